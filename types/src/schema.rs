//! Schema metadata used to resolve index owners

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Resolves the logical table that owns an index
pub trait IndexOwnerLookup: Send + Sync {
    fn lookup_table_by_index(&self, index_name: &str) -> Option<String>;
}

/// Metadata of one logical table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetaData {
    #[serde(default)]
    pub indexes: BTreeSet<String>,
}

impl TableMetaData {
    pub fn with_indexes(indexes: &[&str]) -> Self {
        Self {
            indexes: indexes.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Tables of one logical schema, kept sorted so lookups scan deterministically
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMetaData {
    #[serde(default)]
    tables: BTreeMap<String, TableMetaData>,
}

impl SchemaMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, table_name: impl Into<String>, meta: TableMetaData) {
        self.tables.insert(table_name.into(), meta);
    }

    pub fn remove(&mut self, table_name: &str) -> Option<TableMetaData> {
        self.tables.remove(table_name)
    }

    pub fn get(&self, table_name: &str) -> Option<&TableMetaData> {
        self.tables.get(table_name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl IndexOwnerLookup for SchemaMetaData {
    fn lookup_table_by_index(&self, index_name: &str) -> Option<String> {
        self.tables
            .iter()
            .find(|(_, meta)| meta.indexes.contains(index_name))
            .map(|(name, _)| name.clone())
    }
}
