//! Schema registry - shared, refreshable view of logical table metadata

use std::sync::Arc;

use parking_lot::RwLock;
use strata_types::{IndexOwnerLookup, SchemaMetaData, TableMetaData};
use tracing::{debug, info};

/// Thread-safe schema registry
///
/// Readers take cheap snapshots; writers replace table entries in place.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schema: Arc<RwLock<SchemaMetaData>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded from configuration
    pub fn with_schema(schema: SchemaMetaData) -> Self {
        info!(tables = schema.len(), "Loading schema metadata");
        Self {
            schema: Arc::new(RwLock::new(schema)),
        }
    }

    /// Register or replace a table
    pub fn register_table(&self, table_name: impl Into<String>, meta: TableMetaData) {
        let table_name = table_name.into();
        debug!(table = %table_name, indexes = meta.indexes.len(), "Registering table metadata");
        self.schema.write().put(table_name, meta);
    }

    /// Drop a table
    pub fn unregister_table(&self, table_name: &str) -> Option<TableMetaData> {
        debug!(table = %table_name, "Unregistering table metadata");
        self.schema.write().remove(table_name)
    }

    pub fn get_table(&self, table_name: &str) -> Option<TableMetaData> {
        self.schema.read().get(table_name).cloned()
    }

    /// Point-in-time copy of the whole schema
    pub fn snapshot(&self) -> SchemaMetaData {
        self.schema.read().clone()
    }

    pub fn table_count(&self) -> usize {
        self.schema.read().len()
    }
}

impl IndexOwnerLookup for SchemaRegistry {
    fn lookup_table_by_index(&self, index_name: &str) -> Option<String> {
        self.schema.read().lookup_table_by_index(index_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let registry = SchemaRegistry::new();
        registry.register_table("t_order", TableMetaData::with_indexes(&["idx_order_user"]));

        assert_eq!(registry.table_count(), 1);
        assert_eq!(
            registry.lookup_table_by_index("idx_order_user"),
            Some("t_order".to_string())
        );

        registry.unregister_table("t_order");
        assert_eq!(registry.lookup_table_by_index("idx_order_user"), None);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = SchemaRegistry::new();
        registry.register_table("t_order", TableMetaData::default());

        let snapshot = registry.snapshot();
        registry.register_table("t_item", TableMetaData::default());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.table_count(), 2);
    }
}
