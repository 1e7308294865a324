//! Pre-parsed statement context handed to the router
//!
//! Parsing is done upstream; the router only needs the statement kind and the
//! names it references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of SQL statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    CreateTable,
    AlterTable,
    DropTable,
    Truncate,
    CreateIndex,
    DropIndex,
    Other,
}

impl StatementKind {
    pub fn is_query(&self) -> bool {
        matches!(self, StatementKind::Select)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::AlterTable => "ALTER TABLE",
            StatementKind::DropTable => "DROP TABLE",
            StatementKind::Truncate => "TRUNCATE",
            StatementKind::CreateIndex => "CREATE INDEX",
            StatementKind::DropIndex => "DROP INDEX",
            StatementKind::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// Routing-relevant view of one parsed statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementContext {
    pub kind: StatementKind,

    /// Logical tables named by the statement, in statement order
    pub table_names: Vec<String>,

    /// Index names, for statements that name an index without its table
    pub index_names: Vec<String>,

    /// `SELECT ... FOR UPDATE` / `LOCK IN SHARE MODE`
    pub lock_clause: bool,

    /// Session hint forcing the write datasource
    pub write_route_only: bool,

    /// Statement runs inside an explicit transaction
    pub in_transaction: bool,
}

impl StatementContext {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            table_names: vec![],
            index_names: vec![],
            lock_clause: false,
            write_route_only: false,
            in_transaction: false,
        }
    }

    pub fn select(tables: &[&str]) -> Self {
        Self::new(StatementKind::Select).with_tables(tables)
    }

    pub fn insert(table: &str) -> Self {
        Self::new(StatementKind::Insert).with_tables(&[table])
    }

    pub fn drop_index(indexes: &[&str]) -> Self {
        let mut ctx = Self::new(StatementKind::DropIndex);
        ctx.index_names = indexes.iter().map(|s| s.to_string()).collect();
        ctx
    }

    pub fn with_tables(mut self, tables: &[&str]) -> Self {
        self.table_names = tables.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_lock_clause(mut self) -> Self {
        self.lock_clause = true;
        self
    }

    pub fn with_write_route_only(mut self) -> Self {
        self.write_route_only = true;
        self
    }

    pub fn in_transaction(mut self) -> Self {
        self.in_transaction = true;
        self
    }

    /// Whether the statement must go to a write (primary) datasource
    pub fn is_primary_route(&self) -> bool {
        !self.kind.is_query() || self.lock_clause || self.write_route_only || self.in_transaction
    }
}
