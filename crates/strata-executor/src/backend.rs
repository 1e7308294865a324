//! Backend contracts consumed by the execution engine
//!
//! Connection management and wire protocols live outside this crate; the
//! engine only needs to obtain a connection for a datasource and run one
//! SQL text on it with explicit statement options.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a backend
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection could not be obtained
    #[error("Cannot get connection to `{data_source}`: {reason}")]
    Connection { data_source: String, reason: String },

    /// Backend rejected or failed the statement
    #[error("SQL execution failed: {0}")]
    Sql(String),

    /// Row fetch failed after the statement started streaming
    #[error("Row fetch failed: {0}")]
    Fetch(String),
}

/// One column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

/// One result row
pub type Row = Vec<Value>;

/// Lazily fetched rows of one result set
pub type RowStream = BoxStream<'static, Result<Row, BackendError>>;

/// Column definition reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: String,
    pub table: Option<String>,
    pub nullable: bool,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            table: None,
            nullable: true,
        }
    }
}

/// How many rows a statement fetches per round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchSize {
    /// Streaming sentinel: never buffer more than one row per backend
    OneRowAtATime,
    /// Fetch up to `n` rows per round trip
    Rows(u32),
}

/// Options a statement is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementOptions {
    pub fetch_size: FetchSize,
    pub return_generated_keys: bool,
    /// Report column metadata for query results
    pub capture_metadata: bool,
}

impl StatementOptions {
    /// Memory-strict options: rows are always streamed one at a time
    pub fn memory_strict(return_generated_keys: bool, capture_metadata: bool) -> Self {
        Self {
            fetch_size: FetchSize::OneRowAtATime,
            return_generated_keys,
            capture_metadata,
        }
    }
}

/// Counters returned by a mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub affected_rows: u64,
    pub last_insert_id: Option<u64>,
    pub generated_keys: Vec<u64>,
}

impl UpdateResult {
    pub fn new(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }
}

/// What executing one SQL text produced
pub enum StatementOutcome {
    /// Result set; `columns` may be empty when metadata was not requested
    Query {
        columns: Vec<ColumnMetadata>,
        rows: RowStream,
    },
    Update(UpdateResult),
}

impl fmt::Debug for StatementOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementOutcome::Query { columns, .. } => f
                .debug_struct("Query")
                .field("columns", columns)
                .finish_non_exhaustive(),
            StatementOutcome::Update(update) => f.debug_tuple("Update").field(update).finish(),
        }
    }
}

/// A connection bound to the current session for one datasource
#[async_trait]
pub trait BackendConnection: Send + Sync {
    /// Create a statement with `options` and execute `sql` on it
    async fn execute(
        &self,
        sql: &str,
        options: &StatementOptions,
    ) -> Result<StatementOutcome, BackendError>;
}

/// Hands out connections; must be safe to call concurrently for distinct datasources
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn get_connection(
        &self,
        data_source: &str,
    ) -> Result<Arc<dyn BackendConnection>, BackendError>;
}
