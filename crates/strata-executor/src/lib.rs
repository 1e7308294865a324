//! Strata Executor - runs routed statements against backend datasources
//!
//! ```text
//! RouteContext ──► ExecutionUnitBuilder ──► [SqlExecutionUnit]
//!                                                 │
//!                                                 ▼
//!                                          ExecuteEngine ──► WorkerPool
//!                                                 │
//!                                                 ▼
//!                                    merge ──► ExecuteResponse
//! ```
//!
//! Backends are reached through [`ConnectionProvider`]; every statement is
//! created memory-strict, streaming one row at a time.

pub mod backend;
pub mod engine;
pub mod error;
pub mod merge;
pub mod pool;
pub mod response;
pub mod unit;

pub use backend::{
    BackendConnection, BackendError, ColumnMetadata, ConnectionProvider, FetchSize, Row,
    RowStream, StatementOptions, StatementOutcome, UpdateResult, Value,
};
pub use engine::ExecuteEngine;
pub use error::{ExecuteError, ExecuteResult};
pub use merge::merge;
pub use pool::{PoolClosed, WorkerPool};
pub use response::{
    ExecuteQueryResponse, ExecuteResponse, ExecuteUpdateResponse, FirstUnitResult, QueryResult,
    ResponseKind, SubsequentUnitResult, UpdatePacket,
};
pub use unit::{ExecutionUnitBuilder, SqlExecutionUnit, SqlTextResolver};
