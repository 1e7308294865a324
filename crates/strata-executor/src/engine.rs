//! Fan-out execution engine
//!
//! ```text
//! units: [u0, u1, u2, ... un]
//!          │    └──────┬─────┘
//!          │           ▼
//!          │     WorkerPool::submit   (metadata off, one row at a time)
//!          ▼
//!     run inline on the caller        (metadata on, one row at a time)
//!          │           │
//!          └─────┬─────┘
//!                ▼
//!     await handles in submission order ──► merge ──► ExecuteResponse
//! ```
//!
//! Every dispatched unit is awaited before the statement completes, even when
//! an earlier unit already failed. The first unit's error takes precedence,
//! otherwise the earliest failing deferred unit is reported.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::{ConnectionProvider, StatementOptions, StatementOutcome};
use crate::error::{ExecuteError, ExecuteResult};
use crate::merge::merge;
use crate::pool::WorkerPool;
use crate::response::{
    ExecuteResponse, FirstUnitResult, QueryResult, SubsequentUnitResult, UpdatePacket,
};
use crate::unit::SqlExecutionUnit;

/// Runs execution units against backends and merges their results
#[derive(Clone)]
pub struct ExecuteEngine {
    pool: WorkerPool,
    connections: Arc<dyn ConnectionProvider>,
}

impl std::fmt::Debug for ExecuteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecuteEngine")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl ExecuteEngine {
    pub fn new(pool: WorkerPool, connections: Arc<dyn ConnectionProvider>) -> Self {
        Self { pool, connections }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Execute `units` and return one response with results in unit order
    pub async fn execute(
        &self,
        units: Vec<SqlExecutionUnit>,
        return_generated_keys: bool,
    ) -> ExecuteResult<ExecuteResponse> {
        let mut units = units.into_iter();
        let Some(first) = units.next() else {
            return Err(ExecuteError::NoExecutionUnit);
        };

        let deferred_options = StatementOptions::memory_strict(return_generated_keys, false);
        let handles: Vec<_> = units
            .map(|unit| {
                let data_source = unit.data_source().to_string();
                let connections = self.connections.clone();
                let options = deferred_options;
                let handle = self.pool.submit(async move {
                    execute_subsequent(connections.as_ref(), &unit, &options).await
                });
                (data_source, handle)
            })
            .collect();
        debug!(
            first = %first.data_source(),
            deferred = handles.len(),
            "Dispatched execution units"
        );

        let first_options = StatementOptions::memory_strict(return_generated_keys, true);
        let first_result = execute_first(self.connections.as_ref(), &first, &first_options).await;

        let mut rest = Vec::with_capacity(handles.len());
        for (data_source, handle) in handles {
            let result = match handle.await {
                Ok(Ok(result)) => result,
                Ok(Err(closed)) => Err(ExecuteError::Aggregation {
                    data_source: data_source.clone(),
                    reason: closed.to_string(),
                }),
                Err(join_error) => Err(ExecuteError::Aggregation {
                    data_source: data_source.clone(),
                    reason: join_error.to_string(),
                }),
            };
            if let Err(e) = &result {
                warn!(data_source = %data_source, error = %e, "Execution unit failed");
            }
            rest.push(result);
        }

        let first_result = match first_result {
            Ok(result) => result,
            Err(e) => {
                warn!(data_source = %first.data_source(), error = %e, "First execution unit failed");
                return Err(e);
            }
        };
        merge(first_result, rest)
    }
}

async fn execute_first(
    connections: &dyn ConnectionProvider,
    unit: &SqlExecutionUnit,
    options: &StatementOptions,
) -> ExecuteResult<FirstUnitResult> {
    let data_source = unit.data_source();
    Ok(match execute_unit(connections, unit, options).await? {
        StatementOutcome::Query { columns, rows } => FirstUnitResult::Query {
            columns,
            result: QueryResult::new(data_source, rows),
        },
        StatementOutcome::Update(result) => {
            FirstUnitResult::Update(UpdatePacket::new(data_source, result))
        }
    })
}

async fn execute_subsequent(
    connections: &dyn ConnectionProvider,
    unit: &SqlExecutionUnit,
    options: &StatementOptions,
) -> ExecuteResult<SubsequentUnitResult> {
    let data_source = unit.data_source();
    Ok(match execute_unit(connections, unit, options).await? {
        StatementOutcome::Query { rows, .. } => {
            SubsequentUnitResult::Query(QueryResult::new(data_source, rows))
        }
        StatementOutcome::Update(result) => {
            SubsequentUnitResult::Update(UpdatePacket::new(data_source, result))
        }
    })
}

async fn execute_unit(
    connections: &dyn ConnectionProvider,
    unit: &SqlExecutionUnit,
    options: &StatementOptions,
) -> ExecuteResult<StatementOutcome> {
    let data_source = unit.data_source();
    let connection = connections
        .get_connection(data_source)
        .await
        .map_err(|e| ExecuteError::unit(data_source, e))?;
    connection
        .execute(unit.sql(), options)
        .await
        .map_err(|e| ExecuteError::unit(data_source, e))
}
