//! Execution units and the builder that derives them from a route context

use serde::{Deserialize, Serialize};
use strata_types::{RouteContext, RouteUnit};
use tracing::trace;

/// One SQL text bound to one actual datasource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SqlExecutionUnit {
    data_source: String,
    sql: String,
}

impl SqlExecutionUnit {
    pub fn new(data_source: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            sql: sql.into(),
        }
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// Supplies the final SQL text of a route unit (the rewriting layer)
pub trait SqlTextResolver: Send + Sync {
    fn resolve_sql_text(&self, route_unit: &RouteUnit) -> String;
}

impl<F> SqlTextResolver for F
where
    F: Fn(&RouteUnit) -> String + Send + Sync,
{
    fn resolve_sql_text(&self, route_unit: &RouteUnit) -> String {
        self(route_unit)
    }
}

/// Builds execution units, one per route unit, in route order
#[derive(Debug, Default, Clone, Copy)]
pub struct ExecutionUnitBuilder;

impl ExecutionUnitBuilder {
    pub fn build(
        route_context: &RouteContext,
        resolver: &dyn SqlTextResolver,
    ) -> Vec<SqlExecutionUnit> {
        route_context
            .route_units()
            .iter()
            .map(|route_unit| {
                let sql = resolver.resolve_sql_text(route_unit);
                trace!(data_source = %route_unit.actual_data_source(), sql = %sql, "Execution unit built");
                SqlExecutionUnit::new(route_unit.actual_data_source(), sql)
            })
            .collect()
    }
}
