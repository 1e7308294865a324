//! Strata Proxy - statement processor
//!
//! The proxy wires the routing pipeline to the execution engine:
//! - Routing a statement context into a route context
//! - Building execution units with the configured SQL text resolver
//! - Fanning units out and merging their results
//! - Previewing the units of a statement without executing it

use std::sync::Arc;

use strata_core::{ProxyConfig, SchemaRegistry};
use strata_executor::{
    ConnectionProvider, ExecuteEngine, ExecuteError, ExecuteResponse, ExecutionUnitBuilder,
    SqlExecutionUnit, SqlTextResolver, WorkerPool,
};
use strata_router_core::{RouteEngine, RoutingError};
use strata_types::{RouteContext, StatementContext};
use thiserror::Error;
use tracing::{debug, info};

/// Statement processing errors
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Routing failed: {0}")]
    Routing(#[from] RoutingError),

    #[error("Execution failed: {0}")]
    Execution(#[from] ExecuteError),
}

/// Statement processor
pub struct Proxy {
    proxy_id: String,
    route_engine: RouteEngine,
    execute_engine: ExecuteEngine,
    schema: Arc<SchemaRegistry>,
    resolver: Arc<dyn SqlTextResolver>,
}

impl Proxy {
    pub fn new(
        proxy_id: impl Into<String>,
        route_engine: RouteEngine,
        execute_engine: ExecuteEngine,
        schema: Arc<SchemaRegistry>,
        resolver: Arc<dyn SqlTextResolver>,
    ) -> Self {
        Self {
            proxy_id: proxy_id.into(),
            route_engine,
            execute_engine,
            schema,
            resolver,
        }
    }

    /// Build a proxy from configuration
    pub fn from_config(
        config: &ProxyConfig,
        connections: Arc<dyn ConnectionProvider>,
        resolver: Arc<dyn SqlTextResolver>,
    ) -> Result<Self, ProxyError> {
        let route_engine = RouteEngine::from_rules(&config.rules)?;
        let execute_engine = ExecuteEngine::new(
            WorkerPool::new(config.executor.max_workers),
            connections,
        );
        let schema = Arc::new(SchemaRegistry::with_schema(config.schema.clone()));

        info!(
            proxy_id = %config.proxy_id,
            stages = ?route_engine.stage_names(),
            max_workers = config.executor.max_workers,
            "Creating proxy"
        );

        Ok(Self::new(
            config.proxy_id.clone(),
            route_engine,
            execute_engine,
            schema,
            resolver,
        ))
    }

    pub fn proxy_id(&self) -> &str {
        &self.proxy_id
    }

    pub fn schema(&self) -> &Arc<SchemaRegistry> {
        &self.schema
    }

    pub fn route_engine(&self) -> &RouteEngine {
        &self.route_engine
    }

    /// Route a statement
    pub fn route(&self, statement: &StatementContext) -> Result<RouteContext, ProxyError> {
        Ok(self.route_engine.route(statement, self.schema.as_ref())?)
    }

    /// Execution units of a statement, without running them
    pub fn preview(&self, statement: &StatementContext) -> Result<Vec<SqlExecutionUnit>, ProxyError> {
        let route_context = self.route(statement)?;
        Ok(ExecutionUnitBuilder::build(&route_context, self.resolver.as_ref()))
    }

    /// Route, execute and merge a statement
    pub async fn execute(
        &self,
        statement: &StatementContext,
        return_generated_keys: bool,
    ) -> Result<ExecuteResponse, ProxyError> {
        let units = self.preview(statement)?;
        debug!(kind = %statement.kind, units = units.len(), "Executing statement");
        Ok(self.execute_engine.execute(units, return_generated_keys).await?)
    }

    /// Stop accepting new deferred units
    pub fn shutdown(&self) {
        info!(proxy_id = %self.proxy_id, "Shutting down proxy");
        self.execute_engine.pool().shutdown();
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("proxy_id", &self.proxy_id)
            .field("route_engine", &self.route_engine)
            .field("execute_engine", &self.execute_engine)
            .finish_non_exhaustive()
    }
}
