//! Route Engine
//!
//! Runs the configured routing stages over one exclusively owned route
//! context per statement.
//!
//! # Pipeline
//!
//! ```text
//! StatementContext
//!        │
//!        ▼
//! stages sorted by order (sharding = 0, read-write splitting = 10)
//!        │
//!        ▼
//! for each stage that applies:
//!     context empty? ──Yes──► create_route_context
//!        │
//!        No
//!        ▼
//!     decorate_route_context (in place)
//!        │
//!        ▼
//!   RouteContext
//! ```

use std::sync::Arc;

use strata_types::{
    IndexOwnerLookup, RouteContext, SchemaRuleConfig, ShardingRule, StatementContext,
};
use tracing::{debug, info, trace};

use crate::error::RoutingError;
use crate::readwrite_splitting::{ReadWriteSplittingRule, ReadWriteSplittingSqlRouter};
use crate::router::SqlRouter;
use crate::sharding::ShardingSqlRouter;
use crate::types::RouteAction;

/// Ordered routing pipeline
#[derive(Clone)]
pub struct RouteEngine {
    routers: Vec<Arc<dyn SqlRouter>>,
}

impl RouteEngine {
    /// Create from explicit stages; they are sorted by order once, here
    pub fn new(mut routers: Vec<Arc<dyn SqlRouter>>) -> Self {
        routers.sort_by_key(|r| r.order());
        Self { routers }
    }

    /// Create the stages implied by a schema's rule configuration
    pub fn from_rules(config: &SchemaRuleConfig) -> Result<Self, RoutingError> {
        let mut routers: Vec<Arc<dyn SqlRouter>> = Vec::new();

        if let Some(sharding) = &config.sharding {
            let rule = ShardingRule::new(sharding.clone())?;
            routers.push(Arc::new(ShardingSqlRouter::new(rule)));
        }
        if let Some(readwrite_splitting) = &config.readwrite_splitting {
            let rule = ReadWriteSplittingRule::new(readwrite_splitting)?;
            routers.push(Arc::new(ReadWriteSplittingSqlRouter::new(rule)));
        }

        if routers.is_empty() {
            return Err(RoutingError::InvalidConfig(
                "no sharding or read-write splitting rule configured".to_string(),
            ));
        }

        let engine = Self::new(routers);
        info!(stages = ?engine.stage_names(), "Route engine created");
        Ok(engine)
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.routers.iter().map(|r| r.name()).collect()
    }

    /// Route a statement through every applicable stage
    pub fn route(
        &self,
        statement: &StatementContext,
        schema: &dyn IndexOwnerLookup,
    ) -> Result<RouteContext, RoutingError> {
        let mut route_context = RouteContext::new();
        let mut seeded = false;

        for router in &self.routers {
            let action = if !router.applies_to(statement) {
                RouteAction::Skip
            } else if !seeded {
                route_context = router.create_route_context(statement, schema)?;
                seeded = true;
                RouteAction::Create
            } else {
                router.decorate_route_context(&mut route_context, statement, schema)?;
                RouteAction::Decorate
            };
            trace!(stage = router.name(), action = %action, units = route_context.len(), "Routing stage done");
        }

        if !seeded {
            return Err(RoutingError::NoApplicableRoute(statement.kind.to_string()));
        }

        debug!(
            kind = %statement.kind,
            units = route_context.len(),
            data_sources = ?route_context.actual_data_source_names(),
            "Statement routed"
        );
        Ok(route_context)
    }
}

impl std::fmt::Debug for RouteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteEngine")
            .field("stages", &self.stage_names())
            .finish()
    }
}
