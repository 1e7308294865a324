//! Routing stage contract

use strata_types::{IndexOwnerLookup, RouteContext, StatementContext};

use crate::error::RoutingError;

/// One stage of the routing pipeline
///
/// The first applicable stage seeds the route context; every later
/// applicable stage decorates the context in place.
pub trait SqlRouter: Send + Sync {
    /// Position in the pipeline; lower runs first
    fn order(&self) -> i32;

    /// Stage name for logging
    fn name(&self) -> &'static str;

    /// Whether this stage takes part in routing `statement`
    fn applies_to(&self, _statement: &StatementContext) -> bool {
        true
    }

    /// Build a fresh route context
    fn create_route_context(
        &self,
        statement: &StatementContext,
        schema: &dyn IndexOwnerLookup,
    ) -> Result<RouteContext, RoutingError>;

    /// Rewrite a route context produced by an earlier stage
    fn decorate_route_context(
        &self,
        route_context: &mut RouteContext,
        statement: &StatementContext,
        schema: &dyn IndexOwnerLookup,
    ) -> Result<(), RoutingError>;
}
