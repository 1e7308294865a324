//! Common types for the router module
//!
//! Centralizes stage ordering constants so every stage sorts the same way.

use serde::{Deserialize, Serialize};

/// Sharding stage runs first and seeds the route context
pub const SHARDING_ORDER: i32 = 0;

/// Read-write splitting decorates what sharding produced
pub const READWRITE_SPLITTING_ORDER: i32 = 10;

/// What a stage did to the route context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteAction {
    /// Stage produced the initial route units
    Create,
    /// Stage rewrote existing route units
    Decorate,
    /// Stage did not apply to the statement
    Skip,
}

impl std::fmt::Display for RouteAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteAction::Create => write!(f, "create"),
            RouteAction::Decorate => write!(f, "decorate"),
            RouteAction::Skip => write!(f, "skip"),
        }
    }
}
