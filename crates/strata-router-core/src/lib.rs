//! Strata Router - Statement Routing Module
//!
//! Decides which physical datasources and tables a logical statement touches.
//!
//! # Architecture
//!
//! ```text
//! StatementContext
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │     ShardingSqlRouter   │  Seeds: which datasources / actual tables?
//! └───────────┬─────────────┘
//!             │  RouteContext
//!             ▼
//! ┌─────────────────────────┐
//! │ ReadWriteSplittingSql-  │  Decorates: which write / read datasource?
//! │ Router                  │
//! └─────────────────────────┘
//! ```
//!
//! # Load-Balance Strategies (strategy module)
//! - **RoundRobinLoadBalanceAlgorithm**: Rotates over reads per group
//! - **RandomLoadBalanceAlgorithm**: Uniform random read
//! - **WeightLoadBalanceAlgorithm**: Weighted random read
//!
//! # Example
//!
//! ```rust,ignore
//! use strata_router_core::RouteEngine;
//! use strata_types::StatementContext;
//!
//! let engine = RouteEngine::from_rules(&config.rules)?;
//! let route_context = engine.route(&StatementContext::select(&["t_order"]), &schema)?;
//! ```

// Core modules
mod error;
mod types;

// Strategy module (read datasource selection)
mod strategy;

// Routing stages
mod readwrite_splitting;
mod router;
mod sharding;

// Pipeline
mod engine;


// Re-exports: Error types
pub use error::RoutingError;

// Re-exports: Core types
pub use types::{RouteAction, READWRITE_SPLITTING_ORDER, SHARDING_ORDER};

// Re-exports: Strategy traits and implementations
pub use strategy::{
    build_load_balancer, RandomLoadBalanceAlgorithm, ReplicaLoadBalanceAlgorithm,
    RoundRobinLoadBalanceAlgorithm, WeightLoadBalanceAlgorithm,
};

// Re-exports: Stages
pub use readwrite_splitting::{
    ReadWriteSplittingDataSourceRule, ReadWriteSplittingRule, ReadWriteSplittingSqlRouter,
};
pub use router::SqlRouter;
pub use sharding::{ShardingSqlRouter, TableBroadcastRoutingEngine};

// Re-exports: Pipeline
pub use engine::RouteEngine;
