//! Replica Load-Balance Strategies
//!
//! This module contains the strategies used by read-write splitting to pick
//! one read datasource per statement:
//!
//! - `RoundRobinLoadBalanceAlgorithm`: Rotates over reads, one counter per group
//! - `RandomLoadBalanceAlgorithm`: Uniform random choice
//! - `WeightLoadBalanceAlgorithm`: Random choice proportional to configured weights
//!
//! # Strategy Placement
//!
//! ```text
//! RouteUnit (logic ds = group, actual ds = group)
//!     │
//!     ▼
//! ┌─────────────────────────┐
//! │  Primary route?         │──Yes──► write datasource
//! └───────────┬─────────────┘
//!             │ No
//!             ▼
//! ┌─────────────────────────┐
//! │  Load-balance strategy  │──────► one read datasource
//! └─────────────────────────┘
//! ```

mod random;
mod round_robin;
mod weight;

pub use random::RandomLoadBalanceAlgorithm;
pub use round_robin::RoundRobinLoadBalanceAlgorithm;
pub use weight::WeightLoadBalanceAlgorithm;

use std::sync::Arc;

use strata_types::{LoadBalanceAlgorithmConfig, LoadBalanceAlgorithmType};

use crate::error::RoutingError;

/// Trait for read datasource selection strategies
pub trait ReplicaLoadBalanceAlgorithm: Send + Sync + std::fmt::Debug {
    /// Select one of `read_data_sources` for the group `name`
    fn select(
        &self,
        name: &str,
        write_data_source: &str,
        read_data_sources: &[String],
    ) -> Result<String, RoutingError>;

    /// Strategy kind
    fn algorithm_type(&self) -> LoadBalanceAlgorithmType;

    /// Strategy name for logging
    fn name(&self) -> &'static str;
}

/// Build a strategy instance from its configuration
pub fn build_load_balancer(
    config: &LoadBalanceAlgorithmConfig,
) -> Result<Arc<dyn ReplicaLoadBalanceAlgorithm>, RoutingError> {
    let algorithm: Arc<dyn ReplicaLoadBalanceAlgorithm> = match config.algorithm_type {
        LoadBalanceAlgorithmType::RoundRobin => Arc::new(RoundRobinLoadBalanceAlgorithm::new()),
        LoadBalanceAlgorithmType::Random => Arc::new(RandomLoadBalanceAlgorithm::new()),
        LoadBalanceAlgorithmType::Weight => {
            Arc::new(WeightLoadBalanceAlgorithm::from_props(&config.props)?)
        }
    };
    Ok(algorithm)
}
