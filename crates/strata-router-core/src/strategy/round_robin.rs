//! Round Robin Strategy for Read Datasource Selection
//!
//! Each read-write splitting group keeps its own counter so that groups do
//! not disturb each other's rotation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use strata_types::LoadBalanceAlgorithmType;
use tracing::trace;

use super::ReplicaLoadBalanceAlgorithm;
use crate::error::RoutingError;

/// Round-robin routing strategy
#[derive(Debug, Default)]
pub struct RoundRobinLoadBalanceAlgorithm {
    /// Per-group rotation counters
    counters: RwLock<HashMap<String, AtomicUsize>>,
}

impl RoundRobinLoadBalanceAlgorithm {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_index(&self, name: &str) -> usize {
        if let Some(counter) = self.counters.read().get(name) {
            return counter.fetch_add(1, Ordering::Relaxed);
        }
        self.counters
            .write()
            .entry(name.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed)
    }
}

impl ReplicaLoadBalanceAlgorithm for RoundRobinLoadBalanceAlgorithm {
    fn select(
        &self,
        name: &str,
        _write_data_source: &str,
        read_data_sources: &[String],
    ) -> Result<String, RoutingError> {
        if read_data_sources.is_empty() {
            return Err(RoutingError::NoReadDataSource(name.to_string()));
        }

        let index = self.next_index(name) % read_data_sources.len();
        let selected = &read_data_sources[index];
        trace!(group = %name, data_source = %selected, "Selected by round robin");
        Ok(selected.clone())
    }

    fn algorithm_type(&self) -> LoadBalanceAlgorithmType {
        LoadBalanceAlgorithmType::RoundRobin
    }

    fn name(&self) -> &'static str {
        "RoundRobin"
    }
}
