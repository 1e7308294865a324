//! Random Strategy for Read Datasource Selection

use rand::Rng;
use strata_types::LoadBalanceAlgorithmType;
use tracing::trace;

use super::ReplicaLoadBalanceAlgorithm;
use crate::error::RoutingError;

/// Uniform random routing strategy
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomLoadBalanceAlgorithm;

impl RandomLoadBalanceAlgorithm {
    pub fn new() -> Self {
        Self
    }
}

impl ReplicaLoadBalanceAlgorithm for RandomLoadBalanceAlgorithm {
    fn select(
        &self,
        name: &str,
        _write_data_source: &str,
        read_data_sources: &[String],
    ) -> Result<String, RoutingError> {
        if read_data_sources.is_empty() {
            return Err(RoutingError::NoReadDataSource(name.to_string()));
        }

        let index = rand::thread_rng().gen_range(0..read_data_sources.len());
        let selected = &read_data_sources[index];
        trace!(group = %name, data_source = %selected, "Selected at random");
        Ok(selected.clone())
    }

    fn algorithm_type(&self) -> LoadBalanceAlgorithmType {
        LoadBalanceAlgorithmType::Random
    }

    fn name(&self) -> &'static str {
        "Random"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selects_member_of_pool() {
        let strategy = RandomLoadBalanceAlgorithm::new();
        let reads = vec!["read_0".to_string(), "read_1".to_string()];

        for _ in 0..100 {
            let picked = strategy.select("ds0", "write", &reads).unwrap();
            assert!(reads.contains(&picked));
        }
    }

    #[test]
    fn test_single_read() {
        let strategy = RandomLoadBalanceAlgorithm::new();
        let reads = vec!["only".to_string()];
        assert_eq!(strategy.select("ds0", "write", &reads).unwrap(), "only");
    }

    #[test]
    fn test_empty_reads() {
        let strategy = RandomLoadBalanceAlgorithm::new();
        assert!(strategy.select("ds0", "write", &[]).is_err());
    }
}
