//! Weighted Strategy for Read Datasource Selection
//!
//! Picks a read datasource at random with probability proportional to its
//! configured weight. Reads without a configured weight count as 1.0.

use std::collections::HashMap;

use rand::Rng;
use strata_types::LoadBalanceAlgorithmType;
use tracing::trace;

use super::ReplicaLoadBalanceAlgorithm;
use crate::error::RoutingError;

const DEFAULT_WEIGHT: f64 = 1.0;

/// Weighted random routing strategy
#[derive(Debug, Clone, Default)]
pub struct WeightLoadBalanceAlgorithm {
    /// Read datasource name -> weight
    weights: HashMap<String, f64>,
}

impl WeightLoadBalanceAlgorithm {
    pub fn new(weights: HashMap<String, f64>) -> Self {
        Self { weights }
    }

    /// Parse weights from algorithm properties
    pub fn from_props(props: &HashMap<String, String>) -> Result<Self, RoutingError> {
        let mut weights = HashMap::with_capacity(props.len());
        for (data_source, raw) in props {
            let weight: f64 = raw.trim().parse().map_err(|_| {
                RoutingError::InvalidConfig(format!(
                    "weight of `{}` is not a number: {}",
                    data_source, raw
                ))
            })?;
            if !weight.is_finite() || weight <= 0.0 {
                return Err(RoutingError::InvalidConfig(format!(
                    "weight of `{}` must be positive, got {}",
                    data_source, raw
                )));
            }
            weights.insert(data_source.clone(), weight);
        }

        let total: f64 = weights.values().sum();
        if !total.is_finite() {
            return Err(RoutingError::InvalidConfig(format!(
                "sum of weights overflows: {}",
                total
            )));
        }
        Ok(Self { weights })
    }

    fn weight_of(&self, data_source: &str) -> f64 {
        self.weights.get(data_source).copied().unwrap_or(DEFAULT_WEIGHT)
    }

    /// Index of the read whose cumulative weight range contains `point`,
    /// where `point` lies in `[0, total weight)`.
    fn pick(&self, read_data_sources: &[String], point: f64) -> usize {
        let mut cumulative = 0.0;
        for (index, data_source) in read_data_sources.iter().enumerate() {
            cumulative += self.weight_of(data_source);
            if point < cumulative {
                return index;
            }
        }
        read_data_sources.len() - 1
    }
}

impl ReplicaLoadBalanceAlgorithm for WeightLoadBalanceAlgorithm {
    fn select(
        &self,
        name: &str,
        _write_data_source: &str,
        read_data_sources: &[String],
    ) -> Result<String, RoutingError> {
        if read_data_sources.is_empty() {
            return Err(RoutingError::NoReadDataSource(name.to_string()));
        }

        let total: f64 = read_data_sources.iter().map(|ds| self.weight_of(ds)).sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(RoutingError::InvalidConfig(format!(
                "group `{}` has an unusable total weight: {}",
                name, total
            )));
        }
        let point = rand::thread_rng().gen_range(0.0..total);
        let selected = &read_data_sources[self.pick(read_data_sources, point)];
        trace!(group = %name, data_source = %selected, "Selected by weight");
        Ok(selected.clone())
    }

    fn algorithm_type(&self) -> LoadBalanceAlgorithmType {
        LoadBalanceAlgorithmType::Weight
    }

    fn name(&self) -> &'static str {
        "Weight"
    }
}
