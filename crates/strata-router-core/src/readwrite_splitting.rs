//! Read-write splitting routing stage
//!
//! Re-points route units whose datasource is a read-write splitting group
//! placeholder to a concrete write or read datasource.

use std::collections::HashMap;
use std::sync::Arc;

use strata_types::{
    IndexOwnerLookup, ReadWriteSplittingDataSourceRuleConfig, ReadWriteSplittingRuleConfig, RouteContext,
    RouteMapper, RouteUnit, StatementContext,
};
use tracing::{debug, trace};

use crate::error::RoutingError;
use crate::router::SqlRouter;
use crate::strategy::{
    build_load_balancer, ReplicaLoadBalanceAlgorithm, RoundRobinLoadBalanceAlgorithm,
};
use crate::types::READWRITE_SPLITTING_ORDER;

/// Runtime rule of one read-write splitting group
#[derive(Debug, Clone)]
pub struct ReadWriteSplittingDataSourceRule {
    name: String,
    write_data_source_name: String,
    read_data_source_names: Vec<String>,
    load_balancer: Arc<dyn ReplicaLoadBalanceAlgorithm>,
}

impl ReadWriteSplittingDataSourceRule {
    pub fn new(
        config: &ReadWriteSplittingDataSourceRuleConfig,
        load_balancer: Arc<dyn ReplicaLoadBalanceAlgorithm>,
    ) -> Result<Self, RoutingError> {
        // Read pool is an ordered set that never contains the write datasource.
        let mut read_data_source_names: Vec<String> = Vec::new();
        for read in &config.read_data_source_names {
            if read != &config.write_data_source_name && !read_data_source_names.contains(read) {
                read_data_source_names.push(read.clone());
            }
        }
        if read_data_source_names.is_empty() {
            return Err(RoutingError::InvalidConfig(format!(
                "read-write splitting group `{}` has no read datasource",
                config.name
            )));
        }

        Ok(Self {
            name: config.name.clone(),
            write_data_source_name: config.write_data_source_name.clone(),
            read_data_source_names,
            load_balancer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn write_data_source_name(&self) -> &str {
        &self.write_data_source_name
    }

    pub fn read_data_source_names(&self) -> &[String] {
        &self.read_data_source_names
    }

    pub fn load_balancer(&self) -> &dyn ReplicaLoadBalanceAlgorithm {
        self.load_balancer.as_ref()
    }

    /// Pick the actual datasource for `statement`
    pub fn route(&self, statement: &StatementContext) -> Result<String, RoutingError> {
        if statement.is_primary_route() {
            trace!(group = %self.name, data_source = %self.write_data_source_name, "Primary route");
            return Ok(self.write_data_source_name.clone());
        }
        self.load_balancer
            .select(&self.name, &self.write_data_source_name, &self.read_data_source_names)
    }
}

/// All read-write splitting groups of a schema
#[derive(Debug, Clone)]
pub struct ReadWriteSplittingRule {
    data_source_rules: Vec<ReadWriteSplittingDataSourceRule>,
}

impl ReadWriteSplittingRule {
    /// Build the runtime rule; groups naming the same load balancer share one instance
    pub fn new(config: &ReadWriteSplittingRuleConfig) -> Result<Self, RoutingError> {
        let mut balancers: HashMap<&str, Arc<dyn ReplicaLoadBalanceAlgorithm>> = HashMap::new();
        let mut default_balancer: Option<Arc<dyn ReplicaLoadBalanceAlgorithm>> = None;
        let mut data_source_rules = Vec::with_capacity(config.data_sources.len());

        for group in &config.data_sources {
            let balancer = match group.load_balancer_name.as_deref() {
                Some(balancer_name) => match balancers.get(balancer_name) {
                    Some(existing) => existing.clone(),
                    None => {
                        let algorithm_config = config.load_balancers.get(balancer_name).ok_or_else(|| {
                            RoutingError::InvalidConfig(format!(
                                "group `{}` references unknown load balancer `{}`",
                                group.name, balancer_name
                            ))
                        })?;
                        let built = build_load_balancer(algorithm_config)?;
                        balancers.insert(balancer_name, built.clone());
                        built
                    }
                },
                None => default_balancer
                    .get_or_insert_with(|| Arc::new(RoundRobinLoadBalanceAlgorithm::new()))
                    .clone(),
            };

            debug!(
                group = %group.name,
                write = %group.write_data_source_name,
                reads = group.read_data_source_names.len(),
                load_balancer = balancer.name(),
                "Read-write splitting group loaded"
            );
            data_source_rules.push(ReadWriteSplittingDataSourceRule::new(group, balancer)?);
        }

        Ok(Self { data_source_rules })
    }

    pub fn data_source_rules(&self) -> &[ReadWriteSplittingDataSourceRule] {
        &self.data_source_rules
    }

    /// Find the group whose placeholder name matches (ASCII case-insensitive)
    pub fn find_data_source_rule(&self, name: &str) -> Option<&ReadWriteSplittingDataSourceRule> {
        self.data_source_rules
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
    }

    /// The only group, when read-write splitting routes without sharding
    pub fn single_data_source_rule(&self) -> Result<&ReadWriteSplittingDataSourceRule, RoutingError> {
        match self.data_source_rules.as_slice() {
            [only] => Ok(only),
            rules => Err(RoutingError::AmbiguousDataSourceRule(rules.len())),
        }
    }
}

/// Read-write splitting stage of the routing pipeline
#[derive(Debug, Clone)]
pub struct ReadWriteSplittingSqlRouter {
    rule: ReadWriteSplittingRule,
}

impl ReadWriteSplittingSqlRouter {
    pub fn new(rule: ReadWriteSplittingRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &ReadWriteSplittingRule {
        &self.rule
    }
}

impl SqlRouter for ReadWriteSplittingSqlRouter {
    fn order(&self) -> i32 {
        READWRITE_SPLITTING_ORDER
    }

    fn name(&self) -> &'static str {
        "ReadWriteSplitting"
    }

    fn create_route_context(
        &self,
        statement: &StatementContext,
        _schema: &dyn IndexOwnerLookup,
    ) -> Result<RouteContext, RoutingError> {
        let group = self.rule.single_data_source_rule()?;
        let actual = group.route(statement)?;
        let mut route_context = RouteContext::new();
        route_context.push(RouteUnit::new(RouteMapper::new(group.name(), actual), vec![]));
        Ok(route_context)
    }

    /// Replace every unit still pointing at a group placeholder, in place.
    /// The number of units never changes.
    fn decorate_route_context(
        &self,
        route_context: &mut RouteContext,
        statement: &StatementContext,
        _schema: &dyn IndexOwnerLookup,
    ) -> Result<(), RoutingError> {
        for unit in route_context.route_units_mut().iter_mut() {
            let Some(group) = self.rule.find_data_source_rule(unit.logic_data_source()) else {
                continue;
            };
            if !group.name().eq_ignore_ascii_case(unit.actual_data_source()) {
                continue;
            }

            let actual = group.route(statement)?;
            trace!(group = %group.name(), data_source = %actual, "Route unit re-pointed");
            unit.data_source_mapper.actual_name = actual;
        }
        Ok(())
    }
}
