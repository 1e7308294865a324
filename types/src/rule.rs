//! Rule model - sharding and read-write splitting configuration
//!
//! Pure data plus lookups. Runtime objects that carry state (load-balance
//! algorithms) are built from these types by the router.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::RuleError;

/// Separator between datasource and table in the inline data node form
pub const DATA_NODE_SEPARATOR: char = '.';

/// One physical placement of a logical table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataNode {
    pub data_source_name: String,
    pub table_name: String,
}

impl DataNode {
    pub fn new(data_source_name: impl Into<String>, table_name: impl Into<String>) -> Self {
        Self {
            data_source_name: data_source_name.into(),
            table_name: table_name.into(),
        }
    }
}

impl FromStr for DataNode {
    type Err = RuleError;

    /// Parse `"ds0.t_order_0"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut parts = s.split(DATA_NODE_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ds), Some(table), None) if !ds.is_empty() && !table.is_empty() => {
                Ok(Self::new(ds, table))
            }
            _ => Err(RuleError::InvalidDataNode(s.to_string())),
        }
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.data_source_name, DATA_NODE_SEPARATOR, self.table_name)
    }
}

/// Logical table plus every actual data node it is spread over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRule {
    pub logic_table: String,
    pub actual_data_nodes: Vec<DataNode>,
}

impl TableRule {
    pub fn new(logic_table: impl Into<String>, actual_data_nodes: Vec<DataNode>) -> Self {
        Self {
            logic_table: logic_table.into(),
            actual_data_nodes,
        }
    }

    /// Build from comma separated inline nodes, e.g. `"ds0.t_order_0, ds1.t_order_1"`
    pub fn from_inline(logic_table: impl Into<String>, nodes: &str) -> Result<Self, RuleError> {
        let actual_data_nodes = nodes
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(DataNode::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(logic_table, actual_data_nodes))
    }

    /// Datasources this table spans, in first-seen order
    pub fn data_source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for node in &self.actual_data_nodes {
            if !names.contains(&node.data_source_name.as_str()) {
                names.push(&node.data_source_name);
            }
        }
        names
    }
}

/// Sharding rule configuration as accepted from the configuration layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardingRuleConfig {
    pub data_source_names: Vec<String>,
    pub tables: Vec<TableRule>,
    pub broadcast_tables: Vec<String>,
}

/// Validated sharding rule
#[derive(Debug, Clone, PartialEq)]
pub struct ShardingRule {
    data_source_names: Vec<String>,
    table_rules: Vec<TableRule>,
    broadcast_tables: Vec<String>,
}

impl ShardingRule {
    pub fn new(config: ShardingRuleConfig) -> Result<Self, RuleError> {
        if config.data_source_names.is_empty() {
            return Err(RuleError::NoDataSource);
        }
        for rule in &config.tables {
            if rule.actual_data_nodes.is_empty() {
                return Err(RuleError::EmptyTableRule(rule.logic_table.clone()));
            }
            if let Some(data_source) = rule
                .data_source_names()
                .into_iter()
                .find(|ds| !config.data_source_names.iter().any(|known| known.as_str() == *ds))
            {
                return Err(RuleError::UnknownDataSource {
                    table: rule.logic_table.clone(),
                    data_source: data_source.to_string(),
                });
            }
            if config
                .broadcast_tables
                .iter()
                .any(|t| t.eq_ignore_ascii_case(&rule.logic_table))
            {
                return Err(RuleError::BroadcastTableSharded(rule.logic_table.clone()));
            }
        }
        Ok(Self {
            data_source_names: config.data_source_names,
            table_rules: config.tables,
            broadcast_tables: config.broadcast_tables,
        })
    }

    pub fn data_source_names(&self) -> &[String] {
        &self.data_source_names
    }

    pub fn table_rules(&self) -> &[TableRule] {
        &self.table_rules
    }

    pub fn broadcast_tables(&self) -> &[String] {
        &self.broadcast_tables
    }

    pub fn find_table_rule(&self, logic_table: &str) -> Option<&TableRule> {
        self.table_rules
            .iter()
            .find(|r| r.logic_table.eq_ignore_ascii_case(logic_table))
    }

    pub fn is_broadcast_table(&self, logic_table: &str) -> bool {
        self.broadcast_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(logic_table))
    }
}

/// Load-balance algorithm kinds for read datasource selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadBalanceAlgorithmType {
    RoundRobin,
    Random,
    Weight,
}

impl fmt::Display for LoadBalanceAlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadBalanceAlgorithmType::RoundRobin => write!(f, "ROUND_ROBIN"),
            LoadBalanceAlgorithmType::Random => write!(f, "RANDOM"),
            LoadBalanceAlgorithmType::Weight => write!(f, "WEIGHT"),
        }
    }
}

/// Named load-balance algorithm configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalanceAlgorithmConfig {
    #[serde(rename = "type")]
    pub algorithm_type: LoadBalanceAlgorithmType,

    /// Algorithm properties; `WEIGHT` reads one weight per read datasource
    #[serde(default)]
    pub props: HashMap<String, String>,
}

impl LoadBalanceAlgorithmConfig {
    pub fn new(algorithm_type: LoadBalanceAlgorithmType) -> Self {
        Self {
            algorithm_type,
            props: HashMap::new(),
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }
}

/// One read-write splitting group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadWriteSplittingDataSourceRuleConfig {
    /// Logical placeholder name, as it appears in sharding rules
    pub name: String,
    pub write_data_source_name: String,
    pub read_data_source_names: Vec<String>,

    /// Key into `ReadWriteSplittingRuleConfig::load_balancers`
    #[serde(default)]
    pub load_balancer_name: Option<String>,
}

impl ReadWriteSplittingDataSourceRuleConfig {
    pub fn new(
        name: impl Into<String>,
        write_data_source_name: impl Into<String>,
        read_data_source_names: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            write_data_source_name: write_data_source_name.into(),
            read_data_source_names,
            load_balancer_name: None,
        }
    }

    pub fn with_load_balancer(mut self, name: impl Into<String>) -> Self {
        self.load_balancer_name = Some(name.into());
        self
    }
}

/// Read-write splitting configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadWriteSplittingRuleConfig {
    pub data_sources: Vec<ReadWriteSplittingDataSourceRuleConfig>,
    pub load_balancers: HashMap<String, LoadBalanceAlgorithmConfig>,
}

/// All rules of one logical schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaRuleConfig {
    pub sharding: Option<ShardingRuleConfig>,
    pub readwrite_splitting: Option<ReadWriteSplittingRuleConfig>,
}
