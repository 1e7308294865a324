// ========== Core Modules ==========
pub mod route;
pub mod rule;
pub mod schema;
pub mod statement;

// Export commonly used types
pub use route::{RouteContext, RouteMapper, RouteUnit};
pub use rule::{
    DataNode, LoadBalanceAlgorithmConfig, LoadBalanceAlgorithmType,
    ReadWriteSplittingDataSourceRuleConfig, ReadWriteSplittingRuleConfig, SchemaRuleConfig,
    ShardingRule, ShardingRuleConfig, TableRule, DATA_NODE_SEPARATOR,
};
pub use schema::{IndexOwnerLookup, SchemaMetaData, TableMetaData};
pub use statement::{StatementContext, StatementKind};

// Error types
pub type RuleResult<T> = Result<T, RuleError>;

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Invalid data node: `{0}` (expected `<datasource>.<table>`)")]
    InvalidDataNode(String),

    #[error("Sharding rule declares no datasource")]
    NoDataSource,

    #[error("Table rule `{0}` has no actual data node")]
    EmptyTableRule(String),

    #[error("Table rule `{table}` references unknown datasource `{data_source}`")]
    UnknownDataSource { table: String, data_source: String },

    #[error("Table `{0}` is declared both broadcast and sharded")]
    BroadcastTableSharded(String),
}
