//! Error types for the router module

use strata_types::RuleError;
use thiserror::Error;

/// Routing error types
///
/// Every variant is fatal for the statement and is raised before any
/// execution unit is built.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// Logical table has neither a table rule nor a broadcast entry
    #[error("Cannot find table rule or broadcast entry for logic table `{0}`")]
    TableRuleNotFound(String),

    /// Read-write splitting group has nothing to balance over
    #[error("No read datasource available in read-write splitting group `{0}`")]
    NoReadDataSource(String),

    /// Read-write splitting routing alone needs exactly one group
    #[error("Read-write splitting can route alone only with one datasource group, found {0}")]
    AmbiguousDataSourceRule(usize),

    /// No configured stage accepted the statement
    #[error("No routing stage applies to {0} statement")]
    NoApplicableRoute(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Rule model rejected the configuration
    #[error(transparent)]
    Rule(#[from] RuleError),
}

