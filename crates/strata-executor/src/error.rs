//! Execution error types

use thiserror::Error;

use crate::backend::BackendError;
use crate::response::ResponseKind;

/// Errors raised while fanning a statement out to its execution units
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("No execution unit to run")]
    NoExecutionUnit,

    /// A unit failed on its backend
    #[error("Execution on `{data_source}` failed: {source}")]
    Unit {
        data_source: String,
        #[source]
        source: BackendError,
    },

    /// A deferred unit could not be collected
    #[error("Result of `{data_source}` could not be collected: {reason}")]
    Aggregation { data_source: String, reason: String },

    /// Units of one statement disagreed on the response variant
    #[error("`{data_source}` returned a {actual} response, expected {expected}")]
    ResponseMismatch {
        data_source: String,
        expected: ResponseKind,
        actual: ResponseKind,
    },
}

impl ExecuteError {
    pub fn unit(data_source: impl Into<String>, source: BackendError) -> Self {
        ExecuteError::Unit {
            data_source: data_source.into(),
            source,
        }
    }

    /// Datasource of the failing unit, when there is one
    pub fn data_source(&self) -> Option<&str> {
        match self {
            ExecuteError::NoExecutionUnit => None,
            ExecuteError::Unit { data_source, .. }
            | ExecuteError::Aggregation { data_source, .. }
            | ExecuteError::ResponseMismatch { data_source, .. } => Some(data_source),
        }
    }
}

pub type ExecuteResult<T> = Result<T, ExecuteError>;
