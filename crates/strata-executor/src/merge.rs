//! Result merger
//!
//! Combines the first unit's result with the deferred results into one
//! response. The first unit fixes the response variant and, for queries, the
//! column metadata. Any failed deferred unit fails the whole statement.

use crate::error::{ExecuteError, ExecuteResult};
use crate::response::{
    ExecuteQueryResponse, ExecuteResponse, ExecuteUpdateResponse, FirstUnitResult, ResponseKind,
    SubsequentUnitResult,
};

/// Merge results in position order; the first error in that order wins
pub fn merge(
    first: FirstUnitResult,
    rest: Vec<ExecuteResult<SubsequentUnitResult>>,
) -> ExecuteResult<ExecuteResponse> {
    let expected = first.kind();
    match first {
        FirstUnitResult::Query { columns, result } => {
            let mut response = ExecuteQueryResponse::new(columns);
            response.push(result);
            for item in rest {
                match item? {
                    SubsequentUnitResult::Query(result) => response.push(result),
                    other => return Err(mismatch(&other, expected)),
                }
            }
            Ok(ExecuteResponse::Query(response))
        }
        FirstUnitResult::Update(packet) => {
            let mut response = ExecuteUpdateResponse::new(packet);
            for item in rest {
                match item? {
                    SubsequentUnitResult::Update(packet) => response.push(packet),
                    other => return Err(mismatch(&other, expected)),
                }
            }
            Ok(ExecuteResponse::Update(response))
        }
    }
}

fn mismatch(result: &SubsequentUnitResult, expected: ResponseKind) -> ExecuteError {
    ExecuteError::ResponseMismatch {
        data_source: result.data_source().to_string(),
        expected,
        actual: result.kind(),
    }
}
