//! Per-unit results and the unified statement response

use std::fmt;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::backend::{ColumnMetadata, RowStream, UpdateResult};

/// Response variant of a unit or a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    Query,
    Update,
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseKind::Query => write!(f, "query"),
            ResponseKind::Update => write!(f, "update"),
        }
    }
}

/// Streaming result set of one unit
pub struct QueryResult {
    data_source: String,
    rows: RowStream,
}

impl QueryResult {
    pub fn new(data_source: impl Into<String>, rows: RowStream) -> Self {
        Self {
            data_source: data_source.into(),
            rows,
        }
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn into_rows(self) -> RowStream {
        self.rows
    }
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("data_source", &self.data_source)
            .finish_non_exhaustive()
    }
}

/// Update counters of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatePacket {
    pub data_source: String,
    pub result: UpdateResult,
}

impl UpdatePacket {
    pub fn new(data_source: impl Into<String>, result: UpdateResult) -> Self {
        Self {
            data_source: data_source.into(),
            result,
        }
    }
}

/// Result of the synchronously executed first unit; carries metadata
#[derive(Debug)]
pub enum FirstUnitResult {
    Query {
        columns: Vec<ColumnMetadata>,
        result: QueryResult,
    },
    Update(UpdatePacket),
}

impl FirstUnitResult {
    pub fn kind(&self) -> ResponseKind {
        match self {
            FirstUnitResult::Query { .. } => ResponseKind::Query,
            FirstUnitResult::Update(_) => ResponseKind::Update,
        }
    }
}

/// Result of a deferred unit; never carries metadata
#[derive(Debug)]
pub enum SubsequentUnitResult {
    Query(QueryResult),
    Update(UpdatePacket),
}

impl SubsequentUnitResult {
    pub fn kind(&self) -> ResponseKind {
        match self {
            SubsequentUnitResult::Query(_) => ResponseKind::Query,
            SubsequentUnitResult::Update(_) => ResponseKind::Update,
        }
    }

    pub fn data_source(&self) -> &str {
        match self {
            SubsequentUnitResult::Query(result) => result.data_source(),
            SubsequentUnitResult::Update(packet) => &packet.data_source,
        }
    }
}

/// Query response: first unit's metadata plus every unit's result set in
/// submission order
#[derive(Debug)]
pub struct ExecuteQueryResponse {
    columns: Vec<ColumnMetadata>,
    query_results: Vec<QueryResult>,
}

impl ExecuteQueryResponse {
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self {
            columns,
            query_results: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, result: QueryResult) {
        self.query_results.push(result);
    }

    pub fn columns(&self) -> &[ColumnMetadata] {
        &self.columns
    }

    /// Datasource of every result set, in position order
    pub fn data_sources(&self) -> Vec<&str> {
        self.query_results.iter().map(|r| r.data_source()).collect()
    }

    /// All rows, one result set after another in position order.
    /// Each backend is only pulled from once the previous one is drained.
    pub fn into_row_stream(self) -> RowStream {
        stream::iter(self.query_results.into_iter().map(QueryResult::into_rows))
            .flatten()
            .boxed()
    }
}

/// Update response: every unit's packet in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteUpdateResponse {
    packets: Vec<UpdatePacket>,
}

impl ExecuteUpdateResponse {
    pub fn new(first: UpdatePacket) -> Self {
        Self {
            packets: vec![first],
        }
    }

    pub(crate) fn push(&mut self, packet: UpdatePacket) {
        self.packets.push(packet);
    }

    pub fn packets(&self) -> &[UpdatePacket] {
        &self.packets
    }

    /// Sum of affected rows across all units
    pub fn affected_rows(&self) -> u64 {
        self.packets.iter().map(|p| p.result.affected_rows).sum()
    }

    /// First last-insert-id reported, in position order
    pub fn last_insert_id(&self) -> Option<u64> {
        self.packets.iter().find_map(|p| p.result.last_insert_id)
    }

    /// Generated keys of all units, in position order
    pub fn generated_keys(&self) -> Vec<u64> {
        self.packets
            .iter()
            .flat_map(|p| p.result.generated_keys.iter().copied())
            .collect()
    }
}

/// Unified response of one statement
#[derive(Debug)]
pub enum ExecuteResponse {
    Query(ExecuteQueryResponse),
    Update(ExecuteUpdateResponse),
}

impl ExecuteResponse {
    pub fn kind(&self) -> ResponseKind {
        match self {
            ExecuteResponse::Query(_) => ResponseKind::Query,
            ExecuteResponse::Update(_) => ResponseKind::Update,
        }
    }

    pub fn as_query(&self) -> Option<&ExecuteQueryResponse> {
        match self {
            ExecuteResponse::Query(response) => Some(response),
            ExecuteResponse::Update(_) => None,
        }
    }

    pub fn as_update(&self) -> Option<&ExecuteUpdateResponse> {
        match self {
            ExecuteResponse::Update(response) => Some(response),
            ExecuteResponse::Query(_) => None,
        }
    }

    pub fn into_query(self) -> Option<ExecuteQueryResponse> {
        match self {
            ExecuteResponse::Query(response) => Some(response),
            ExecuteResponse::Update(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, Row, Value};
    use futures::TryStreamExt;

    fn rows(values: &[i64]) -> RowStream {
        let rows: Vec<Result<Row, BackendError>> =
            values.iter().map(|v| Ok(vec![Value::Int(*v)])).collect();
        stream::iter(rows).boxed()
    }

    #[tokio::test]
    async fn test_row_stream_concatenates_in_position_order() {
        let mut response = ExecuteQueryResponse::new(vec![ColumnMetadata::new("id", "BIGINT")]);
        response.push(QueryResult::new("ds0", rows(&[1, 2])));
        response.push(QueryResult::new("ds1", rows(&[])));
        response.push(QueryResult::new("ds2", rows(&[3])));

        assert_eq!(response.data_sources(), vec!["ds0", "ds1", "ds2"]);

        let all: Vec<Row> = response.into_row_stream().try_collect().await.unwrap();
        assert_eq!(
            all,
            vec![vec![Value::Int(1)], vec![Value::Int(2)], vec![Value::Int(3)]]
        );
    }

    #[test]
    fn test_update_aggregation() {
        let mut response = ExecuteUpdateResponse::new(UpdatePacket::new(
            "ds0",
            UpdateResult { affected_rows: 2, last_insert_id: None, generated_keys: vec![] },
        ));
        response.push(UpdatePacket::new(
            "ds1",
            UpdateResult { affected_rows: 3, last_insert_id: Some(11), generated_keys: vec![11, 12] },
        ));
        response.push(UpdatePacket::new(
            "ds2",
            UpdateResult { affected_rows: 1, last_insert_id: Some(20), generated_keys: vec![20] },
        ));

        assert_eq!(response.affected_rows(), 6);
        assert_eq!(response.last_insert_id(), Some(11));
        assert_eq!(response.generated_keys(), vec![11, 12, 20]);
        assert_eq!(response.packets()[2].data_source, "ds2");
    }
}
