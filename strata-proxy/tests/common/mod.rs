//! Shared fixtures: in-memory backends and a two-group proxy configuration

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use strata_core::{ExecutorConfig, ProxyConfig};
use strata_executor::{
    BackendConnection, BackendError, ColumnMetadata, ConnectionProvider, Row, StatementOptions,
    StatementOutcome, UpdateResult, Value,
};
use strata_proxy::Proxy;
use strata_types::{
    LoadBalanceAlgorithmConfig, LoadBalanceAlgorithmType, ReadWriteSplittingDataSourceRuleConfig,
    ReadWriteSplittingRuleConfig, RouteUnit, SchemaMetaData, SchemaRuleConfig, ShardingRuleConfig,
    TableMetaData, TableRule,
};

/// A statement as seen by one backend
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub data_source: String,
    pub sql: String,
    pub options: StatementOptions,
}

/// In-memory backend serving every datasource
#[derive(Default)]
pub struct MockBackend {
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    pub calls: Mutex<Vec<RecordedCall>>,
    pub completed: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, data_source: &str, millis: u64) -> Self {
        self.delays.insert(data_source.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn with_failure(mut self, data_source: &str) -> Self {
        self.failing.insert(data_source.to_string());
        self
    }

    pub fn called_data_sources(&self) -> Vec<String> {
        let mut called: Vec<String> = self.calls.lock().iter().map(|c| c.data_source.clone()).collect();
        called.sort();
        called
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

pub struct MockProvider(pub Arc<MockBackend>);

struct MockConnection {
    data_source: String,
    backend: Arc<MockBackend>,
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    async fn get_connection(
        &self,
        data_source: &str,
    ) -> Result<Arc<dyn BackendConnection>, BackendError> {
        Ok(Arc::new(MockConnection {
            data_source: data_source.to_string(),
            backend: self.0.clone(),
        }))
    }
}

#[async_trait]
impl BackendConnection for MockConnection {
    async fn execute(
        &self,
        sql: &str,
        options: &StatementOptions,
    ) -> Result<StatementOutcome, BackendError> {
        self.backend.calls.lock().push(RecordedCall {
            data_source: self.data_source.clone(),
            sql: sql.to_string(),
            options: *options,
        });
        if let Some(delay) = self.backend.delays.get(&self.data_source) {
            tokio::time::sleep(*delay).await;
        }
        self.backend.completed.fetch_add(1, Ordering::SeqCst);

        if self.backend.failing.contains(&self.data_source) {
            return Err(BackendError::Sql(format!("table missing on {}", self.data_source)));
        }

        if sql.starts_with("SELECT") {
            let columns = if options.capture_metadata {
                vec![ColumnMetadata::new("data_source", "VARCHAR")]
            } else {
                Vec::new()
            };
            let rows: Vec<Result<Row, BackendError>> =
                vec![Ok(vec![Value::Text(self.data_source.clone())])];
            Ok(StatementOutcome::Query {
                columns,
                rows: stream::iter(rows).boxed(),
            })
        } else {
            Ok(StatementOutcome::Update(UpdateResult::new(2)))
        }
    }
}

/// `ds0`, `ds1`, `ds2`; `t_order` on ds0/ds1; `t_config` broadcast.
/// `ds0` and `ds1` are read-write splitting groups.
pub fn rules() -> SchemaRuleConfig {
    SchemaRuleConfig {
        sharding: Some(ShardingRuleConfig {
            data_source_names: vec!["ds0".into(), "ds1".into(), "ds2".into()],
            tables: vec![
                TableRule::from_inline("t_order", "ds0.t_order_0, ds1.t_order_1").unwrap(),
            ],
            broadcast_tables: vec!["t_config".into()],
        }),
        readwrite_splitting: Some(ReadWriteSplittingRuleConfig {
            data_sources: vec![
                ReadWriteSplittingDataSourceRuleConfig::new(
                    "ds0",
                    "ds0_primary",
                    vec!["ds0_replica".into()],
                )
                .with_load_balancer("round_robin"),
                ReadWriteSplittingDataSourceRuleConfig::new(
                    "ds1",
                    "ds1_primary",
                    vec!["ds1_replica".into()],
                ),
            ],
            load_balancers: [(
                "round_robin".to_string(),
                LoadBalanceAlgorithmConfig::new(LoadBalanceAlgorithmType::RoundRobin),
            )]
            .into_iter()
            .collect(),
        }),
    }
}

pub fn config(max_workers: usize) -> ProxyConfig {
    let mut schema = SchemaMetaData::new();
    schema.put("t_order", TableMetaData::with_indexes(&["idx_order_user"]));
    schema.put("t_config", TableMetaData::default());

    ProxyConfig {
        proxy_id: "proxy-test".to_string(),
        executor: ExecutorConfig { max_workers },
        rules: rules(),
        schema,
    }
}

/// Rewrites logical tables to actual ones; untargeted units get `SELECT 1`
pub fn resolve(unit: &RouteUnit) -> String {
    let tables: Vec<&str> = unit.table_mappers.iter().map(|m| m.actual_name.as_str()).collect();
    if tables.is_empty() {
        "SELECT 1".to_string()
    } else {
        format!("SELECT * FROM {}", tables.join(", "))
    }
}

pub fn resolve_insert(unit: &RouteUnit) -> String {
    let table = unit.table_mappers.first().map(|m| m.actual_name.as_str()).unwrap_or("t_order");
    format!("INSERT INTO {table} (user_id) VALUES (7)")
}

pub fn proxy(backend: MockBackend, max_workers: usize) -> (Proxy, Arc<MockBackend>) {
    proxy_with(backend, max_workers, resolve)
}

pub fn proxy_with(
    backend: MockBackend,
    max_workers: usize,
    resolver: fn(&RouteUnit) -> String,
) -> (Proxy, Arc<MockBackend>) {
    let backend = Arc::new(backend);
    let proxy = Proxy::from_config(
        &config(max_workers),
        Arc::new(MockProvider(backend.clone())),
        Arc::new(resolver),
    )
    .unwrap();
    (proxy, backend)
}
