//! End-to-end execution: routing, fan-out, merging

mod common;

use common::{proxy, proxy_with, resolve_insert, MockBackend};
use futures::TryStreamExt;
use strata_core::ProxyConfig;
use strata_executor::{ExecuteError, FetchSize, Row, Value};
use strata_proxy::{Proxy, ProxyError};
use strata_types::StatementContext;
use tokio_test::{assert_err, assert_ok};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_query_results_keep_route_order() {
    // ds0_replica is the slowest, yet stays first
    let backend = MockBackend::new().with_delay("ds0_replica", 60).with_delay("ds1_replica", 30);
    let (proxy, backend) = proxy(backend, 4);

    let response = assert_ok!(proxy.execute(&StatementContext::select(&["t_config"]), false).await);
    let query = response.into_query().unwrap();
    assert_eq!(query.data_sources(), vec!["ds0_replica", "ds1_replica", "ds2"]);
    assert_eq!(query.columns().len(), 1);

    let rows: Vec<Row> = query.into_row_stream().try_collect().await.unwrap();
    let sources: Vec<Value> = rows.into_iter().flatten().collect();
    assert_eq!(
        sources,
        vec![
            Value::Text("ds0_replica".into()),
            Value::Text("ds1_replica".into()),
            Value::Text("ds2".into()),
        ]
    );
    assert_eq!(backend.completed(), 3);
}

#[tokio::test]
async fn test_statements_are_memory_strict() {
    let (proxy, backend) = proxy(MockBackend::new(), 2);

    assert_ok!(proxy.execute(&StatementContext::select(&["t_config"]), false).await);

    let calls = backend.calls.lock();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.options.fetch_size == FetchSize::OneRowAtATime));
    let with_metadata: Vec<&str> = calls
        .iter()
        .filter(|c| c.options.capture_metadata)
        .map(|c| c.data_source.as_str())
        .collect();
    assert_eq!(with_metadata, vec!["ds0_replica"]);
}

#[tokio::test]
async fn test_sharded_insert_aggregates_updates() {
    let (proxy, backend) = proxy_with(MockBackend::new(), 2, resolve_insert);

    let response = assert_ok!(proxy.execute(&StatementContext::insert("t_order"), true).await);
    let update = response.as_update().unwrap();
    assert_eq!(update.affected_rows(), 4);
    assert_eq!(update.packets().len(), 2);
    assert_eq!(update.packets()[0].data_source, "ds0_primary");
    assert_eq!(update.packets()[1].data_source, "ds1_primary");

    assert_eq!(backend.called_data_sources(), vec!["ds0_primary", "ds1_primary"]);
    assert!(backend.calls.lock().iter().all(|c| c.options.return_generated_keys));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_unit_fails_statement() {
    let backend = MockBackend::new().with_failure("ds1_replica").with_delay("ds2", 40);
    let (proxy, backend) = proxy(backend, 4);

    let err = assert_err!(proxy.execute(&StatementContext::select(&["t_config"]), false).await);
    match err {
        ProxyError::Execution(e) => assert_eq!(e.data_source(), Some("ds1_replica")),
        other => panic!("unexpected error: {other}"),
    }
    // The slow sibling finished before the error was reported
    assert_eq!(backend.completed(), 3);
}

#[tokio::test]
async fn test_single_worker_still_completes_fan_out() {
    let (proxy, backend) = proxy(MockBackend::new(), 1);

    let response = assert_ok!(proxy.execute(&StatementContext::select(&["t_config"]), false).await);
    assert_eq!(response.as_query().unwrap().data_sources().len(), 3);
    assert_eq!(backend.called_data_sources(), vec!["ds0_replica", "ds1_replica", "ds2"]);
}

#[tokio::test]
async fn test_execute_after_shutdown() {
    let (proxy, _) = proxy(MockBackend::new(), 2);
    proxy.shutdown();

    let err = assert_err!(proxy.execute(&StatementContext::select(&["t_order"]), false).await);
    assert!(matches!(
        err,
        ProxyError::Execution(ExecuteError::Aggregation { ref data_source, .. }) if data_source == "ds1_replica"
    ));
}

#[tokio::test]
async fn test_proxy_from_json_config() {
    let json = r#"{
        "proxy_id": "proxy-json",
        "executor": { "max_workers": 3 },
        "rules": {
            "sharding": {
                "data_source_names": ["ds0", "ds1"],
                "tables": [{
                    "logic_table": "t_user",
                    "actual_data_nodes": [
                        { "data_source_name": "ds0", "table_name": "t_user_0" },
                        { "data_source_name": "ds1", "table_name": "t_user_1" }
                    ]
                }]
            },
            "readwrite_splitting": {
                "data_sources": [{
                    "name": "ds1",
                    "write_data_source_name": "ds1_primary",
                    "read_data_source_names": ["ds1_replica_0", "ds1_replica_1"],
                    "load_balancer_name": "weighted"
                }],
                "load_balancers": {
                    "weighted": { "type": "WEIGHT", "props": { "ds1_replica_0": "1", "ds1_replica_1": "0.000001" } }
                }
            }
        }
    }"#;
    let config = assert_ok!(ProxyConfig::from_json_str(json));
    let backend = std::sync::Arc::new(MockBackend::new());
    let proxy = assert_ok!(Proxy::from_config(
        &config,
        std::sync::Arc::new(common::MockProvider(backend.clone())),
        std::sync::Arc::new(common::resolve),
    ));
    assert_eq!(proxy.proxy_id(), "proxy-json");

    let response = assert_ok!(proxy.execute(&StatementContext::select(&["t_user"]), false).await);
    let data_sources = response.as_query().unwrap().data_sources().iter().map(|s| s.to_string()).collect::<Vec<_>>();
    assert_eq!(data_sources.len(), 2);
    assert_eq!(data_sources[0], "ds0");
    assert!(data_sources[1].starts_with("ds1_replica_"));
}
