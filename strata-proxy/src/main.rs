//! Strata Proxy - route preview entry point
//!
//! Usage: `STRATA_CONFIG=proxy.json strata-proxy [TABLE...]`

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use strata_core::ProxyConfig;
use strata_executor::{BackendConnection, BackendError, ConnectionProvider};
use strata_proxy::Proxy;
use strata_types::{RouteUnit, StatementContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

const ENV_CONFIG_PATH: &str = "STRATA_CONFIG";

/// Preview never reaches a backend
struct NoBackend;

#[async_trait]
impl ConnectionProvider for NoBackend {
    async fn get_connection(
        &self,
        data_source: &str,
    ) -> Result<Arc<dyn BackendConnection>, BackendError> {
        Err(BackendError::Connection {
            data_source: data_source.to_string(),
            reason: "no backend configured".to_string(),
        })
    }
}

fn select_all(unit: &RouteUnit) -> String {
    let tables: Vec<&str> = unit
        .table_mappers
        .iter()
        .map(|m| m.actual_name.as_str())
        .collect();
    if tables.is_empty() {
        "SELECT 1".to_string()
    } else {
        format!("SELECT * FROM {}", tables.join(", "))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let path = std::env::var(ENV_CONFIG_PATH)
        .with_context(|| format!("{ENV_CONFIG_PATH} must name a config file with routing rules"))?;
    let config = ProxyConfig::load(&path).with_context(|| format!("loading {path}"))?;

    let proxy = Proxy::from_config(&config, Arc::new(NoBackend), Arc::new(select_all))?;

    let tables: Vec<String> = std::env::args().skip(1).collect();
    let table_refs: Vec<&str> = tables.iter().map(String::as_str).collect();
    let statement = StatementContext::select(&table_refs);

    for unit in proxy.preview(&statement)? {
        info!(data_source = %unit.data_source(), sql = %unit.sql(), "Preview");
    }

    proxy.shutdown();
    Ok(())
}
