//! Configuration module for Strata proxies

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_types::{SchemaMetaData, SchemaRuleConfig};
use thiserror::Error;
use tracing::debug;

/// Environment variable overriding the proxy ID
pub const ENV_PROXY_ID: &str = "STRATA_PROXY_ID";

/// Environment variable overriding the executor worker count
pub const ENV_MAX_WORKERS: &str = "STRATA_MAX_WORKERS";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Proxy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy instance ID
    #[serde(default = "default_proxy_id")]
    pub proxy_id: String,

    /// Fan-out executor configuration
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Sharding and read-write splitting rules
    #[serde(default)]
    pub rules: SchemaRuleConfig,

    /// Schema metadata seed (tables and their indexes)
    #[serde(default)]
    pub schema: SchemaMetaData,
}

/// Executor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum number of execution units running concurrently
    pub max_workers: usize,
}

fn default_proxy_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            proxy_id: default_proxy_id(),
            executor: ExecutorConfig::default(),
            rules: SchemaRuleConfig::default(),
            schema: SchemaMetaData::default(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            max_workers: (parallelism * 2).max(1),
        }
    }
}

impl ProxyConfig {
    /// Parse configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Loading proxy config");
        Self::from_json_str(&contents)?.with_overrides(|key| std::env::var(key).ok())
    }

    /// Default configuration with environment overrides applied
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(proxy_id) = lookup(ENV_PROXY_ID) {
            self.proxy_id = proxy_id;
        }

        if let Some(workers) = lookup(ENV_MAX_WORKERS) {
            self.executor.max_workers = match workers.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_MAX_WORKERS,
                        value: workers,
                    })
                }
            };
        }

        Ok(self)
    }
}
