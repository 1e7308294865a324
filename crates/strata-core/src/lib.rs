//! Strata Core - Shared library for the router, executor and proxy
//!
//! This crate provides the configuration model and the schema registry
//! used across the Strata crates.

pub mod config;
pub mod schema;

pub use config::{ConfigError, ExecutorConfig, ProxyConfig};
pub use schema::SchemaRegistry;
