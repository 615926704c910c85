//! Configuration structures
//!
//! Deserialized from environment variables or a TOML/JSON file by the
//! infrastructure config loader.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOG_FILTER};

/// Top-level client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway access settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API gateway (e.g. `https://gateway.example.com`)
    pub gateway_url: String,
    /// Per-request timeout enforced by the HTTP transport
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Share one in-flight token refresh between concurrent requests
    #[serde(default = "default_true")]
    pub coalesce_refresh: bool,
}

impl ApiConfig {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            coalesce_refresh: true,
        }
    }
}

/// Where the refresh token is persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON file in the platform data directory
    #[default]
    File,
    /// OS keychain / secret service
    Keychain,
    /// Process memory only (nothing survives a restart)
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keychain" => Ok(Self::Keychain),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

/// Durable storage settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Override for the file backend's location
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), json: false }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}
