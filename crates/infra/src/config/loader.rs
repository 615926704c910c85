//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If `RELAYCHAT_API_GATEWAY_URI` is set, loads from environment variables
//!    and reports any invalid variable
//! 2. Otherwise falls back to a config file
//! 3. Searches the working directory for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `RELAYCHAT_API_GATEWAY_URI`: Gateway base URL (required)
//! - `RELAYCHAT_HTTP_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `RELAYCHAT_COALESCE_REFRESH`: Share one token refresh between
//!   concurrent requests (true/false)
//! - `RELAYCHAT_STORAGE_BACKEND`: `file`, `keychain` or `memory`
//! - `RELAYCHAT_STORAGE_PATH`: File backend location
//! - `RELAYCHAT_LOG_FILTER`: Default tracing filter
//! - `RELAYCHAT_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! ## File Locations
//! The loader checks the following paths (in order), relative to the
//! current working directory:
//! 1. `relaychat.toml`
//! 2. `relaychat.json`
//! 3. `config.toml`
//! 4. `config.json`

use std::path::{Path, PathBuf};

use relaychat_domain::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use relaychat_domain::{
    ApiConfig, Config, LoggingConfig, RelayChatError, Result, StorageBackend, StorageConfig,
};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["relaychat.toml", "relaychat.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// Environment variables are used when `RELAYCHAT_API_GATEWAY_URI` is set;
/// otherwise the configuration comes from a config file.
///
/// # Errors
/// Returns `RelayChatError::Config` if:
/// - The gateway URL is set but another variable is invalid
/// - No gateway URL is set and no usable config file exists
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    load_with(|key| std::env::var(key).ok(), || load_from_file(None))
}

/// [`load`] over an arbitrary variable source and file fallback
fn load_with<F, G>(lookup: F, fallback: G) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
    G: FnOnce() -> Result<Config>,
{
    if gateway_url(&lookup).is_none() {
        tracing::debug!("RELAYCHAT_API_GATEWAY_URI not set, trying config file");
        return fallback();
    }

    let config = config_from_vars(lookup)?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `RelayChatError::Config` if `RELAYCHAT_API_GATEWAY_URI` is
/// missing or a variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    config_from_vars(|key| std::env::var(key).ok())
}

/// Build configuration from an arbitrary variable source
///
/// # Errors
/// Same as [`load_from_env`].
pub fn config_from_vars<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let gateway_url = gateway_url(&lookup).ok_or_else(|| {
        RelayChatError::Config(
            "Missing required environment variable: RELAYCHAT_API_GATEWAY_URI".to_string(),
        )
    })?;

    let timeout_secs = match lookup("RELAYCHAT_HTTP_TIMEOUT_SECS") {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| RelayChatError::Config(format!("Invalid HTTP timeout: {e}")))?,
        None => DEFAULT_HTTP_TIMEOUT_SECS,
    };
    let coalesce_refresh = parse_bool(lookup("RELAYCHAT_COALESCE_REFRESH"), true);

    let backend = match lookup("RELAYCHAT_STORAGE_BACKEND") {
        Some(raw) => raw.parse::<StorageBackend>().map_err(RelayChatError::Config)?,
        None => StorageBackend::default(),
    };
    let path = lookup("RELAYCHAT_STORAGE_PATH").map(PathBuf::from);

    let mut logging = LoggingConfig::default();
    if let Some(filter) = lookup("RELAYCHAT_LOG_FILTER") {
        logging.filter = filter;
    }
    logging.json = parse_bool(lookup("RELAYCHAT_LOG_JSON"), false);

    Ok(Config {
        api: ApiConfig { gateway_url, timeout_secs, coalesce_refresh },
        storage: StorageConfig { backend, path },
        logging,
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the working directory for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `RelayChatError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(RelayChatError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            RelayChatError::Config(
                "No RELAYCHAT_API_GATEWAY_URI set and no config file found".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| RelayChatError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| RelayChatError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| RelayChatError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(RelayChatError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file in the current working directory
pub fn find_config_path() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    search_dir(&cwd)
}

fn search_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES.iter().map(|name| dir.join(name)).find(|path| path.exists())
}

fn gateway_url<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup("RELAYCHAT_API_GATEWAY_URI").filter(|v| !v.trim().is_empty())
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn parse_bool(raw: Option<String>, default: bool) -> bool {
    raw.map(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_bool() {
        for raw in ["1", "true", "YES", "on", " True "] {
            assert!(parse_bool(Some(raw.to_string()), false), "{raw}");
        }
        for raw in ["0", "false", "no", "off", "garbage"] {
            assert!(!parse_bool(Some(raw.to_string()), true), "{raw}");
        }
        assert!(parse_bool(None, true));
        assert!(!parse_bool(None, false));
    }

    #[test]
    fn test_env_only_gateway_uses_defaults() {
        let config =
            config_from_vars(vars(&[("RELAYCHAT_API_GATEWAY_URI", "http://localhost:3000")]))
                .unwrap();

        assert_eq!(config.api, ApiConfig::new("http://localhost:3000"));
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_env_all_vars_set() {
        let config = config_from_vars(vars(&[
            ("RELAYCHAT_API_GATEWAY_URI", "https://gw.example.com"),
            ("RELAYCHAT_HTTP_TIMEOUT_SECS", "5"),
            ("RELAYCHAT_COALESCE_REFRESH", "false"),
            ("RELAYCHAT_STORAGE_BACKEND", "Keychain"),
            ("RELAYCHAT_STORAGE_PATH", "/tmp/relaychat.json"),
            ("RELAYCHAT_LOG_FILTER", "relaychat=debug"),
            ("RELAYCHAT_LOG_JSON", "1"),
        ]))
        .unwrap();

        assert_eq!(config.api.timeout_secs, 5);
        assert!(!config.api.coalesce_refresh);
        assert_eq!(config.storage.backend, StorageBackend::Keychain);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/relaychat.json")));
        assert_eq!(config.logging.filter, "relaychat=debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_env_missing_gateway() {
        let err = config_from_vars(vars(&[("RELAYCHAT_HTTP_TIMEOUT_SECS", "5")])).unwrap_err();
        assert!(matches!(err, RelayChatError::Config(_)));

        let err = config_from_vars(vars(&[("RELAYCHAT_API_GATEWAY_URI", "  ")])).unwrap_err();
        assert!(matches!(err, RelayChatError::Config(_)));
    }

    #[test]
    fn test_env_invalid_values() {
        let err = config_from_vars(vars(&[
            ("RELAYCHAT_API_GATEWAY_URI", "http://gw"),
            ("RELAYCHAT_HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RelayChatError::Config(_)));

        let err = config_from_vars(vars(&[
            ("RELAYCHAT_API_GATEWAY_URI", "http://gw"),
            ("RELAYCHAT_STORAGE_BACKEND", "floppy"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RelayChatError::Config(msg) if msg.contains("floppy")));
    }

    #[test]
    fn test_load_reports_invalid_env_instead_of_falling_back() {
        let result = load_with(
            vars(&[
                ("RELAYCHAT_API_GATEWAY_URI", "http://gw.test"),
                ("RELAYCHAT_HTTP_TIMEOUT_SECS", "abc"),
            ]),
            || Err(RelayChatError::Config("config file consulted".to_string())),
        );

        match result {
            Err(RelayChatError::Config(msg)) => {
                assert!(msg.contains("Invalid HTTP timeout"), "got {msg}");
            }
            other => panic!("expected timeout error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_falls_back_to_file_without_gateway() {
        let result = load_with(vars(&[("RELAYCHAT_HTTP_TIMEOUT_SECS", "abc")]), || {
            Ok(Config {
                api: ApiConfig::new("http://from-file"),
                storage: StorageConfig::default(),
                logging: LoggingConfig::default(),
            })
        });

        assert_eq!(result.unwrap().api.gateway_url, "http://from-file");
    }

    #[test]
    fn test_load_from_file_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relaychat.toml");
        std::fs::write(
            &path,
            r#"
[api]
gateway_url = "http://localhost:3000"
coalesce_refresh = false

[storage]
backend = "memory"
"#,
        )
        .unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.api.gateway_url, "http://localhost:3000");
        assert!(!config.api.coalesce_refresh);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_load_from_file_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api": {"gateway_url": "http://gw", "timeout_secs": 12},
                "logging": {"filter": "debug", "json": true}}"#,
        )
        .unwrap();

        let config = load_from_file(Some(path)).unwrap();
        assert_eq!(config.api.timeout_secs, 12);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/relaychat.toml")));
        assert!(matches!(result, Err(RelayChatError::Config(_))));
    }

    #[test]
    fn test_load_from_file_missing_gateway() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relaychat.toml");
        std::fs::write(&path, "[storage]\nbackend = \"file\"\n").unwrap();

        assert!(load_from_file(Some(path)).is_err());
    }

    #[test]
    fn test_search_prefers_relaychat_toml() {
        let dir = TempDir::new().unwrap();
        assert_eq!(search_dir(dir.path()), None);

        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        assert_eq!(search_dir(dir.path()), Some(dir.path().join("config.json")));

        std::fs::write(dir.path().join("relaychat.toml"), "").unwrap();
        assert_eq!(search_dir(dir.path()), Some(dir.path().join("relaychat.toml")));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("api: {}", Path::new("relaychat.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
