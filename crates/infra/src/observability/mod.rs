//! Tracing subscriber setup
//!
//! Log lines go to stderr so command output on stdout stays machine-readable.
//! `RUST_LOG` wins over the configured filter when it is set.

use relaychat_domain::{LoggingConfig, RelayChatError};
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` if set and valid, else `config.filter`
///
/// # Errors
/// Returns `RelayChatError::Config` if the configured directive is invalid
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, RelayChatError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter)
        .map_err(|e| RelayChatError::Config(format!("invalid log filter '{}': {e}", config.filter)))
}

/// Install the global subscriber
///
/// Returns `Ok(false)` when a subscriber was already installed.
///
/// # Errors
/// Returns `RelayChatError::Config` if the log filter is invalid
pub fn init_tracing(config: &LoggingConfig) -> Result<bool, RelayChatError> {
    let filter = env_filter(config)?;
    let builder =
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init().is_ok()
    } else {
        builder.with_target(true).try_init().is_ok()
    };
    Ok(installed)
}
