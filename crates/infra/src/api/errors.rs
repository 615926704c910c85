//! API-specific error types
//!
//! Classifies transport failures into the kinds callers act on. A 401 only
//! ever reaches a caller as [`ApiError::AuthExpired`]: the first one of a
//! request is consumed by the refresh path.

use relaychat_common::TokenStoreError;
use relaychat_domain::RelayChatError;
use serde_json::Value;
use thiserror::Error;

use crate::http::TransportError;

/// Categories of API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Session is gone; the user must log in again
    Authentication,
    /// Server errors (5xx)
    Server,
    /// Client errors (4xx except 401)
    Client,
    /// No usable response (connection failure, timeout, malformed body)
    Network,
    /// Local configuration or storage failure
    Local,
}

/// API operation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Request never produced a usable response
    #[error("Network error: {0}")]
    Network(String),

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// 4xx other than 401
    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String },

    /// 5xx
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Session could not be renewed; the user must log in again
    #[error("Authentication expired: {0}")]
    AuthExpired(String),

    /// Invalid gateway URL or client setup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Refresh token could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::AuthExpired(_) => ApiErrorCategory::Authentication,
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::Network(_) | Self::Decode(_) => ApiErrorCategory::Network,
            Self::Config(_) | Self::Storage(_) => ApiErrorCategory::Local,
        }
    }

    /// HTTP status behind this error, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::AuthExpired(_))
    }

    /// Text suitable for a header alert: the gateway's own message when it
    /// sent one, otherwise this error's description
    pub fn alert_message(&self) -> String {
        match self {
            Self::Client { message, .. }
            | Self::Server { message, .. }
            | Self::AuthExpired(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Status { status, body } => {
                let message = gateway_message(status, &body);
                match status {
                    401 => Self::AuthExpired(message),
                    500..=599 => Self::Server { status, message },
                    _ => Self::Client { status, message },
                }
            }
            TransportError::Network(message) => Self::Network(message),
            TransportError::Decode(message) => Self::Decode(message),
        }
    }
}

impl From<TokenStoreError> for ApiError {
    fn from(err: TokenStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<RelayChatError> for ApiError {
    fn from(err: RelayChatError) -> Self {
        match err {
            RelayChatError::Network(message) => Self::Network(message),
            RelayChatError::Auth(message) => Self::AuthExpired(message),
            RelayChatError::Storage(message) => Self::Storage(message),
            RelayChatError::Config(message)
            | RelayChatError::InvalidInput(message)
            | RelayChatError::Internal(message) => Self::Config(message),
        }
    }
}

/// Pull the human-readable message out of an error body
///
/// The gateway answers `{"statusCode": .., "message": ..}` where `message` is
/// a string or, for validation failures, a list of strings.
fn gateway_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    match parsed.as_ref().and_then(|v| v.get("message")) {
        Some(Value::String(message)) => return message.clone(),
        Some(Value::Array(items)) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if !parts.is_empty() {
                return parts.join("; ");
            }
        }
        _ => {}
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        trimmed.to_string()
    }
}
