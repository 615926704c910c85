//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use relaychat_common::StorageError;
use relaychat_domain::RelayChatError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RelayChatError);

impl From<InfraError> for RelayChatError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RelayChatError> for InfraError {
    fn from(value: RelayChatError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RelayChatError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for InfraError {
    fn from(err: HttpError) -> Self {
        if err.is_timeout() {
            return InfraError(RelayChatError::Network("HTTP request timed out".into()));
        }

        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return InfraError(RelayChatError::Network(format!("HTTP connection failure: {err}")));
        }

        if err.is_builder() {
            return InfraError(RelayChatError::InvalidInput(format!("invalid HTTP request: {err}")));
        }

        if let Some(status) = err.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
            return match code {
                401 | 403 => InfraError(RelayChatError::Auth(message)),
                _ => InfraError(RelayChatError::Network(message)),
            };
        }

        InfraError(RelayChatError::Network(err.to_string()))
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → StorageError */
/* -------------------------------------------------------------------------- */

/// File-backed storage reports I/O failures through the storage seam.
pub(crate) fn io_to_storage(err: &IoError, context: &str) -> StorageError {
    match err.kind() {
        ErrorKind::PermissionDenied => StorageError::Unavailable(format!("{context}: {err}")),
        ErrorKind::InvalidData => StorageError::Corrupt(format!("{context}: {err}")),
        _ => StorageError::Io(format!("{context}: {err}")),
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
