//! Session state types and storage errors

use thiserror::Error;

/// Coarse session state broadcast to observers of a [`TokenStore`]
///
/// [`TokenStore`]: super::TokenStore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// A token pair is held in memory
    SignedIn,
    /// No tokens in memory (never logged in, logged out, or refresh failed)
    SignedOut,
}

/// Point-in-time view of the session used to issue one request
///
/// `generation` changes on every login, refresh and logout, so a caller that
/// failed with a token can tell whether the session has moved on since.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub access_token: Option<String>,
    pub generation: u64,
}

impl std::fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("generation", &self.generation)
            .finish()
    }
}

/// Errors raised by [`DurableStorage`] backends
///
/// [`DurableStorage`]: super::DurableStorage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Backend could not be reached (no keychain service, etc.)
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing medium failed
    #[error("storage I/O failed: {0}")]
    Io(String),

    /// Persisted data could not be decoded
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

impl From<StorageError> for relaychat_domain::RelayChatError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
