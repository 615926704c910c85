//! OS keychain backend for the refresh token
//!
//! Each storage key becomes one keychain entry under the configured service
//! name (macOS Keychain, Windows Credential Manager). Keychain calls block,
//! so they run on tokio's blocking pool.

use async_trait::async_trait;
use keyring::{Entry, Error as KeyringError};
use tracing::debug;

use super::traits::DurableStorage;
use super::types::StorageError;

/// [`DurableStorage`] backed by the platform keychain
#[derive(Debug, Clone)]
pub struct KeychainStorage {
    service: String,
}

impl KeychainStorage {
    /// # Arguments
    /// * `service` - Keychain service name (e.g., "RelayChat")
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    async fn with_entry<T, F>(&self, key: &str, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(Entry) -> Result<T, KeyringError> + Send + 'static,
    {
        let service = self.service.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let entry = Entry::new(&service, &key).map_err(map_keyring_error)?;
            op(entry).map_err(map_keyring_error)
        })
        .await
        .map_err(|e| StorageError::Io(format!("keychain task failed: {e}")))?
    }
}

#[async_trait]
impl DurableStorage for KeychainStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        debug!(service = %self.service, key = %key, "Reading keychain entry");
        self.with_entry(key, |entry| match entry.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(KeyringError::NoEntry) => Ok(None),
            Err(other) => Err(other),
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(service = %self.service, key = %key, "Writing keychain entry");
        let value = value.to_string();
        self.with_entry(key, move |entry| entry.set_password(&value)).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        debug!(service = %self.service, key = %key, "Deleting keychain entry");
        self.with_entry(key, |entry| match entry.delete_credential() {
            Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
            Err(other) => Err(other),
        })
        .await
    }
}

fn map_keyring_error(err: KeyringError) -> StorageError {
    match err {
        KeyringError::PlatformFailure(_) | KeyringError::NoStorageAccess(_) => {
            StorageError::Unavailable(err.to_string())
        }
        KeyringError::BadEncoding(_) => StorageError::Corrupt(err.to_string()),
        other => StorageError::Io(other.to_string()),
    }
}
