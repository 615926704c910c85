//! Trait for durable key/value storage
//!
//! Abstracts where the refresh token survives process restarts so the token
//! store can be tested against in-memory or failure-injecting backends.

use async_trait::async_trait;

use super::types::StorageError;

/// String key/value storage that outlives the process
#[async_trait]
pub trait DurableStorage: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// # Returns
    /// `None` when nothing is stored under the key
    ///
    /// # Errors
    /// Returns error if the backend cannot be read
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    /// Returns error if the write does not reach the backend
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`; removing a missing key succeeds
    ///
    /// # Errors
    /// Returns error if the backend rejects the deletion
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
