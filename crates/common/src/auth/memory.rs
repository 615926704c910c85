//! Process-local storage backend

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::DurableStorage;
use super::types::StorageError;

/// In-memory [`DurableStorage`]
///
/// Used when the configured backend is `memory` and throughout the tests.
/// Nothing stored here survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.values.lock().insert(key.to_string(), value.to_string());
        storage
    }

    /// Synchronous peek for assertions
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

#[async_trait]
impl DurableStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().remove(key);
        Ok(())
    }
}
