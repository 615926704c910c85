//! Mock implementations of common traits

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::{DurableStorage, MemoryStorage, StorageError};

/// One call observed by [`MockStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    Get(String),
    Set(String, String),
    Remove(String),
}

/// [`DurableStorage`] that records every call and can be told to fail
#[derive(Debug, Default)]
pub struct MockStorage {
    inner: MemoryStorage,
    ops: Mutex<Vec<StorageOp>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_removes: AtomicBool,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock pre-populated with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        Self { inner: MemoryStorage::with_entry(key, value), ..Self::default() }
    }

    /// Make subsequent `get` calls fail
    pub fn fail_reads(&self, enabled: bool) {
        self.fail_reads.store(enabled, Ordering::SeqCst);
    }

    /// Make subsequent `set` calls fail
    pub fn fail_writes(&self, enabled: bool) {
        self.fail_writes.store(enabled, Ordering::SeqCst);
    }

    /// Make subsequent `remove` calls fail
    pub fn fail_removes(&self, enabled: bool) {
        self.fail_removes.store(enabled, Ordering::SeqCst);
    }

    /// Calls observed so far, in order
    pub fn ops(&self) -> Vec<StorageOp> {
        self.ops.lock().clone()
    }

    /// The backing in-memory storage
    pub fn inner(&self) -> &MemoryStorage {
        &self.inner
    }

    fn record(&self, op: StorageOp) {
        self.ops.lock().push(op);
    }
}

#[async_trait]
impl DurableStorage for MockStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.record(StorageOp::Get(key.to_string()));
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("mock read failure".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.record(StorageOp::Set(key.to_string(), value.to_string()));
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("mock write failure".into()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.record(StorageOp::Remove(key.to_string()));
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("mock remove failure".into()));
        }
        self.inner.remove(key).await
    }
}
