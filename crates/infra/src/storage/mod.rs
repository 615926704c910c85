//! Durable storage backends for the refresh token
//!
//! [`open_storage`] picks the backend named in [`StorageConfig`].

mod file;

use std::sync::Arc;

use relaychat_common::{DurableStorage, KeychainStorage, MemoryStorage};
use relaychat_domain::{RelayChatError, StorageBackend, StorageConfig};
use tracing::info;

pub use file::FileStorage;

/// Keychain service name entries are stored under
pub const KEYCHAIN_SERVICE: &str = "RelayChat";

/// Build the configured storage backend
///
/// # Errors
/// Returns `RelayChatError::Config` if the file backend has no explicit path
/// and the platform has no data directory
pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn DurableStorage>, RelayChatError> {
    let storage: Arc<dyn DurableStorage> = match config.backend {
        StorageBackend::File => {
            let path = match &config.path {
                Some(path) => path.clone(),
                None => FileStorage::default_path().ok_or_else(|| {
                    RelayChatError::Config(
                        "no data directory on this platform; set RELAYCHAT_STORAGE_PATH"
                            .to_string(),
                    )
                })?,
            };
            info!(path = %path.display(), "Using file storage");
            Arc::new(FileStorage::new(path))
        }
        StorageBackend::Keychain => {
            info!(service = KEYCHAIN_SERVICE, "Using keychain storage");
            Arc::new(KeychainStorage::new(KEYCHAIN_SERVICE))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; the session will not survive a restart");
            Arc::new(MemoryStorage::new())
        }
    };
    Ok(storage)
}
