//! Session credentials and their persistence
//!
//! The access token lives in memory only; the refresh token is mirrored to
//! durable storage so a restarted process can mint a new access token without
//! a fresh login.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   TokenStore    │  in-memory pair + session generation + status watch
//! └────────┬────────┘
//!          │
//!          └──► DurableStorage     (refresh token under `refreshToken`)
//!                  ├── MemoryStorage
//!                  ├── KeychainStorage   (feature `platform`)
//!                  └── FileStorage       (relaychat-infra)
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: session status/snapshot and storage errors
//! - **[`traits`]**: the [`DurableStorage`] seam
//! - **[`memory`]**: process-local storage backend
//! - **[`token_store`]**: the shared session store

#[cfg(feature = "platform")]
mod keychain;
pub mod memory;
pub mod token_store;
pub mod traits;
pub mod types;

#[cfg(feature = "platform")]
pub use keychain::KeychainStorage;
pub use memory::MemoryStorage;
pub use token_store::{TokenStore, TokenStoreError};
pub use traits::DurableStorage;
pub use types::{SessionSnapshot, SessionStatus, StorageError};
