//! Session and UI-state building blocks shared across RelayChat crates.
//!
//! # Feature Tiers
//!
//! - default: token store, durable-storage abstraction, header alerts
//! - `platform`: OS keychain backend for the refresh token

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod auth;
pub mod notices;

// Testing utilities
// ---------------------------------------------------------------
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
pub use auth::{
    DurableStorage, MemoryStorage, SessionSnapshot, SessionStatus, StorageError, TokenStore,
    TokenStoreError,
};
#[cfg(feature = "platform")]
pub use auth::KeychainStorage;
pub use notices::{AlertKind, HeaderAlert, HeaderAlertStore};
