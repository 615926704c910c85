//! # RelayChat Infrastructure
//!
//! Impure implementations behind the client core.
//!
//! This crate contains:
//! - HTTP client and the transport seam used by the API layer
//! - The authenticated request executor (bearer auth + refresh on 401)
//! - Gateway API wrappers (auth, users directory)
//! - Durable storage backends and the config loader
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Builds on `relaychat-common` (token store, storage seam)
//! - Depends on `relaychat-domain` for wire records and config
//! - Contains all I/O (network, filesystem, keychain)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use api::{
    ApiError, AuthApi, AuthenticatedRequestExecutor, ExecutorConfig, HttpMethod, UsersApi,
};
pub use errors::InfraError;
pub use http::{HttpClient, HttpTransport, ReqwestTransport, TransportError};
pub use storage::{open_storage, FileStorage};
