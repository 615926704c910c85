//! Gateway API client for RelayChat
//!
//! Every authenticated call goes through [`AuthenticatedRequestExecutor`],
//! which attaches the session's bearer token and recovers from an expired
//! access token with a single refresh.
//!
//! # Architecture
//!
//! - [`executor`]: bearer auth, refresh-on-401, refresh coalescing
//! - [`auth`]: login / registration / refresh issuers
//! - [`users`]: user directory
//! - [`errors`]: [`ApiError`] classification of transport failures

pub mod auth;
pub mod errors;
pub mod executor;
pub mod users;

pub use auth::AuthApi;
pub use errors::{ApiError, ApiErrorCategory};
pub use executor::{AuthenticatedRequestExecutor, ExecutorConfig, HttpMethod};
pub use users::UsersApi;
