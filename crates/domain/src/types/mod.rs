//! Domain types and models
//!
//! Wire records exchanged with the gateway. Field names follow the gateway's
//! JSON, so camelCase renames live here and nowhere else.

pub mod auth;
pub mod users;

pub use auth::{LoginRequest, RegistrationRequest, TokenPair};
pub use users::{User, UserList, UsersListQuery};
