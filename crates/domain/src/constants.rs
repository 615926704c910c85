//! Application constants
//!
//! Gateway routes and storage keys shared by every layer.

/// Durable storage key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

// Gateway routes (relative to the gateway base URL)
pub const AUTH_LOGIN_PATH: &str = "/auth/login";
pub const AUTH_REGISTRATION_PATH: &str = "/auth/registration";
pub const AUTH_REFRESH_PATH: &str = "/auth/refresh";
pub const USERS_FIND_ALL_PATH: &str = "/users/find-all";

/// How long a header alert stays visible before it is cleared.
pub const HEADER_ALERT_TTL_SECS: u64 = 10;

// Configuration defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_FILTER: &str = "relaychat=info";
