//! Login, registration and refresh issuers
//!
//! Login and registration go out without credentials; a successful login
//! seeds the session store the executor reads from.

use std::sync::Arc;

use relaychat_domain::constants::{AUTH_LOGIN_PATH, AUTH_REGISTRATION_PATH};
use relaychat_domain::{LoginRequest, RegistrationRequest, TokenPair, User};
use tracing::{info, instrument, warn};

use super::errors::ApiError;
use super::executor::AuthenticatedRequestExecutor;

/// Gateway authentication endpoints
#[derive(Debug, Clone)]
pub struct AuthApi {
    executor: Arc<AuthenticatedRequestExecutor>,
}

impl AuthApi {
    pub fn new(executor: Arc<AuthenticatedRequestExecutor>) -> Self {
        Self { executor }
    }

    /// Log in and install the issued pair as the current session
    ///
    /// # Errors
    ///
    /// Returns the gateway's rejection, or [`ApiError::Storage`] if the
    /// refresh token could not be persisted
    #[instrument(skip(self, request), fields(login = %request.login))]
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenPair, ApiError> {
        let tokens: TokenPair = self.executor.post_anonymous(AUTH_LOGIN_PATH, request).await?;
        self.executor.store().login(tokens.clone()).await?;
        info!("Logged in");
        Ok(tokens)
    }

    /// Create an account; does not log in
    ///
    /// # Errors
    ///
    /// Returns the gateway's rejection (e.g. a validation failure)
    #[instrument(skip(self, request), fields(login = %request.login))]
    pub async fn register(&self, request: &RegistrationRequest) -> Result<User, ApiError> {
        let user: User = self.executor.post_anonymous(AUTH_REGISTRATION_PATH, request).await?;
        info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Exchange a refresh token for a new pair
    ///
    /// The session store is left alone; use [`refresh_session`](Self::refresh_session)
    /// to rotate the current session.
    ///
    /// # Errors
    ///
    /// Returns the refresh endpoint's failure
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, ApiError> {
        self.executor.request_tokens(refresh_token).await
    }

    /// Rotate the current session's tokens
    ///
    /// # Errors
    ///
    /// Returns the refresh error; the session has been ended in that case
    pub async fn refresh_session(&self) -> Result<(), ApiError> {
        self.executor.force_refresh().await
    }

    /// End the session locally
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Storage`] if the persisted refresh token could not
    /// be removed; memory is cleared regardless
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.executor.store().logout().await.map_err(|e| {
            warn!(error = %e, "Logout left the persisted refresh token behind");
            ApiError::from(e)
        })
    }
}
