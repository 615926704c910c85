//! Session token store
//!
//! Holds the current access/refresh token pair for every consumer of the
//! gateway. Mutations replace the pair wholesale:
//! - `login` / `refresh` persist the refresh token, then swap the pair in
//! - `logout` clears memory and deletes the persisted refresh token
//!
//! A pair is only installed after its refresh token reached durable storage,
//! so the store is never left holding tokens the next process can't recover.

use std::sync::Arc;

use relaychat_domain::constants::REFRESH_TOKEN_KEY;
use relaychat_domain::TokenPair;
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use super::traits::DurableStorage;
use super::types::{SessionSnapshot, SessionStatus, StorageError};

/// Error type for token store operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenStoreError {
    /// Durable storage rejected a read or write
    #[error("token storage failed: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Default)]
struct SessionState {
    tokens: Option<TokenPair>,
    generation: u64,
}

/// Shared session store
///
/// Cheap to share behind an `Arc`; all state sits behind an async `RwLock`.
pub struct TokenStore {
    storage: Arc<dyn DurableStorage>,
    state: RwLock<SessionState>,
    status: watch::Sender<SessionStatus>,
}

impl TokenStore {
    /// Create an empty (signed out) store backed by `storage`
    pub fn new(storage: Arc<dyn DurableStorage>) -> Self {
        let (status, _) = watch::channel(SessionStatus::SignedOut);
        Self { storage, state: RwLock::new(SessionState::default()), status }
    }

    /// Check whether a refresh token survived from a previous process
    ///
    /// Memory always starts empty; a persisted refresh token lets the next
    /// authenticated request recover a session through the refresh path.
    ///
    /// # Errors
    /// Returns error if durable storage cannot be read
    pub async fn initialize(&self) -> Result<bool, TokenStoreError> {
        let restored = self.storage.get(REFRESH_TOKEN_KEY).await?.is_some();
        if restored {
            info!("Persisted refresh token found; session can be resumed");
        } else {
            debug!("No persisted refresh token");
        }
        Ok(restored)
    }

    /// Install the pair issued by a successful login
    ///
    /// # Errors
    /// Returns error if the refresh token cannot be persisted; the previous
    /// session is left untouched in that case
    pub async fn login(&self, tokens: TokenPair) -> Result<(), TokenStoreError> {
        self.install(tokens).await?;
        info!("Session established");
        Ok(())
    }

    /// Replace both tokens with a freshly minted pair
    ///
    /// # Errors
    /// Returns error if the new refresh token cannot be persisted; the
    /// previous pair is left untouched in that case
    pub async fn refresh(&self, tokens: TokenPair) -> Result<(), TokenStoreError> {
        self.install(tokens).await?;
        info!("Session tokens refreshed");
        Ok(())
    }

    /// Clear all credentials
    ///
    /// Memory is always cleared, even when deleting the persisted refresh
    /// token fails.
    ///
    /// # Errors
    /// Returns error if the persisted refresh token could not be deleted
    pub async fn logout(&self) -> Result<(), TokenStoreError> {
        let removal = {
            let mut state = self.state.write().await;
            state.tokens = None;
            state.generation += 1;
            self.storage.remove(REFRESH_TOKEN_KEY).await
        };
        self.status.send_replace(SessionStatus::SignedOut);

        match removal {
            Ok(()) => {
                info!("Session cleared (logged out)");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Session cleared in memory but persisted refresh token remains");
                Err(e.into())
            }
        }
    }

    /// Current in-memory access token
    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.tokens.as_ref().map(|t| t.access_token.clone())
    }

    /// Access token together with the generation it belongs to
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            access_token: state.tokens.as_ref().map(|t| t.access_token.clone()),
            generation: state.generation,
        }
    }

    /// Current in-memory token pair
    pub async fn tokens(&self) -> Option<TokenPair> {
        self.state.read().await.tokens.clone()
    }

    /// Refresh token as persisted in durable storage
    ///
    /// Read from storage rather than memory so a restarted process can still
    /// refresh.
    ///
    /// # Errors
    /// Returns error if durable storage cannot be read
    pub async fn stored_refresh_token(&self) -> Result<Option<String>, TokenStoreError> {
        Ok(self.storage.get(REFRESH_TOKEN_KEY).await?)
    }

    /// Check if a token pair is held in memory
    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.tokens.is_some()
    }

    /// Number of session mutations so far
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Watch sign-in / sign-out transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    async fn install(&self, tokens: TokenPair) -> Result<(), TokenStoreError> {
        {
            let mut state = self.state.write().await;
            self.storage.set(REFRESH_TOKEN_KEY, &tokens.refresh_token).await?;
            state.tokens = Some(tokens);
            state.generation += 1;
            debug!(generation = state.generation, "Token pair installed");
        }
        self.status.send_replace(SessionStatus::SignedIn);
        Ok(())
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").field("status", &*self.status.borrow()).finish_non_exhaustive()
    }
}
