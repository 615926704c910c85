//! User directory endpoints

use std::sync::Arc;

use relaychat_domain::constants::USERS_FIND_ALL_PATH;
use relaychat_domain::{UserList, UsersListQuery};
use tracing::{debug, instrument};

use super::errors::ApiError;
use super::executor::AuthenticatedRequestExecutor;

#[derive(Debug, Clone)]
pub struct UsersApi {
    executor: Arc<AuthenticatedRequestExecutor>,
}

impl UsersApi {
    pub fn new(executor: Arc<AuthenticatedRequestExecutor>) -> Self {
        Self { executor }
    }

    /// List users matching `query`
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedRequestExecutor::execute`]
    #[instrument(skip(self))]
    pub async fn list_users(&self, query: &UsersListQuery) -> Result<UserList, ApiError> {
        let mut url = self.executor.resolve(USERS_FIND_ALL_PATH)?;
        let pairs = query.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let list: UserList = self.executor.get(url.as_str()).await?;
        debug!(returned = list.users.len(), total = list.count, "Users listed");
        Ok(list)
    }
}
