//! User directory types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as listed by the directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub login: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// One page of the user directory plus the total number of matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<User>,
    pub count: u64,
}

/// Filters and paging for `GET /users/find-all`
///
/// Every field that is set becomes one query parameter; unset fields are
/// left off the URL entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_asc: Option<bool>,
}

impl UsersListQuery {
    /// Query parameters in declaration order, skipping unset fields.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(login) = &self.login {
            pairs.push(("login", login.clone()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(field) = &self.sort_field {
            pairs.push(("sortField", field.clone()));
        }
        if let Some(asc) = self.sort_asc {
            pairs.push(("sortAsc", asc.to_string()));
        }
        pairs
    }
}
