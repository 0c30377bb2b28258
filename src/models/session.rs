use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Current schema version of the session file
pub const CURRENT_VERSION: u32 = 1;

/// Client-side persisted auth state: the bearer token and the user it belongs to
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoredSession {
    pub version: u32,
    pub token: Option<String>,
    pub user: Option<User>,
}

impl Default for StoredSession {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            token: None,
            user: None,
        }
    }
}

impl StoredSession {
    pub fn signed_in(token: String, user: User) -> Self {
        Self {
            version: CURRENT_VERSION,
            token: Some(token),
            user: Some(user),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}
