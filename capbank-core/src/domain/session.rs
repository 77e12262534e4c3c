//! Authenticated session

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user's bearer token and id
///
/// Field names match the keys the browser client kept in its cookies, so a
/// session file is readable next to the old storage layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "auth-token")]
    pub token: String,
    #[serde(rename = "user-id")]
    pub user_id: String,
    #[serde(rename = "user-name", default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Derived from the login response's `expiresIn`; informational only
    #[serde(rename = "expires-at", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            user_name: None,
            expires_at: None,
        }
    }

    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Set the expiry from a lifetime in seconds, counted from now
    pub fn expiring_in(mut self, seconds: i64) -> Self {
        if seconds > 0 {
            self.expires_at = Some(Utc::now() + Duration::seconds(seconds));
        }
        self
    }

    /// Whether there is a token at all. Expiry is never checked here:
    /// an expired token is only discovered through a 401.
    pub fn has_token(&self) -> bool {
        !self.token.trim().is_empty()
    }
}
