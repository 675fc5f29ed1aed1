use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Storage keys for persisted session material. String-typed on purpose: the
/// storage is a plain key-value store shared with whatever else the host
/// application persists.
pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";
pub const TOKEN_EXPIRATION_KEY: &str = "tokenExpiration";

/// An active client-side session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Time left until expiry, `None` once the session has expired.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expires_at - now).to_std().ok()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// What the identity provider hands back on a successful authentication:
/// an opaque token, the user id, and a relative time-to-live.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub token: String,
    pub user_id: String,
    pub expires_in: Duration,
}
