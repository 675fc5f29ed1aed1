use crate::domain::coach::{Coach, CoachProfile};
use crate::domain::request::{ContactRequest, RequestMessage};
use crate::domain::session::{AuthGrant, AuthMode, Credentials};
use anyhow::Result;
use async_trait::async_trait;

/// Remote identity provider. One POST per call, no retries.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn authenticate(&self, mode: AuthMode, credentials: &Credentials) -> Result<AuthGrant>;
}

/// Remote coach collection: bulk read plus idempotent per-id overwrite.
#[async_trait]
pub trait CoachBackend: Send + Sync {
    async fn fetch_coaches(&self) -> Result<Vec<Coach>>;
    async fn put_coach(&self, user_id: &str, profile: &CoachProfile) -> Result<()>;
}

/// Remote contact-request collection, keyed under the receiving coach.
#[async_trait]
pub trait RequestBackend: Send + Sync {
    /// Appends a request and returns the backend-generated key.
    async fn send_request(&self, coach_id: &str, message: &RequestMessage) -> Result<String>;
    async fn fetch_requests(&self, coach_id: &str) -> Result<Vec<ContactRequest>>;
}

/// Durable string-keyed storage for session material. Process-wide state,
/// last writer wins.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}
