use crate::domain::backend::RequestBackend;
use crate::domain::request::{ContactRequest, RequestMessage};
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, trace};

/// Contact requests between visitors and coaches: sending is fire-and-forget
/// (the sender never sees the stored copy), listing is for the receiving
/// coach.
pub struct RequestService<B> {
    backend: Arc<B>,
    state: Arc<RwLock<Vec<ContactRequest>>>,
}

impl<B> Clone for RequestService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: RequestBackend> RequestService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Appends a request under the coach's id and returns the key the backend
    /// generated for it. Local state is untouched: received requests belong
    /// to the coach, not the sender.
    #[instrument(skip(self, message), fields(coach_id = coach_id, email = %message.user_email))]
    pub async fn contact_coach(&self, coach_id: &str, message: RequestMessage) -> Result<String> {
        trace!("Sending contact request");
        let key = self.backend.send_request(coach_id, &message).await?;
        info!(coach_id = coach_id, key = %key, "Contact request sent");
        Ok(key)
    }

    /// Loads the requests addressed to the given coach (the current user).
    #[instrument(skip(self), fields(coach_id = coach_user_id))]
    pub async fn load_requests(&self, coach_user_id: &str) -> Result<()> {
        trace!("Fetching received requests");
        let requests = self.backend.fetch_requests(coach_user_id).await?;

        let mut state = self.state.write().await;
        info!(count = requests.len(), "Received requests refreshed");
        *state = requests;
        Ok(())
    }

    pub async fn requests(&self) -> Vec<ContactRequest> {
        self.state.read().await.clone()
    }

    pub async fn has_requests(&self) -> bool {
        !self.state.read().await.is_empty()
    }
}
