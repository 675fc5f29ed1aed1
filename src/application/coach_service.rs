use crate::domain::backend::CoachBackend;
use crate::domain::coach::{Coach, CoachProfile};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, trace};

/// How long a fetched coach list stays fresh before `load_coaches` hits the
/// network again.
const MAX_CACHE_AGE_SECS: i64 = 60;

#[derive(Debug, Default)]
struct CoachState {
    coaches: Vec<Coach>,
    last_fetch: Option<DateTime<Utc>>,
}

/// Synchronizes the coach collection with the remote store: staleness-gated
/// bulk reads and idempotent per-user registration writes. Local state is
/// only committed after the remote call succeeded.
pub struct CoachService<B> {
    backend: Arc<B>,
    state: Arc<RwLock<CoachState>>,
}

impl<B> Clone for CoachService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: CoachBackend> CoachService<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: Arc::new(RwLock::new(CoachState::default())),
        }
    }

    /// Fetches the coach list unless a fresh-enough copy is already cached.
    /// With `force_refresh = false` and a fresh cache this performs no
    /// network call and leaves state untouched.
    #[instrument(skip(self))]
    pub async fn load_coaches(&self, force_refresh: bool) -> Result<()> {
        if !force_refresh && !self.should_update().await {
            debug!("Cached coach list is fresh, skipping fetch");
            return Ok(());
        }

        trace!("Fetching coach list");
        let coaches = self.backend.fetch_coaches().await?;

        let mut state = self.state.write().await;
        info!(count = coaches.len(), "Coach list refreshed");
        state.coaches = coaches;
        state.last_fetch = Some(Utc::now());
        Ok(())
    }

    /// Registers the current user as a coach. The remote write is an
    /// idempotent overwrite keyed by the user id; local state is committed
    /// only afterwards.
    #[instrument(skip(self, profile), fields(user_id = user_id))]
    pub async fn register_coach(&self, user_id: &str, profile: CoachProfile) -> Result<()> {
        trace!("Registering coach");
        self.backend.put_coach(user_id, &profile).await?;

        let coach = Coach::from_profile(user_id, profile);
        let mut state = self.state.write().await;
        if let Some(existing) = state.coaches.iter_mut().find(|c| c.id == coach.id) {
            *existing = coach;
        } else {
            state.coaches.push(coach);
        }
        info!(user_id = user_id, "Coach registered");
        Ok(())
    }

    async fn should_update(&self) -> bool {
        let state = self.state.read().await;
        match state.last_fetch {
            Some(at) => Utc::now() - at > chrono::Duration::seconds(MAX_CACHE_AGE_SECS),
            None => true,
        }
    }

    pub async fn coaches(&self) -> Vec<Coach> {
        self.state.read().await.coaches.clone()
    }

    pub async fn has_coaches(&self) -> bool {
        !self.state.read().await.coaches.is_empty()
    }

    pub async fn is_coach(&self, user_id: &str) -> bool {
        self.state
            .read()
            .await
            .coaches
            .iter()
            .any(|c| c.id == user_id)
    }

    /// Coaches offering at least one of the given areas. An empty filter
    /// matches nothing, mirroring a filter UI with every box unticked.
    pub async fn coaches_matching(&self, active_areas: &BTreeSet<String>) -> Vec<Coach> {
        self.state
            .read()
            .await
            .coaches
            .iter()
            .filter(|c| c.areas.iter().any(|a| active_areas.contains(a)))
            .cloned()
            .collect()
    }

    pub async fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_fetch
    }
}
