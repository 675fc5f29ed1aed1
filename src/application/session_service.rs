use crate::domain::backend::{AuthBackend, TokenStorage};
use crate::domain::session::{
    AuthMode, Credentials, Session, TOKEN_EXPIRATION_KEY, TOKEN_KEY, USER_ID_KEY,
};
use crate::infrastructure::timer::SessionTimer;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, trace, warn};

#[derive(Debug, Default)]
struct SessionState {
    session: Option<Session>,
    did_auto_logout: bool,
}

/// Owns the client-side session lifecycle: authentication against the remote
/// identity provider, durable persistence of the session material, and the
/// single auto-logout timer that expires the session in place.
pub struct SessionService<A, S> {
    backend: Arc<A>,
    storage: Arc<S>,
    state: Arc<RwLock<SessionState>>,
    timer: Arc<SessionTimer>,
}

impl<A, S> Clone for SessionService<A, S> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            storage: Arc::clone(&self.storage),
            state: Arc::clone(&self.state),
            timer: Arc::clone(&self.timer),
        }
    }
}

impl<A, S> SessionService<A, S>
where
    A: AuthBackend,
    S: TokenStorage + 'static,
{
    pub fn new(backend: Arc<A>, storage: Arc<S>) -> Self {
        Self {
            backend,
            storage,
            state: Arc::new(RwLock::new(SessionState::default())),
            timer: Arc::new(SessionTimer::new()),
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        self.authenticate(AuthMode::Login, credentials).await
    }

    pub async fn signup(&self, credentials: &Credentials) -> Result<()> {
        self.authenticate(AuthMode::Signup, credentials).await
    }

    #[instrument(skip(self, credentials), fields(mode = ?mode, email = %credentials.email))]
    pub async fn authenticate(&self, mode: AuthMode, credentials: &Credentials) -> Result<()> {
        trace!("Starting authentication");
        let grant = self.backend.authenticate(mode, credentials).await?;

        let now = Utc::now();
        let expires_at = now + chrono::Duration::milliseconds(grant.expires_in.as_millis() as i64);

        debug!(user_id = %grant.user_id, expires_at = %expires_at, "Persisting session material");
        self.storage.set(TOKEN_KEY, &grant.token).await?;
        self.storage.set(USER_ID_KEY, &grant.user_id).await?;
        self.storage
            .set(
                TOKEN_EXPIRATION_KEY,
                &expires_at.timestamp_millis().to_string(),
            )
            .await?;

        self.arm_auto_logout(grant.expires_in);

        let mut state = self.state.write().await;
        state.session = Some(Session {
            token: grant.token,
            user_id: grant.user_id.clone(),
            expires_at,
        });
        state.did_auto_logout = false;

        info!(user_id = %grant.user_id, "Session established");
        Ok(())
    }

    /// Restores a persisted session on startup. An expired or unparsable
    /// persisted expiration leaves everything as it is: no session, no timer.
    #[instrument(skip(self))]
    pub async fn try_login(&self) -> Result<()> {
        trace!("Attempting session restore");
        let token = self.storage.get(TOKEN_KEY).await?;
        let user_id = self.storage.get(USER_ID_KEY).await?;
        let Some(raw_expiration) = self.storage.get(TOKEN_EXPIRATION_KEY).await? else {
            trace!("No persisted expiration, nothing to restore");
            return Ok(());
        };

        let Ok(expires_at_ms) = raw_expiration.parse::<i64>() else {
            warn!(value = %raw_expiration, "Unparsable persisted expiration, ignoring");
            return Ok(());
        };

        let remaining_ms = expires_at_ms - Utc::now().timestamp_millis();
        if remaining_ms < 0 {
            debug!("Persisted session already expired");
            return Ok(());
        }

        self.arm_auto_logout(Duration::from_millis(remaining_ms as u64));

        if let (Some(token), Some(user_id)) = (token, user_id) {
            let Some(expires_at) = DateTime::<Utc>::from_timestamp_millis(expires_at_ms) else {
                warn!(value = expires_at_ms, "Persisted expiration out of range, ignoring");
                return Ok(());
            };
            let mut state = self.state.write().await;
            state.session = Some(Session {
                token,
                user_id: user_id.clone(),
                expires_at,
            });
            state.did_auto_logout = false;
            info!(user_id = %user_id, "Session restored from storage");
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        clear_persisted(self.storage.as_ref()).await?;
        self.timer.cancel();

        let mut state = self.state.write().await;
        state.session = None;
        state.did_auto_logout = false;

        info!("Session cleared");
        Ok(())
    }

    /// Schedules expiry of the current session. The fired task clears storage
    /// and state directly rather than going through `logout`, which would
    /// abort the task itself mid-flight.
    fn arm_auto_logout(&self, delay: Duration) {
        let storage = Arc::clone(&self.storage);
        let state = Arc::clone(&self.state);
        self.timer.arm(delay, async move {
            if let Err(e) = clear_persisted(storage.as_ref()).await {
                warn!(error = %e, "Failed to clear persisted session on expiry");
            }
            let mut state = state.write().await;
            state.session = None;
            state.did_auto_logout = true;
            info!("Session expired, logged out automatically");
        });
    }

    pub async fn session(&self) -> Option<Session> {
        self.state.read().await.session.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.session.as_ref().map(|s| s.token.clone())
    }

    pub async fn user_id(&self) -> Option<String> {
        self.state
            .read()
            .await
            .session
            .as_ref()
            .map(|s| s.user_id.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.session.is_some()
    }

    /// True after the session was ended by the expiry timer rather than an
    /// explicit logout; reset by the next committed session.
    pub async fn did_auto_logout(&self) -> bool {
        self.state.read().await.did_auto_logout
    }

    pub fn has_pending_auto_logout(&self) -> bool {
        self.timer.is_armed()
    }
}

async fn clear_persisted<S: TokenStorage + ?Sized>(storage: &S) -> Result<()> {
    storage.remove(TOKEN_KEY).await?;
    storage.remove(USER_ID_KEY).await?;
    storage.remove(TOKEN_EXPIRATION_KEY).await?;
    Ok(())
}
