use crate::domain::backend::{AuthBackend, CoachBackend, RequestBackend};
use crate::domain::coach::{Coach, CoachProfile};
use crate::domain::error::StoreError;
use crate::domain::request::{ContactRequest, RequestMessage};
use crate::domain::session::{AuthGrant, AuthMode, Credentials};
use crate::infrastructure::config::BackendConfig;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, instrument, trace};

const AUTH_FALLBACK: &str = "Failed to authenticate";
const FETCH_COACHES_FALLBACK: &str = "Failed to fetch!";
const REGISTER_COACH_FALLBACK: &str = "Failed to register coach.";
const SEND_REQUEST_FALLBACK: &str = "Failed to send request.";
const FETCH_REQUESTS_FALLBACK: &str = "Failed to fetch requests!";

/// Client for the keyed JSON store and the identity provider.
///
/// One `reqwest::Client` shared across calls; every operation is a single
/// round trip with no retry, no caching and no request coalescing.
#[derive(Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    id_token: String,
    local_id: String,
    /// Relative lifetime in seconds, as a decimal string.
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

impl RestBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn database_base(&self) -> &str {
        self.config.database_url.as_str().trim_end_matches('/')
    }

    fn identity_endpoint(&self, mode: AuthMode) -> String {
        let verb = match mode {
            AuthMode::Login => "signInWithPassword",
            AuthMode::Signup => "signUp",
        };
        format!(
            "{}/v1/accounts:{}?key={}",
            self.config.identity_url.as_str().trim_end_matches('/'),
            verb,
            self.config.api_key
        )
    }

    /// Turns a non-success response into the single remote error shape,
    /// preferring whatever message the backend put in the body.
    async fn remote_error(response: reqwest::Response, fallback: &str) -> StoreError {
        let status = response.status();
        let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
        let message = remote_message(&body, fallback);
        error!(status = %status, message = %message, "Remote call failed");
        StoreError::Remote(message)
    }
}

/// The backend reports errors in several shapes: `{"error": {"message": ..}}`
/// from the identity provider, `{"error": "..."}` from the database, and the
/// occasional bare `{"message": ...}`.
fn remote_message(body: &serde_json::Value, fallback: &str) -> String {
    body.pointer("/error/message")
        .and_then(|v| v.as_str())
        .or_else(|| body.get("error").and_then(|v| v.as_str()))
        .or_else(|| body.get("message").and_then(|v| v.as_str()))
        .unwrap_or(fallback)
        .to_string()
}

#[async_trait]
impl AuthBackend for RestBackend {
    #[instrument(skip(self, credentials), fields(mode = ?mode, email = %credentials.email))]
    async fn authenticate(&self, mode: AuthMode, credentials: &Credentials) -> Result<AuthGrant> {
        trace!("Sending authentication request");
        let response = self
            .client
            .post(self.identity_endpoint(mode))
            .json(&AuthRequest {
                email: &credentials.email,
                password: &credentials.password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Authentication request did not reach the backend");
                StoreError::Remote(AUTH_FALLBACK.to_string())
            })?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response, AUTH_FALLBACK).await.into());
        }

        let body: AuthResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Malformed authentication response");
            StoreError::Remote(AUTH_FALLBACK.to_string())
        })?;

        let seconds: u64 = body.expires_in.parse().map_err(|_| {
            error!(expires_in = %body.expires_in, "Unparsable expiresIn in authentication response");
            StoreError::Remote(AUTH_FALLBACK.to_string())
        })?;

        debug!(user_id = %body.local_id, expires_in_s = seconds, "Authentication succeeded");
        Ok(AuthGrant {
            token: body.id_token,
            user_id: body.local_id,
            expires_in: Duration::from_secs(seconds),
        })
    }
}

#[async_trait]
impl CoachBackend for RestBackend {
    #[instrument(skip(self))]
    async fn fetch_coaches(&self) -> Result<Vec<Coach>> {
        let url = format!("{}/coaches.json", self.database_base());
        trace!(url = %url, "Fetching coach collection");

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!(error = %e, "Coach fetch did not reach the backend");
            StoreError::Remote(FETCH_COACHES_FALLBACK.to_string())
        })?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response, FETCH_COACHES_FALLBACK)
                .await
                .into());
        }

        // An empty collection comes back as a JSON `null`, not `{}`.
        let documents: Option<BTreeMap<String, CoachProfile>> =
            response.json().await.map_err(|e| {
                error!(error = %e, "Malformed coach collection");
                StoreError::Remote(FETCH_COACHES_FALLBACK.to_string())
            })?;

        let coaches: Vec<Coach> = documents
            .unwrap_or_default()
            .into_iter()
            .map(|(id, profile)| Coach::from_profile(id, profile))
            .collect();

        debug!(count = coaches.len(), "Coach collection fetched");
        Ok(coaches)
    }

    #[instrument(skip(self, profile), fields(user_id = user_id))]
    async fn put_coach(&self, user_id: &str, profile: &CoachProfile) -> Result<()> {
        let url = format!("{}/coaches/{}.json", self.database_base(), user_id);
        trace!(url = %url, "Writing coach document");

        let response = self.client.put(&url).json(profile).send().await.map_err(|e| {
            error!(error = %e, "Coach write did not reach the backend");
            StoreError::Remote(REGISTER_COACH_FALLBACK.to_string())
        })?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response, REGISTER_COACH_FALLBACK)
                .await
                .into());
        }

        debug!(user_id = user_id, "Coach document written");
        Ok(())
    }
}

#[async_trait]
impl RequestBackend for RestBackend {
    #[instrument(skip(self, message), fields(coach_id = coach_id))]
    async fn send_request(&self, coach_id: &str, message: &RequestMessage) -> Result<String> {
        let url = format!("{}/requests/{}.json", self.database_base(), coach_id);
        trace!(url = %url, "Appending contact request");

        let response = self.client.post(&url).json(message).send().await.map_err(|e| {
            error!(error = %e, "Request write did not reach the backend");
            StoreError::Remote(SEND_REQUEST_FALLBACK.to_string())
        })?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response, SEND_REQUEST_FALLBACK)
                .await
                .into());
        }

        let push: PushResponse = response.json().await.map_err(|e| {
            error!(error = %e, "Malformed push response");
            StoreError::Remote(SEND_REQUEST_FALLBACK.to_string())
        })?;

        debug!(coach_id = coach_id, key = %push.name, "Contact request stored");
        Ok(push.name)
    }

    #[instrument(skip(self), fields(coach_id = coach_id))]
    async fn fetch_requests(&self, coach_id: &str) -> Result<Vec<ContactRequest>> {
        let url = format!("{}/requests/{}.json", self.database_base(), coach_id);
        trace!(url = %url, "Fetching contact requests");

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!(error = %e, "Request fetch did not reach the backend");
            StoreError::Remote(FETCH_REQUESTS_FALLBACK.to_string())
        })?;

        if !response.status().is_success() {
            return Err(Self::remote_error(response, FETCH_REQUESTS_FALLBACK)
                .await
                .into());
        }

        let documents: Option<BTreeMap<String, RequestMessage>> =
            response.json().await.map_err(|e| {
                error!(error = %e, "Malformed request collection");
                StoreError::Remote(FETCH_REQUESTS_FALLBACK.to_string())
            })?;

        let requests: Vec<ContactRequest> = documents
            .unwrap_or_default()
            .into_iter()
            .map(|(id, message)| ContactRequest {
                id,
                coach_id: coach_id.to_string(),
                user_email: message.user_email,
                message: message.message,
            })
            .collect();

        debug!(count = requests.len(), "Contact requests fetched");
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remote_message_prefers_identity_error_shape() {
        let body = json!({ "error": { "message": "INVALID_PASSWORD" } });
        assert_eq!(remote_message(&body, "fallback"), "INVALID_PASSWORD");
    }

    #[test]
    fn test_remote_message_reads_database_error_string() {
        let body = json!({ "error": "Permission denied" });
        assert_eq!(remote_message(&body, "fallback"), "Permission denied");
    }

    #[test]
    fn test_remote_message_reads_bare_message() {
        let body = json!({ "message": "out of quota" });
        assert_eq!(remote_message(&body, "fallback"), "out of quota");
    }

    #[test]
    fn test_remote_message_falls_back_on_unknown_shape() {
        assert_eq!(remote_message(&json!(null), "fallback"), "fallback");
        assert_eq!(remote_message(&json!({ "error": 42 }), "fallback"), "fallback");
    }
}
