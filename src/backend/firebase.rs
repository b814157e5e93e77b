//! Firebase Authentication adapter over the Identity Toolkit REST API.
//!
//! Thin HTTP wrapper for `accounts:signInWithPassword` and `accounts:signUp`.
//! Pure parsing in `parse_account_response` / `parse_error_response` for
//! testability. Sessions live in the `SessionStore` given at construction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::IdentityTimeouts;
use super::{BackendError, IdentityBackend};
use crate::session::{ProviderSession, SessionStore};

const SIGN_IN_ENDPOINT: &str = "accounts:signInWithPassword";
const SIGN_UP_ENDPOINT: &str = "accounts:signUp";

// =============================================================================
// CLIENT
// =============================================================================

pub struct FirebaseBackend {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    store: SessionStore,
}

impl FirebaseBackend {
    /// Build a client against `base_url` (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(
        api_key: String,
        base_url: String,
        timeouts: IdentityTimeouts,
        store: SessionStore,
    ) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url, store })
    }

    async fn post_credentials(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderSession>, BackendError> {
        let url = endpoint_url(&self.base_url, endpoint, &self.api_key);
        let body = CredentialsRequest { email, password, return_secure_token: true };

        // `without_url` keeps the API key out of error messages.
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.without_url().to_string()))?;

        if !(200..300).contains(&status) {
            return Err(parse_error_response(status, &text));
        }

        let session = parse_account_response(&text)?;
        if let Some(session) = &session {
            self.store.replace(session.clone());
        }
        Ok(session)
    }
}

#[async_trait::async_trait]
impl IdentityBackend for FirebaseBackend {
    async fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderSession>, BackendError> {
        self.post_credentials(SIGN_IN_ENDPOINT, email, password)
            .await
    }

    async fn create_account_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderSession>, BackendError> {
        self.post_credentials(SIGN_UP_ENDPOINT, email, password)
            .await
    }

    fn current_session(&self) -> Option<ProviderSession> {
        self.store.current()
    }

    fn sign_out(&self) {
        self.store.clear();
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    #[serde(default)]
    local_id: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

fn endpoint_url(base_url: &str, endpoint: &str, api_key: &str) -> String {
    format!("{base_url}/{endpoint}?key={api_key}")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Map a 2xx body to a session. A body without `localId` yields `Ok(None)`.
fn parse_account_response(json: &str) -> Result<Option<ProviderSession>, BackendError> {
    let account: AccountResponse = serde_json::from_str(json).map_err(|e| BackendError::Parse(e.to_string()))?;

    let Some(uid) = non_empty(account.local_id) else {
        return Ok(None);
    };

    Ok(Some(ProviderSession {
        uid,
        display_name: non_empty(account.display_name),
        email: non_empty(account.email),
        id_token: non_empty(account.id_token),
    }))
}

/// Map a non-2xx body to [`BackendError::Rejected`], keeping the provider's message.
fn parse_error_response(status: u16, body: &str) -> BackendError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => BackendError::rejected(status, envelope.error.message),
        _ => BackendError::rejected(status, format!("identity provider returned HTTP {status}")),
    }
}

#[cfg(test)]
#[path = "firebase_test.rs"]
mod tests;
