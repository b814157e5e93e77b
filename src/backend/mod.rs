//! Identity backend: the capability set the auth gateway is written against.
//!
//! DESIGN
//! ======
//! `IdentityBackend` names the four provider operations the app relies on.
//! Adapters own their transport and the `SessionStore` they were built with;
//! nothing above the gateway sees provider wire types. `connect` picks an
//! adapter from a typed [`config::BackendConfig`].

pub mod config;
pub mod firebase;
pub mod memory;

use std::sync::Arc;

use crate::session::{ProviderSession, SessionStore};
use config::{BackendConfig, IdentityProviderKind};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by identity backend adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The provider refused the request. `message` is the provider's own text.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response (connect, timeout, read).
    #[error("network request failed: {0}")]
    Transport(String),

    /// A success response body could not be deserialized.
    #[error("unexpected identity provider response: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The provider API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },
}

impl BackendError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected { status, message: message.into() }
    }
}

// =============================================================================
// TRAIT
// =============================================================================

/// Operations an identity provider must expose.
///
/// `Ok(None)` from the credential operations means the provider reported
/// success without handing back an identity.
#[async_trait::async_trait]
pub trait IdentityBackend: Send + Sync {
    /// Authenticate an existing account and make it the current session.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the provider rejects the credentials or
    /// cannot be reached.
    async fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderSession>, BackendError>;

    /// Create an account and make it the current session.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the provider refuses the account or
    /// cannot be reached.
    async fn create_account_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderSession>, BackendError>;

    /// Session currently held in memory, if any.
    fn current_session(&self) -> Option<ProviderSession>;

    /// Drop the current session. No-op when signed out.
    fn sign_out(&self);
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Build the adapter selected by `config`, bound to `store`.
///
/// # Errors
///
/// Returns an error if the Firebase adapter is selected without an API key or
/// its HTTP client fails to build.
pub fn connect(config: &BackendConfig, store: SessionStore) -> Result<Arc<dyn IdentityBackend>, BackendError> {
    match config.provider {
        IdentityProviderKind::Memory => {
            tracing::info!("using in-memory identity backend");
            Ok(Arc::new(memory::MemoryBackend::new(store)))
        }
        IdentityProviderKind::Firebase => {
            let api_key = config
                .api_key
                .clone()
                .ok_or_else(|| BackendError::MissingApiKey { var: config::FIREBASE_API_KEY_VAR.into() })?;
            let client = firebase::FirebaseBackend::new(api_key, config.base_url.clone(), config.timeouts, store)?;
            tracing::info!(base_url = %config.base_url, "using firebase identity backend");
            Ok(Arc::new(client))
        }
    }
}
