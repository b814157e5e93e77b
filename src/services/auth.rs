//! Identity gateway, the app's only door to the identity backend.
//!
//! ARCHITECTURE
//! ============
//! `AuthGateway` is the seam the view-state controller depends on.
//! `IdentityGateway` implements it over any [`IdentityBackend`], mapping
//! provider sessions to [`User`] and every provider failure to [`AuthError`].
//!
//! ERROR HANDLING
//! ==============
//! A provider that reports success without an identity breaks its contract.
//! Those cases surface as ordinary `AuthError`s to callers but are logged at
//! `error` level, while credential rejections stay at `warn`.

use std::sync::Arc;

use crate::backend::{BackendError, IdentityBackend};
use crate::model::User;
use crate::session::ProviderSession;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Provider rejection or transport failure, message kept verbatim.
    #[error("{0}")]
    Backend(String),
    #[error("no user after login")]
    NoUserAfterLogin,
    #[error("account creation failed")]
    AccountCreationFailed,
}

impl AuthError {
    /// True when the provider broke its contract rather than refusing the user.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::NoUserAfterLogin | Self::AccountCreationFailed)
    }
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Authentication operations offered to the presentation side.
#[async_trait::async_trait]
pub trait AuthGateway: Send + Sync {
    /// User for the session the backend currently holds, if any.
    fn get_current_user(&self) -> Option<User>;

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the provider rejects the credentials, cannot
    /// be reached, or reports success without an identity.
    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] when the provider refuses the account, cannot be
    /// reached, or reports success without an identity.
    async fn register(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// End the current session. Safe to call when signed out.
    fn logout(&self);
}

#[derive(Clone)]
pub struct IdentityGateway {
    backend: Arc<dyn IdentityBackend>,
}

impl IdentityGateway {
    #[must_use]
    pub fn new(backend: Arc<dyn IdentityBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait::async_trait]
impl AuthGateway for IdentityGateway {
    fn get_current_user(&self) -> Option<User> {
        self.backend.current_session().map(to_user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let outcome = self
            .backend
            .sign_in_with_credentials(email, password)
            .await;
        let user = resolve(outcome, AuthError::NoUserAfterLogin)?;
        tracing::info!(uid = %user.id, "login succeeded");
        Ok(user)
    }

    async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let outcome = self
            .backend
            .create_account_with_credentials(email, password)
            .await;
        let user = resolve(outcome, AuthError::AccountCreationFailed)?;
        tracing::info!(uid = %user.id, "account created");
        Ok(user)
    }

    fn logout(&self) {
        self.backend.sign_out();
        tracing::debug!("signed out");
    }
}

fn resolve(outcome: Result<Option<ProviderSession>, BackendError>, missing: AuthError) -> Result<User, AuthError> {
    match outcome {
        Ok(Some(session)) => Ok(to_user(session)),
        Ok(None) => {
            tracing::error!(error = %missing, "identity provider reported success without a user");
            Err(missing)
        }
        Err(e) => {
            tracing::warn!(error = %e, "identity provider request failed");
            Err(e.into())
        }
    }
}

fn to_user(session: ProviderSession) -> User {
    User { id: session.uid, display_name: session.display_name, email: session.email }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
