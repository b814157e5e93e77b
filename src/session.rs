//! Provider session held in memory for the lifetime of the process.
//!
//! DESIGN
//! ======
//! The identity provider's "current user" is an explicit `SessionStore`
//! handed to each backend at construction rather than a process global.
//! Clones share the same cell, so the gateway, the backend, and tests can
//! observe one session. Nothing is written to disk.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Session issued by the identity provider after sign-in or sign-up.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSession {
    /// Provider-assigned user identifier.
    pub uid: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    /// Bearer token returned by the provider, when it issues one.
    pub id_token: Option<String>,
}

impl fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSession")
            .field("uid", &self.uid)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("id_token", &self.id_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Shared cell holding the active provider session, if any.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<ProviderSession>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the active session.
    #[must_use]
    pub fn current(&self) -> Option<ProviderSession> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active session.
    pub fn replace(&self, session: ProviderSession) {
        *self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Drop the active session. Returns `true` if one was present.
    pub fn clear(&self) -> bool {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }
}
