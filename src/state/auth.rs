//! Login/registration view state and the controller that drives it.
//!
//! SYSTEM CONTEXT
//! ==============
//! A login screen renders [`AuthViewState`] snapshots from
//! [`AuthController::subscribe`] and forwards text edits and button presses
//! to the controller. The controller validates input, calls the
//! [`AuthGateway`] on a Tokio task, and folds the outcome back into state.
//!
//! CONCURRENCY
//! ===========
//! Submits arriving while a request is in flight are ignored. The in-flight
//! check and the switch to loading happen inside one `send_if_modified`
//! closure, so two racing submits cannot both dispatch. There is no timeout
//! here: a backend call that never resolves leaves `is_loading` set, which is
//! why the HTTP adapter carries request timeouts. A request task that unwinds
//! before resolving still clears `is_loading` through [`InFlight`].

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::User;
use crate::services::auth::{AuthError, AuthGateway};

pub const EMPTY_FIELDS_MESSAGE: &str = "Email and password must not be empty.";

/// Shown when a request task ends without producing an outcome.
pub const REQUEST_ABORTED_MESSAGE: &str = "auth request aborted";

/// Everything a login screen needs to render.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthViewState {
    pub email: String,
    pub password: String,
    /// Set only between dispatch and resolution of a request.
    pub is_loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

impl fmt::Debug for AuthViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthViewState")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("is_loading", &self.is_loading)
            .field("error", &self.error)
            .field("success", &self.success)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthAction {
    Login,
    Register,
}

pub struct AuthController {
    gateway: Arc<dyn AuthGateway>,
    state: Arc<watch::Sender<AuthViewState>>,
}

impl AuthController {
    #[must_use]
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        let (state, _) = watch::channel(AuthViewState::default());
        Self { gateway, state: Arc::new(state) }
    }

    /// Receiver that always holds the latest snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthViewState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> AuthViewState {
        self.state.borrow().clone()
    }

    pub fn on_email_change(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_if_modified(|state| replace_field(&mut state.email, text));
    }

    pub fn on_password_change(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_if_modified(|state| replace_field(&mut state.password, text));
    }

    /// Sign in with the current fields.
    ///
    /// Returns the request task, or `None` when validation failed or a
    /// request is already in flight. Must be called inside a Tokio runtime.
    pub fn login(&self) -> Option<JoinHandle<()>> {
        self.submit(AuthAction::Login)
    }

    /// Create an account with the current fields. Same contract as [`Self::login`].
    pub fn register(&self) -> Option<JoinHandle<()>> {
        self.submit(AuthAction::Register)
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.gateway.get_current_user()
    }

    /// End the session and drop any earlier success flag.
    pub fn logout(&self) {
        self.gateway.logout();
        self.state
            .send_if_modified(|state| std::mem::take(&mut state.success));
    }

    fn submit(&self, action: AuthAction) -> Option<JoinHandle<()>> {
        let mut credentials = None;
        self.state.send_if_modified(|state| {
            if state.is_loading {
                tracing::debug!(?action, "request already in flight; submit ignored");
                return false;
            }
            if state.email.trim().is_empty() || state.password.trim().is_empty() {
                tracing::debug!(?action, "blank credentials rejected");
                let changed = state.error.as_deref() != Some(EMPTY_FIELDS_MESSAGE);
                state.error = Some(EMPTY_FIELDS_MESSAGE.to_owned());
                return changed;
            }
            state.is_loading = true;
            state.error = None;
            credentials = Some((state.email.clone(), state.password.clone()));
            true
        });

        let (email, password) = credentials?;
        let gateway = Arc::clone(&self.gateway);
        let in_flight = InFlight { state: Some(Arc::clone(&self.state)), action };
        tracing::debug!(?action, "auth request dispatched");

        Some(tokio::spawn(async move {
            let outcome = match action {
                AuthAction::Login => gateway.login(&email, &password).await,
                AuthAction::Register => gateway.register(&email, &password).await,
            };
            in_flight.resolve(outcome);
        }))
    }
}

/// Owns the loading flag of one dispatched request.
///
/// Dropped without [`InFlight::resolve`] (the gateway panicked or the task
/// was aborted), it publishes a failure so later submits are not locked out.
struct InFlight {
    state: Option<Arc<watch::Sender<AuthViewState>>>,
    action: AuthAction,
}

impl InFlight {
    fn resolve(mut self, outcome: Result<User, AuthError>) {
        if let Some(state) = self.state.take() {
            state.send_modify(|s| apply_outcome(s, outcome));
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };
        tracing::error!(action = ?self.action, "auth request ended without an outcome");
        state.send_modify(|s| {
            s.is_loading = false;
            s.error = Some(REQUEST_ABORTED_MESSAGE.to_owned());
            s.success = false;
        });
    }
}

fn replace_field(field: &mut String, text: String) -> bool {
    if *field == text {
        return false;
    }
    *field = text;
    true
}

fn apply_outcome(state: &mut AuthViewState, outcome: Result<User, AuthError>) {
    state.is_loading = false;
    match outcome {
        Ok(_) => {
            state.error = None;
            state.success = true;
        }
        Err(e) => {
            state.error = Some(e.to_string());
            state.success = false;
        }
    }
}
