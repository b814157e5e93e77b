//! In-process identity backend.
//!
//! Accounts live in a `HashMap` keyed by normalized email, with SHA-256
//! password digests. Errors reuse the Firebase message vocabulary so screens
//! render the same strings against either backend.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Mutex, PoisonError};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::{BackendError, IdentityBackend};
use crate::session::{ProviderSession, SessionStore};

pub const INVALID_EMAIL: &str = "INVALID_EMAIL";
pub const WEAK_PASSWORD: &str = "WEAK_PASSWORD : Password should be at least 6 characters";
pub const EMAIL_EXISTS: &str = "EMAIL_EXISTS";
pub const INVALID_LOGIN_CREDENTIALS: &str = "INVALID_LOGIN_CREDENTIALS";

const MIN_PASSWORD_LEN: usize = 6;
const BAD_REQUEST: u16 = 400;

struct Account {
    uid: String,
    email: String,
    display_name: Option<String>,
    password_hash: String,
}

impl Account {
    fn session(&self) -> ProviderSession {
        ProviderSession {
            uid: self.uid.clone(),
            display_name: self.display_name.clone(),
            email: Some(self.email.clone()),
            id_token: None,
        }
    }
}

pub struct MemoryBackend {
    accounts: Mutex<HashMap<String, Account>>,
    store: SessionStore,
}

impl MemoryBackend {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self { accounts: Mutex::new(HashMap::new()), store }
    }

    /// Register an account without signing it in. Returns the new uid.
    ///
    /// # Errors
    ///
    /// Same validation as [`IdentityBackend::create_account_with_credentials`].
    pub fn seed_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<String, BackendError> {
        let account = self.insert_account(email, password, display_name.map(str::to_owned))?;
        Ok(account.uid)
    }

    fn insert_account(
        &self,
        email: &str,
        password: &str,
        display_name: Option<String>,
    ) -> Result<ProviderSession, BackendError> {
        let normalized = normalize_email(email).ok_or_else(|| BackendError::rejected(BAD_REQUEST, INVALID_EMAIL))?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BackendError::rejected(BAD_REQUEST, WEAK_PASSWORD));
        }

        let mut accounts = self
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(&normalized) {
            return Err(BackendError::rejected(BAD_REQUEST, EMAIL_EXISTS));
        }

        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            email: normalized.clone(),
            display_name,
            password_hash: hash_password(password),
        };
        let session = account.session();
        accounts.insert(normalized, account);
        Ok(session)
    }
}

#[async_trait::async_trait]
impl IdentityBackend for MemoryBackend {
    async fn sign_in_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderSession>, BackendError> {
        let normalized = normalize_email(email).ok_or_else(|| BackendError::rejected(BAD_REQUEST, INVALID_EMAIL))?;
        let session = {
            let accounts = self
                .accounts
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            accounts
                .get(&normalized)
                .filter(|account| account.password_hash == hash_password(password))
                .map(Account::session)
        };

        let Some(session) = session else {
            return Err(BackendError::rejected(BAD_REQUEST, INVALID_LOGIN_CREDENTIALS));
        };
        self.store.replace(session.clone());
        Ok(Some(session))
    }

    async fn create_account_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<ProviderSession>, BackendError> {
        let session = self.insert_account(email, password, None)?;
        self.store.replace(session.clone());
        Ok(Some(session))
    }

    fn current_session(&self) -> Option<ProviderSession> {
        self.store.current()
    }

    fn sign_out(&self) {
        self.store.clear();
    }
}

// =============================================================================
// HELPERS
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return None;
    }
    Some(normalized)
}

fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    let mut out = String::with_capacity(digest.len() * 2);
    for b in &digest {
        let _ = write!(out, "{b:02x}");
    }
    out
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
