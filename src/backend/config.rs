//! Identity backend configuration parsed from environment variables.

use super::BackendError;

pub const DEFAULT_FIREBASE_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_IDENTITY_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IDENTITY_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const FIREBASE_API_KEY_VAR: &str = "FIREBASE_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProviderKind {
    Memory,
    Firebase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for IdentityTimeouts {
    fn default() -> Self {
        Self {
            request_secs: DEFAULT_IDENTITY_REQUEST_TIMEOUT_SECS,
            connect_secs: DEFAULT_IDENTITY_CONNECT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub provider: IdentityProviderKind,
    /// Web API key; only read when `provider` is Firebase.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeouts: IdentityTimeouts,
}

impl BackendConfig {
    /// Build typed backend config from environment variables.
    ///
    /// Optional:
    /// - `IDENTITY_PROVIDER`: `memory` (default) or `firebase`
    /// - `FIREBASE_API_KEY`: required when the provider is `firebase`
    /// - `FIREBASE_AUTH_BASE_URL`: Identity Toolkit base URL
    /// - `IDENTITY_REQUEST_TIMEOUT_SECS`: default 30
    /// - `IDENTITY_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider, or a Firebase provider with
    /// no API key.
    pub fn from_env() -> Result<Self, BackendError> {
        let provider = parse_provider(std::env::var("IDENTITY_PROVIDER").ok().as_deref())?;

        let api_key = std::env::var(FIREBASE_API_KEY_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty());
        if provider == IdentityProviderKind::Firebase && api_key.is_none() {
            return Err(BackendError::MissingApiKey { var: FIREBASE_API_KEY_VAR.into() });
        }

        let base_url = std::env::var("FIREBASE_AUTH_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_FIREBASE_AUTH_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = IdentityTimeouts {
            request_secs: env_parse_u64("IDENTITY_REQUEST_TIMEOUT_SECS", DEFAULT_IDENTITY_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("IDENTITY_CONNECT_TIMEOUT_SECS", DEFAULT_IDENTITY_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { provider, api_key, base_url, timeouts })
    }

    /// Config for the in-memory backend with default timeouts.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            provider: IdentityProviderKind::Memory,
            api_key: None,
            base_url: DEFAULT_FIREBASE_AUTH_BASE_URL.to_string(),
            timeouts: IdentityTimeouts::default(),
        }
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_provider(raw: Option<&str>) -> Result<IdentityProviderKind, BackendError> {
    match raw.unwrap_or("memory") {
        "memory" => Ok(IdentityProviderKind::Memory),
        "firebase" => Ok(IdentityProviderKind::Firebase),
        other => Err(BackendError::ConfigParse(format!("unknown IDENTITY_PROVIDER: {other}"))),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
