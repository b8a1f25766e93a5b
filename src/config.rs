//! Configuration types.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::onboarding::session::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_INTERVAL};

/// Service configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL of the remote payments API.
    pub api_base_url: String,
    /// Bearer token for the payments API. When absent, the service waits
    /// for session credentials to appear in the store after login.
    pub api_token: Option<SecretString>,
    /// Path of the local libsql database file.
    pub db_path: String,
    /// Port the REST surface binds to.
    pub port: u16,
    /// Attempt budget for the post-login credential poll.
    pub credential_poll_attempts: u32,
    /// Delay between credential poll attempts.
    pub credential_poll_interval: Duration,
    /// Per-request timeout for payments API calls.
    pub api_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.paydesk.example".to_string(),
            api_token: None,
            db_path: "./data/paydesk-onboarding.db".to_string(),
            port: 8080,
            credential_poll_attempts: DEFAULT_POLL_ATTEMPTS,
            credential_poll_interval: DEFAULT_POLL_INTERVAL,
            api_timeout: Duration::from_secs(30),
        }
    }
}

impl ServiceConfig {
    /// Build a config from environment variables.
    ///
    /// `PAYDESK_API_URL` is required; everything else falls back to the
    /// defaults above. `PAYDESK_API_TOKEN` is optional — without it the
    /// binary polls the store for post-login session credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = std::env::var("PAYDESK_API_URL")
            .map_err(|_| ConfigError::MissingEnvVar("PAYDESK_API_URL".to_string()))?;
        let api_token = std::env::var("PAYDESK_API_TOKEN").ok().map(SecretString::from);

        let defaults = Self::default();

        let db_path =
            std::env::var("PAYDESK_DB_PATH").unwrap_or_else(|_| defaults.db_path.clone());

        let port = match std::env::var("PAYDESK_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PAYDESK_PORT".to_string(),
                message: format!("not a port number: {raw}"),
            })?,
            Err(_) => defaults.port,
        };

        let credential_poll_attempts = match std::env::var("PAYDESK_CRED_POLL_ATTEMPTS") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PAYDESK_CRED_POLL_ATTEMPTS".to_string(),
                message: format!("not a number: {raw}"),
            })?,
            Err(_) => defaults.credential_poll_attempts,
        };

        Ok(Self {
            api_base_url,
            api_token,
            db_path,
            port,
            credential_poll_attempts,
            ..defaults
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_wizard_poll_budget() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.credential_poll_attempts, 10);
        assert_eq!(cfg.credential_poll_interval, Duration::from_millis(500));
        assert_eq!(cfg.port, 8080);
    }
}
