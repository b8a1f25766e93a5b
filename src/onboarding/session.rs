//! Bounded wait for session credentials after login.
//!
//! Right after login the credentials land in the store asynchronously, so
//! the wizard polls for them: a fixed attempt budget with a fixed delay,
//! no retry-forever mode. Callers that mount the wizard in a task cancel
//! the wait by aborting that task.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::SessionError;
use crate::onboarding::markers::keys;
use crate::store::kv::{KvStore, get_string};

/// Default attempt budget.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 10;
/// Default delay between attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Credentials of the logged-in account.
#[derive(Clone)]
pub struct SessionCredentials {
    pub account_id: String,
    pub token: SecretString,
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("account_id", &self.account_id)
            .field("token", &"[redacted]")
            .finish()
    }
}

/// Poll the store until credentials appear or the budget runs out.
///
/// Sleeps only between attempts; once the final attempt fails the error
/// is immediate and user-actionable (log in again). A store failure ends
/// the wait early — not-ready and broken are different conditions.
pub async fn wait_for_credentials(
    store: &dyn KvStore,
    attempts: u32,
    interval: Duration,
) -> Result<SessionCredentials, SessionError> {
    for attempt in 1..=attempts {
        match read_credentials(store).await? {
            Some(creds) => {
                tracing::debug!(attempt, "Session credentials available");
                return Ok(creds);
            }
            None if attempt < attempts => tokio::time::sleep(interval).await,
            None => {}
        }
    }
    Err(SessionError::CredentialsUnavailable { attempts })
}

async fn read_credentials(
    store: &dyn KvStore,
) -> Result<Option<SessionCredentials>, SessionError> {
    let account_id = get_string(store, keys::SESSION_ACCOUNT_ID)
        .await
        .map_err(|e| SessionError::Malformed(e.to_string()))?;
    let token = get_string(store, keys::SESSION_TOKEN)
        .await
        .map_err(|e| SessionError::Malformed(e.to_string()))?;

    match (account_id, token) {
        (Some(account_id), Some(token)) if !account_id.is_empty() && !token.is_empty() => {
            Ok(Some(SessionCredentials {
                account_id,
                token: SecretString::from(token),
            }))
        }
        _ => Ok(None),
    }
}
