//! Local progress markers — write-once completion timestamps.
//!
//! Markers feed the activity display only. Gating always comes from the
//! server snapshot; a missing or garbled marker is "no marker yet", never
//! an error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::onboarding::step::StepKey;
use crate::store::kv::{KvStore, get_string, set_string};

/// Store keys used by the wizard.
pub mod keys {
    use crate::onboarding::step::StepKey;

    /// Cached organization id, so reloads skip re-resolving it.
    pub const ORGANIZATION_ID: &str = "onboarding.organization_id";
    /// Session account id written by the login flow.
    pub const SESSION_ACCOUNT_ID: &str = "session.account_id";
    /// Session API token written by the login flow.
    pub const SESSION_TOKEN: &str = "session.token";

    /// Per-step completion marker key.
    pub fn step_marker(step: StepKey) -> String {
        format!("onboarding.step.{step}.completed_at")
    }
}

/// One row of the activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityEntry {
    pub step: StepKey,
    pub title: &'static str,
    pub completed_at: DateTime<Utc>,
    /// Relative age at read time, e.g. "2 days ago".
    pub age: String,
}

/// Marker access over the injected store.
#[derive(Clone)]
pub struct MarkerStore {
    store: Arc<dyn KvStore>,
}

impl MarkerStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Record a completion marker for `step`, unless one already exists.
    ///
    /// Replaying an advance for an already-completed step keeps the
    /// original timestamp. Returns whether a marker was written.
    pub async fn record_once(&self, step: StepKey) -> Result<bool, StoreError> {
        let key = keys::step_marker(step);
        if self.marker(step).await?.is_some() {
            return Ok(false);
        }
        set_string(self.store.as_ref(), &key, &Utc::now().to_rfc3339()).await?;
        Ok(true)
    }

    /// Read the marker for `step`. Invalid timestamps read as absent.
    pub async fn marker(&self, step: StepKey) -> Result<Option<DateTime<Utc>>, StoreError> {
        let raw = get_string(self.store.as_ref(), &keys::step_marker(step)).await?;
        Ok(raw
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// All recorded markers, oldest first, with relative ages.
    pub async fn activity(&self) -> Result<Vec<ActivityEntry>, StoreError> {
        let now = Utc::now();
        let mut entries = Vec::new();
        for step in StepKey::ALL {
            if let Some(completed_at) = self.marker(step).await? {
                entries.push(ActivityEntry {
                    step,
                    title: step.title(),
                    completed_at,
                    age: relative_age(completed_at, now),
                });
            }
        }
        entries.sort_by_key(|e| e.completed_at);
        Ok(entries)
    }

    /// Cached organization id from a previous session, if any.
    pub async fn cached_organization_id(&self) -> Result<Option<String>, StoreError> {
        let id = get_string(self.store.as_ref(), keys::ORGANIZATION_ID).await?;
        Ok(id.filter(|id| !id.is_empty()))
    }

    /// Cache the organization id for later sessions.
    pub async fn cache_organization_id(&self, id: &str) -> Result<(), StoreError> {
        set_string(self.store.as_ref(), keys::ORGANIZATION_ID, id).await
    }
}

/// Render how long ago `then` was, relative to `now`.
fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let seconds = delta.num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = delta.num_minutes();
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = delta.num_hours();
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = delta.num_days();
    if days < 30 {
        return plural(days, "day");
    }
    let months = days / 30;
    if months < 12 {
        return plural(months, "month");
    }
    plural(months / 12, "year")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
