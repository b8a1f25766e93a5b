//! OnboardingProgressController — coordinates step resolution, gating,
//! and per-step submission against the payments API.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;

use crate::api::client::PaymentsApi;
use crate::api::types::{
    BusinessActivity, DocumentUpload, NewOrganization, OrganizationRecord,
    PaymentMethodSelection, StakeholderInfo,
};
use crate::error::{OnboardingError, Result, StoreError};
use crate::onboarding::markers::{ActivityEntry, MarkerStore};
use crate::onboarding::progress::{
    JumpOutcome, NavOutcome, Resolution, WizardState, resolve_initial_step,
};
use crate::onboarding::step::StepKey;
use crate::store::kv::KvStore;

/// Snapshot of the wizard for the REST layer / step indicators.
#[derive(Debug, Clone, Serialize)]
pub struct WizardStatus {
    pub current_step: usize,
    pub current_key: StepKey,
    pub is_complete: bool,
    pub completed_steps: Vec<usize>,
    pub steps: Vec<StepStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<OrganizationRecord>,
    /// Last progress-fetch failure, if any. Retryable; the wizard stays
    /// on its last-known step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_error: Option<String>,
}

/// One step indicator.
#[derive(Debug, Clone, Serialize)]
pub struct StepStatus {
    pub index: usize,
    pub key: StepKey,
    pub title: &'static str,
    pub mandatory: bool,
    pub completed: bool,
    /// Whether the indicator is clickable from the current position.
    pub reachable: bool,
}

/// Owns the wizard session: resolves the current step from server state,
/// enforces the organization-first gate, and advances on submits.
///
/// One instance per wizard session; all mutation goes through the inner
/// `RwLock`.
pub struct OnboardingProgressController {
    api: Arc<dyn PaymentsApi>,
    markers: MarkerStore,
    state: RwLock<WizardState>,
    /// Set once the mount-time load finished. Gating decisions are not
    /// trusted before that.
    initialized: AtomicBool,
    progress_error: RwLock<Option<String>>,
}

impl OnboardingProgressController {
    pub fn new(api: Arc<dyn PaymentsApi>, store: Arc<dyn KvStore>) -> Self {
        Self {
            api,
            markers: MarkerStore::new(store),
            state: RwLock::new(WizardState::new()),
            initialized: AtomicBool::new(false),
            progress_error: RwLock::new(None),
        }
    }

    /// Mount-time load: read the cached organization id, fetch server
    /// progress, and resolve the step to open on.
    ///
    /// A progress-fetch failure is non-fatal — the wizard degrades to
    /// step 0 with a retryable error recorded, and the cached id is kept.
    pub async fn initialize(&self) -> Result<WizardStatus> {
        let organization_id = self.markers.cached_organization_id().await?;

        let (progress, fetch_error) = match &organization_id {
            Some(id) => match self.api.get_onboarding_progress(id).await {
                Ok(progress) => (Some(progress), None),
                Err(e) => {
                    warn!(organization_id = %id, error = %e, "Progress fetch failed; opening on step 0");
                    (None, Some(e.to_string()))
                }
            },
            None => (None, None),
        };

        let resolved = resolve_initial_step(organization_id.as_deref(), progress.as_ref());
        {
            let mut state = self.state.write().await;
            state.apply_resolution(organization_id, &resolved);
        }
        *self.progress_error.write().await = fetch_error;
        self.initialized.store(true, Ordering::SeqCst);

        if matches!(resolved.resolution, Resolution::Complete) {
            tracing::info!("Onboarding already complete; caller should leave the wizard");
        }
        Ok(self.status().await)
    }

    /// Re-run the progress fetch after a failed mount (the retry banner).
    pub async fn retry(&self) -> Result<WizardStatus> {
        self.initialize().await
    }

    fn ensure_initialized(&self) -> std::result::Result<(), OnboardingError> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(OnboardingError::NotInitialized)
        }
    }

    /// Current wizard snapshot.
    pub async fn status(&self) -> WizardStatus {
        let state = self.state.read().await;
        let completed = state.completed();
        let current = state.current();
        let steps = StepKey::ALL
            .iter()
            .map(|step| {
                let index = step.index();
                StepStatus {
                    index,
                    key: *step,
                    title: step.title(),
                    mandatory: step.mandatory(),
                    completed: completed.contains(&index),
                    reachable: completed.contains(&index) || index == current + 1,
                }
            })
            .collect();

        WizardStatus {
            current_step: current,
            current_key: state.current_step(),
            is_complete: state.is_complete(),
            completed_steps: completed.iter().copied().collect(),
            steps,
            organization_id: state.organization_id().map(str::to_string),
            organization: state.organization().cloned(),
            progress_error: self.progress_error.read().await.clone(),
        }
    }

    /// The local activity feed (relative completion times).
    pub async fn activity(&self) -> std::result::Result<Vec<ActivityEntry>, StoreError> {
        self.markers.activity().await
    }

    /// Advance past the current step ("Continue").
    pub async fn advance(&self) -> Result<NavOutcome> {
        self.ensure_initialized()?;
        let mut state = self.state.write().await;
        let step = state.current_step();
        let outcome = state.advance()?;
        drop(state);

        self.record_marker(step).await;
        Ok(outcome)
    }

    /// Step back one ("Previous"). Never un-completes anything.
    pub async fn rewind(&self) -> Result<NavOutcome> {
        self.ensure_initialized()?;
        Ok(self.state.write().await.rewind())
    }

    /// Jump to a step indicator. Illegal targets are rejected without
    /// state change.
    pub async fn jump_to(&self, target: usize) -> Result<JumpOutcome> {
        self.ensure_initialized()?;
        Ok(self.state.write().await.jump_to(target))
    }

    /// Step 1: create the organization. On success the id is cached, step
    /// 0 is marked complete, and the wizard moves on.
    pub async fn submit_organization(&self, org: &NewOrganization) -> Result<NavOutcome> {
        self.ensure_initialized()?;
        let record = self.api.create_organization(org).await?;

        if let Err(e) = self.markers.cache_organization_id(&record.id).await {
            warn!(error = %e, "Failed to cache organization id");
        }

        let mut state = self.state.write().await;
        state.set_organization(record);
        let outcome = state.advance()?;
        drop(state);

        self.record_marker(StepKey::Organization).await;
        Ok(outcome)
    }

    /// Step 2: stakeholder details.
    pub async fn submit_stakeholder(&self, info: &StakeholderInfo) -> Result<NavOutcome> {
        let id = self.require_organization().await?;
        self.api.submit_stakeholder(&id, info).await?;
        self.advance().await
    }

    /// Step 3: business activity.
    pub async fn submit_business(&self, activity: &BusinessActivity) -> Result<NavOutcome> {
        let id = self.require_organization().await?;
        self.api.submit_business(&id, activity).await?;
        self.advance().await
    }

    /// Step 4: payment methods.
    pub async fn submit_payment_methods(
        &self,
        selection: &PaymentMethodSelection,
    ) -> Result<NavOutcome> {
        let id = self.require_organization().await?;
        self.api.submit_payment_methods(&id, selection).await?;
        self.advance().await
    }

    /// Step 5: document upload. Completing it ends the wizard.
    pub async fn submit_documents(&self, upload: &DocumentUpload) -> Result<NavOutcome> {
        let id = self.require_organization().await?;
        self.api.submit_documents(&id, upload).await?;
        self.advance().await
    }

    async fn require_organization(&self) -> Result<String> {
        self.ensure_initialized()?;
        self.state
            .read()
            .await
            .organization_id()
            .map(str::to_string)
            .ok_or_else(|| OnboardingError::OrganizationRequired.into())
    }

    /// Best-effort write-once marker. Marker failures never block the
    /// wizard; markers are display-only.
    async fn record_marker(&self, step: StepKey) {
        if let Err(e) = self.markers.record_once(step).await {
            warn!(step = %step, error = %e, "Failed to record completion marker");
        }
    }
}

// API-failure and navigation scenarios are covered end to end in
// tests/onboarding_flow.rs with a stub PaymentsApi; the pure transition
// rules live in progress.rs with their own tests.
