//! Step resolution and wizard state transitions.
//!
//! Everything in this module is pure: the controller feeds it the cached
//! organization id and the server progress snapshot, and it decides which
//! step is current and which navigation moves are legal.

use std::collections::BTreeSet;

use crate::api::types::{OrganizationRecord, ServerProgress};
use crate::error::OnboardingError;
use crate::onboarding::step::{STEP_COUNT, ServerStepName, StepKey};

/// Where the wizard should open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Render the step at this index.
    Step(usize),
    /// Onboarding is done; the caller leaves the wizard entirely.
    Complete,
}

/// Result of the mount-time resolution: a step (or terminal state) plus
/// the set of step indices already treated as done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub resolution: Resolution,
    pub completed: BTreeSet<usize>,
}

/// Resolve which step the user should see on mount.
///
/// - No organization id: step 0, nothing completed. Steps 2–5 are
///   meaningless without an id, whatever the progress payload claims.
/// - Id present but no snapshot (fetch failed): step 0 as a safe
///   fallback. The organization itself still counts as done; progress is
///   never assumed when the source of truth is unreachable.
/// - `isComplete`: terminal, caller exits the wizard.
/// - Otherwise the first post-organization step the server has not
///   confirmed, in sequence order.
pub fn resolve_initial_step(
    organization_id: Option<&str>,
    server_progress: Option<&ServerProgress>,
) -> Resolved {
    let organization_id = organization_id.filter(|id| !id.is_empty());
    if organization_id.is_none() {
        return Resolved {
            resolution: Resolution::Step(0),
            completed: BTreeSet::new(),
        };
    }

    let Some(progress) = server_progress else {
        return Resolved {
            resolution: Resolution::Step(0),
            completed: BTreeSet::from([0]),
        };
    };

    if progress.is_complete {
        return Resolved {
            resolution: Resolution::Complete,
            completed: (0..STEP_COUNT).collect(),
        };
    }

    // Completed server names, deduplicated through the canonical
    // vocabulary. Unknown names are ignored.
    let done: BTreeSet<StepKey> = progress
        .steps
        .iter()
        .filter(|s| s.completed)
        .filter_map(|s| ServerStepName::parse(&s.step_name))
        .map(ServerStepName::step_key)
        .collect();

    let mut completed: BTreeSet<usize> = BTreeSet::from([0]);
    completed.extend(done.iter().map(|k| k.index()));

    for step in &StepKey::ALL[1..] {
        if !done.contains(step) {
            return Resolved {
                resolution: Resolution::Step(step.index()),
                completed,
            };
        }
    }

    // All four server steps complete but isComplete was false. The server
    // is inconsistent with itself; land on the last actionable step
    // rather than guessing completion.
    tracing::warn!("Server progress lists every step complete but isComplete=false");
    Resolved {
        resolution: Resolution::Step(STEP_COUNT - 1),
        completed,
    }
}

/// Outcome of `advance` / `rewind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The current index changed to this value.
    Moved(usize),
    /// The last step was completed; the caller leaves the wizard.
    Complete,
    /// Rewound past the first step; the caller navigates away.
    Exit,
}

/// Outcome of `jump_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    Moved(usize),
    /// Illegal target; nothing changed.
    Rejected,
}

/// In-memory wizard state: current index, monotone completed set, and the
/// resolved organization. One instance per wizard session.
#[derive(Debug, Clone, Default)]
pub struct WizardState {
    current: usize,
    completed: BTreeSet<usize>,
    /// The id that unlocks steps 2–5. May come from the cache alone,
    /// without a full record.
    organization_id: Option<String>,
    /// Full record when this session created (or re-fetched) it; display
    /// pass-through only.
    organization: Option<OrganizationRecord>,
    complete: bool,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the state from a mount-time resolution.
    pub fn apply_resolution(&mut self, organization_id: Option<String>, resolved: &Resolved) {
        self.organization_id = organization_id.filter(|id| !id.is_empty());
        // Set union: completed steps never un-complete within a session.
        self.completed.extend(resolved.completed.iter().copied());
        match resolved.resolution {
            Resolution::Step(index) => self.current = index,
            Resolution::Complete => self.complete = true,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> StepKey {
        StepKey::from_index(self.current).unwrap_or(StepKey::Organization)
    }

    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.completed
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn organization(&self) -> Option<&OrganizationRecord> {
        self.organization.as_ref()
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    /// Record a freshly created organization. Unlocks the later steps and
    /// marks step 0 complete.
    pub fn set_organization(&mut self, organization: OrganizationRecord) {
        self.organization_id = Some(organization.id.clone()).filter(|id| !id.is_empty());
        self.organization = Some(organization);
        self.completed.insert(0);
    }

    /// Advance past the current step.
    ///
    /// On step 0 this requires an organization id; without one nothing
    /// moves and the caller gets a precondition error to surface inline.
    pub fn advance(&mut self) -> Result<NavOutcome, OnboardingError> {
        if self.current == 0 && self.organization_id().is_none() {
            return Err(OnboardingError::OrganizationRequired);
        }

        self.completed.insert(self.current);

        if self.current == STEP_COUNT - 1 {
            self.complete = true;
            return Ok(NavOutcome::Complete);
        }

        self.current += 1;
        Ok(NavOutcome::Moved(self.current))
    }

    /// Step back one. Never un-completes anything.
    pub fn rewind(&mut self) -> NavOutcome {
        if self.current == 0 {
            return NavOutcome::Exit;
        }
        self.current -= 1;
        NavOutcome::Moved(self.current)
    }

    /// Jump to a step indicator.
    ///
    /// Legal targets are completed steps and the immediate next step;
    /// everything else is rejected without state change. Without an
    /// organization id any target past 0 is forced back to 0.
    pub fn jump_to(&mut self, target: usize) -> JumpOutcome {
        if target >= STEP_COUNT {
            return JumpOutcome::Rejected;
        }

        if target > 0 && self.organization_id().is_none() {
            self.current = 0;
            return JumpOutcome::Moved(0);
        }

        if self.completed.contains(&target) || target == self.current + 1 {
            self.current = target;
            return JumpOutcome::Moved(target);
        }

        JumpOutcome::Rejected
    }
}
