//! Onboarding wizard core — the five-step merchant onboarding flow.
//!
//! The wizard walks a merchant through organization creation, stakeholder
//! details, business activity, payment methods, and document upload. The
//! organization step is the hard gate: until an organization id exists,
//! no other step is reachable. Server-reported progress is the source of
//! truth for gating; local markers only feed the activity display.

pub mod controller;
pub mod markers;
pub mod progress;
pub mod routes;
pub mod session;
pub mod step;

pub use controller::{OnboardingProgressController, WizardStatus};
pub use markers::{ActivityEntry, MarkerStore};
pub use progress::{JumpOutcome, NavOutcome, Resolution, Resolved, WizardState};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use session::{SessionCredentials, wait_for_credentials};
pub use step::{STEP_COUNT, ServerStepName, StepKey};
