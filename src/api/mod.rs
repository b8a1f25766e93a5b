//! Remote payments API — the external service that owns organizations,
//! onboarding progress, and step submissions. Consumed through the
//! [`PaymentsApi`] trait; the wire format belongs to the remote side.

pub mod client;
pub mod types;

pub use client::{HttpPaymentsApi, PaymentsApi};
pub use types::{
    BusinessActivity, DocumentUpload, NewOrganization, OrganizationRecord,
    PaymentMethodSelection, ServerProgress, ServerProgressStep, StakeholderInfo,
};
