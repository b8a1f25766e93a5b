//! Wire types for the payments API.
//!
//! Field names follow the remote API's JSON (camelCase), except where a
//! payload explicitly uses snake_case (`step_name`).

use serde::{Deserialize, Serialize};

/// An organization as reported by the remote API.
///
/// Only `id` is interpreted here — it is the key that unlocks the
/// post-organization onboarding steps. The descriptive fields are passed
/// through for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Payload for creating a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_form: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// One entry of the server-reported onboarding progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerProgressStep {
    /// Server-side step vocabulary, e.g. `STAKEHOLDER`, `PAYMENT_METHODS`.
    pub step_name: String,
    pub completed: bool,
}

/// Server-reported onboarding progress for one organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerProgress {
    #[serde(default)]
    pub steps: Vec<ServerProgressStep>,
    #[serde(rename = "isComplete", default)]
    pub is_complete: bool,
}

/// Stakeholder (owner/director) details for the stakeholder step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeholderInfo {
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Business-activity details for the business step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessActivity {
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_volume: Option<String>,
}

/// Payment-method selection for the payment step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodSelection {
    pub methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settlement_account: Option<String>,
}

/// A document to upload for the document step.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    /// Document kind, e.g. "registration_certificate".
    pub kind: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
