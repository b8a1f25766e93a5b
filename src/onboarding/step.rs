//! The fixed step catalog and the two step vocabularies.
//!
//! Local step keys and server step names are different vocabularies for
//! (almost) the same thing. All translation happens here; nothing else in
//! the crate compares raw strings from the two sides.

use serde::{Deserialize, Serialize};

/// Number of wizard steps. Index range is `0..STEP_COUNT`.
pub const STEP_COUNT: usize = 5;

/// Stable local identifier for one wizard step.
///
/// Declaration order is sequence order: organization → stakeholder →
/// business → payment → document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    Organization,
    Stakeholder,
    Business,
    Payment,
    Document,
}

impl StepKey {
    /// All steps in sequence order.
    pub const ALL: [StepKey; STEP_COUNT] = [
        StepKey::Organization,
        StepKey::Stakeholder,
        StepKey::Business,
        StepKey::Payment,
        StepKey::Document,
    ];

    /// Position of this step in the sequence.
    pub fn index(self) -> usize {
        match self {
            Self::Organization => 0,
            Self::Stakeholder => 1,
            Self::Business => 2,
            Self::Payment => 3,
            Self::Document => 4,
        }
    }

    /// Step at a given index, if in range.
    pub fn from_index(index: usize) -> Option<StepKey> {
        Self::ALL.get(index).copied()
    }

    /// Human-readable label.
    pub fn title(self) -> &'static str {
        match self {
            Self::Organization => "Organization",
            Self::Stakeholder => "Stakeholders",
            Self::Business => "Business activity",
            Self::Payment => "Payment methods",
            Self::Document => "Documents",
        }
    }

    /// Whether the step cannot be skipped. Only the organization step is
    /// mandatory today; the flag is per-step so that can change.
    pub fn mandatory(self) -> bool {
        matches!(self, Self::Organization)
    }

    /// The server-side name for this step.
    ///
    /// The organization step has none: its completion is implied by the
    /// organization record existing.
    pub fn server_name(self) -> Option<ServerStepName> {
        match self {
            Self::Organization => None,
            Self::Stakeholder => Some(ServerStepName::Stakeholder),
            Self::Business => Some(ServerStepName::Business),
            Self::Payment => Some(ServerStepName::PaymentMethods),
            Self::Document => Some(ServerStepName::Documents),
        }
    }
}

impl std::fmt::Display for StepKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Organization => "organization",
            Self::Stakeholder => "stakeholder",
            Self::Business => "business",
            Self::Payment => "payment",
            Self::Document => "document",
        };
        write!(f, "{s}")
    }
}

/// The remote API's vocabulary for the four post-organization steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerStepName {
    Stakeholder,
    Business,
    PaymentMethods,
    Documents,
}

impl ServerStepName {
    /// Parse a server step name, tolerating the legacy aliases one
    /// auxiliary summary view used (`METHODS` for the payment step, `ID`
    /// for identity documents). Unknown names parse to `None` and are
    /// ignored upstream rather than treated as errors.
    pub fn parse(raw: &str) -> Option<ServerStepName> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "STAKEHOLDER" => Some(Self::Stakeholder),
            "BUSINESS" => Some(Self::Business),
            "PAYMENT_METHODS" | "METHODS" => Some(Self::PaymentMethods),
            "DOCUMENTS" | "ID" => Some(Self::Documents),
            _ => None,
        }
    }

    /// Canonical wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stakeholder => "STAKEHOLDER",
            Self::Business => "BUSINESS",
            Self::PaymentMethods => "PAYMENT_METHODS",
            Self::Documents => "DOCUMENTS",
        }
    }

    /// The local step this server name maps to.
    pub fn step_key(self) -> StepKey {
        match self {
            Self::Stakeholder => StepKey::Stakeholder,
            Self::Business => StepKey::Business,
            Self::PaymentMethods => StepKey::Payment,
            Self::Documents => StepKey::Document,
        }
    }
}

impl std::fmt::Display for ServerStepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_is_index_order() {
        for (i, step) in StepKey::ALL.iter().enumerate() {
            assert_eq!(step.index(), i);
            assert_eq!(StepKey::from_index(i), Some(*step));
        }
        assert_eq!(StepKey::from_index(STEP_COUNT), None);
    }

    #[test]
    fn only_organization_is_mandatory() {
        assert!(StepKey::Organization.mandatory());
        for step in &StepKey::ALL[1..] {
            assert!(!step.mandatory(), "{step} should be skippable");
        }
    }

    #[test]
    fn server_mapping_is_bidirectional() {
        for step in &StepKey::ALL[1..] {
            let name = step.server_name().unwrap();
            assert_eq!(name.step_key(), *step);
            assert_eq!(ServerStepName::parse(name.as_str()), Some(name));
        }
        assert_eq!(StepKey::Organization.server_name(), None);
    }

    #[test]
    fn legacy_aliases_parse_to_canonical_names() {
        assert_eq!(
            ServerStepName::parse("METHODS"),
            Some(ServerStepName::PaymentMethods)
        );
        assert_eq!(ServerStepName::parse("ID"), Some(ServerStepName::Documents));
        // Aliases dedup with their canonical spelling, not as extra steps.
        assert_eq!(
            ServerStepName::parse("METHODS").map(ServerStepName::step_key),
            ServerStepName::parse("PAYMENT_METHODS").map(ServerStepName::step_key),
        );
    }

    #[test]
    fn unknown_names_are_ignored() {
        assert_eq!(ServerStepName::parse("ORGANIZATION"), None);
        assert_eq!(ServerStepName::parse(""), None);
        assert_eq!(ServerStepName::parse("garbage"), None);
    }

    #[test]
    fn display_matches_serde() {
        for step in StepKey::ALL {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(format!("\"{display}\""), json);
        }
    }
}
