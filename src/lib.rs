//! PayDesk onboarding — merchant onboarding progress service for the
//! admin console.

pub mod api;
pub mod config;
pub mod error;
pub mod onboarding;
pub mod store;
