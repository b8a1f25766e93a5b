//! Error types for the onboarding service.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Payments API error: {0}")]
    Api(#[from] ApiError),

    #[error("Onboarding error: {0}")]
    Onboarding(#[from] OnboardingError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Key-value store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Remote payments API errors. All of these are retryable from the
/// caller's point of view: the wizard keeps its last-known step.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Remote rejected {endpoint} with status {status}: {body}")]
    RemoteRejected {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Authentication failed for {endpoint}")]
    AuthFailed { endpoint: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

/// Wizard precondition and navigation errors.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    /// Steps past the first are gated on an organization record existing.
    #[error("An organization must be created before continuing")]
    OrganizationRequired,

    /// The mount-time load has not finished; gating decisions are not
    /// trustworthy yet.
    #[error("Onboarding progress is still loading")]
    NotInitialized,
}

/// Session credential errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The bounded poll exhausted its attempt budget. The user needs to
    /// log in again.
    #[error("Session credentials unavailable after {attempts} attempts")]
    CredentialsUnavailable { attempts: u32 },

    #[error("Stored session credentials are malformed: {0}")]
    Malformed(String),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
