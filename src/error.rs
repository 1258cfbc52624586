//! Error types for the itinerary planner

use thiserror::Error;

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Required trip fields that may be missing from the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    EmptyDestination,
    NoInterestsSelected,
}

/// Trip form rejected by the preference validator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Destination and/or interests absent. Both are always checked.
    #[error("Missing required fields: {0:?}")]
    MissingRequiredFields(Vec<MissingField>),

    #[error("Budget must be a number of at least {minimum}, got {raw:?}")]
    BudgetTooLow { raw: String, minimum: f64 },
}

impl ValidationError {
    pub fn is_missing_required(&self) -> bool {
        matches!(self, ValidationError::MissingRequiredFields(_))
    }

    pub fn is_budget(&self) -> bool {
        matches!(self, ValidationError::BudgetTooLow { .. })
    }

    pub fn missing(&self) -> &[MissingField] {
        match self {
            ValidationError::MissingRequiredFields(fields) => fields,
            ValidationError::BudgetTooLow { .. } => &[],
        }
    }
}

/// Which stage of the generation request failed.
///
/// Kept for logs only; every kind is shown to the user as the same message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Transport,
    Api,
    EmptyResponse,
    /// Response text is not JSON at all
    Malformed,
    /// JSON, but missing or mistyped required plan fields
    SchemaMismatch,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Itinerary provider error ({kind:?}): {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transport, message)
    }

    pub fn api(status: u16, body: &str) -> Self {
        Self::new(ProviderErrorKind::Api, format!("status {}: {}", status, body))
    }

    /// Classify a serde_json failure on the response text
    pub fn from_parse(err: &serde_json::Error) -> Self {
        use serde_json::error::Category;

        let kind = match err.classify() {
            Category::Data => ProviderErrorKind::SchemaMismatch,
            Category::Syntax | Category::Eof | Category::Io => ProviderErrorKind::Malformed,
        };
        Self::new(kind, err.to_string())
    }
}

/// Shared itinerary link could not be turned back into a plan
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Share token is empty")]
    Empty,

    #[error("Share token is not valid base64: {0}")]
    Encoding(String),

    #[error("Share token does not hold a valid itinerary: {0}")]
    Payload(String),
}

/// Fatal startup misconfiguration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Missing required environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: String, value: String },
}

/// Demo login form errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    #[error("Name, email and password are all required")]
    MissingFields,

    #[error("Email address is not valid")]
    InvalidEmail,
}

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Login error: {0}")]
    Login(#[from] LoginError),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Localization error: {0}")]
    Localization(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
