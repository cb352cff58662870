use std::io;
use thiserror::Error;

/// Error type for the TribeGate SDK
#[derive(Debug, Error)]
pub enum SdkError {
    /// Credential missing, malformed, or rejected by the identity service
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Credential valid but insufficient privilege for the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced user or resource does not exist upstream
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport failure or unexpected identity-service response
    #[error("Network error: {0}")]
    Network(String),

    /// Local setup problem: missing builder input, catalog field, or
    /// reference to an undeclared scope
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Errors related to IO operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SdkError {
    /// True if the caller can recover by re-authenticating.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, SdkError::Unauthorized(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, SdkError::Forbidden(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SdkError::NotFound(_))
    }
}

/// Conversion from reqwest::Error to SdkError
impl From<reqwest::Error> for SdkError {
    fn from(error: reqwest::Error) -> Self {
        SdkError::Network(error.to_string())
    }
}

/// Conversion from serde_json::Error to SdkError
impl From<serde_json::Error> for SdkError {
    fn from(error: serde_json::Error) -> Self {
        SdkError::Serialization(error.to_string())
    }
}

/// Result type alias for operations that can result in an SdkError
pub type SdkResult<T> = Result<T, SdkError>;
