//! Signing error types.

use thiserror::Error;

/// Result type for signing operations.
pub type Result<T> = std::result::Result<T, SigningError>;

/// Errors that can occur while signing a request.
///
/// None of these are transient: retrying the same input fails the same way.
#[derive(Debug, Error)]
pub enum SigningError {
    /// The request could not be signed as given (bad URL, bad header).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Signing key material is missing or unusable.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// The request body could not be serialized to JSON.
    #[error("Body serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The signature on a request did not match the recomputed one.
    #[error("Signature does not match")]
    SignatureMismatch,

    /// The signed timestamp is outside the accepted window.
    #[error("Request timestamp outside tolerance: {0}")]
    Expired(String),
}

impl SigningError {
    /// Create an invalid request error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a credentials error.
    pub fn credentials(message: impl Into<String>) -> Self {
        Self::Credentials(message.into())
    }
}

impl From<url::ParseError> for SigningError {
    fn from(err: url::ParseError) -> Self {
        SigningError::InvalidRequest(format!("malformed URL: {err}"))
    }
}
