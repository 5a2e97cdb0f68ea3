//! Error types for webhook verification

use thiserror::Error;

/// Errors that can occur while verifying an incoming webhook
#[derive(Error, Debug)]
pub enum WebhookError {
    /// One or more required delivery headers are absent
    #[error("Missing required headers: {}", .0.join(", "))]
    MissingHeaders(Vec<String>),

    /// Signature missing from request
    #[error("Signature missing from request")]
    SignatureMissing,

    /// Signature does not match the payload
    #[error("Signature verification failed")]
    SignatureInvalid,

    /// Payload serialization/deserialization failed
    #[error("Payload error: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::Payload(err.to_string())
    }
}
