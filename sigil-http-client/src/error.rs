//! HTTP Client error types.

use sigil_signing::SigningError;
use thiserror::Error;

use crate::ResponseBody;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The request could not be built or signed. Never retried.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Signing credentials are missing or unusable. Never retried.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Transport failure, timeout, or a status outside 2xx.
    #[error("Request failed: {message}")]
    Request {
        /// HTTP status code, when a response arrived.
        status: Option<u16>,
        /// Response body, when a response arrived.
        body: Option<ResponseBody>,
        /// What went wrong.
        message: String,
    },

    /// A response body did not have the expected shape.
    #[error("JSON error: {0}")]
    Json(String),

    /// Every attempt failed.
    #[error("Request failed after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The last failure.
        #[source]
        source: Box<HttpClientError>,
    },
}

impl HttpClientError {
    /// Create a request error with no response attached.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Request {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    /// Get the HTTP status code, looking through an exhausted retry.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            Self::RetryExhausted { source, .. } => source.status_code(),
            _ => None,
        }
    }

    /// Get the response body, looking through an exhausted retry.
    pub fn response_body(&self) -> Option<&ResponseBody> {
        match self {
            Self::Request { body, .. } => body.as_ref(),
            Self::RetryExhausted { source, .. } => source.response_body(),
            _ => None,
        }
    }

    /// Total attempts for an exhausted retry.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::RetryExhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Short description without the wrapping context.
    pub fn message(&self) -> String {
        match self {
            Self::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<SigningError> for HttpClientError {
    fn from(err: SigningError) -> Self {
        match err {
            SigningError::Credentials(msg) => Self::Credentials(msg),
            other => Self::InvalidRequest(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for HttpClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            return Self::InvalidRequest(err.to_string());
        }

        let message = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection error: {err}")
        } else {
            err.to_string()
        };
        Self::Request {
            status: err.status().map(|s| s.as_u16()),
            body: None,
            message,
        }
    }
}
