//! # Sigil HTTP Client
//!
//! Sends SigV4-signed JSON requests to a regional API gateway and retries
//! failed attempts with a linear backoff.
//!
//! ## Features
//!
//! - **Signing**: Every attempt is freshly signed with [`sigil_signing`]
//! - **Timeouts**: A fixed per-attempt timeout (3 seconds by default)
//! - **Retry with Backoff**: `(1 + n) * 2 * base_delay` before retry `n`
//! - **Workflow Headers**: Optional repository/run identifiers on every call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sigil_http_client::{SignedClientConfig, SignedHttpClient, SignedRequest};
//! use sigil_signing::{Credentials, RequestSigner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let signer = RequestSigner::new(Credentials::new("AKIDEXAMPLE", "secret"));
//!     let client = SignedHttpClient::new(signer, SignedClientConfig::default())?;
//!
//!     let request = SignedRequest::post("https://abc123.execute-api.us-east-2.amazonaws.com/prod/deploy")
//!         .json(serde_json::json!({"ref": "main"}));
//!
//!     let response = client.request_with_retries(&request).await?;
//!     println!("Status: {}", response.status_code());
//!     Ok(())
//! }
//! ```

pub mod backoff;
mod client;
mod config;
mod context;
mod error;
mod executor;
mod request;
mod response;

pub use backoff::{RetryConfig, RetryState, backoff_delay};
pub use client::SignedHttpClient;
pub use config::{DEFAULT_TIMEOUT, SignedClientConfig, SignedClientConfigBuilder};
pub use context::{CONTEXT_HEADER, WORKFLOW_HEADER, WorkflowContext};
pub use error::{HttpClientError, Result};
pub use executor::{RequestExecutor, SignedRequestExecutor};
pub use request::SignedRequest;
pub use response::{Response, ResponseBody};

// Re-export common types
pub use http::{HeaderMap, Method, StatusCode};

/// Prelude for common imports.
///
/// ```
/// use sigil_http_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::{RetryConfig, RetryState};
    pub use crate::client::SignedHttpClient;
    pub use crate::config::{SignedClientConfig, SignedClientConfigBuilder};
    pub use crate::context::WorkflowContext;
    pub use crate::error::{HttpClientError, Result};
    pub use crate::executor::{RequestExecutor, SignedRequestExecutor};
    pub use crate::request::SignedRequest;
    pub use crate::response::{Response, ResponseBody};
    pub use http::Method;
}
