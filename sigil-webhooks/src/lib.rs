//! GitHub Webhook Verification for Sigil
//!
//! Authenticates incoming GitHub webhook deliveries with the shared secret.
//!
//! # Features
//!
//! - **Signature Generation**: HMAC-SHA256 in the `sha256=<hex>` header shape
//! - **Constant-Time Comparison**: Signature checks do not leak timing
//! - **Header Validation**: Checks the delivery headers GitHub always sends
//! - **Fail Closed**: Verification faults are logged and reported as `false`
//!
//! # Example: Verifying a Delivery
//!
//! ```rust
//! use std::collections::HashMap;
//! use sigil_webhooks::{WebhookVerifier, get_raw_body_signature};
//!
//! let body = br#"{"action":"opened"}"#;
//! let mut headers = HashMap::new();
//! headers.insert(
//!     "x-hub-signature-256".to_string(),
//!     get_raw_body_signature("your-secret-key", body),
//! );
//!
//! let verifier = WebhookVerifier::new("your-secret-key");
//! assert!(verifier.verify_raw(body, &headers));
//! ```
//!
//! # Example: Receiving a Delivery
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use sigil_webhooks::WebhookVerifier;
//!
//! # fn handle(body: &[u8], headers: HashMap<String, String>) -> sigil_webhooks::Result<()> {
//! let verifier = WebhookVerifier::new("your-secret-key");
//! let delivery = verifier.receive(body, &headers)?;
//! println!("{} from hook {}", delivery.event, delivery.hook_id);
//! # Ok(())
//! # }
//! ```

mod error;
pub mod headers;
mod signature;
mod verifier;

pub use error::WebhookError;
pub use headers::{REQUIRED_HEADERS, missing_headers, verify_github_headers_exist};
pub use signature::{
    SIGNATURE_PREFIX, compare_signatures, get_body_signature, get_raw_body_signature,
};
pub use verifier::{
    GithubDelivery, WebhookBody, WebhookVerificationRequest, WebhookVerifier,
    verify_github_payload,
};

/// Result type for webhook operations
pub type Result<T> = std::result::Result<T, WebhookError>;
