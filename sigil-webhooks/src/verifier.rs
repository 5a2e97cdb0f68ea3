//! Verification of incoming GitHub webhook deliveries

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::headers::{
    DELIVERY_HEADER, EVENT_HEADER, HOOK_ID_HEADER, SIGNATURE_HEADER, TARGET_TYPE_HEADER,
    missing_headers,
};
use crate::signature::{compare_signatures, get_body_signature, get_raw_body_signature};
use crate::{Result, WebhookError};

/// Body of a delivery, as handed to the verifier.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookBody {
    /// Exact bytes received. Verifies regardless of JSON formatting.
    Raw(Vec<u8>),
    /// An already-parsed body. Re-encoded as compact JSON before signing, so
    /// it only verifies when the sender signed compact JSON.
    Json(Value),
}

impl From<Value> for WebhookBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for WebhookBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Raw(bytes)
    }
}

impl From<&[u8]> for WebhookBody {
    fn from(bytes: &[u8]) -> Self {
        Self::Raw(bytes.to_vec())
    }
}

/// Everything needed to verify one delivery.
#[derive(Clone)]
pub struct WebhookVerificationRequest {
    /// Shared webhook secret.
    pub key: String,
    /// Delivery body.
    pub body: WebhookBody,
    /// Delivery headers with lowercase names.
    pub headers: HashMap<String, String>,
}

impl fmt::Debug for WebhookVerificationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookVerificationRequest")
            .field("key", &"<redacted>")
            .field("body", &self.body)
            .field("headers", &self.headers)
            .finish()
    }
}

/// Check a delivery's `x-hub-signature-256` header against its body.
///
/// Fails closed: any fault, including a missing signature header, is logged
/// and reported as `false`.
pub fn verify_github_payload(request: &WebhookVerificationRequest) -> bool {
    fail_closed(&request.key, &request.body, &request.headers)
}

fn fail_closed(key: &str, body: &WebhookBody, headers: &HashMap<String, String>) -> bool {
    match check_signature(key, body, headers) {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "Webhook signature rejected");
            false
        }
    }
}

fn check_signature(key: &str, body: &WebhookBody, headers: &HashMap<String, String>) -> Result<()> {
    let received = headers
        .get(SIGNATURE_HEADER)
        .ok_or(WebhookError::SignatureMissing)?;

    let expected = match body {
        WebhookBody::Raw(bytes) => get_raw_body_signature(key, bytes),
        WebhookBody::Json(value) => get_body_signature(key, value)?,
    };

    if compare_signatures(received, &expected) {
        Ok(())
    } else {
        Err(WebhookError::SignatureInvalid)
    }
}

/// Metadata and payload of a verified delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubDelivery {
    /// Value of `x-github-event`.
    pub event: String,
    /// Value of `x-github-hook-id`.
    pub hook_id: String,
    /// Value of `x-github-hook-installation-target-type`.
    pub target_type: String,
    /// Value of `x-github-delivery`, when sent.
    pub delivery: Option<String>,
    /// Parsed JSON body.
    pub payload: Value,
}

/// Verifier for deliveries signed with one webhook secret.
#[derive(Clone)]
pub struct WebhookVerifier {
    key: String,
}

impl fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl WebhookVerifier {
    /// Create a verifier with the given secret
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Verify a body against the signature header. Never errors.
    pub fn verify(&self, body: &WebhookBody, headers: &HashMap<String, String>) -> bool {
        fail_closed(&self.key, body, headers)
    }

    /// Verify the exact bytes received.
    pub fn verify_raw(&self, body: &[u8], headers: &HashMap<String, String>) -> bool {
        self.verify(&WebhookBody::Raw(body.to_vec()), headers)
    }

    /// Check headers, verify the raw body, and parse the delivery.
    ///
    /// # Errors
    ///
    /// [`WebhookError::MissingHeaders`] lists every absent required header.
    /// [`WebhookError::SignatureInvalid`] when the body does not match.
    /// [`WebhookError::Payload`] when a verified body is not JSON.
    pub fn receive(&self, body: &[u8], headers: &HashMap<String, String>) -> Result<GithubDelivery> {
        let missing = missing_headers(headers);
        if !missing.is_empty() {
            warn!(missing = ?missing, "Webhook delivery missing headers");
            return Err(WebhookError::MissingHeaders(
                missing.into_iter().map(String::from).collect(),
            ));
        }

        if let Err(err) = check_signature(&self.key, &WebhookBody::Raw(body.to_vec()), headers) {
            warn!(error = %err, "Webhook signature rejected");
            return Err(err);
        }

        let header = |name: &str| headers.get(name).cloned().unwrap_or_default();
        let delivery = GithubDelivery {
            event: header(EVENT_HEADER),
            hook_id: header(HOOK_ID_HEADER),
            target_type: header(TARGET_TYPE_HEADER),
            delivery: headers.get(DELIVERY_HEADER).cloned(),
            payload: serde_json::from_slice(body)?,
        };

        debug!(
            event = %delivery.event,
            hook_id = %delivery.hook_id,
            "Webhook delivery verified"
        );
        Ok(delivery)
    }
}
