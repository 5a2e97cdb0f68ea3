//! Webhook signature generation and comparison

use crate::Result;
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Prefix GitHub puts in front of the hex digest in `x-hub-signature-256`.
pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Sign the JSON encoding of `body`.
///
/// Object keys keep their insertion order, so a body parsed from a delivery
/// re-encodes to the same compact text GitHub signed, as long as the sender
/// used compact JSON.
pub fn get_body_signature<T: Serialize + ?Sized>(key: &str, body: &T) -> Result<String> {
    let encoded = serde_json::to_string(body)?;
    Ok(get_raw_body_signature(key, encoded.as_bytes()))
}

/// Sign the exact bytes of a delivery body.
pub fn get_raw_body_signature(key: &str, body: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).expect("HMAC can take any size key");
    mac.update(body);
    format!("{SIGNATURE_PREFIX}{}", hex::encode(mac.finalize().into_bytes()))
}

/// Compare two signatures in constant time.
///
/// Signatures of different lengths never match.
pub fn compare_signatures(signature: &str, comparison: &str) -> bool {
    signature.as_bytes().ct_eq(comparison.as_bytes()).into()
}
