//! Server-side check of a signed request.
//!
//! Recomputes the signature from the headers that were actually transmitted
//! and compares it in constant time. Used to validate signer output without a
//! live gateway.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::canonical_request;
use crate::signer::{
    ALGORITHM, AMZ_DATE_FORMAT, derive_signing_key, hmac_sha256, string_to_sign,
};
use crate::{Credentials, Result, SignedHeaders, SigningError, SigningParams};

/// Parsed `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthorization {
    /// Access key ID from the credential scope.
    pub access_key_id: String,
    /// Scope date, `YYYYMMDD`.
    pub date: String,
    /// Scope region.
    pub region: String,
    /// Scope service.
    pub service: String,
    /// Lowercase names of the signed headers.
    pub signed_headers: Vec<String>,
    /// Hex signature.
    pub signature: String,
}

/// Parse an `AWS4-HMAC-SHA256 Credential=…, SignedHeaders=…, Signature=…` header.
pub fn parse_authorization(header: &str) -> Result<ParsedAuthorization> {
    let rest = header
        .strip_prefix(ALGORITHM)
        .ok_or_else(|| SigningError::invalid("unsupported authorization algorithm"))?
        .trim();

    let mut credential = None;
    let mut signed_headers = None;
    let mut signature = None;

    for part in rest.split(',') {
        match part.trim().split_once('=') {
            Some(("Credential", v)) => credential = Some(v),
            Some(("SignedHeaders", v)) => signed_headers = Some(v),
            Some(("Signature", v)) => signature = Some(v),
            _ => {}
        }
    }

    let (Some(credential), Some(signed_headers), Some(signature)) =
        (credential, signed_headers, signature)
    else {
        return Err(SigningError::invalid("incomplete authorization header"));
    };

    let scope: Vec<&str> = credential.split('/').collect();
    let [access_key_id, date, region, service, "aws4_request"] = scope.as_slice() else {
        return Err(SigningError::invalid("malformed credential scope"));
    };

    Ok(ParsedAuthorization {
        access_key_id: (*access_key_id).to_string(),
        date: (*date).to_string(),
        region: (*region).to_string(),
        service: (*service).to_string(),
        signed_headers: signed_headers.split(';').map(str::to_string).collect(),
        signature: signature.to_string(),
    })
}

/// Verify transmitted headers against the request they were attached to.
///
/// `params` supplies method, path and body; its own headers are ignored in
/// favour of `headers`. The signed timestamp must be within `tolerance` of
/// `now`.
pub fn verify_signed_headers(
    params: &SigningParams,
    headers: &SignedHeaders,
    credentials: &Credentials,
    now: DateTime<Utc>,
    tolerance: Duration,
) -> Result<()> {
    let auth = parse_authorization(
        headers
            .authorization()
            .ok_or_else(|| SigningError::invalid("missing authorization header"))?,
    )?;

    if auth.access_key_id != credentials.access_key_id() {
        return Err(SigningError::credentials("unknown access key"));
    }

    let amz_date = headers
        .amz_date()
        .ok_or_else(|| SigningError::invalid("missing x-amz-date header"))?;
    let signed_at = NaiveDateTime::parse_from_str(amz_date, AMZ_DATE_FORMAT)
        .map_err(|e| SigningError::invalid(format!("bad x-amz-date: {e}")))?
        .and_utc();

    let skew = (now - signed_at).abs();
    if skew > tolerance {
        return Err(SigningError::Expired(format!(
            "signed {}s away from now, tolerance {}s",
            skew.num_seconds(),
            tolerance.num_seconds()
        )));
    }

    let mut covered = BTreeMap::new();
    for name in &auth.signed_headers {
        let value = headers
            .get(name)
            .ok_or_else(|| SigningError::invalid(format!("signed header {name} not sent")))?;
        covered.insert(name.clone(), value.to_string());
    }

    let canonical = canonical_request(
        &params.method,
        &params.path,
        &covered,
        &params.body,
        &auth.service,
    );
    let scope = format!(
        "{}/{}/{}/aws4_request",
        auth.date, auth.region, auth.service
    );
    let to_sign = string_to_sign(amz_date, &scope, &canonical);
    let key = derive_signing_key(
        credentials.secret_access_key(),
        &auth.date,
        &auth.region,
        &auth.service,
    )?;
    let expected = hex::encode(hmac_sha256(&key, to_sign.as_bytes())?);

    if expected.as_bytes().ct_eq(auth.signature.as_bytes()).into() {
        debug!(access_key_id = %auth.access_key_id, "Signature verified");
        Ok(())
    } else {
        debug!(access_key_id = %auth.access_key_id, "Signature mismatch");
        Err(SigningError::SignatureMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestSigner;
    use chrono::TimeZone;
    use serde_json::json;

    fn creds() -> Credentials {
        Credentials::new("AKIDEXAMPLE", "secret-key")
    }

    fn params() -> SigningParams {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("x-github-context".to_string(), "octo/repo".to_string());
        SigningParams::from_url(
            "PUT",
            "https://gw.example.com/prod/items?id=7",
            headers,
            Some(&json!({"name": "test"})),
        )
        .unwrap()
        .with_region("us-west-2")
    }

    #[test]
    fn test_parse_authorization() {
        let parsed = parse_authorization(
            "AWS4-HMAC-SHA256 Credential=AKID/20240101/us-east-2/execute-api/aws4_request, \
             SignedHeaders=host;x-amz-date, Signature=abcdef",
        )
        .unwrap();

        assert_eq!(parsed.access_key_id, "AKID");
        assert_eq!(parsed.date, "20240101");
        assert_eq!(parsed.region, "us-east-2");
        assert_eq!(parsed.service, "execute-api");
        assert_eq!(parsed.signed_headers, vec!["host", "x-amz-date"]);
        assert_eq!(parsed.signature, "abcdef");
    }

    #[test]
    fn test_parse_authorization_rejects_garbage() {
        assert!(parse_authorization("Bearer token").is_err());
        assert!(parse_authorization("AWS4-HMAC-SHA256 Credential=AKID/2024").is_err());
        assert!(
            parse_authorization(
                "AWS4-HMAC-SHA256 Credential=AKID/20240101/r/s/other, SignedHeaders=host, Signature=a"
            )
            .is_err()
        );
    }

    #[test]
    fn test_signatures_vary_with_time_and_both_verify() {
        let signer = RequestSigner::new(creds());
        let t1 = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let t2 = t1 + Duration::seconds(90);

        let first = signer.sign_at(&params(), t1).unwrap();
        let second = signer.sign_at(&params(), t2).unwrap();
        assert_ne!(first.signature(), second.signature());

        let tolerance = Duration::minutes(5);
        let now = t2 + Duration::seconds(30);
        verify_signed_headers(&params(), &first, &creds(), now, tolerance).unwrap();
        verify_signed_headers(&params(), &second, &creds(), now, tolerance).unwrap();
    }

    #[test]
    fn test_verify_rejects_outside_tolerance() {
        let signer = RequestSigner::new(creds());
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let signed = signer.sign_at(&params(), t).unwrap();

        let result = verify_signed_headers(
            &params(),
            &signed,
            &creds(),
            t + Duration::minutes(16),
            Duration::minutes(15),
        );
        assert!(matches!(result, Err(SigningError::Expired(_))));
    }

    #[test]
    fn test_verify_rejects_tampering() {
        let signer = RequestSigner::new(creds());
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let signed = signer.sign_at(&params(), t).unwrap();
        let tolerance = Duration::minutes(5);

        let mut other_body = params();
        other_body.body = r#"{"name":"evil"}"#.to_string();
        assert!(matches!(
            verify_signed_headers(&other_body, &signed, &creds(), t, tolerance),
            Err(SigningError::SignatureMismatch)
        ));

        let mut other_path = params();
        other_path.path = "/prod/items?id=8".to_string();
        assert!(matches!(
            verify_signed_headers(&other_path, &signed, &creds(), t, tolerance),
            Err(SigningError::SignatureMismatch)
        ));

        let mut headers = signed.clone().into_map();
        headers.insert("x-github-context".to_string(), "evil/repo".to_string());
        assert!(matches!(
            verify_signed_headers(&params(), &headers.into(), &creds(), t, tolerance),
            Err(SigningError::SignatureMismatch)
        ));

        let wrong_secret = Credentials::new("AKIDEXAMPLE", "other-secret");
        assert!(matches!(
            verify_signed_headers(&params(), &signed, &wrong_secret, t, tolerance),
            Err(SigningError::SignatureMismatch)
        ));
    }
}
