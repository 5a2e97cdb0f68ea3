//! SigV4-style request signing.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use crate::canonical::{canonical_headers, canonical_request, signed_header_names};
use crate::{Credentials, ProvideCredentials, Result, SigningError};

type HmacSha256 = Hmac<Sha256>;

/// The only supported signing algorithm.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Region used when the caller does not name one.
pub const DEFAULT_REGION: &str = "us-east-2";

/// Service used when the caller does not name one.
pub const DEFAULT_SERVICE: &str = "execute-api";

/// Timestamp format of the `X-Amz-Date` header.
pub const AMZ_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

const DATE_FORMAT: &str = "%Y%m%d";

/// Header names written by the signer. Caller values for these are replaced.
const SIGNER_OWNED_HEADERS: &[&str] = &[
    "authorization",
    "host",
    "x-amz-date",
    "x-amz-security-token",
];

/// Inputs to a signature.
///
/// `path` is the URL path plus `?query` when present, never the full URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningParams {
    /// HTTP method, e.g. `POST`.
    pub method: String,
    /// Host, including a non-default port.
    pub host: String,
    /// Path and query string.
    pub path: String,
    /// Caller headers to send and sign.
    pub headers: BTreeMap<String, String>,
    /// Serialized request body.
    pub body: String,
    /// Signing region.
    pub region: String,
    /// Signing service.
    pub service: String,
}

impl SigningParams {
    /// Build signing parameters from an absolute URL and a JSON body.
    ///
    /// Uses [`DEFAULT_REGION`] and [`DEFAULT_SERVICE`]; override them with
    /// [`with_region`](Self::with_region) and [`with_service`](Self::with_service).
    ///
    /// # Errors
    ///
    /// [`SigningError::InvalidRequest`] for a malformed or relative URL, a
    /// non-HTTP scheme, or a URL without a host. [`SigningError::Serialization`]
    /// when the body cannot be encoded.
    pub fn from_url(
        method: &str,
        url: &str,
        headers: BTreeMap<String, String>,
        body: Option<&Value>,
    ) -> Result<Self> {
        let parsed = Url::parse(url)?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SigningError::invalid(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| SigningError::invalid(format!("URL has no host: {url}")))?;
        let host = match parsed.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        let mut path = parsed.path().to_string();
        if let Some(query) = parsed.query() {
            path.push('?');
            path.push_str(query);
        }

        Ok(Self {
            method: method.to_uppercase(),
            host,
            path,
            headers,
            body: serialize_body(body)?,
            region: DEFAULT_REGION.to_string(),
            service: DEFAULT_SERVICE.to_string(),
        })
    }

    /// Set the signing region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set the signing service.
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.method.is_empty() || !self.method.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(SigningError::invalid(format!(
                "invalid HTTP method: {:?}",
                self.method
            )));
        }
        if self.host.is_empty() {
            return Err(SigningError::invalid("host is empty"));
        }
        if self.region.is_empty() || self.service.is_empty() {
            return Err(SigningError::invalid("region and service must be set"));
        }
        for (name, value) in &self.headers {
            let bad_name = name.is_empty()
                || name
                    .bytes()
                    .any(|b| b.is_ascii_whitespace() || b == b':' || b.is_ascii_control());
            if bad_name {
                return Err(SigningError::invalid(format!("invalid header name: {name:?}")));
            }
            if value.bytes().any(|b| b == b'\r' || b == b'\n') {
                return Err(SigningError::invalid(format!(
                    "header {name} contains a line break"
                )));
            }
        }
        Ok(())
    }
}

/// Serialize a request body the way the signer expects.
///
/// A missing or `null` body becomes `{}`, never an empty string.
pub fn serialize_body(body: Option<&Value>) -> Result<String> {
    match body {
        None | Some(Value::Null) => Ok("{}".to_string()),
        Some(value) => Ok(serde_json::to_string(value)?),
    }
}

/// Header set produced by signing, ready to attach to the request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignedHeaders {
    headers: BTreeMap<String, String>,
}

impl SignedHeaders {
    /// Look a header up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `Authorization` header.
    pub fn authorization(&self) -> Option<&str> {
        self.get("authorization")
    }

    /// The `X-Amz-Date` header.
    pub fn amz_date(&self) -> Option<&str> {
        self.get("x-amz-date")
    }

    /// The `X-Amz-Security-Token` header, present for temporary credentials.
    pub fn security_token(&self) -> Option<&str> {
        self.get("x-amz-security-token")
    }

    /// The hex signature carried in the `Authorization` header.
    pub fn signature(&self) -> Option<&str> {
        self.authorization()
            .and_then(|auth| auth.rsplit_once("Signature="))
            .map(|(_, sig)| sig.trim())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Whether there are no headers.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Consume into the underlying map.
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.headers
    }
}

impl From<BTreeMap<String, String>> for SignedHeaders {
    fn from(headers: BTreeMap<String, String>) -> Self {
        Self { headers }
    }
}

/// Signs requests with a fixed set of credentials.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    /// Create a signer. Credentials are checked when signing.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Resolve credentials from a provider and build a signer.
    pub fn from_provider(provider: &dyn ProvideCredentials) -> Result<Self> {
        Ok(Self::new(provider.provide_credentials()?))
    }

    /// The credentials this signer uses.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign at the current time.
    pub fn sign(&self, params: &SigningParams) -> Result<SignedHeaders> {
        self.sign_at(params, Utc::now())
    }

    /// Sign at a fixed time. Identical inputs give identical output.
    ///
    /// # Errors
    ///
    /// [`SigningError::Credentials`] for unusable credentials and
    /// [`SigningError::InvalidRequest`] for a bad method, host or header.
    pub fn sign_at(&self, params: &SigningParams, now: DateTime<Utc>) -> Result<SignedHeaders> {
        self.credentials.validate()?;
        params.validate()?;

        let amz_date = now.format(AMZ_DATE_FORMAT).to_string();
        let date = now.format(DATE_FORMAT).to_string();

        let mut headers: BTreeMap<String, String> = params
            .headers
            .iter()
            .filter(|(k, _)| !SIGNER_OWNED_HEADERS.contains(&k.to_lowercase().as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        headers.insert("Host".to_string(), params.host.clone());
        headers.insert("X-Amz-Date".to_string(), amz_date.clone());
        if let Some(token) = self.credentials.session_token() {
            headers.insert("X-Amz-Security-Token".to_string(), token.to_string());
        }

        let canonical = canonical_request(
            &params.method,
            &params.path,
            &headers,
            &params.body,
            &params.service,
        );
        let scope = credential_scope(&date, &params.region, &params.service);
        let to_sign = string_to_sign(&amz_date, &scope, &canonical);
        let signing_key = derive_signing_key(
            self.credentials.secret_access_key(),
            &date,
            &params.region,
            &params.service,
        )?;
        let signature = hex::encode(hmac_sha256(&signing_key, to_sign.as_bytes())?);
        let signed_names = signed_header_names(&canonical_headers(&headers));

        debug!(
            method = %params.method,
            host = %params.host,
            path = %params.path,
            region = %params.region,
            service = %params.service,
            signed_headers = %signed_names,
            "Signed request"
        );

        headers.insert(
            "Authorization".to_string(),
            format!(
                "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_names}, Signature={signature}",
                self.credentials.access_key_id()
            ),
        );

        Ok(SignedHeaders { headers })
    }
}

/// `{date}/{region}/{service}/aws4_request`
pub fn credential_scope(date: &str, region: &str, service: &str) -> String {
    format!("{date}/{region}/{service}/aws4_request")
}

/// Build the string to sign from a canonical request.
pub fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
    format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        hex::encode(Sha256::digest(canonical_request.as_bytes()))
    )
}

/// Derive the signing key.
///
/// ```text
/// DateKey              = HMAC-SHA256("AWS4" + secret, date)
/// DateRegionKey        = HMAC-SHA256(DateKey, region)
/// DateRegionServiceKey = HMAC-SHA256(DateRegionKey, service)
/// SigningKey           = HMAC-SHA256(DateRegionServiceKey, "aws4_request")
/// ```
pub fn derive_signing_key(secret: &str, date: &str, region: &str, service: &str) -> Result<Vec<u8>> {
    let date_key = hmac_sha256(format!("AWS4{secret}").as_bytes(), date.as_bytes())?;
    let region_key = hmac_sha256(&date_key, region.as_bytes())?;
    let service_key = hmac_sha256(&region_key, service.as_bytes())?;
    hmac_sha256(&service_key, b"aws4_request")
}

pub(crate) fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| SigningError::credentials(format!("unusable signing key: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}
