//! # Sigil Signing
//!
//! SigV4-style signing for requests sent to a regional API gateway.
//!
//! Only the subset needed to sign a JSON body against
//! host/path/method/region/service is implemented: no chunked payloads,
//! no presigned URLs, no S3 path rules.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use sigil_signing::{Credentials, RequestSigner, SigningParams};
//!
//! # fn main() -> Result<(), sigil_signing::SigningError> {
//! let signer = RequestSigner::new(Credentials::new("AKIDEXAMPLE", "secret"));
//!
//! let params = SigningParams::from_url(
//!     "POST",
//!     "https://abc123.execute-api.us-east-2.amazonaws.com/prod/deploy",
//!     BTreeMap::new(),
//!     Some(&serde_json::json!({"ref": "main"})),
//! )?;
//!
//! let headers = signer.sign(&params)?;
//! assert!(headers.authorization().is_some());
//! # Ok(())
//! # }
//! ```

pub mod canonical;
mod credentials;
mod error;
mod signer;
mod verify;

pub use credentials::{
    ACCESS_KEY_ID_VAR, Credentials, EnvCredentials, ProvideCredentials, SECRET_ACCESS_KEY_VAR,
    SESSION_TOKEN_VAR, StaticCredentials,
};
pub use error::{Result, SigningError};
pub use signer::{
    ALGORITHM, AMZ_DATE_FORMAT, DEFAULT_REGION, DEFAULT_SERVICE, RequestSigner, SignedHeaders,
    SigningParams, credential_scope, derive_signing_key, serialize_body, string_to_sign,
};
pub use verify::{ParsedAuthorization, parse_authorization, verify_signed_headers};
