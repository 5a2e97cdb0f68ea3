//! Signing credentials and the providers that resolve them.

use std::fmt;

use crate::{Result, SigningError};

/// Environment variable holding the access key ID.
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable holding the secret access key.
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
/// Environment variable holding the optional session token.
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";

/// Long-term or temporary signing credentials.
///
/// `Debug` redacts the secret and the session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl Credentials {
    /// Create long-term credentials.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token, making these temporary credentials.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// The access key ID.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret access key.
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// The session token, if these are temporary credentials.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Check that the key material is usable for signing.
    pub fn validate(&self) -> Result<()> {
        if self.access_key_id.trim().is_empty() {
            return Err(SigningError::credentials("access key ID is empty"));
        }
        if self.secret_access_key.trim().is_empty() {
            return Err(SigningError::credentials("secret access key is empty"));
        }
        if self
            .session_token
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            return Err(SigningError::credentials("session token is empty"));
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Source of signing credentials.
///
/// Resolution is explicit: a signer is built from whatever a provider returns,
/// it never reaches back into the provider while signing.
pub trait ProvideCredentials: Send + Sync {
    /// Resolve credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SigningError::Credentials`] when no usable credentials exist.
    fn provide_credentials(&self) -> Result<Credentials>;
}

/// Fixed, in-memory credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    credentials: Credentials,
}

impl StaticCredentials {
    /// Wrap a set of credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl ProvideCredentials for StaticCredentials {
    fn provide_credentials(&self) -> Result<Credentials> {
        self.credentials.validate()?;
        Ok(self.credentials.clone())
    }
}

/// Credentials read from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
/// `AWS_SESSION_TOKEN`.
#[derive(Debug, Clone, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    /// Create an environment credential provider.
    pub fn new() -> Self {
        Self
    }
}

impl ProvideCredentials for EnvCredentials {
    fn provide_credentials(&self) -> Result<Credentials> {
        let access_key_id = std::env::var(ACCESS_KEY_ID_VAR)
            .map_err(|_| SigningError::credentials(format!("{ACCESS_KEY_ID_VAR} is not set")))?;
        let secret_access_key = std::env::var(SECRET_ACCESS_KEY_VAR).map_err(|_| {
            SigningError::credentials(format!("{SECRET_ACCESS_KEY_VAR} is not set"))
        })?;

        let mut credentials = Credentials::new(access_key_id, secret_access_key);
        if let Ok(token) = std::env::var(SESSION_TOKEN_VAR)
            && !token.is_empty()
        {
            credentials = credentials.with_session_token(token);
        }

        credentials.validate()?;
        Ok(credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("AKIDEXAMPLE", "super-secret").with_session_token("tok");
        let printed = format!("{:?}", creds);

        assert!(printed.contains("AKIDEXAMPLE"));
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("tok\""));
    }

    #[test]
    fn test_validate_rejects_blank_key_material() {
        assert!(Credentials::new("", "secret").validate().is_err());
        assert!(Credentials::new("AKID", "  ").validate().is_err());
        assert!(
            Credentials::new("AKID", "secret")
                .with_session_token("")
                .validate()
                .is_err()
        );
        assert!(Credentials::new("AKID", "secret").validate().is_ok());
    }

    #[test]
    fn test_static_provider() {
        let provider = StaticCredentials::new(Credentials::new("AKID", "secret"));
        let creds = provider.provide_credentials().unwrap();
        assert_eq!(creds.access_key_id(), "AKID");
        assert_eq!(creds.session_token(), None);

        let empty = StaticCredentials::new(Credentials::new("", ""));
        assert!(matches!(
            empty.provide_credentials(),
            Err(SigningError::Credentials(_))
        ));
    }
}
