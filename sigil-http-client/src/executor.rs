//! Single-shot signed request execution.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use sigil_signing::{RequestSigner, SigningParams};
use tracing::debug;

use crate::{HttpClientError, Response, Result, SignedClientConfig, SignedRequest};

/// Runs one attempt of a request.
///
/// The retrying client drives attempts through this trait, so any transport
/// that signs and sends can stand in for [`SignedRequestExecutor`].
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Perform exactly one attempt.
    async fn execute(&self, request: &SignedRequest) -> Result<Response>;
}

#[async_trait]
impl<T: RequestExecutor + ?Sized> RequestExecutor for Arc<T> {
    async fn execute(&self, request: &SignedRequest) -> Result<Response> {
        (**self).execute(request).await
    }
}

/// Signs a request and sends it once, with a per-attempt timeout.
#[derive(Debug, Clone)]
pub struct SignedRequestExecutor {
    inner: reqwest::Client,
    signer: RequestSigner,
    config: Arc<SignedClientConfig>,
}

impl SignedRequestExecutor {
    /// Create an executor. Each executor owns its own connection pool.
    pub fn new(signer: RequestSigner, config: SignedClientConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| HttpClientError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            signer,
            config: Arc::new(config),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &SignedClientConfig {
        &self.config
    }

    /// Get the signer.
    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Assemble the signing inputs for a request.
    ///
    /// Header precedence, lowest first: configured defaults,
    /// `Content-Type: application/json`, workflow identifiers, request headers.
    pub fn signing_params(&self, request: &SignedRequest) -> Result<SigningParams> {
        let mut headers = BTreeMap::new();
        for (name, value) in &self.config.default_headers {
            insert_header(&mut headers, name, value);
        }
        insert_header(&mut headers, "Content-Type", "application/json");
        if let Some(workflow) = &self.config.workflow {
            for (name, value) in workflow.headers() {
                insert_header(&mut headers, name, value);
            }
        }
        for (name, value) in &request.headers {
            insert_header(&mut headers, name, value);
        }

        let params = SigningParams::from_url(
            request.method.as_str(),
            &request.url,
            headers,
            request.body.as_ref(),
        )?
        .with_region(request.region.as_deref().unwrap_or(&self.config.region))
        .with_service(request.service.as_deref().unwrap_or(&self.config.service));

        Ok(params)
    }

    /// Sign and send the request once.
    ///
    /// # Errors
    ///
    /// Signing problems surface as [`HttpClientError::InvalidRequest`] or
    /// [`HttpClientError::Credentials`]. Transport failures, timeouts and
    /// non-2xx statuses surface as [`HttpClientError::Request`].
    pub async fn execute_once(&self, request: &SignedRequest) -> Result<Response> {
        let params = self.signing_params(request)?;
        let signed = self.signer.sign(&params)?;

        debug!(
            method = %request.method,
            url = %request.url,
            region = %params.region,
            service = %params.service,
            "Sending signed request"
        );

        let mut builder = self.inner.request(request.method.clone(), &request.url);
        for (name, value) in signed.iter() {
            builder = builder.header(name, value);
        }

        let response = builder.body(params.body).send().await?;
        Response::from_reqwest(response).await
    }
}

#[async_trait]
impl RequestExecutor for SignedRequestExecutor {
    async fn execute(&self, request: &SignedRequest) -> Result<Response> {
        self.execute_once(request).await
    }
}

/// Insert a header, replacing any existing entry that differs only in case.
fn insert_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}
