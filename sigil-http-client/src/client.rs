//! Retrying signed HTTP client.

use tracing::{debug, error, info};

use crate::backoff::{RetryConfig, RetryState, backoff, delay_millis};
use crate::{
    HttpClientError, RequestExecutor, Response, Result, SignedClientConfig, SignedRequest,
    SignedRequestExecutor,
};
use sigil_signing::{EnvCredentials, RequestSigner};

/// Signed HTTP client that retries failed attempts with linear backoff.
///
/// Retries resend the identical request, so callers must only use this for
/// idempotent calls. Nothing here checks that.
#[derive(Debug, Clone)]
pub struct SignedHttpClient<E = SignedRequestExecutor> {
    executor: E,
    retry: RetryConfig,
}

impl SignedHttpClient<SignedRequestExecutor> {
    /// Create a client that signs with the given signer.
    pub fn new(signer: RequestSigner, config: SignedClientConfig) -> Result<Self> {
        let retry = config.retry;
        Ok(Self {
            executor: SignedRequestExecutor::new(signer, config)?,
            retry,
        })
    }

    /// Create a client with credentials from the standard environment variables.
    pub fn from_env(config: SignedClientConfig) -> Result<Self> {
        let signer = RequestSigner::from_provider(&EnvCredentials::new())?;
        Self::new(signer, config)
    }
}

impl<E: RequestExecutor> SignedHttpClient<E> {
    /// Wrap any executor with a retry budget.
    pub fn with_executor(executor: E, retry: RetryConfig) -> Self {
        Self { executor, retry }
    }

    /// Get the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Get the retry configuration.
    pub fn retry_config(&self) -> RetryConfig {
        self.retry
    }

    /// Send once, without retries.
    pub async fn request(&self, request: &SignedRequest) -> Result<Response> {
        self.executor.execute(request).await
    }

    /// Send, retrying up to the configured budget.
    pub async fn request_with_retries(&self, request: &SignedRequest) -> Result<Response> {
        self.request_with_retry_state(request, self.retry.state())
            .await
    }

    /// Send, retrying within the budget carried by `state`.
    ///
    /// Makes at most `max_retries + 1` attempts. Only
    /// [`HttpClientError::Request`] failures are retried; anything else is
    /// returned at once. When the budget runs out the last failure is
    /// returned inside [`HttpClientError::RetryExhausted`].
    pub async fn request_with_retry_state(
        &self,
        request: &SignedRequest,
        mut state: RetryState,
    ) -> Result<Response> {
        loop {
            debug!(
                phase = "attempting",
                attempt = state.attempts(),
                method = %request.method,
                url = %request.url,
                "Sending request"
            );

            let err = match self.executor.execute(request).await {
                Ok(response) => {
                    debug!(
                        phase = "succeeded",
                        attempt = state.attempts(),
                        status = %response.status_code(),
                        "Request succeeded"
                    );
                    return Ok(response);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => err,
            };

            if !state.record_failure() {
                error!(
                    phase = "exhausted",
                    attempts = state.attempts(),
                    error = %err,
                    "Request failed, retries exhausted"
                );
                return Err(HttpClientError::RetryExhausted {
                    attempts: state.attempts(),
                    source: Box::new(err),
                });
            }

            info!(
                "request failed with \"{}\" - retry {} / {}...",
                err.message(),
                state.retry_count(),
                state.max_retries()
            );
            info!(
                "response: {}",
                err.response_body()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "undefined".to_string())
            );

            let delay = backoff(state.retry_count(), state.base_delay()).await;
            debug!(
                phase = "backoff",
                delay_ms = delay_millis(delay),
                "Backoff elapsed"
            );
        }
    }
}
