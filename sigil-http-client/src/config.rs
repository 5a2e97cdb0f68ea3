//! HTTP client configuration.

use std::time::Duration;

use sigil_signing::{DEFAULT_REGION, DEFAULT_SERVICE};

use crate::backoff::RetryConfig;
use crate::context::WorkflowContext;

/// Per-attempt timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Signed HTTP client configuration.
#[derive(Debug, Clone)]
pub struct SignedClientConfig {
    /// Region used when a request does not name one.
    pub region: String,
    /// Service used when a request does not name one.
    pub service: String,
    /// Timeout for a single attempt.
    pub timeout: Duration,
    /// Retry budget and base delay.
    pub retry: RetryConfig,
    /// Headers added to every request before signing.
    pub default_headers: Vec<(String, String)>,
    /// Workflow identifiers sent with every request.
    pub workflow: Option<WorkflowContext>,
    /// User agent string. Not signed.
    pub user_agent: String,
}

impl Default for SignedClientConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryConfig::default(),
            default_headers: Vec::new(),
            workflow: None,
            user_agent: format!("sigil-http-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SignedClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SignedClientConfigBuilder {
        SignedClientConfigBuilder::default()
    }
}

/// Builder for [`SignedClientConfig`].
#[derive(Debug, Default)]
pub struct SignedClientConfigBuilder {
    config: SignedClientConfig,
}

impl SignedClientConfigBuilder {
    /// Set the default region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    /// Set the default service.
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.config.service = service.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the number of retries after the first attempt.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    /// Set the backoff base delay.
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.config.retry.base_delay = base_delay;
        self
    }

    /// Add a header to every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Forward workflow identifiers with every request.
    pub fn workflow(mut self, context: WorkflowContext) -> Self {
        self.config.workflow = Some(context);
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> SignedClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SignedClientConfig::default();
        assert_eq!(config.region, "us-east-2");
        assert_eq!(config.service, "execute-api");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.base_delay, Duration::from_millis(1000));
        assert!(config.workflow.is_none());
    }

    #[test]
    fn test_builder() {
        let config = SignedClientConfig::builder()
            .region("eu-west-1")
            .max_retries(5)
            .base_delay(Duration::from_millis(10))
            .default_header("x-team", "platform")
            .workflow(WorkflowContext::new("octo/repo", "run"))
            .build();

        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.retry, RetryConfig::new(5, Duration::from_millis(10)));
        assert_eq!(config.default_headers.len(), 1);
        assert!(config.workflow.is_some());
    }
}
