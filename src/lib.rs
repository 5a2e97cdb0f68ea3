// Sigil - signed requests to regional API gateways and verified GitHub webhooks
//
// This library bundles the signing, HTTP client and webhook crates behind
// feature flags, plus shared configuration and logging setup.

// Re-export optional crates
#[cfg(feature = "signing")]
pub use sigil_signing;

#[cfg(feature = "http-client")]
pub use sigil_http_client;

#[cfg(feature = "webhooks")]
pub use sigil_webhooks;

#[cfg(feature = "http-client")]
pub mod config;

pub mod logging;

pub use logging::{init_tracing, init_tracing_with_level};

// Prelude for common imports
pub mod prelude {
    #[cfg(feature = "http-client")]
    pub use crate::config::{ConfigError, SigilConfig};

    #[cfg(feature = "signing")]
    pub use sigil_signing::{
        Credentials, EnvCredentials, ProvideCredentials, RequestSigner, SignedHeaders,
        SigningError, SigningParams, StaticCredentials,
    };

    #[cfg(feature = "http-client")]
    pub use sigil_http_client::{
        HttpClientError, RetryConfig, SignedClientConfig, SignedHttpClient, SignedRequest,
        WorkflowContext,
    };

    #[cfg(feature = "webhooks")]
    pub use sigil_webhooks::{
        GithubDelivery, WebhookBody, WebhookError, WebhookVerificationRequest, WebhookVerifier,
        verify_github_headers_exist, verify_github_payload,
    };
}
