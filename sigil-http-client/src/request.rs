//! Outbound request description.

use std::collections::BTreeMap;

use http::Method;
use serde_json::Value;

/// A request to sign and send.
///
/// Built fresh for each logical call; every retry reuses it unchanged.
/// `region` and `service` fall back to the client configuration when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    /// Absolute URL.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// JSON body. `None` is sent as `{}`.
    pub body: Option<Value>,
    /// Extra headers, signed along with the request.
    pub headers: BTreeMap<String, String>,
    /// Signing region override.
    pub region: Option<String>,
    /// Signing service override.
    pub service: Option<String>,
}

impl SignedRequest {
    /// Create a request with no body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            body: None,
            headers: BTreeMap::new(),
            region: None,
            service: None,
        }
    }

    /// Create a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Create a POST request.
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Create a PUT request.
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    /// Create a PATCH request.
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    /// Create a DELETE request.
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    /// Set the JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sign for a specific region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Sign for a specific service.
    pub fn service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }
}
