//! HTTP response wrapper.

use std::fmt;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{HttpClientError, Result};

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Parsed JSON, for JSON content types.
    Json(Value),
    /// Anything else, decoded lossily as UTF-8.
    Text(String),
    /// No body.
    Empty,
}

impl ResponseBody {
    /// Decode raw bytes according to the content type.
    ///
    /// A JSON content type with an unparsable body falls back to text.
    pub fn decode(content_type: Option<&str>, bytes: &[u8]) -> Self {
        if bytes.is_empty() {
            return Self::Empty;
        }

        if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
            && let Ok(value) = serde_json::from_slice(bytes)
        {
            return Self::Json(value);
        }

        Self::Text(String::from_utf8_lossy(bytes).into_owned())
    }

    /// The JSON value, if this body is JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Whether there is no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => write!(f, "{text:?}"),
            Self::Empty => write!(f, "null"),
        }
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct Response {
    status_code: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl Response {
    /// Assemble a response from its parts.
    pub fn new(status_code: StatusCode, headers: HeaderMap, body: ResponseBody) -> Self {
        Self {
            status_code,
            headers,
            body,
        }
    }

    /// Read a reqwest response to completion.
    ///
    /// Returns the response for 2xx statuses and a
    /// [`HttpClientError::Request`] carrying status and body otherwise.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> Result<Self> {
        let status_code = response.status();
        let headers = response.headers().clone();
        let bytes: Bytes = response.bytes().await?;

        let content_type = headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        let body = ResponseBody::decode(content_type, &bytes);

        if !status_code.is_success() {
            return Err(HttpClientError::Request {
                status: Some(status_code.as_u16()),
                body: Some(body),
                message: format!("Request failed with status code {}", status_code.as_u16()),
            });
        }

        Ok(Self::new(status_code, headers, body))
    }

    /// Get the status code.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the decoded body.
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Consume the response and return the body.
    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Deserialize a JSON body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self
            .body
            .as_json()
            .ok_or_else(|| HttpClientError::Json("response body is not JSON".to_string()))?;
        serde_json::from_value(value.clone()).map_err(|e| HttpClientError::Json(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json() {
        let body = ResponseBody::decode(Some("application/json; charset=utf-8"), br#"{"ok":true}"#);
        assert_eq!(body, ResponseBody::Json(json!({"ok": true})));
    }

    #[test]
    fn test_decode_text_and_empty() {
        assert_eq!(
            ResponseBody::decode(Some("text/plain"), b"hello"),
            ResponseBody::Text("hello".into())
        );
        assert_eq!(ResponseBody::decode(None, b"{}"), ResponseBody::Text("{}".into()));
        assert_eq!(ResponseBody::decode(Some("application/json"), b""), ResponseBody::Empty);
    }

    #[test]
    fn test_decode_bad_json_falls_back_to_text() {
        assert_eq!(
            ResponseBody::decode(Some("application/json"), b"not json"),
            ResponseBody::Text("not json".into())
        );
    }

    #[test]
    fn test_typed_json() {
        #[derive(serde::Deserialize)]
        struct Ack {
            id: u32,
        }

        let response = Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            ResponseBody::Json(json!({"id": 7})),
        );
        assert_eq!(response.json::<Ack>().unwrap().id, 7);

        let text = Response::new(StatusCode::OK, HeaderMap::new(), ResponseBody::Text("x".into()));
        assert!(text.json::<Ack>().is_err());
    }
}
