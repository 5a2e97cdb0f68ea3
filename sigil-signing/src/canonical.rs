//! Canonical request construction.
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use sha2::{Digest, Sha256};

/// Everything outside the RFC 3986 unreserved set is encoded.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// The one service whose paths are encoded once rather than twice.
pub const S3_SERVICE: &str = "s3";

/// Headers that are transmitted but never covered by the signature.
pub const UNSIGNED_HEADERS: &[&str] = &[
    "authorization",
    "connection",
    "expect",
    "range",
    "user-agent",
    "x-amzn-trace-id",
];

/// Build the canonical request string.
///
/// `path` may carry a query string (`/items?id=7`); it is split here.
/// `headers` must already be the final set that will be sent, including
/// `host` and `x-amz-date`. `service` selects the path encoding, see
/// [`canonical_uri`].
pub fn canonical_request(
    method: &str,
    path: &str,
    headers: &BTreeMap<String, String>,
    body: &str,
    service: &str,
) -> String {
    let (uri, query) = path.split_once('?').unwrap_or((path, ""));
    let canonical = canonical_headers(headers);

    format!(
        "{}\n{}\n{}\n{}\n\n{}\n{}",
        method.to_uppercase(),
        canonical_uri(uri, service),
        canonical_query_string(query),
        canonical
            .iter()
            .map(|(name, value)| format!("{name}:{value}"))
            .collect::<Vec<_>>()
            .join("\n"),
        signed_header_names(&canonical),
        hash_payload(body.as_bytes()),
    )
}

/// Encode each path segment, keeping the separators. Empty paths become `/`.
///
/// Segments are decoded, then encoded with the unreserved set. Every service
/// except S3 encodes the result a second time, so `/a b` becomes `/a%2520b`.
pub fn canonical_uri(path: &str, service: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    let double = service != S3_SERVICE;
    path.split('/')
        .map(|segment| {
            let encoded = uri_encode(&percent_decode_str(segment).decode_utf8_lossy());
            if double { uri_encode(&encoded) } else { encoded }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Sort query parameters by key, then value, re-encoding both.
pub fn canonical_query_string(query: &str) -> String {
    let mut params: Vec<(String, String)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|param| {
            let (k, v) = param.split_once('=').unwrap_or((param, ""));
            (normalize_component(k), normalize_component(v))
        })
        .collect();

    params.sort_unstable();

    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Lowercase, trim and collapse the signable headers, sorted by name.
///
/// Headers that differ only in case are merged with a comma.
pub fn canonical_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut canonical: BTreeMap<String, String> = BTreeMap::new();

    for (name, value) in headers {
        let lower = name.trim().to_lowercase();
        if UNSIGNED_HEADERS.contains(&lower.as_str()) {
            continue;
        }
        let value = collapse_whitespace(value.trim());
        canonical
            .entry(lower)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    canonical
}

/// Semicolon-separated list of signed header names.
pub fn signed_header_names(canonical: &BTreeMap<String, String>) -> String {
    canonical.keys().cloned().collect::<Vec<_>>().join(";")
}

/// Hex-encoded SHA-256 of a payload.
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn normalize_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    uri_encode(&percent_decode_str(&spaced).decode_utf8_lossy())
}

fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, URI_ENCODE_SET).to_string()
}

fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_uri() {
        assert_eq!(canonical_uri("", "execute-api"), "/");
        assert_eq!(canonical_uri("/", "execute-api"), "/");
        assert_eq!(canonical_uri("/prod/deploy", "execute-api"), "/prod/deploy");
        assert_eq!(canonical_uri("/prod/deploy", S3_SERVICE), "/prod/deploy");
    }

    #[test]
    fn test_canonical_uri_double_encodes_outside_s3() {
        assert_eq!(canonical_uri("/prod/a b", "execute-api"), "/prod/a%2520b");
        assert_eq!(canonical_uri("/prod/a%20b", "execute-api"), "/prod/a%2520b");
        assert_eq!(canonical_uri("/prod/a%2Fb", "execute-api"), "/prod/a%252Fb");
        assert_eq!(canonical_uri("/prod/a b/c", "lambda"), "/prod/a%2520b/c");
    }

    #[test]
    fn test_canonical_uri_single_encodes_for_s3() {
        assert_eq!(canonical_uri("/prod/a b", S3_SERVICE), "/prod/a%20b");
        assert_eq!(canonical_uri("/prod/a%20b", S3_SERVICE), "/prod/a%20b");
        assert_eq!(canonical_uri("/prod/a%2Fb", S3_SERVICE), "/prod/a%2Fb");
    }

    #[test]
    fn test_canonical_query_string_sorted() {
        assert_eq!(canonical_query_string(""), "");
        assert_eq!(canonical_query_string("b=2&a=1"), "a=1&b=2");
        assert_eq!(canonical_query_string("a=2&a=1"), "a=1&a=2");
        assert_eq!(canonical_query_string("flag"), "flag=");
        assert_eq!(canonical_query_string("q=hello+world"), "q=hello%20world");
    }

    #[test]
    fn test_canonical_headers_normalized() {
        let mut headers = BTreeMap::new();
        headers.insert("Host".to_string(), "api.example.com".to_string());
        headers.insert("X-Custom".to_string(), "  a   b  ".to_string());
        headers.insert("User-Agent".to_string(), "sigil".to_string());

        let canonical = canonical_headers(&headers);
        assert_eq!(canonical.get("host").map(String::as_str), Some("api.example.com"));
        assert_eq!(canonical.get("x-custom").map(String::as_str), Some("a b"));
        assert!(!canonical.contains_key("user-agent"));
        assert_eq!(signed_header_names(&canonical), "host;x-custom");
    }

    #[test]
    fn test_canonical_headers_merge_case_variants() {
        let mut headers = BTreeMap::new();
        headers.insert("X-Tag".to_string(), "one".to_string());
        headers.insert("x-tag".to_string(), "two".to_string());

        let canonical = canonical_headers(&headers);
        assert_eq!(canonical.get("x-tag").map(String::as_str), Some("one,two"));
    }

    #[test]
    fn test_canonical_request_layout() {
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), "api.example.com".to_string());
        headers.insert("x-amz-date".to_string(), "20240101T000000Z".to_string());

        let request = canonical_request("post", "/prod/run?b=2&a=1", &headers, "{}", "execute-api");
        let lines: Vec<&str> = request.split('\n').collect();

        assert_eq!(lines[0], "POST");
        assert_eq!(lines[1], "/prod/run");
        assert_eq!(lines[2], "a=1&b=2");
        assert_eq!(lines[3], "host:api.example.com");
        assert_eq!(lines[4], "x-amz-date:20240101T000000Z");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "host;x-amz-date");
        assert_eq!(lines[7], hash_payload(b"{}"));
    }

    #[test]
    fn test_canonical_request_path_encoding_follows_service() {
        let mut headers = BTreeMap::new();
        headers.insert("host".to_string(), "api.example.com".to_string());

        let gateway = canonical_request("GET", "/prod/a%20b?q=1", &headers, "{}", "execute-api");
        let s3 = canonical_request("GET", "/prod/a%20b?q=1", &headers, "{}", S3_SERVICE);

        assert_eq!(gateway.split('\n').nth(1), Some("/prod/a%2520b"));
        assert_eq!(s3.split('\n').nth(1), Some("/prod/a%20b"));
    }

    #[test]
    fn test_hash_empty_payload() {
        assert_eq!(
            hash_payload(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
