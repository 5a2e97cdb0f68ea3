//! GitHub delivery header names and presence checks

use std::collections::HashMap;

/// HMAC-SHA256 signature of the body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Event name, e.g. `push`.
pub const EVENT_HEADER: &str = "x-github-event";

/// Id of the hook that fired.
pub const HOOK_ID_HEADER: &str = "x-github-hook-id";

/// Kind of resource the hook is installed on.
pub const TARGET_TYPE_HEADER: &str = "x-github-hook-installation-target-type";

/// Unique delivery id. Optional.
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Headers every delivery must carry.
pub const REQUIRED_HEADERS: [&str; 4] = [
    SIGNATURE_HEADER,
    EVENT_HEADER,
    HOOK_ID_HEADER,
    TARGET_TYPE_HEADER,
];

/// Check that every required header is present.
///
/// Keys are matched exactly, so callers must lowercase header names first.
/// Extra headers are ignored.
pub fn verify_github_headers_exist(headers: &HashMap<String, String>) -> bool {
    REQUIRED_HEADERS.iter().all(|name| headers.contains_key(*name))
}

/// Required headers absent from `headers`, in declaration order.
pub fn missing_headers(headers: &HashMap<String, String>) -> Vec<&'static str> {
    REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|name| !headers.contains_key(*name))
        .collect()
}
