//! End-to-end tests for the sigil facade.
//!
//! These tests wire configuration, signing, retries and webhook verification
//! together the way a workflow step would.

use std::collections::HashMap;

use serde_json::json;
use sigil::prelude::*;
use sigil::sigil_webhooks::get_raw_body_signature;
use tokio_test::assert_ok;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Outbound Signed Requests
// =============================================================================

#[tokio::test]
async fn test_configured_client_signs_and_retries() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prod/sync"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/prod/sync"))
        .and(header_exists("authorization"))
        .and(header("x-github-context", "octo/sigil"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"synced": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let config = SigilConfig::from_toml_str(
        r#"
        region = "us-west-2"
        base_delay_ms = 1
        "#,
    )
    .unwrap();
    let workflow = WorkflowContext::from_parts("https://github.com", "octo/sigil", "7");
    let signer = RequestSigner::new(Credentials::new("AKIDEXAMPLE", "secret"));
    let client = SignedHttpClient::new(signer, config.client_config(Some(workflow))).unwrap();

    let request = SignedRequest::post(format!("{}/prod/sync", server.uri()))
        .json(json!({"repository": "octo/sigil"}));
    let response = assert_ok!(client.request_with_retries(&request).await);

    assert_eq!(response.body().as_json(), Some(&json!({"synced": 3})));
}

#[tokio::test]
async fn test_zero_retries_from_config() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let mut vars = HashMap::new();
    vars.insert("SIGIL_MAX_RETRIES".to_string(), "0".to_string());
    let config = SigilConfig::from_vars(&vars).unwrap();
    let signer = RequestSigner::new(Credentials::new("AKIDEXAMPLE", "secret"));
    let client = SignedHttpClient::new(signer, config.into()).unwrap();

    let err = client
        .request_with_retries(&SignedRequest::post(server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, HttpClientError::RetryExhausted { attempts: 1, .. }));
    assert_eq!(err.status_code(), Some(500));
}

// =============================================================================
// Inbound Webhooks
// =============================================================================

#[test]
fn test_delivery_round_trip() {
    let key = "webhook-secret";
    let body = br#"{"action":"completed","workflow_run":{"id":7}}"#;

    let mut headers = HashMap::new();
    headers.insert(
        "x-hub-signature-256".to_string(),
        get_raw_body_signature(key, body),
    );
    headers.insert("x-github-event".to_string(), "workflow_run".to_string());
    headers.insert("x-github-hook-id".to_string(), "99".to_string());
    headers.insert(
        "x-github-hook-installation-target-type".to_string(),
        "repository".to_string(),
    );

    assert!(verify_github_headers_exist(&headers));

    let request = WebhookVerificationRequest {
        key: key.to_string(),
        body: WebhookBody::Raw(body.to_vec()),
        headers: headers.clone(),
    };
    assert!(verify_github_payload(&request));

    let delivery = assert_ok!(WebhookVerifier::new(key).receive(body, &headers));
    assert_eq!(delivery.event, "workflow_run");
    assert_eq!(delivery.payload["workflow_run"]["id"], 7);

    assert!(!WebhookVerifier::new("wrong-secret").verify_raw(body, &headers));
}
