//! Tests for facilitator client

use super::FacilitatorClient;
use crate::types::{
    FacilitatorConfig, PaymentArtifact, PaymentRequirement, PaymentTerms, VerifyRequest,
};
use crate::X402Error;
use mockito::{Matcher, Server};
use serde_json::json;
use std::io::Write;
use std::time::Duration;

fn create_test_terms(facilitator_url: &str) -> PaymentTerms {
    PaymentRequirement::new(
        "movement",
        "0x1::aptos_coin::AptosCoin",
        "100000000".parse().unwrap(),
        "Test payment",
    )
    .with_max_timeout_seconds(600)
    .quote("0x209693bc6afc0c5328ba36faf03c514ef312287c", facilitator_url)
}

fn create_test_artifact() -> PaymentArtifact {
    r#"{"sig":"0x2d6a7588","publicKey":"0x857b0651"}"#.parse().unwrap()
}

#[test]
fn test_facilitator_client_creation() {
    let config = FacilitatorConfig::new("https://example.com/facilitator");
    let client = FacilitatorClient::new(&config).unwrap();
    assert_eq!(client.timeout_cap(), Duration::from_secs(30));
}

#[test]
fn test_facilitator_client_creation_with_invalid_config() {
    let config = FacilitatorConfig::new("not-a-url");
    let result = FacilitatorClient::new(&config);
    assert!(matches!(result, Err(X402Error::Config { .. })));
}

#[test]
fn test_effective_timeout() {
    let config =
        FacilitatorConfig::new("https://example.com").with_timeout(Duration::from_secs(30));
    let client = FacilitatorClient::new(&config).unwrap();

    assert_eq!(client.effective_timeout(600), Duration::from_secs(30));
    assert_eq!(client.effective_timeout(5), Duration::from_secs(5));
    assert_eq!(client.effective_timeout(0), Duration::from_secs(30));
}

#[tokio::test]
async fn test_facilitator_verify_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/verify")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "payment": {"sig": "0x2d6a7588", "publicKey": "0x857b0651"},
            "payTo": "0x209693bc6afc0c5328ba36faf03c514ef312287c",
            "network": "movement",
            "asset": "0x1::aptos_coin::AptosCoin",
            "maxAmountRequired": "100000000"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"isValid": true, "payer": "0x857b0651"}).to_string())
        .create_async()
        .await;

    let client = FacilitatorClient::new(&FacilitatorConfig::new(server.url())).unwrap();
    let terms = create_test_terms(&server.url());
    let artifact = create_test_artifact();

    let response = client
        .verify(
            &terms.facilitator_url,
            &VerifyRequest::new(&artifact, &terms),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert!(response.is_approved());
    assert_eq!(response.payer.as_deref(), Some("0x857b0651"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_facilitator_verify_declined_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/verify")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"isValid": false, "invalidReason": "insufficient_funds"}).to_string())
        .create_async()
        .await;

    let client = FacilitatorClient::new(&FacilitatorConfig::new(server.url())).unwrap();
    let terms = create_test_terms(&server.url());
    let artifact = create_test_artifact();

    let response = client
        .verify(
            &terms.facilitator_url,
            &VerifyRequest::new(&artifact, &terms),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert!(!response.is_approved());
    assert_eq!(
        response.invalid_reason,
        Some("insufficient_funds".to_string())
    );
}

#[tokio::test]
async fn test_facilitator_verify_empty_success_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/verify")
        .with_status(200)
        .create_async()
        .await;

    let client = FacilitatorClient::new(&FacilitatorConfig::new(server.url())).unwrap();
    let terms = create_test_terms(&server.url());
    let artifact = create_test_artifact();

    let response = client
        .verify(
            &terms.facilitator_url,
            &VerifyRequest::new(&artifact, &terms),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert!(response.is_approved());
}

#[tokio::test]
async fn test_facilitator_declined_body_with_odd_reason_stays_declined() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/verify")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"isValid": false, "invalidReason": {"code": "insufficient_funds"}, "payer": 7})
                .to_string(),
        )
        .create_async()
        .await;

    let client = FacilitatorClient::new(&FacilitatorConfig::new(server.url())).unwrap();
    let terms = create_test_terms(&server.url());
    let artifact = create_test_artifact();

    let response = client
        .verify(
            &terms.facilitator_url,
            &VerifyRequest::new(&artifact, &terms),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert!(!response.is_approved());
    assert!(response
        .invalid_reason
        .unwrap()
        .contains("insufficient_funds"));
}

#[tokio::test]
async fn test_facilitator_unusable_success_body_is_declined() {
    for body in [r#"{"isValid": "false"}"#, "not json", "[false]"] {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/verify")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let client = FacilitatorClient::new(&FacilitatorConfig::new(server.url())).unwrap();
        let terms = create_test_terms(&server.url());
        let artifact = create_test_artifact();

        let result = client
            .verify(
                &terms.facilitator_url,
                &VerifyRequest::new(&artifact, &terms),
                Duration::from_secs(5),
            )
            .await;

        assert!(
            matches!(result, Err(X402Error::PaymentVerificationFailed { .. })),
            "body {:?} gave {:?}",
            body,
            result
        );
    }
}

#[tokio::test]
async fn test_facilitator_server_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/verify")
        .with_status(500)
        .create_async()
        .await;

    let client = FacilitatorClient::new(&FacilitatorConfig::new(server.url())).unwrap();
    let terms = create_test_terms(&server.url());
    let artifact = create_test_artifact();

    let result = client
        .verify(
            &terms.facilitator_url,
            &VerifyRequest::new(&artifact, &terms),
            Duration::from_secs(5),
        )
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, X402Error::PaymentVerificationFailed { .. }));
    assert!(error
        .to_string()
        .contains("Verification failed with status: 500"));
}

#[tokio::test]
async fn test_facilitator_trailing_slash_url() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/verify")
        .with_status(200)
        .create_async()
        .await;

    let client = FacilitatorClient::new(&FacilitatorConfig::new(server.url())).unwrap();
    let terms = create_test_terms(&format!("{}/", server.url()));
    let artifact = create_test_artifact();

    client
        .verify(
            &terms.facilitator_url,
            &VerifyRequest::new(&artifact, &terms),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_facilitator_with_api_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/verify")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body(json!({"isValid": true}).to_string())
        .create_async()
        .await;

    let config = FacilitatorConfig::new(server.url()).with_api_key("test-token");
    let client = FacilitatorClient::new(&config).unwrap();
    let terms = create_test_terms(&server.url());
    let artifact = create_test_artifact();

    let response = client
        .verify(
            &terms.facilitator_url,
            &VerifyRequest::new(&artifact, &terms),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
    assert!(response.is_approved());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_facilitator_unreachable() {
    let config = FacilitatorConfig::new("http://127.0.0.1:1");
    let client = FacilitatorClient::new(&config).unwrap();
    let terms = create_test_terms("http://127.0.0.1:1");
    let artifact = create_test_artifact();

    let result = client
        .verify(
            &terms.facilitator_url,
            &VerifyRequest::new(&artifact, &terms),
            Duration::from_secs(2),
        )
        .await;

    let error = result.unwrap_err();
    assert!(
        matches!(error, X402Error::Http(_) | X402Error::Timeout { .. }),
        "Expected transport error, got: {:?}",
        error
    );
}

#[tokio::test]
async fn test_facilitator_timeout() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/verify")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(1500));
            w.write_all(b"{\"isValid\":true}")
        })
        .create_async()
        .await;

    let client = FacilitatorClient::new(&FacilitatorConfig::new(server.url())).unwrap();
    let terms = create_test_terms(&server.url());
    let artifact = create_test_artifact();

    let result = client
        .verify(
            &terms.facilitator_url,
            &VerifyRequest::new(&artifact, &terms),
            Duration::from_millis(200),
        )
        .await;

    let error = result.unwrap_err();
    assert!(
        matches!(error, X402Error::Timeout { .. } | X402Error::Http(_)),
        "Expected timeout, got: {:?}",
        error
    );
    assert!(!matches!(error, X402Error::PaymentVerificationFailed { .. }));
}
