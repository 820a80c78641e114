//! GeminiGateway against a mocked generateContent endpoint. No real API
//! calls are made.

use serde_json::json;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drcs::gateway::{AnalysisGateway, GatewayError, GeminiGateway};
use drcs::models::Assessment;

const GENERATE_PATH: &str = "/v1beta/models/gemini-test:generateContent";

fn gateway_for(server: &MockServer) -> GeminiGateway {
    GeminiGateway::new(
        format!("{}/v1beta", server.uri()),
        "gemini-test",
        Some("test-key".to_string()),
        Duration::from_secs(5),
    )
    .expect("client")
}

/// Wrap model text in a generateContent response envelope
fn candidate(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_structured_assessment_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {"required": ["type", "severity_score", "urgency", "suggested_action"]}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            r#"{"type":"Fire","severity_score":8,"urgency":"High","suggested_action":"Evacuate block"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let assessment = assert_ok!(gateway_for(&server).analyze("Warehouse fire, chemical smoke").await);
    assert_eq!(assessment, Assessment::new("Fire", 8.0, "High", "Evacuate block"));
}

#[tokio::test]
async fn test_prompt_carries_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{
                "text": "Analyze this disaster report: \"Flooding near bridge\". Return a structured assessment."
            }]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
            r#"{"type":"Flood","severity_score":7,"urgency":"High","suggested_action":"Deploy boats"}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    assert_ok!(gateway_for(&server).analyze("Flooding near bridge").await);
}

#[tokio::test]
async fn test_http_error_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let err = assert_err!(gateway_for(&server).analyze("Gas leak").await);
    assert_eq!(
        err,
        GatewayError::Http {
            status: 500,
            body: "backend exploded".to_string()
        }
    );
}

#[tokio::test]
async fn test_non_json_model_output_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("I cannot assess this report.")))
        .mount(&server)
        .await;

    let err = assert_err!(gateway_for(&server).analyze("Gas leak").await);
    assert!(matches!(err, GatewayError::Parse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_missing_fields_is_schema_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(r#"{"type":"Flood","urgency":"High"}"#)))
        .mount(&server)
        .await;

    let err = assert_err!(gateway_for(&server).analyze("Flooding").await);
    assert!(matches!(err, GatewayError::Schema(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_empty_candidates_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let err = assert_err!(gateway_for(&server).analyze("Flooding").await);
    assert!(matches!(err, GatewayError::Parse(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_network_error() {
    let gateway = GeminiGateway::new(
        "http://127.0.0.1:1/v1beta",
        "gemini-test",
        Some("test-key".to_string()),
        Duration::from_secs(5),
    )
    .expect("client");

    let err = assert_err!(gateway.analyze("Flooding").await);
    assert!(matches!(err, GatewayError::Network(_)), "got {:?}", err);
}
