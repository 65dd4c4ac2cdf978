//! End-to-end tests against a mocked Anthropic Messages API.

mod common;

use common::{test_config, valid_images, TestApp, TEST_API_KEY};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn message_reply(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_test",
        "type": "message",
        "role": "assistant",
        "model": "claude-test",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 6400, "output_tokens": 12 }
    })
}

fn api_error(kind: &str, message: &str) -> serde_json::Value {
    json!({ "type": "error", "error": { "type": kind, "message": message } })
}

#[tokio::test]
async fn forwards_prompt_and_images_and_returns_analysis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", TEST_API_KEY))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_reply(r#"{"a":1}"#)))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::spawn(&server.uri()).await;
    let response = app.post_analyze(&json!({ "images": valid_images() })).await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["analysis"], json!({"a": 1}));
    assert_eq!(body["metadata"]["inputTokens"], 6400);
    assert_eq!(body["metadata"]["outputTokens"], 12);

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let content = sent["messages"][0]["content"].as_array().unwrap();
    assert_eq!(sent["model"], "claude-test");
    assert_eq!(sent["max_tokens"], 4000);
    assert_eq!(content.len(), 5);
    assert_eq!(content[0]["type"], "text");
    assert!(content[1..]
        .iter()
        .all(|c| c["type"] == "image" && c["source"]["media_type"] == "image/png"));
}

#[tokio::test]
async fn upstream_rate_limit_becomes_429() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "15")
                .set_body_json(api_error("rate_limit_error", "Number of request tokens has exceeded your rate limit")),
        )
        .mount(&server)
        .await;

    let app = TestApp::spawn(&server.uri()).await;
    let response = app.post_analyze(&json!({ "images": valid_images() })).await;

    assert_eq!(response.status().as_u16(), 429);
    assert_eq!(response.headers()["retry-after"], "15");
}

#[tokio::test]
async fn rate_limit_wording_wins_regardless_of_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_json(api_error(
            "invalid_request_error",
            "JSON body rejected: rate limit for api key reached",
        )))
        .mount(&server)
        .await;

    let app = TestApp::spawn(&server.uri()).await;
    let response = app.post_analyze(&json!({ "images": valid_images() })).await;

    assert_eq!(response.status().as_u16(), 429);
}

#[tokio::test]
async fn upstream_auth_failure_becomes_401() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(api_error("authentication_error", "invalid x-api-key")),
        )
        .mount(&server)
        .await;

    let app = TestApp::spawn(&server.uri()).await;
    let response = app.post_analyze(&json!({ "images": valid_images() })).await;

    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn overloaded_upstream_is_a_generic_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(503).set_body_json(api_error("overloaded_error", "Overloaded")))
        .mount(&server)
        .await;

    let app = TestApp::spawn(&server.uri()).await;
    let response = app.post_analyze(&json!({ "images": valid_images() })).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["details"].as_str().unwrap().contains("Overloaded"));
}

#[tokio::test]
async fn configured_timeout_cuts_off_slow_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(message_reply(r#"{"a":1}"#))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.anthropic.timeout_secs = Some(1);
    let app = TestApp::spawn_with_config(config).await;
    let response = app.post_analyze(&json!({ "images": valid_images() })).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["details"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn reply_without_text_block_is_a_format_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "type": "message",
            "content": [{ "type": "tool_use", "id": "t1", "name": "x", "input": {} }],
            "usage": { "input_tokens": 1, "output_tokens": 1 }
        })))
        .mount(&server)
        .await;

    let app = TestApp::spawn(&server.uri()).await;
    let response = app.post_analyze(&json!({ "images": valid_images() })).await;

    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["details"], "JSON parsing error");
}

#[tokio::test]
async fn invalid_requests_never_reach_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(message_reply("{}")))
        .expect(0)
        .mount(&server)
        .await;

    let app = TestApp::spawn(&server.uri()).await;
    let response = app
        .post_analyze(&json!({ "images": valid_images()[..3].to_vec() }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["received"], 3);
    assert_eq!(body["expected"], 4);
}
