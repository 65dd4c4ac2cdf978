mod common;

use analysis_service::services::providers::mock::MockVisionProvider;
use axum::http::{header, Method, StatusCode};
use common::{body_json, empty_request, router_with};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> axum::Router {
    router_with(Arc::new(MockVisionProvider::with_text("{}")))
}

#[tokio::test]
async fn health_check_returns_status_and_timestamp() {
    let response = app()
        .oneshot(empty_request(Method::GET, "/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "SMC Trading Analysis API is running");
    assert_eq!(body["endpoints"]["analyze"]["path"], "/api/analyze");
    assert_eq!(body["endpoints"]["analyze"]["method"], "POST");

    let timestamp = body["timestamp"].as_str().expect("timestamp is a string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn unknown_path_echoes_path() {
    let response = app()
        .oneshot(empty_request(Method::GET, "/nope"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["path"], "/nope");
}

#[tokio::test]
async fn health_rejects_post() {
    let response = app()
        .oneshot(empty_request(Method::POST, "/"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "GET");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let response = app()
        .oneshot(
            axum::http::Request::builder()
                .uri("/")
                .header("x-request-id", "req-42")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_text() {
    let response = app()
        .oneshot(empty_request(Method::GET, "/metrics"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}
