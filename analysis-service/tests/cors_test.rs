mod common;

use analysis_service::services::providers::mock::MockVisionProvider;
use axum::http::{header, Method, StatusCode};
use common::{body_bytes, empty_request, router_with};
use std::sync::Arc;
use tower::ServiceExt;

#[tokio::test]
async fn options_short_circuits_on_every_path() {
    for path in ["/", "/api/analyze", "/nope"] {
        let provider = Arc::new(MockVisionProvider::with_text("{}"));
        let response = router_with(provider.clone())
            .oneshot(empty_request(Method::OPTIONS, path))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "path {path}");

        let headers = response.headers().clone();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap()
            .to_string();
        assert!(methods.contains("POST"), "methods: {methods}");
        let allowed_headers = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(allowed_headers.contains("content-type"));

        assert!(body_bytes(response).await.is_empty(), "path {path}");
        assert_eq!(provider.calls(), 0);
    }
}

#[tokio::test]
async fn preflight_from_browser_is_accepted() {
    let response = router_with(Arc::new(MockVisionProvider::with_text("{}")))
        .oneshot(
            axum::http::Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/analyze")
                .header(header::ORIGIN, "https://charts.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn regular_responses_allow_any_origin() {
    for (method, path) in [(Method::GET, "/"), (Method::GET, "/nope"), (Method::GET, "/api/analyze")] {
        let response = router_with(Arc::new(MockVisionProvider::with_text("{}")))
            .oneshot(empty_request(method, path))
            .await
            .unwrap();

        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*",
            "path {path}"
        );
    }
}
