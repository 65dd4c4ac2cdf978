//! Test helpers shared by analysis-service integration tests.

#![allow(dead_code)]

use analysis_service::config::{AnalysisConfig, AnalysisSettings, AnthropicConfig};
use analysis_service::services::providers::VisionProvider;
use analysis_service::startup::{build_router, AppState, Application};
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub const TEST_API_KEY: &str = "test-api-key";

/// Config bound to a random port, talking to `base_url` for the model API.
pub fn test_config(base_url: &str) -> AnalysisConfig {
    let mut anthropic = AnthropicConfig::with_api_key(TEST_API_KEY);
    anthropic.base_url = base_url.to_string();
    anthropic.model = "claude-test".to_string();

    AnalysisConfig {
        common: CoreConfig { port: 0 },
        anthropic,
        analysis: AnalysisSettings::default(),
    }
}

/// Router backed by the given provider, for `oneshot` tests.
pub fn router_with(provider: Arc<dyn VisionProvider>) -> Router {
    router_with_config(test_config("http://127.0.0.1:9"), provider)
}

pub fn router_with_config(config: AnalysisConfig, provider: Arc<dyn VisionProvider>) -> Router {
    build_router(AppState::new(config, provider))
}

/// Four tiny base64 PNG payloads.
pub fn valid_images() -> Vec<String> {
    let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    vec![STANDARD.encode(png); 4]
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Body is not JSON")
}

/// A running server instance.
pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the real application (Anthropic provider) against `base_url`.
    pub async fn spawn(base_url: &str) -> Self {
        Self::spawn_with_config(test_config(base_url)).await
    }

    pub async fn spawn_with_config(config: AnalysisConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let address = format!("http://127.0.0.1:{}", port);

        // Wait for the server by polling the health endpoint
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp { address, port }
    }

    pub async fn post_analyze(&self, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/analyze", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to send request")
    }
}
