//! Application startup and lifecycle management.

use crate::config::AnalysisConfig;
use crate::handlers;
use crate::services::metrics;
use crate::services::providers::anthropic::AnthropicVisionProvider;
use crate::services::providers::VisionProvider;
use crate::services::ChartAnalyzer;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{request_id_middleware, REQUEST_ID_HEADER};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: AnalysisConfig,
    pub analyzer: ChartAnalyzer,
}

impl AppState {
    pub fn new(config: AnalysisConfig, provider: Arc<dyn VisionProvider>) -> Self {
        let analyzer = ChartAnalyzer::new(provider, config.analysis.strict_schema);
        Self { config, analyzer }
    }
}

/// Permissive cross-origin policy. Every `OPTIONS` request is answered here
/// with an empty 200 before routing.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_router(state: AppState) -> Router {
    metrics::init_metrics();

    let max_body_bytes = state.config.analysis.max_body_bytes;

    Router::new()
        .route(
            "/",
            get(handlers::health_check).fallback(handlers::health_method_not_allowed),
        )
        .route(
            "/api/analyze",
            post(handlers::analyze).fallback(handlers::analyze_method_not_allowed),
        )
        .route("/metrics", get(handlers::metrics))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the Anthropic provider.
    pub async fn build(config: AnalysisConfig) -> Result<Self, AppError> {
        let provider = AnthropicVisionProvider::new(config.anthropic.clone()).map_err(|e| {
            tracing::error!("Failed to initialize Anthropic provider: {}", e);
            AppError::ConfigError(anyhow::Error::new(e))
        })?;

        tracing::info!(
            model = %config.anthropic.model,
            base_url = %config.anthropic.base_url,
            "Initialized Anthropic vision provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around any provider.
    pub async fn build_with_provider(
        config: AnalysisConfig,
        provider: Arc<dyn VisionProvider>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let router = build_router(AppState::new(config, provider));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!("Server running on port {}", self.port);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
