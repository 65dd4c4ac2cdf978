use axum::{response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "SMC Trading Analysis API is running",
        "service": "analysis-service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "analyze": {
                "path": "/api/analyze",
                "method": "POST",
                "body": "{ \"images\": [5m, 15m, 1h, 4h] } as base64 strings"
            }
        },
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }))
}
