//! Responses for requests no handler matches.

use axum::{http::StatusCode, http::Uri, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "No route matched");

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Not found",
            "path": uri.path()
        })),
    )
}

pub async fn analyze_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed {
        message: "Method not allowed. Use POST to send chart images for analysis.".to_string(),
        allow: "POST",
    }
}

pub async fn health_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed {
        message: "Method not allowed. Use GET for service status.".to_string(),
        allow: "GET",
    }
}
