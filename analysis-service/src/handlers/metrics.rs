use crate::services::metrics::get_metrics;
use axum::{http::header, response::IntoResponse};
use service_core::error::AppError;

pub async fn metrics() -> Result<impl IntoResponse, AppError> {
    let body = get_metrics().map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
