use crate::error::AnalysisError;
use crate::models::{AnalysisMetadata, AnalyzeRequest, AnalyzeResponse, Timeframe};
use crate::services::{decode_images, metrics};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{SecondsFormat, Utc};
use service_core::middleware::RequestId;
use validator::Validate;

#[tracing::instrument(skip(state, request_id, payload))]
pub async fn analyze(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AnalysisError> {
    let request_id = request_id.map(|Extension(RequestId(id))| id);

    let result = run_analysis(&state, request_id, payload).await;

    match &result {
        Ok(_) => metrics::record_request("success"),
        Err(e) => metrics::record_request(e.outcome()),
    }

    result
}

async fn run_analysis(
    state: &AppState,
    request_id: Option<String>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AnalysisError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected analyze body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AnalysisError::PayloadTooLarge {
                limit: state.config.analysis.max_body_bytes,
            }
        } else {
            AnalysisError::MalformedBody(rejection.body_text())
        }
    })?;

    if request.validate().is_err() {
        tracing::warn!(received = request.images.len(), "Wrong number of chart images");
        return Err(AnalysisError::image_count(request.images.len()));
    }

    let charts = decode_images(&request.images)?;
    let outcome = state.analyzer.analyze(&charts).await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis: outcome.analysis,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        metadata: AnalysisMetadata {
            model: outcome.model,
            timeframes: Timeframe::ORDER.to_vec(),
            processing_time_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            input_tokens: outcome.input_tokens,
            output_tokens: outcome.output_tokens,
            request_id,
        },
    }))
}
