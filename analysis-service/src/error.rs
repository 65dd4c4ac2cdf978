//! Failure taxonomy of the analyze endpoint and its HTTP mapping.

use crate::models::{Timeframe, EXPECTED_IMAGE_COUNT};
use crate::services::providers::ProviderError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Expected {expected} chart images, received {received}")]
    InvalidImageCount { received: usize, expected: usize },

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Image {index} ({timeframe}) is invalid: {reason}")]
    InvalidImage {
        index: usize,
        timeframe: Timeframe,
        reason: String,
    },

    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    #[error("Upstream rate limit: {message}")]
    UpstreamRateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Model response was not valid JSON: {0}")]
    UpstreamFormat(String),

    #[error("Model response did not match the report schema: {0}")]
    SchemaMismatch(String),

    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl AnalysisError {
    pub fn image_count(received: usize) -> Self {
        AnalysisError::InvalidImageCount {
            received,
            expected: EXPECTED_IMAGE_COUNT,
        }
    }

    /// Label used for the `outcome` metric dimension.
    pub fn outcome(&self) -> &'static str {
        match self {
            AnalysisError::InvalidImageCount { .. }
            | AnalysisError::MalformedBody(_)
            | AnalysisError::InvalidImage { .. } => "invalid_request",
            AnalysisError::PayloadTooLarge { .. } => "payload_too_large",
            AnalysisError::UpstreamAuth(_) => "upstream_auth",
            AnalysisError::UpstreamRateLimit { .. } => "rate_limited",
            AnalysisError::UpstreamFormat(_) => "format_error",
            AnalysisError::SchemaMismatch(_) => "schema_mismatch",
            AnalysisError::Upstream(_) => "upstream_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AnalysisError::InvalidImageCount { .. }
            | AnalysisError::MalformedBody(_)
            | AnalysisError::InvalidImage { .. } => StatusCode::BAD_REQUEST,
            AnalysisError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AnalysisError::UpstreamAuth(_) => StatusCode::UNAUTHORIZED,
            AnalysisError::UpstreamRateLimit { .. } => StatusCode::TOO_MANY_REQUESTS,
            AnalysisError::UpstreamFormat(_)
            | AnalysisError::SchemaMismatch(_)
            | AnalysisError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProviderError> for AnalysisError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Authentication(msg) => AnalysisError::UpstreamAuth(msg),
            ProviderError::RateLimited {
                message,
                retry_after,
            } => AnalysisError::UpstreamRateLimit {
                message,
                retry_after,
            },
            ProviderError::InvalidResponse(msg) => AnalysisError::UpstreamFormat(msg),
            ProviderError::NotConfigured(msg)
            | ProviderError::ApiError(msg)
            | ProviderError::NetworkError(msg) => AnalysisError::Upstream(msg),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    received: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expected: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeframe: Option<Timeframe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
            received: None,
            expected: None,
            index: None,
            timeframe: None,
            retry_after: None,
        }
    }

    fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

const IMAGE_COUNT_MESSAGE: &str = "Please provide exactly 4 chart images in base64 format";
const MALFORMED_BODY_MESSAGE: &str =
    "Request body must be a JSON object with an \"images\" array of 4 base64 strings";

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut retry_header = None;

        let body = match self {
            AnalysisError::InvalidImageCount { received, expected } => ErrorBody {
                received: Some(received),
                expected: Some(expected),
                ..ErrorBody::new(IMAGE_COUNT_MESSAGE)
            },
            AnalysisError::MalformedBody(reason) => ErrorBody {
                received: Some(0),
                expected: Some(EXPECTED_IMAGE_COUNT),
                ..ErrorBody::new(MALFORMED_BODY_MESSAGE).details(reason)
            },
            AnalysisError::PayloadTooLarge { limit } => ErrorBody::new(format!(
                "Request body is too large. The limit is {} bytes for all four images.",
                limit
            )),
            AnalysisError::InvalidImage {
                index,
                timeframe,
                reason,
            } => ErrorBody {
                index: Some(index),
                timeframe: Some(timeframe),
                ..ErrorBody::new(format!("Image {} ({} chart): {}", index, timeframe, reason))
                    .details(reason)
            },
            AnalysisError::UpstreamAuth(_) => {
                ErrorBody::new("Analysis provider rejected the configured API key.")
                    .details("API authentication error")
            }
            AnalysisError::UpstreamRateLimit { retry_after, .. } => {
                retry_header = retry_after;
                ErrorBody {
                    retry_after,
                    ..ErrorBody::new("Rate limit exceeded. Please wait a moment and try again.")
                        .details("API rate limit")
                }
            }
            AnalysisError::UpstreamFormat(_) => ErrorBody::new(
                "Analysis completed but response format was invalid. Please try again.",
            )
            .details("JSON parsing error"),
            AnalysisError::SchemaMismatch(reason) => ErrorBody::new(
                "Analysis completed but response did not match the expected report format. Please try again.",
            )
            .details(format!("Schema mismatch: {}", reason)),
            AnalysisError::Upstream(msg) => {
                ErrorBody::new("Analysis failed. Please check your images and try again.")
                    .details(msg)
            }
        };

        let mut res = (status, Json(body)).into_response();

        if let Some(retry) = retry_header {
            res.headers_mut().insert(header::RETRY_AFTER, retry.into());
        }

        res
    }
}
