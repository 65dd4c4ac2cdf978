//! Vision model provider abstractions and implementations.
//!
//! The analyzer only talks to [`VisionProvider`]; the Anthropic client is the
//! production backend and the mock backs tests.

pub mod anthropic;
pub mod mock;

use crate::models::ChartImage;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
///
/// Adapters translate their API's error shape into these variants so callers
/// never inspect upstream message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Result of a provider call.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// First text block of the reply.
    pub text: String,

    pub model: String,

    pub input_tokens: u32,

    pub output_tokens: u32,

    pub stop_reason: StopReason,
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    StopSequence,
    Other,
}

impl StopReason {
    pub fn from_api(value: Option<&str>) -> Self {
        match value {
            Some("end_turn") => StopReason::EndTurn,
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::Other,
        }
    }
}

/// Trait for multimodal (text + image) generation providers.
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send one instruction followed by the charts, in order.
    async fn analyze(
        &self,
        prompt: &str,
        images: &[ChartImage],
    ) -> Result<ProviderResponse, ProviderError>;

    /// Model identifier reported in response metadata.
    fn model(&self) -> &str;
}
