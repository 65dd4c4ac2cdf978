use crate::error::AnalysisError;
use crate::models::{AnalysisReport, ChartImage};
use crate::services::metrics;
use crate::services::prompt::ANALYSIS_PROMPT;
use crate::services::providers::{StopReason, VisionProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Parsed model output plus call statistics.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub analysis: serde_json::Value,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub elapsed: Duration,
}

/// Runs one analysis: prompt + charts upstream, reply parsed as JSON.
#[derive(Clone)]
pub struct ChartAnalyzer {
    provider: Arc<dyn VisionProvider>,
    strict_schema: bool,
}

impl ChartAnalyzer {
    pub fn new(provider: Arc<dyn VisionProvider>, strict_schema: bool) -> Self {
        Self {
            provider,
            strict_schema,
        }
    }

    /// Single best-effort attempt; the caller retries if needed.
    #[tracing::instrument(skip(self, images), fields(model = %self.provider.model(), images = images.len()))]
    pub async fn analyze(&self, images: &[ChartImage]) -> Result<AnalysisOutcome, AnalysisError> {
        tracing::info!("Starting analysis of {} chart images", images.len());

        let started = Instant::now();
        let result = self.provider.analyze(ANALYSIS_PROMPT, images).await;
        let elapsed = started.elapsed();
        metrics::record_upstream_latency(self.provider.model(), elapsed.as_secs_f64());

        let response = result.map_err(|e| {
            tracing::error!(error = %e, "Vision provider call failed");
            AnalysisError::from(e)
        })?;

        metrics::record_tokens(
            &response.model,
            response.input_tokens,
            response.output_tokens,
        );

        if response.stop_reason == StopReason::MaxTokens {
            tracing::warn!(
                output_tokens = response.output_tokens,
                "Model output hit the token limit; JSON is likely truncated"
            );
        }

        let analysis = parse_analysis(&response.text)?;

        if self.strict_schema {
            AnalysisReport::validate_value(&analysis).map_err(|reason| {
                tracing::warn!(%reason, "Analysis does not match report schema");
                AnalysisError::SchemaMismatch(reason)
            })?;
        }

        tracing::info!(
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Analysis completed successfully"
        );

        Ok(AnalysisOutcome {
            analysis,
            model: response.model,
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
            elapsed,
        })
    }
}

/// The reply must be a bare JSON document. Prose around it is a format error.
fn parse_analysis(text: &str) -> Result<serde_json::Value, AnalysisError> {
    serde_json::from_str(text.trim()).map_err(|e| {
        tracing::error!(error = %e, text_len = text.len(), "Model reply is not valid JSON");
        AnalysisError::UpstreamFormat(e.to_string())
    })
}
