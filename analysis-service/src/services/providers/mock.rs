//! Mock provider implementation for testing.

use super::{ProviderError, ProviderResponse, StopReason, VisionProvider};
use crate::models::ChartImage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock vision provider returning a canned reply.
pub struct MockVisionProvider {
    outcome: Result<String, ProviderError>,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    /// Reply with `text` as the model's first text block.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every call with `error`.
    pub fn with_error(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of upstream calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    async fn analyze(
        &self,
        prompt: &str,
        images: &[ChartImage],
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let text = self.outcome.clone()?;

        Ok(ProviderResponse {
            text,
            model: self.model().to_string(),
            input_tokens: (prompt.len() / 4 + images.len() * 1600) as u32,
            output_tokens: 10,
            stop_reason: StopReason::EndTurn,
        })
    }

    fn model(&self) -> &str {
        "mock-vision"
    }
}
