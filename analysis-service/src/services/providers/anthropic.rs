//! Anthropic Messages API provider.
//!
//! Sends the prompt and charts as one user turn and translates the API's
//! error envelope into [`ProviderError`] variants.

use super::{ProviderError, ProviderResponse, StopReason, VisionProvider};
use crate::config::AnthropicConfig;
use crate::models::ChartImage;
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MESSAGES_PATH: &str = "/v1/messages";

/// Anthropic vision provider.
pub struct AnthropicVisionProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicVisionProvider {
    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
        if config.api_key.expose_secret().trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Anthropic API key not configured".to_string(),
            ));
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            MESSAGES_PATH
        )
    }

    fn build_request<'a>(&'a self, prompt: &'a str, images: &'a [ChartImage]) -> MessagesRequest<'a> {
        let mut content = Vec::with_capacity(images.len() + 1);
        content.push(RequestContent::Text { text: prompt });
        content.extend(images.iter().map(|image| RequestContent::Image {
            source: ImageSource {
                kind: "base64",
                media_type: image.media_type,
                data: &image.data,
            },
        }));

        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content,
            }],
        }
    }
}

#[async_trait]
impl VisionProvider for AnthropicVisionProvider {
    async fn analyze(
        &self,
        prompt: &str,
        images: &[ChartImage],
    ) -> Result<ProviderResponse, ProviderError> {
        let request = self.build_request(prompt, images);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            image_count = images.len(),
            "Sending request to Anthropic API"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", &self.config.api_version)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::NetworkError(format!(
                        "Anthropic API request timed out after {}s",
                        self.config.timeout_secs.unwrap_or_default()
                    ))
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();

            return Err(classify_error(status, retry_after, &error_text));
        }

        let api_response: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let text = api_response
            .content
            .into_iter()
            .find_map(|block| match block {
                ResponseContent::Text { text } => Some(text),
                ResponseContent::Other => None,
            })
            .ok_or_else(|| {
                ProviderError::InvalidResponse("Response contained no text content".to_string())
            })?;

        let usage = api_response.usage.unwrap_or_default();

        Ok(ProviderResponse {
            text,
            model: api_response.model.unwrap_or_else(|| self.config.model.clone()),
            input_tokens: usage.input_tokens,
            output_tokens: usage.output_tokens,
            stop_reason: StopReason::from_api(api_response.stop_reason.as_deref()),
        })
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Map a failed Messages API call onto a [`ProviderError`].
///
/// The error `type` and HTTP status decide first. Message wording is the
/// fallback, with rate-limit wording taking precedence over everything else.
pub fn classify_error(status: StatusCode, retry_after: Option<u64>, body: &str) -> ProviderError {
    let (kind, message) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.kind, envelope.error.message),
        Err(_) if body.trim().is_empty() => (String::new(), status.to_string()),
        Err(_) => (String::new(), body.to_string()),
    };
    let lowered = message.to_ascii_lowercase();

    if kind == "rate_limit_error"
        || status == StatusCode::TOO_MANY_REQUESTS
        || lowered.contains("rate limit")
    {
        return ProviderError::RateLimited {
            message,
            retry_after,
        };
    }

    if kind == "authentication_error"
        || kind == "permission_error"
        || status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || lowered.contains("api key")
    {
        return ProviderError::Authentication(message);
    }

    if message.contains("JSON") {
        return ProviderError::InvalidResponse(message);
    }

    ProviderError::ApiError(format!("Anthropic API error {}: {}", status.as_u16(), message))
}

// ============================================================================
// Anthropic API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestContent<'a> {
    Text { text: &'a str },
    Image { source: ImageSource<'a> },
}

#[derive(Debug, Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseContent>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}
