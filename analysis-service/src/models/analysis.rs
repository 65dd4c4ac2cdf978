use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Number of charts every analysis expects.
pub const EXPECTED_IMAGE_COUNT: usize = 4;

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzeRequest {
    /// Base64 payloads ordered 5m, 15m, 1h, 4h.
    ///
    /// Entries stay untyped so the count can be checked before their
    /// contents. A missing or non-array value reads as empty.
    #[serde(default, deserialize_with = "array_or_empty")]
    #[validate(length(equal = 4, message = "Exactly 4 chart images are required"))]
    pub images: Vec<serde_json::Value>,
}

fn array_or_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(entries) => Ok(entries),
        _ => Ok(Vec::new()),
    }
}

/// Chart granularity, identified only by position in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
}

impl Timeframe {
    /// Positional order of the request's `images` array.
    pub const ORDER: [Timeframe; EXPECTED_IMAGE_COUNT] =
        [Timeframe::M5, Timeframe::M15, Timeframe::H1, Timeframe::H4];

    pub fn from_position(position: usize) -> Option<Self> {
        Self::ORDER.get(position).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated chart ready to forward upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub timeframe: Timeframe,
    pub media_type: &'static str,
    /// Standard base64 without any data-URL prefix.
    pub data: String,
}

/// Successful analysis envelope.
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: serde_json::Value,
    pub timestamp: String,
    pub metadata: AnalysisMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub model: String,
    pub timeframes: Vec<Timeframe>,
    pub processing_time_ms: u64,
    pub input_tokens: u32,
    pub output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
