//! Decoding and media-type detection for submitted charts.

use crate::error::AnalysisError;
use crate::models::{ChartImage, Timeframe};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use serde_json::Value;

/// Declared when the signature is not recognised.
const FALLBACK_MEDIA_TYPE: &str = "image/jpeg";

/// Turn the raw `images` array into charts tagged by timeframe.
///
/// Accepts bare base64 or `data:<type>;base64,<payload>` URLs. The caller has
/// already checked the count.
pub fn decode_images(raw: &[Value]) -> Result<Vec<ChartImage>, AnalysisError> {
    raw.iter()
        .enumerate()
        .map(|(index, entry)| {
            let timeframe = Timeframe::from_position(index)
                .ok_or_else(|| AnalysisError::image_count(raw.len()))?;
            let (media_type, data) =
                decode_one(entry).map_err(|reason| AnalysisError::InvalidImage {
                    index,
                    timeframe,
                    reason,
                })?;

            Ok(ChartImage {
                timeframe,
                media_type,
                data,
            })
        })
        .collect()
}

fn decode_one(entry: &Value) -> Result<(&'static str, String), String> {
    let entry = entry
        .as_str()
        .ok_or_else(|| format!("expected a base64 string, got {}", json_kind(entry)))?;
    let payload = strip_data_url(entry.trim())?;

    let payload: String = if payload.contains(char::is_whitespace) {
        payload.split_whitespace().collect()
    } else {
        payload.to_string()
    };

    if payload.is_empty() {
        return Err("image data is empty".to_string());
    }

    let bytes = STANDARD
        .decode(&payload)
        .map_err(|e| format!("invalid base64: {}", e))?;

    Ok((sniff_media_type(&bytes), payload))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn strip_data_url(entry: &str) -> Result<&str, String> {
    let Some(rest) = entry.strip_prefix("data:") else {
        return Ok(entry);
    };

    match rest.split_once(',') {
        Some((meta, payload)) if meta.ends_with(";base64") => Ok(payload),
        Some(_) => Err("data URL is not base64 encoded".to_string()),
        None => Err("data URL has no payload".to_string()),
    }
}

/// Media type from the file signature.
pub fn sniff_media_type(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::Gif) => "image/gif",
        Ok(ImageFormat::WebP) => "image/webp",
        _ => FALLBACK_MEDIA_TYPE,
    }
}
