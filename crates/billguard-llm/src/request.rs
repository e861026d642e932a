//! `generateContent` request payloads and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{AnalysisError, AnalysisResult};
use crate::config::ClientConfig;
use crate::prompts::build_analysis_prompt;

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// One document photo to analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    /// Base64 image data without a `data:` URL prefix
    pub image_base64: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_context: Option<String>,
}

impl AnalysisRequest {
    /// Build a request; a blank MIME type falls back to `image/jpeg`.
    pub fn new(image_base64: impl Into<String>, mime_type: Option<&str>) -> AnalysisResult<Self> {
        let image_base64 = strip_data_url(image_base64.into());
        if image_base64.trim().is_empty() {
            return Err(AnalysisError::InvalidRequest("No image provided".into()));
        }

        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        Ok(Self {
            image_base64,
            mime_type,
            user_context: None,
        })
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.user_context = Some(context.into());
        self
    }
}

/// Drop a `data:image/png;base64,` prefix left by browser file readers.
fn strip_data_url(data: String) -> String {
    if data.starts_with("data:") {
        if let Some((_, payload)) = data.split_once(',') {
            return payload.to_string();
        }
    }
    data
}

/// The JSON body of a `generateContent` call: image part, prompt part, generation config.
pub fn build_generate_request(request: &AnalysisRequest, config: &ClientConfig) -> Value {
    json!({
        "contents": [{
            "parts": [
                {
                    "inlineData": {
                        "mimeType": request.mime_type,
                        "data": request.image_base64,
                    }
                },
                { "text": build_analysis_prompt(request.user_context.as_deref()) },
            ]
        }],
        "generationConfig": {
            "temperature": config.temperature,
            "topP": config.top_p,
            "maxOutputTokens": config.max_output_tokens,
        }
    })
}

/// Reply text at `candidates[0].content.parts[0].text`, empty when absent.
pub fn extract_response_text(envelope: &Value) -> String {
    envelope
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Reply text from a raw `generateContent` response body.
pub fn response_text_from_body(body: &str) -> AnalysisResult<String> {
    let envelope: Value = serde_json::from_str(body)?;
    Ok(extract_response_text(&envelope))
}
