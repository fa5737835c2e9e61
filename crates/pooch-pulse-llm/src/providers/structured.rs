//! Schema-constrained provider (Gemini `generateContent`).

use serde_json::{json, Value};

use super::{http_client, read_json, resolve_base_url, transport_error};
use super::{AnalysisProvider, AnalysisRequest, ProviderError, ProviderResult};
use crate::config::{ProviderConfig, ProviderKind};
use crate::prompts::{analysis_schema, build_structured_prompt};

pub const STRUCTURED_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const STRUCTURED_DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Provider that asks for JSON matching [`analysis_schema`].
pub struct StructuredProvider {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    model: String,
}

impl StructuredProvider {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(config)?,
            api_key: config.api_key.clone(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| STRUCTURED_DEFAULT_MODEL.to_string()),
        })
    }

    fn endpoint(&self, proxy_url: Option<&str>) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            resolve_base_url(proxy_url, STRUCTURED_DEFAULT_BASE_URL),
            self.model
        )
    }
}

impl AnalysisProvider for StructuredProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Structured
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate(&self, request: &AnalysisRequest) -> ProviderResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Unauthorized("API Key must be set".into()))?;

        let url = self.endpoint(request.proxy_url.as_deref());
        tracing::info!(model = %self.model, image_len = request.image_base64.len(), "Requesting structured analysis");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&structured_body(request))
            .send()
            .map_err(transport_error)?;

        Ok(structured_text(&read_json(response)?))
    }
}

/// Request body: instruction and inline image, constrained to the schema.
pub fn structured_body(request: &AnalysisRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": build_structured_prompt() },
                {
                    "inlineData": {
                        "mimeType": request.mime_type,
                        "data": request.image_base64,
                    }
                }
            ]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": analysis_schema(),
        }
    })
}

/// Empty object handed on when the provider sent no usable text, so the
/// reply still becomes a report with field defaults.
const EMPTY_REPLY: &str = "{}";

/// Concatenate the text parts of the first candidate.
///
/// A blocked prompt, a reply with no candidates or a blank text all yield
/// [`EMPTY_REPLY`] rather than an error.
pub fn structured_text(response: &Value) -> String {
    if let Some(reason) = response
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        tracing::warn!(block_reason = reason, "Prompt blocked by provider");
    }

    let Some(parts) = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
    else {
        tracing::warn!("Response has no candidate content");
        return EMPTY_REPLY.to_string();
    };

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();

    if text.trim().is_empty() {
        tracing::warn!("Response candidate has no text");
        return EMPTY_REPLY.to_string();
    }
    text
}
