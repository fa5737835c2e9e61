//! Free-text provider (OpenAI-compatible chat completions).
//!
//! The model is only asked for JSON in the prompt, so its output frequently
//! arrives wrapped in prose or code fences. Recovery handles that downstream.

use serde_json::{json, Value};

use super::{http_client, read_json, resolve_base_url, transport_error};
use super::{AnalysisProvider, AnalysisRequest, ProviderError, ProviderResult};
use crate::config::{ProviderConfig, ProviderKind};
use crate::prompts::build_text_prompt;

pub const TEXT_DEFAULT_BASE_URL: &str = "https://api.deepseek.com";
pub const TEXT_DEFAULT_MODEL: &str = "deepseek-chat";

/// Provider that prompts for JSON in plain text.
pub struct TextPromptProvider {
    client: reqwest::blocking::Client,
    api_key: Option<String>,
    /// Fixed model; `None` means discover a vision model per request
    model: Option<String>,
}

impl TextPromptProvider {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        Ok(Self {
            client: http_client(config)?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// List models and pick a vision-capable one.
    fn discover_model(&self, base_url: &str, api_key: &str) -> ProviderResult<String> {
        let response = self
            .client
            .get(format!("{}/models", base_url))
            .bearer_auth(api_key)
            .send()
            .map_err(transport_error)?;

        let listing = read_json(response)?;
        let model = select_model(&listing);
        tracing::info!(model = %model, "Selected model from listing");
        Ok(model)
    }
}

impl AnalysisProvider for TextPromptProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::TextPrompt
    }

    fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    fn generate(&self, request: &AnalysisRequest) -> ProviderResult<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Unauthorized("API key not found".into()))?;

        let base_url = resolve_base_url(request.proxy_url.as_deref(), TEXT_DEFAULT_BASE_URL);
        let model = match &self.model {
            Some(model) => model.clone(),
            None => self.discover_model(&base_url, api_key)?,
        };

        tracing::info!(model = %model, image_len = request.image_base64.len(), "Requesting text analysis");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", base_url))
            .bearer_auth(api_key)
            .json(&chat_body(&model, request))
            .send()
            .map_err(transport_error)?;

        chat_text(&read_json(response)?)
    }
}

/// Chat request: one user message carrying the instruction and the image.
pub fn chat_body(model: &str, request: &AnalysisRequest) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": build_text_prompt() },
                {
                    "type": "image_url",
                    "image_url": {
                        "url": format!("data:{};base64,{}", request.mime_type, request.image_base64)
                    }
                }
            ]
        }],
        "response_format": { "type": "text" }
    })
}

/// `choices[0].message.content` of a chat completion.
pub fn chat_text(response: &Value) -> ProviderResult<String> {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|content| !content.is_empty())
        .map(String::from)
        .ok_or_else(|| {
            ProviderError::Envelope(format!("Invalid chat completion format: {}", response))
        })
}

/// First listed model whose id mentions `vl` or `vision`, else [`TEXT_DEFAULT_MODEL`].
pub fn select_model(listing: &Value) -> String {
    let entries = listing
        .pointer("/data")
        .or_else(|| listing.pointer("/list/data"))
        .and_then(Value::as_array);

    entries
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.get("id").and_then(Value::as_str))
        .find(|id| id.contains("vl") || id.contains("vision"))
        .unwrap_or(TEXT_DEFAULT_MODEL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            image_base64: "iVBORw0KGgo".into(),
            mime_type: "image/png".into(),
            proxy_url: Some("https://relay.local/".into()),
        }
    }

    #[test]
    fn test_chat_body_shape() {
        let body = chat_body("deepseek-vl2", &request());
        assert_eq!(body["model"], "deepseek-vl2");
        assert_eq!(body["response_format"]["type"], "text");

        let content = body["messages"][0]["content"].as_array().unwrap();
        assert_eq!(body["messages"][0]["role"], "user");
        assert!(content[0]["text"].as_str().unwrap().contains("JSON 格式"));
        assert_eq!(
            content[1]["image_url"]["url"],
            "data:image/png;base64,iVBORw0KGgo"
        );
    }

    #[test]
    fn test_chat_text() {
        let response = json!({
            "choices": [{ "message": { "role": "assistant", "content": "好的 {\"score\":4}" } }]
        });
        assert_eq!(chat_text(&response).unwrap(), "好的 {\"score\":4}");
    }

    #[test]
    fn test_chat_text_invalid() {
        assert!(matches!(chat_text(&json!({ "choices": [] })), Err(ProviderError::Envelope(_))));
        assert!(matches!(
            chat_text(&json!({ "choices": [{ "message": { "content": "" } }] })),
            Err(ProviderError::Envelope(_))
        ));
    }

    #[test]
    fn test_select_model_prefers_vision() {
        let listing = json!({
            "object": "list",
            "data": [ { "id": "deepseek-chat" }, { "id": "deepseek-vl2" }, { "id": "gpt-4-vision" } ]
        });
        assert_eq!(select_model(&listing), "deepseek-vl2");
    }

    #[test]
    fn test_select_model_nested_listing() {
        let listing = json!({ "list": { "data": [ { "id": "qwen-vision-max" } ] } });
        assert_eq!(select_model(&listing), "qwen-vision-max");
    }

    #[test]
    fn test_select_model_fallback() {
        assert_eq!(select_model(&json!({ "data": [ { "id": "deepseek-reasoner" } ] })), TEXT_DEFAULT_MODEL);
        assert_eq!(select_model(&json!({})), TEXT_DEFAULT_MODEL);
    }
}
