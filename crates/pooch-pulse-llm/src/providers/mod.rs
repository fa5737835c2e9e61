//! Vision-model providers.
//!
//! Both integrations sit behind [`AnalysisProvider`]. Each returns the primary
//! text field of the response; recovery into structured fields happens in
//! [`crate::extraction`] regardless of provider.

mod structured;
mod text_prompt;

pub use structured::*;
pub use text_prompt::*;

use thiserror::Error;

use crate::config::{ProviderConfig, ProviderKind};

/// Provider errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Credential rejected: {0}")]
    Unauthorized(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Provider error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response envelope: {0}")]
    Envelope(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// One analysis call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    /// Base64 image payload without the data-URI prefix
    pub image_base64: String,
    /// e.g. `image/jpeg`
    pub mime_type: String,
    /// User-configured intermediary, used verbatim as the base address
    pub proxy_url: Option<String>,
}

/// A remote model that turns an image into analysis text.
pub trait AnalysisProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether a credential is provisioned. Checked before any request.
    fn has_credential(&self) -> bool;

    /// Send the image with the fixed instruction and return the primary text field.
    fn generate(&self, request: &AnalysisRequest) -> ProviderResult<String>;
}

/// Construct the provider selected by configuration.
pub fn build(config: &ProviderConfig) -> ProviderResult<Box<dyn AnalysisProvider>> {
    match config.kind {
        ProviderKind::Structured => Ok(Box::new(StructuredProvider::new(config)?)),
        ProviderKind::TextPrompt => Ok(Box::new(TextPromptProvider::new(config)?)),
    }
}

/// Resolve the base address: trimmed proxy without trailing slash, else the default.
pub fn resolve_base_url(proxy_url: Option<&str>, default: &str) -> String {
    match proxy_url.map(str::trim) {
        Some(proxy) if !proxy.is_empty() => proxy.trim_end_matches('/').to_string(),
        _ => default.to_string(),
    }
}

/// Messages providers use when the credential is rejected or unknown.
const CREDENTIAL_MARKERS: &[&str] = &[
    "API key",
    "API Key must be set",
    "Requested entity was not found",
    "authentication",
];

/// Map a non-success HTTP response to a provider error.
pub fn classify_failure(status: u16, body: &str) -> ProviderError {
    let message = error_message(body);
    let credential_problem = CREDENTIAL_MARKERS
        .iter()
        .any(|marker| message.to_lowercase().contains(&marker.to_lowercase()));

    if status == 401 || status == 403 || credential_problem {
        ProviderError::Unauthorized(message)
    } else {
        ProviderError::Api { status, message }
    }
}

/// Pull `error.message` out of a JSON error body, or fall back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    ProviderError::Transport(e.to_string())
}

fn http_client(config: &ProviderConfig) -> ProviderResult<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!("pooch-pulse/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(transport_error)
}

/// Read a response, turning non-success statuses into classified errors.
fn read_json(response: reqwest::blocking::Response) -> ProviderResult<serde_json::Value> {
    let status = response.status();
    tracing::debug!(status = status.as_u16(), "Provider responded");

    let body = response.text().map_err(transport_error)?;
    if !status.is_success() {
        return Err(classify_failure(status.as_u16(), &body));
    }
    serde_json::from_str(&body)
        .map_err(|e| ProviderError::Envelope(format!("Response is not JSON: {}", e)))
}
