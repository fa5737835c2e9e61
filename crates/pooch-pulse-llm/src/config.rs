//! Provider configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown provider kind: {0}")]
    UnknownProvider(String),

    #[error("POOCH_TIMEOUT_SECS must be a whole number, got {0:?}")]
    InvalidTimeout(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which provider implementation handles analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Schema-constrained generation (Gemini `generateContent`)
    Structured,
    /// Free-text chat completion with manual recovery (OpenAI-compatible)
    #[default]
    TextPrompt,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Structured => "structured",
            ProviderKind::TextPrompt => "text",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structured" | "gemini" => Ok(ProviderKind::Structured),
            "text" | "text_prompt" | "deepseek" | "openai" => Ok(ProviderKind::TextPrompt),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Provider settings.
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    /// API credential, `None` until provisioned
    pub api_key: Option<String>,
    /// Model override; `None` uses the provider default (or discovery)
    pub model: Option<String>,
    pub timeout: Duration,
}

// Hand-written so the key never reaches logs.
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(ProviderKind::default())
    }
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            model: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the credential. Blank or `"undefined"` values clear it.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = sanitize_credential(Some(key.into()));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        self.model = (!model.trim().is_empty()).then(|| model.trim().to_string());
        self
    }

    /// Whether a usable credential is configured.
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Load from environment variables.
    ///
    /// | Variable | Meaning |
    /// |----------|---------|
    /// | `POOCH_PROVIDER` | `structured`/`gemini` or `text`/`deepseek` (default `text`) |
    /// | `GEMINI_API_KEY`, `API_KEY` | credential for the structured provider |
    /// | `DEEPSEEK_API_KEY` | credential for the text provider |
    /// | `POOCH_MODEL` | model override |
    /// | `POOCH_TIMEOUT_SECS` | request timeout |
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let kind = match lookup("POOCH_PROVIDER") {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => ProviderKind::default(),
        };

        let api_key = match kind {
            ProviderKind::Structured => sanitize_credential(lookup("GEMINI_API_KEY"))
                .or_else(|| sanitize_credential(lookup("API_KEY"))),
            ProviderKind::TextPrompt => sanitize_credential(lookup("DEEPSEEK_API_KEY")),
        };

        let timeout = match lookup("POOCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mut config = Self::new(kind);
        config.api_key = api_key;
        config.timeout = Duration::from_secs(timeout);
        if let Some(model) = lookup("POOCH_MODEL") {
            config = config.with_model(model);
        }
        Ok(config)
    }
}

/// Treat blank values and the literal `"undefined"` as no credential.
pub fn sanitize_credential(raw: Option<String>) -> Option<String> {
    let key = raw?.trim().to_string();
    if key.is_empty() || key == "undefined" {
        None
    } else {
        Some(key)
    }
}
