//! Report acquisition pipeline.
//!
//! Image in, fully populated [`HealthReport`] out. The provider returns text;
//! [`pooch_pulse_llm::recover`] turns it into fields no matter how garbled it is,
//! so a billed call always yields a report.

mod gate;

pub use gate::*;

use pooch_pulse_llm::{
    build_provider, recover, AnalysisProvider, AnalysisRequest, ProviderConfig, ProviderError,
};
use thiserror::Error;

use crate::capture::ImageData;
use crate::models::HealthReport;

/// Analysis errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("No provider credential configured")]
    ApiKeyMissing,

    #[error("Provider rejected the credential: {0}")]
    InvalidCredential(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    /// Whether the remedy is the credential setup flow.
    pub fn needs_credential(&self) -> bool {
        matches!(self, Self::ApiKeyMissing | Self::InvalidCredential(_))
    }

    /// Message shown to the user, with a remediation hint.
    pub fn user_message(&self) -> String {
        match self {
            Self::ApiKeyMissing | Self::InvalidCredential(_) => {
                "AI 引擎授权失效，请重新选择有效的 API Key。\n提示：如果在国内使用，请在设置中配置代理地址。"
                    .to_string()
            }
            Self::Provider(detail) => {
                format!("分析失败: {}\n提示：请检查网络或是否需要配置代理。", detail)
            }
        }
    }
}

impl From<ProviderError> for AnalysisError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::Unauthorized(message) => Self::InvalidCredential(message),
            ProviderError::Api { message, .. } => Self::Provider(message),
            other => Self::Provider(other.to_string()),
        }
    }
}

/// Sends images to the configured provider and assembles reports.
pub struct AnalysisClient {
    provider: Box<dyn AnalysisProvider>,
}

impl AnalysisClient {
    /// Build the provider selected by `config`.
    pub fn new(config: &ProviderConfig) -> AnalysisResult<Self> {
        Ok(Self::with_provider(build_provider(config)?))
    }

    pub fn with_provider(provider: Box<dyn AnalysisProvider>) -> Self {
        Self { provider }
    }

    pub fn has_credential(&self) -> bool {
        self.provider.has_credential()
    }

    /// Analyse one image for `dog_id`.
    ///
    /// Fails with [`AnalysisError::ApiKeyMissing`] before any network traffic
    /// when no credential is provisioned.
    pub fn submit(
        &self,
        image: &ImageData,
        dog_id: &str,
        proxy_url: Option<&str>,
    ) -> AnalysisResult<HealthReport> {
        if !self.provider.has_credential() {
            return Err(AnalysisError::ApiKeyMissing);
        }

        let kind = self.provider.kind();
        tracing::info!(
            provider = %kind,
            dog_id,
            image_len = image.base64.len(),
            proxied = proxy_url.is_some(),
            "Submitting image for analysis"
        );

        let request = AnalysisRequest {
            image_base64: image.base64.clone(),
            mime_type: image.mime_type.clone(),
            proxy_url: proxy_url.map(String::from),
        };
        let text = self.provider.generate(&request).map_err(|e| {
            tracing::warn!(provider = %kind, error = %e, "Analysis request failed");
            AnalysisError::from(e)
        })?;

        let recovery = recover(&text);
        let stage = recovery.stage;
        let report = HealthReport::from_analysis(
            recovery.fields.into_report_fields(),
            dog_id.to_string(),
            image,
        );
        tracing::info!(
            report_id = %report.id,
            score = report.score,
            ?stage,
            "Analysis complete"
        );
        Ok(report)
    }
}
