//! Shared fixtures for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pooch_pulse_llm::{
    AnalysisProvider, AnalysisRequest, ProviderError, ProviderKind, ProviderResult, ReportFields,
};

use crate::capture::ImageData;
use crate::models::HealthReport;

pub fn sample_image() -> ImageData {
    ImageData::from_data_uri("data:image/jpeg;base64,/9j/4AAQ").unwrap()
}

pub fn report_for(dog_id: &str, score: u8) -> HealthReport {
    let fields = ReportFields {
        score,
        consistency: "成形".into(),
        color: "棕色".into(),
        findings: Vec::new(),
        analysis: "测试".into(),
        recommendation: "继续观察".into(),
    };
    HealthReport::from_analysis(fields, dog_id.to_string(), &sample_image())
}

/// Provider returning a canned reply and recording every request.
pub struct MockProvider {
    credential: bool,
    reply: Result<String, ProviderError>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<AnalysisRequest>>>,
}

impl MockProvider {
    pub fn replying(text: &str) -> Self {
        Self {
            credential: true,
            reply: Ok(text.to_string()),
            calls: Arc::default(),
            requests: Arc::default(),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            reply: Err(error),
            ..Self::replying("")
        }
    }

    pub fn without_credential() -> Self {
        Self {
            credential: false,
            ..Self::replying("{}")
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<AnalysisRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl AnalysisProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::TextPrompt
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    fn generate(&self, request: &AnalysisRequest) -> ProviderResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.reply.clone()
    }
}
