//! Submission status.

use serde::{Deserialize, Serialize};

/// Where the analysis flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AnalysisStatus {
    /// Ready for a new photo
    #[default]
    Idle,
    /// Waiting on the provider
    Loading,
    /// Last submission produced a report
    Success,
    /// Last submission failed
    Error,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisStatus::Idle => "IDLE",
            AnalysisStatus::Loading => "LOADING",
            AnalysisStatus::Success => "SUCCESS",
            AnalysisStatus::Error => "ERROR",
        }
    }
}
