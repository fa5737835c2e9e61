//! In-memory application state.

mod dogs;
mod reports;

pub use dogs::*;
pub use reports::*;

use crate::models::HealthReport;

/// Everything the journal holds between persistence writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub reports: ReportStore,
    pub dogs: DogRegistry,
    /// Base URL override for the AI endpoint
    pub proxy_url: Option<String>,
}

impl AppState {
    /// Reports for the active dog, most recent first.
    pub fn active_reports(&self) -> Vec<&HealthReport> {
        self.reports.for_dog(self.dogs.active_id())
    }
}
