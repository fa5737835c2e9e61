//! PoochPulse Core Library
//!
//! Local-first stool-health journal for dogs. A photo goes to a remote
//! vision model; whatever comes back is recovered into a complete report and
//! kept per dog.
//!
//! # Architecture
//!
//! ```text
//! Camera / File → ImageData (data URI)
//!                     │
//!              [SubmissionGate: one at a time]
//!                     │
//!              AnalysisClient ──► AnalysisProvider (structured | text prompt)
//!                     │
//!        direct parse → braced parse → degraded default
//!                     │
//!              HealthReport (id, timestamp, image)
//!                     │
//!     ┌───────────────▼───────────────┐
//!     │  Journal: prepend to store    │
//!     │  rewrite app_state documents  │
//!     └───────────────┬───────────────┘
//!                     │
//!        ┌────────────┼────────────┬──────────────┐
//!        ▼            ▼            ▼              ▼
//!    Calendar       Trend     Daily summary   Report detail
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite key/value persistence
//! - [`models`]: Domain types (HealthReport, DogProfile, Severity)
//! - [`store`]: Report store, dog registry, application state
//! - [`journal`]: State plus write-through persistence
//! - [`capture`]: Image data and camera sessions
//! - [`analysis`]: Analysis client and submission gate
//! - [`views`]: Calendar, trend, summary, detail, knowledge base

pub mod analysis;
pub mod capture;
pub mod db;
pub mod journal;
pub mod models;
pub mod store;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use analysis::{AnalysisClient, AnalysisError, Submission, SubmissionGate};
pub use capture::ImageData;
pub use db::Database;
pub use journal::{Journal, JournalError};
pub use models::{AnalysisStatus, DogDraft, DogProfile, HealthReport, Severity};
pub use store::{AppState, DogRegistry, ReportStore};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate, Utc};
use pooch_pulse_llm::{ConfigError, ProviderConfig, ProviderKind};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum PoochPulseError {
    #[error("{0}")]
    ApiKeyMissing(String),

    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    ProviderError(String),

    #[error("An analysis is already in progress")]
    Busy,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<db::DbError> for PoochPulseError {
    fn from(e: db::DbError) -> Self {
        PoochPulseError::DatabaseError(e.to_string())
    }
}

impl From<AnalysisError> for PoochPulseError {
    fn from(e: AnalysisError) -> Self {
        let message = e.user_message();
        match e {
            AnalysisError::ApiKeyMissing => PoochPulseError::ApiKeyMissing(message),
            AnalysisError::InvalidCredential(_) => PoochPulseError::InvalidCredential(message),
            AnalysisError::Provider(_) => PoochPulseError::ProviderError(message),
        }
    }
}

impl From<JournalError> for PoochPulseError {
    fn from(e: JournalError) -> Self {
        match e {
            JournalError::Db(e) => e.into(),
            JournalError::Analysis(e) => e.into(),
            JournalError::Draft(e) => PoochPulseError::InvalidInput(e.to_string()),
            JournalError::UnknownDog(id) => PoochPulseError::NotFound(format!("dog {}", id)),
        }
    }
}

impl From<ConfigError> for PoochPulseError {
    fn from(e: ConfigError) -> Self {
        PoochPulseError::InvalidInput(e.to_string())
    }
}

impl From<capture::CaptureError> for PoochPulseError {
    fn from(e: capture::CaptureError) -> Self {
        PoochPulseError::InvalidInput(e.to_string())
    }
}

impl From<analysis::Busy> for PoochPulseError {
    fn from(_: analysis::Busy) -> Self {
        PoochPulseError::Busy
    }
}

impl<T> From<std::sync::PoisonError<T>> for PoochPulseError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PoochPulseError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a journal at the given path.
#[uniffi::export]
pub fn open_journal(
    path: String,
    provider: FfiProviderConfig,
) -> Result<Arc<PoochPulseCore>, PoochPulseError> {
    let db = Database::open(&path)?;
    PoochPulseCore::from_parts(Journal::open(db), provider.try_into()?).map(Arc::new)
}

/// Create an in-memory journal (for testing).
#[uniffi::export]
pub fn open_journal_in_memory(
    provider: FfiProviderConfig,
) -> Result<Arc<PoochPulseCore>, PoochPulseError> {
    let db = Database::open_in_memory()?;
    PoochPulseCore::from_parts(Journal::open(db), provider.try_into()?).map(Arc::new)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe journal wrapper for FFI.
///
/// The provider call runs without holding the journal lock; the submission
/// gate keeps it to one at a time.
#[derive(uniffi::Object)]
pub struct PoochPulseCore {
    journal: Mutex<Journal>,
    config: Mutex<ProviderConfig>,
    client: RwLock<Arc<AnalysisClient>>,
    gate: Mutex<SubmissionGate>,
}

impl PoochPulseCore {
    fn from_parts(journal: Journal, config: ProviderConfig) -> Result<Self, PoochPulseError> {
        let client = AnalysisClient::new(&config)?;
        Ok(Self::with_client(journal, config, client))
    }

    /// Assemble around an existing client (hosts embedding the crate directly, tests).
    pub fn with_client(journal: Journal, config: ProviderConfig, client: AnalysisClient) -> Self {
        Self {
            journal: Mutex::new(journal),
            config: Mutex::new(config),
            client: RwLock::new(Arc::new(client)),
            gate: Mutex::new(SubmissionGate::new()),
        }
    }

    fn run_analysis(&self, image: &ImageData) -> Result<HealthReport, PoochPulseError> {
        let (dog_id, proxy_url) = self.journal.lock()?.submission_context();
        let client = Arc::clone(&*self.client.read()?);

        let report = client.submit(image, &dog_id, proxy_url.as_deref())?;
        self.journal.lock()?.record_report(report.clone())?;
        Ok(report)
    }
}

#[uniffi::export]
impl PoochPulseCore {
    // =========================================================================
    // Credentials & Settings
    // =========================================================================

    /// Whether a provider credential is configured.
    pub fn has_api_key(&self) -> Result<bool, PoochPulseError> {
        Ok(self.client.read()?.has_credential())
    }

    /// Install the credential chosen in the host's key-selection flow.
    pub fn set_api_key(&self, api_key: String) -> Result<(), PoochPulseError> {
        let mut config = self.config.lock()?;
        let updated = config.clone().with_api_key(api_key);
        let client = AnalysisClient::new(&updated)?;
        *self.client.write()? = Arc::new(client);
        *config = updated;
        tracing::info!(provider = %config.kind, configured = config.has_credential(), "Credential updated");
        Ok(())
    }

    pub fn proxy_url(&self) -> Result<Option<String>, PoochPulseError> {
        Ok(self.journal.lock()?.proxy_url().map(String::from))
    }

    /// Set the proxy address; blank or `None` clears it.
    pub fn set_proxy_url(&self, url: Option<String>) -> Result<(), PoochPulseError> {
        self.journal.lock()?.set_proxy_url(url.as_deref())?;
        Ok(())
    }

    // =========================================================================
    // Analysis
    // =========================================================================

    /// Analyse a photo (data URI) for the active dog and record the report.
    pub fn analyze_image(&self, data_uri: String) -> Result<FfiHealthReport, PoochPulseError> {
        let image = ImageData::from_data_uri(&data_uri)?;
        let submission = Submission::begin(&self.gate)?;

        let result = self.run_analysis(&image);
        submission.finish(result.is_ok());
        result.map(Into::into)
    }

    /// Current busy state, as `IDLE`, `LOADING`, `SUCCESS` or `ERROR`.
    pub fn analysis_status(&self) -> Result<String, PoochPulseError> {
        Ok(self.gate.lock()?.status(Instant::now()).as_str().to_string())
    }

    // =========================================================================
    // Report Operations
    // =========================================================================

    /// Delete a report. Returns false if it did not exist.
    pub fn delete_report(&self, report_id: String) -> Result<bool, PoochPulseError> {
        Ok(self.journal.lock()?.delete_report(&report_id)?)
    }

    pub fn get_report(&self, report_id: String) -> Result<Option<FfiHealthReport>, PoochPulseError> {
        let journal = self.journal.lock()?;
        Ok(journal.state().reports.get(&report_id).cloned().map(Into::into))
    }

    /// Reports for the active dog, most recent first.
    pub fn list_reports(&self) -> Result<Vec<FfiHealthReport>, PoochPulseError> {
        let journal = self.journal.lock()?;
        Ok(journal
            .active_reports()
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    // =========================================================================
    // Dog Operations
    // =========================================================================

    pub fn list_dogs(&self) -> Result<Vec<FfiDogProfile>, PoochPulseError> {
        let journal = self.journal.lock()?;
        Ok(journal.state().dogs.all().iter().map(Into::into).collect())
    }

    pub fn active_dog(&self) -> Result<FfiDogProfile, PoochPulseError> {
        Ok(self.journal.lock()?.active_dog().into())
    }

    /// Create a profile and make it active.
    pub fn add_dog(&self, draft: FfiDogDraft) -> Result<FfiDogProfile, PoochPulseError> {
        let profile = self.journal.lock()?.add_dog(draft.into())?;
        Ok((&profile).into())
    }

    pub fn update_dog(
        &self,
        dog_id: String,
        draft: FfiDogDraft,
    ) -> Result<FfiDogProfile, PoochPulseError> {
        let profile = self.journal.lock()?.update_dog(&dog_id, draft.into())?;
        Ok((&profile).into())
    }

    pub fn select_dog(&self, dog_id: String) -> Result<(), PoochPulseError> {
        self.journal.lock()?.select_dog(&dog_id)?;
        Ok(())
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Month grid for the active dog. `month` is 1-based.
    pub fn month_view(&self, year: i32, month: u32) -> Result<FfiMonthView, PoochPulseError> {
        let cursor = views::MonthCursor::new(year, month)
            .ok_or_else(|| PoochPulseError::InvalidInput(format!("{}-{}", year, month)))?;
        let journal = self.journal.lock()?;
        let view = views::month_view(&journal.active_reports(), cursor, Utc::now().date_naive());
        Ok(view.into())
    }

    /// Active dog's reports on a `YYYY-MM-DD` date.
    pub fn reports_on_date(&self, date: String) -> Result<Vec<FfiHealthReport>, PoochPulseError> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| PoochPulseError::InvalidInput(format!("date {}", date)))?;
        let journal = self.journal.lock()?;
        Ok(views::reports_on(&journal.active_reports(), date)
            .into_iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    pub fn trend(&self) -> Result<FfiTrend, PoochPulseError> {
        let journal = self.journal.lock()?;
        Ok(views::trend(&journal.active_reports(), &Local).into())
    }

    pub fn daily_summary(
        &self,
        report_id: String,
    ) -> Result<Option<FfiDailySummary>, PoochPulseError> {
        let journal = self.journal.lock()?;
        let state = journal.state();
        Ok(state.reports.get(&report_id).map(|report| {
            let dog_name = state
                .dogs
                .get(&report.dog_id)
                .map(|d| d.name.as_str())
                .unwrap_or_default();
            views::daily_summary(report, dog_name, &Local).into()
        }))
    }

    pub fn report_detail(
        &self,
        report_id: String,
    ) -> Result<Option<FfiReportDetail>, PoochPulseError> {
        let journal = self.journal.lock()?;
        Ok(journal
            .state()
            .reports
            .get(&report_id)
            .map(|r| views::report_detail(r).into()))
    }

    pub fn knowledge_items(&self) -> Vec<FfiKnowledgeItem> {
        views::knowledge_items().iter().map(Into::into).collect()
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe provider settings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProviderConfig {
    /// `structured` or `text`
    pub kind: String,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl TryFrom<FfiProviderConfig> for ProviderConfig {
    type Error = PoochPulseError;

    fn try_from(ffi: FfiProviderConfig) -> Result<Self, Self::Error> {
        let kind: ProviderKind = ffi.kind.parse()?;
        let mut config = ProviderConfig::new(kind);
        if let Some(key) = ffi.api_key {
            config = config.with_api_key(key);
        }
        if let Some(model) = ffi.model {
            config = config.with_model(model);
        }
        if let Some(secs) = ffi.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// FFI-safe health report.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHealthReport {
    pub id: String,
    pub dog_id: String,
    pub date: String,
    pub score: u8,
    pub consistency: String,
    pub color: String,
    pub findings: Vec<String>,
    pub analysis: String,
    pub recommendation: String,
    pub image_url: String,
}

impl From<HealthReport> for FfiHealthReport {
    fn from(report: HealthReport) -> Self {
        Self {
            id: report.id,
            dog_id: report.dog_id,
            date: report.date,
            score: report.score,
            consistency: report.consistency,
            color: report.color,
            findings: report.findings,
            analysis: report.analysis,
            recommendation: report.recommendation,
            image_url: report.image_url,
        }
    }
}

/// FFI-safe dog profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDogProfile {
    pub id: String,
    pub name: String,
    pub breed: String,
    pub birth_date: Option<String>,
    pub weight: Option<String>,
    pub weight_label: String,
    pub avatar_url: String,
}

impl From<&DogProfile> for FfiDogProfile {
    fn from(dog: &DogProfile) -> Self {
        Self {
            id: dog.id.clone(),
            name: dog.name.clone(),
            breed: dog.breed.clone(),
            birth_date: dog.birth_date.clone(),
            weight: dog.weight.clone(),
            weight_label: dog.weight_label(),
            avatar_url: dog.avatar_url(),
        }
    }
}

/// FFI-safe profile form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDogDraft {
    pub name: String,
    pub breed: Option<String>,
    pub birth_date: Option<String>,
    pub weight: Option<String>,
    pub custom_avatar_url: Option<String>,
}

impl From<FfiDogDraft> for DogDraft {
    fn from(draft: FfiDogDraft) -> Self {
        DogDraft {
            name: draft.name,
            breed: draft.breed,
            birth_date: draft.birth_date,
            weight: draft.weight,
            custom_avatar_url: draft.custom_avatar_url,
        }
    }
}

/// FFI-safe calendar cell.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCalendarDay {
    /// `YYYY-MM-DD`
    pub date: String,
    pub day: u32,
    pub report_count: u32,
    pub is_today: bool,
}

/// FFI-safe month grid.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMonthView {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub leading_blanks: u32,
    pub days: Vec<FfiCalendarDay>,
}

impl From<views::MonthView> for FfiMonthView {
    fn from(view: views::MonthView) -> Self {
        Self {
            year: view.cursor.year(),
            month: view.cursor.month(),
            label: view.label,
            leading_blanks: view.leading_blanks,
            days: view
                .days
                .into_iter()
                .map(|d| FfiCalendarDay {
                    date: d.date.format("%Y-%m-%d").to_string(),
                    day: d.day,
                    report_count: d.report_count as u32,
                    is_today: d.is_today,
                })
                .collect(),
        }
    }
}

/// FFI-safe trend point.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTrendPoint {
    pub label: String,
    pub score: u8,
    pub date: String,
}

/// FFI-safe trend series.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTrend {
    pub points: Vec<FfiTrendPoint>,
    pub y_min: u8,
    pub y_max: u8,
    pub ideal_low: u8,
    pub ideal_high: u8,
}

impl From<views::TrendSeries> for FfiTrend {
    fn from(series: views::TrendSeries) -> Self {
        Self {
            points: series
                .points
                .into_iter()
                .map(|p| FfiTrendPoint {
                    label: p.label,
                    score: p.score,
                    date: p.date,
                })
                .collect(),
            y_min: series.y_min,
            y_max: series.y_max,
            ideal_low: series.ideal_low,
            ideal_high: series.ideal_high,
        }
    }
}

/// FFI-safe summary card.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDailySummary {
    pub report_id: String,
    pub dog_name: String,
    pub healthy: bool,
    pub headline: String,
    pub consistency: String,
    pub analysed_at: String,
}

impl From<views::DailySummary> for FfiDailySummary {
    fn from(summary: views::DailySummary) -> Self {
        Self {
            report_id: summary.report_id,
            dog_name: summary.dog_name,
            healthy: summary.healthy,
            headline: summary.headline,
            consistency: summary.consistency,
            analysed_at: summary.analysed_at,
        }
    }
}

/// FFI-safe report detail.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiReportDetail {
    pub report: FfiHealthReport,
    pub severity_label: String,
    /// `green`, `yellow` or `red`
    pub badge: String,
    pub disclaimer: String,
}

impl From<views::ReportDetail> for FfiReportDetail {
    fn from(detail: views::ReportDetail) -> Self {
        Self {
            report: FfiHealthReport {
                id: detail.id,
                dog_id: detail.dog_id,
                date: detail.date,
                score: detail.score,
                consistency: detail.consistency,
                color: detail.color,
                findings: detail.findings,
                analysis: detail.analysis,
                recommendation: detail.recommendation,
                image_url: detail.image_url,
            },
            severity_label: detail.severity_label,
            badge: detail.badge.as_str().to_string(),
            disclaimer: detail.disclaimer,
        }
    }
}

/// FFI-safe knowledge tip.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiKnowledgeItem {
    pub title: String,
    pub description: String,
    pub icon: String,
}

impl From<&views::KnowledgeItem> for FfiKnowledgeItem {
    fn from(item: &views::KnowledgeItem) -> Self {
        Self {
            title: item.title.to_string(),
            description: item.description.to_string(),
            icon: item.icon.to_string(),
        }
    }
}
