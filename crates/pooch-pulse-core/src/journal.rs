//! The journal: application state plus its persistence boundary.
//!
//! State is loaded once at open. Every mutation is applied to a copy of the
//! affected collection, written out in full, and only then swapped into
//! [`AppState`], so a failed write leaves memory matching the database.

use thiserror::Error;

use crate::analysis::{AnalysisClient, AnalysisError};
use crate::capture::ImageData;
use crate::db::{Database, DbError, ACTIVE_DOG_KEY, DOGS_KEY, PROXY_URL_KEY, REPORTS_KEY};
use crate::models::{DogDraft, DogProfile, DraftError, HealthReport};
use crate::store::{AppState, DogRegistry, ReportStore};

/// Journal errors.
#[derive(Error, Debug)]
pub enum JournalError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Invalid profile: {0}")]
    Draft(#[from] DraftError),

    #[error("Unknown dog: {0}")]
    UnknownDog(String),
}

pub type JournalResult<T> = Result<T, JournalError>;

/// Persisted application state.
pub struct Journal {
    db: Database,
    state: AppState,
}

impl Journal {
    /// Load state from `db`. Missing or unreadable documents fall back to defaults.
    pub fn open(db: Database) -> Self {
        let state = load_state(&db);
        tracing::info!(
            reports = state.reports.len(),
            dogs = state.dogs.all().len(),
            active_dog = state.dogs.active_id(),
            "Journal loaded"
        );
        Self { db, state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    // ------------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------------

    /// Prepend a report and persist the collection.
    pub fn record_report(&mut self, report: HealthReport) -> JournalResult<()> {
        tracing::debug!(report_id = %report.id, dog_id = %report.dog_id, "Recording report");
        let mut reports = self.state.reports.clone();
        reports.add(report);
        self.commit_reports(reports)
    }

    /// Delete a report by ID. Returns false if it did not exist.
    pub fn delete_report(&mut self, id: &str) -> JournalResult<bool> {
        let mut reports = self.state.reports.clone();
        if reports.remove(id).is_none() {
            return Ok(false);
        }
        self.commit_reports(reports)?;
        Ok(true)
    }

    /// Reports for the active dog, most recent first.
    pub fn active_reports(&self) -> Vec<&HealthReport> {
        self.state.active_reports()
    }

    /// Dog and proxy a new submission should use.
    pub fn submission_context(&self) -> (String, Option<String>) {
        (
            self.state.dogs.active_id().to_string(),
            self.state.proxy_url.clone(),
        )
    }

    /// Run the analysis pipeline for the active dog and record the result.
    pub fn submit(
        &mut self,
        client: &AnalysisClient,
        image: &ImageData,
    ) -> JournalResult<HealthReport> {
        let (dog_id, proxy_url) = self.submission_context();
        let report = client.submit(image, &dog_id, proxy_url.as_deref())?;
        self.record_report(report.clone())?;
        Ok(report)
    }

    // ------------------------------------------------------------------------
    // Dogs
    // ------------------------------------------------------------------------

    /// Create a profile from the form and make it active.
    pub fn add_dog(&mut self, draft: DogDraft) -> JournalResult<DogProfile> {
        let profile = draft.into_profile()?;
        let mut dogs = self.state.dogs.clone();
        dogs.add(profile.clone());
        self.commit_dogs(dogs)?;
        tracing::info!(dog_id = %profile.id, "Dog profile added");
        Ok(profile)
    }

    /// Edit an existing profile in place.
    pub fn update_dog(&mut self, id: &str, draft: DogDraft) -> JournalResult<DogProfile> {
        let existing = self
            .state
            .dogs
            .get(id)
            .ok_or_else(|| JournalError::UnknownDog(id.to_string()))?;
        let updated = draft.apply_to(existing)?;
        let mut dogs = self.state.dogs.clone();
        dogs.update(updated.clone());
        self.commit_dogs(dogs)?;
        Ok(updated)
    }

    /// Switch the active dog.
    pub fn select_dog(&mut self, id: &str) -> JournalResult<()> {
        let mut dogs = self.state.dogs.clone();
        if !dogs.select(id) {
            return Err(JournalError::UnknownDog(id.to_string()));
        }
        self.db.put_state(ACTIVE_DOG_KEY, dogs.stored_active_id())?;
        self.state.dogs = dogs;
        Ok(())
    }

    pub fn active_dog(&self) -> &DogProfile {
        self.state.dogs.active()
    }

    // ------------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------------

    pub fn proxy_url(&self) -> Option<&str> {
        self.state.proxy_url.as_deref()
    }

    /// Set or clear (blank/None) the proxy address.
    pub fn set_proxy_url(&mut self, url: Option<&str>) -> JournalResult<()> {
        let url = url.map(str::trim).filter(|u| !u.is_empty()).map(String::from);
        match &url {
            Some(u) => self.db.put_state(PROXY_URL_KEY, u)?,
            None => {
                self.db.delete_state(PROXY_URL_KEY)?;
            }
        }
        self.state.proxy_url = url;
        Ok(())
    }

    fn commit_reports(&mut self, reports: ReportStore) -> JournalResult<()> {
        self.db.put_json(REPORTS_KEY, &reports)?;
        self.state.reports = reports;
        Ok(())
    }

    /// Profiles and the active id are written together.
    fn commit_dogs(&mut self, dogs: DogRegistry) -> JournalResult<()> {
        let json = serde_json::to_string(dogs.all()).map_err(DbError::from)?;
        self.db.put_states(&[
            (DOGS_KEY, json.as_str()),
            (ACTIVE_DOG_KEY, dogs.stored_active_id()),
        ])?;
        self.state.dogs = dogs;
        Ok(())
    }
}

fn load_state(db: &Database) -> AppState {
    let reports = db
        .get_json::<ReportStore>(REPORTS_KEY)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Saved reports unreadable, starting empty");
            None
        })
        .unwrap_or_default();

    let dogs = db
        .get_json::<Vec<DogProfile>>(DOGS_KEY)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Saved dog profiles unreadable, seeding default");
            None
        })
        .unwrap_or_default();

    let active_id = db.get_state(ACTIVE_DOG_KEY).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Saved active dog unreadable");
        None
    });

    let proxy_url = db
        .get_state(PROXY_URL_KEY)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Saved proxy address unreadable");
            None
        })
        .filter(|u| !u.trim().is_empty());

    AppState {
        reports,
        dogs: DogRegistry::from_parts(dogs, active_id),
        proxy_url,
    }
}
