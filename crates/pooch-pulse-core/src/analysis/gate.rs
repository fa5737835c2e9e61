//! Busy-state gate for submissions.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::models::AnalysisStatus;

/// How long a finished status stays visible before reverting to idle.
pub const STATUS_GRACE_PERIOD: Duration = Duration::from_secs(3);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("An analysis is already in progress")]
pub struct Busy;

/// Allows one outstanding submission at a time.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGate {
    status: AnalysisStatus,
    finished_at: Option<Instant>,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the loading state. Refused while a submission is outstanding.
    pub fn begin(&mut self) -> Result<(), Busy> {
        if self.status == AnalysisStatus::Loading {
            return Err(Busy);
        }
        self.status = AnalysisStatus::Loading;
        self.finished_at = None;
        Ok(())
    }

    /// Record the outcome of the outstanding submission.
    pub fn finish(&mut self, success: bool, now: Instant) {
        self.status = if success {
            AnalysisStatus::Success
        } else {
            AnalysisStatus::Error
        };
        self.finished_at = Some(now);
    }

    /// Current status; finished outcomes revert to idle after the grace period.
    pub fn status(&self, now: Instant) -> AnalysisStatus {
        match self.finished_at {
            Some(at) if now.saturating_duration_since(at) >= STATUS_GRACE_PERIOD => {
                AnalysisStatus::Idle
            }
            _ => self.status,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.status == AnalysisStatus::Loading
    }
}

/// An admitted submission on a shared gate.
///
/// Dropping it without calling [`Submission::finish`] (early return, panic
/// in the provider) records a failure, so the gate never stays loading.
pub struct Submission<'a> {
    gate: &'a Mutex<SubmissionGate>,
    finished: bool,
}

impl<'a> Submission<'a> {
    pub fn begin(gate: &'a Mutex<SubmissionGate>) -> Result<Self, Busy> {
        lock(gate).begin()?;
        Ok(Self {
            gate,
            finished: false,
        })
    }

    pub fn finish(mut self, success: bool) {
        self.finished = true;
        lock(self.gate).finish(success, Instant::now());
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!("Submission ended without an outcome");
            lock(self.gate).finish(false, Instant::now());
        }
    }
}

// Gate state stays consistent across a panic, so a poisoned lock is still usable.
fn lock(gate: &Mutex<SubmissionGate>) -> std::sync::MutexGuard<'_, SubmissionGate> {
    gate.lock().unwrap_or_else(PoisonError::into_inner)
}
