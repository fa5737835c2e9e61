//! Report collection, most recent first.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::models::HealthReport;

/// Ordered report collection. New reports go to the front.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportStore {
    reports: VecDeque<HealthReport>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a report; it becomes the first element.
    pub fn add(&mut self, report: HealthReport) {
        self.reports.push_front(report);
    }

    /// Remove the first report with `id`. No-op if absent.
    pub fn remove(&mut self, id: &str) -> Option<HealthReport> {
        let index = self.reports.iter().position(|r| r.id == id)?;
        self.reports.remove(index)
    }

    pub fn get(&self, id: &str) -> Option<&HealthReport> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// Most recent report, if any.
    pub fn first(&self) -> Option<&HealthReport> {
        self.reports.front()
    }

    /// Reports for one dog, most recent first. Does not touch the store.
    pub fn for_dog(&self, dog_id: &str) -> Vec<&HealthReport> {
        self.reports.iter().filter(|r| r.dog_id == dog_id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HealthReport> {
        self.reports.iter()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports whose dog is not in `known_dog_ids`.
    pub fn orphaned<'a>(&'a self, known_dog_ids: &[&str]) -> Vec<&'a HealthReport> {
        self.reports
            .iter()
            .filter(|r| !known_dog_ids.contains(&r.dog_id.as_str()))
            .collect()
    }
}

impl FromIterator<HealthReport> for ReportStore {
    /// Collect in the given order (already most recent first).
    fn from_iter<I: IntoIterator<Item = HealthReport>>(iter: I) -> Self {
        Self {
            reports: iter.into_iter().collect(),
        }
    }
}
