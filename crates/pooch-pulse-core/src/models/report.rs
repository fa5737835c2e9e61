//! Health report model.

use chrono::{DateTime, NaiveDate, Utc};
use pooch_pulse_llm::ReportFields;
use serde::{Deserialize, Serialize};

use super::score::{is_healthy_score, Severity};
use crate::capture::ImageData;

/// One analysed photo. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Unique report ID
    pub id: String,
    /// Owning dog profile ID (not enforced)
    pub dog_id: String,
    /// Creation timestamp, RFC 3339
    pub date: String,
    /// Fecal score 1-7, 0 when unscored
    pub score: u8,
    pub consistency: String,
    pub color: String,
    pub findings: Vec<String>,
    pub analysis: String,
    pub recommendation: String,
    /// Source photo as a data URI
    pub image_url: String,
}

impl HealthReport {
    /// Assemble a report from recovered fields, stamped with a fresh ID and the current time.
    pub fn from_analysis(fields: ReportFields, dog_id: String, image: &ImageData) -> Self {
        Self::from_analysis_at(fields, dog_id, image, Utc::now())
    }

    pub fn from_analysis_at(
        fields: ReportFields,
        dog_id: String,
        image: &ImageData,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            dog_id,
            date: created_at.to_rfc3339(),
            score: fields.score,
            consistency: fields.consistency,
            color: fields.color,
            findings: fields.findings,
            analysis: fields.analysis,
            recommendation: fields.recommendation,
            image_url: image.to_data_uri(),
        }
    }

    /// Parsed creation time, if the stored timestamp is valid.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Calendar date portion of the timestamp.
    pub fn date_key(&self) -> Option<NaiveDate> {
        if let Some(ts) = self.timestamp() {
            return Some(ts.date_naive());
        }
        let day = self.date.split('T').next()?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn severity(&self) -> Severity {
        Severity::from_score(self.score)
    }

    pub fn is_healthy(&self) -> bool {
        is_healthy_score(self.score)
    }
}
