//! Score trend series.

use std::fmt::Display;

use chrono::{Datelike, TimeZone};
use serde::Serialize;

use crate::models::{HealthReport, IDEAL_BAND, SCORE_RANGE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// Axis label, e.g. `3月14日`
    pub label: String,
    pub score: u8,
    /// Report timestamp
    pub date: String,
}

/// Chart data: oldest first, fixed y-domain, shaded ideal band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendSeries {
    pub points: Vec<TrendPoint>,
    pub y_min: u8,
    pub y_max: u8,
    pub ideal_low: u8,
    pub ideal_high: u8,
}

/// Build the trend from reports in store order (most recent first).
pub fn trend<Tz>(reports: &[&HealthReport], tz: &Tz) -> TrendSeries
where
    Tz: TimeZone,
{
    let points = reports
        .iter()
        .rev()
        .map(|r| TrendPoint {
            label: point_label(r, tz),
            score: r.score,
            date: r.date.clone(),
        })
        .collect();

    TrendSeries {
        points,
        y_min: *SCORE_RANGE.start(),
        y_max: *SCORE_RANGE.end(),
        ideal_low: *IDEAL_BAND.start(),
        ideal_high: *IDEAL_BAND.end(),
    }
}

fn point_label<Tz: TimeZone>(report: &HealthReport, tz: &Tz) -> String {
    match report.timestamp() {
        Some(ts) => month_day(&ts.with_timezone(tz).date_naive()),
        None => report
            .date_key()
            .map(|d| month_day(&d))
            .unwrap_or_else(|| report.date.clone()),
    }
}

fn month_day<D: Datelike>(date: &D) -> String {
    format!("{}月{}日", date.month(), date.day())
}

impl TrendSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether `score` lies inside the shaded band.
    pub fn in_band(&self, score: u8) -> bool {
        (self.ideal_low..=self.ideal_high).contains(&score)
    }
}

impl Display for TrendPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.label, self.score)
    }
}
