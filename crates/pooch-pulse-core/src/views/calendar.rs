//! Calendar grouping and month navigation.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::models::HealthReport;

/// A displayed month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MonthCursor {
    first_day: NaiveDate,
}

impl MonthCursor {
    /// `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn prev(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_sub_months(Months::new(1))
                .unwrap_or(self.first_day),
        }
    }

    pub fn next(&self) -> Self {
        Self {
            first_day: self
                .first_day
                .checked_add_months(Months::new(1))
                .unwrap_or(self.first_day),
        }
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next().first_day;
        if next == self.first_day {
            return 31;
        }
        (next - self.first_day).num_days() as u32
    }

    /// Empty cells before day 1 in a Sunday-first week grid.
    pub fn leading_blanks(&self) -> u32 {
        self.first_day.weekday().num_days_from_sunday()
    }

    /// e.g. `2025年 3月`
    pub fn label(&self) -> String {
        format!("{}年 {}月", self.year(), self.month())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid month '{0}', expected YYYY-MM")]
pub struct InvalidMonth(pub String);

impl FromStr for MonthCursor {
    type Err = InvalidMonth;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(Self::containing)
            .map_err(|_| InvalidMonth(s.to_string()))
    }
}

/// One cell of the month grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub day: u32,
    pub report_count: usize,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthView {
    pub cursor: MonthCursor,
    pub label: String,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

/// Group reports by the calendar date of their timestamp, preserving order within a day.
///
/// Reports with an unreadable date are left out.
pub fn group_by_date<'a, I>(reports: I) -> BTreeMap<NaiveDate, Vec<&'a HealthReport>>
where
    I: IntoIterator<Item = &'a HealthReport>,
{
    let mut grouped: BTreeMap<NaiveDate, Vec<&'a HealthReport>> = BTreeMap::new();
    for report in reports {
        if let Some(day) = report.date_key() {
            grouped.entry(day).or_default().push(report);
        }
    }
    grouped
}

/// Month grid with per-day report counts.
pub fn month_view(reports: &[&HealthReport], cursor: MonthCursor, today: NaiveDate) -> MonthView {
    let grouped = group_by_date(reports.iter().copied());
    let days = (0..cursor.days_in_month())
        .filter_map(|offset| cursor.first_day.checked_add_days(chrono::Days::new(offset as u64)))
        .map(|date| CalendarDay {
            date,
            day: date.day(),
            report_count: grouped.get(&date).map_or(0, Vec::len),
            is_today: date == today,
        })
        .collect();

    MonthView {
        cursor,
        label: cursor.label(),
        leading_blanks: cursor.leading_blanks(),
        days,
    }
}

/// Reports on one calendar date, in store order.
pub fn reports_on<'a>(reports: &[&'a HealthReport], date: NaiveDate) -> Vec<&'a HealthReport> {
    reports
        .iter()
        .copied()
        .filter(|r| r.date_key() == Some(date))
        .collect()
}

/// Heading for a day's list, e.g. `03月14日 的记录`.
pub fn day_heading(date: NaiveDate) -> String {
    format!("{} 的记录", date.format("%m月%d日"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::report_for;

    fn dated(date: &str, score: u8) -> HealthReport {
        let mut report = report_for("dog-a", score);
        report.date = date.to_string();
        report
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cursor_navigation_wraps_years() {
        let jan = MonthCursor::new(2025, 1).unwrap();
        assert_eq!(jan.prev(), MonthCursor::new(2024, 12).unwrap());
        assert_eq!(jan.prev().next(), jan);
        assert_eq!(MonthCursor::new(2024, 12).unwrap().next(), jan);
        assert!(MonthCursor::new(2025, 13).is_none());
    }

    #[test]
    fn test_cursor_geometry() {
        let feb_leap = MonthCursor::new(2024, 2).unwrap();
        assert_eq!(feb_leap.days_in_month(), 29);
        // 2024-02-01 was a Thursday
        assert_eq!(feb_leap.leading_blanks(), 4);
        assert_eq!(feb_leap.label(), "2024年 2月");

        // 2025-06-01 was a Sunday
        assert_eq!(MonthCursor::new(2025, 6).unwrap().leading_blanks(), 0);
        assert_eq!(MonthCursor::new(2025, 4).unwrap().days_in_month(), 30);
    }

    #[test]
    fn test_cursor_from_str() {
        assert_eq!("2025-03".parse::<MonthCursor>(), Ok(MonthCursor::new(2025, 3).unwrap()));
        assert_eq!(
            "2025-3x".parse::<MonthCursor>(),
            Err(InvalidMonth("2025-3x".into()))
        );
        assert!("march".parse::<MonthCursor>().is_err());
    }

    #[test]
    fn test_group_by_date() {
        let a = dated("2025-03-14T08:00:00Z", 2);
        let b = dated("2025-03-14T20:00:00Z", 4);
        let c = dated("2025-03-15T09:00:00Z", 3);
        let bad = dated("yesterday", 3);
        let reports = [&b, &a, &c, &bad];

        let grouped = group_by_date(reports.iter().copied());
        assert_eq!(grouped.len(), 2);
        let day = &grouped[&ymd(2025, 3, 14)];
        assert_eq!(day.len(), 2);
        assert_eq!(day[0].score, 4);
    }

    #[test]
    fn test_month_view_counts() {
        let a = dated("2025-03-14T08:00:00Z", 2);
        let b = dated("2025-03-14T20:00:00Z", 4);
        let other_month = dated("2025-04-01T09:00:00Z", 3);
        let reports = [&a, &b, &other_month];

        let view = month_view(&reports, MonthCursor::new(2025, 3).unwrap(), ymd(2025, 3, 20));
        assert_eq!(view.days.len(), 31);
        assert_eq!(view.leading_blanks, 6);
        assert_eq!(view.days[13].report_count, 2);
        assert_eq!(view.days.iter().map(|d| d.report_count).sum::<usize>(), 2);
        assert!(view.days[19].is_today);
        assert_eq!(view.days.iter().filter(|d| d.is_today).count(), 1);
    }

    #[test]
    fn test_reports_on() {
        let a = dated("2025-03-14T08:00:00Z", 2);
        let b = dated("2025-03-15T08:00:00Z", 5);
        let reports = [&a, &b];

        let on = reports_on(&reports, ymd(2025, 3, 15));
        assert_eq!(on.len(), 1);
        assert_eq!(on[0].score, 5);
        assert!(reports_on(&reports, ymd(2025, 1, 1)).is_empty());
        assert_eq!(day_heading(ymd(2025, 3, 5)), "03月05日 的记录");
    }
}
