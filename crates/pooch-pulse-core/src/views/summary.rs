//! Summary card and detail projections for a single report.

use chrono::TimeZone;
use serde::Serialize;

use crate::models::{BadgeColor, HealthReport, Severity};

pub const HEADLINE_HEALTHY: &str = "状态极佳";
pub const HEADLINE_ATTENTION: &str = "建议关注";

/// Shown under every detail view.
pub const DISCLAIMER: &str = "本分析由 AI 生成，仅供参考。AI 无法替代专业兽医诊断。如果您的宠物表现出精神萎靡、呕吐或持续腹泻，请立即咨询兽医。";

/// Card shown right after an analysis completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub report_id: String,
    pub dog_name: String,
    pub healthy: bool,
    pub headline: String,
    pub consistency: String,
    /// Local `HH:MM`, empty if the timestamp is unreadable
    pub analysed_at: String,
}

pub fn daily_summary<Tz>(report: &HealthReport, dog_name: &str, tz: &Tz) -> DailySummary
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let healthy = report.is_healthy();
    DailySummary {
        report_id: report.id.clone(),
        dog_name: dog_name.to_string(),
        healthy,
        headline: if healthy { HEADLINE_HEALTHY } else { HEADLINE_ATTENTION }.to_string(),
        consistency: report.consistency.clone(),
        analysed_at: report
            .timestamp()
            .map(|ts| ts.with_timezone(tz).format("%H:%M").to_string())
            .unwrap_or_default(),
    }
}

/// Everything the detail screen renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDetail {
    pub id: String,
    pub dog_id: String,
    pub date: String,
    pub score: u8,
    pub severity: Severity,
    pub severity_label: String,
    pub badge: BadgeColor,
    pub consistency: String,
    pub color: String,
    pub findings: Vec<String>,
    pub analysis: String,
    pub recommendation: String,
    pub image_url: String,
    pub disclaimer: String,
}

pub fn report_detail(report: &HealthReport) -> ReportDetail {
    let severity = report.severity();
    ReportDetail {
        id: report.id.clone(),
        dog_id: report.dog_id.clone(),
        date: report.date.clone(),
        score: report.score,
        severity,
        severity_label: severity.label().to_string(),
        badge: severity.badge(),
        consistency: report.consistency.clone(),
        color: report.color.clone(),
        findings: report.findings.clone(),
        analysis: report.analysis.clone(),
        recommendation: report.recommendation.clone(),
        image_url: report.image_url.clone(),
        disclaimer: DISCLAIMER.to_string(),
    }
}
