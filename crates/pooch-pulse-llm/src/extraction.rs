//! Analysis result recovery from model output.
//!
//! Providers are not guaranteed to return well-formed JSON, so recovery runs a
//! three-stage chain:
//!
//! 1. [`parse_direct`]: the whole response is the object.
//! 2. [`parse_braced`]: the first balanced `{...}` span inside surrounding prose.
//! 3. [`RawFields::degraded`]: a fixed safe record.
//!
//! Whatever stage wins, [`RawFields::into_report_fields`] fills every absent
//! field with its default so callers always see a complete record.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Placeholder for unknown descriptive fields.
pub const UNKNOWN: &str = "未知";
/// Analysis text used when the field is absent.
pub const DEFAULT_ANALYSIS: &str = "无法分析图像";
/// Recommendation used when the field is absent.
pub const DEFAULT_RECOMMENDATION: &str = "请咨询专业兽医";
/// Score used when the field is absent or out of range ("unscored").
pub const UNSCORED: u8 = 0;

/// Score of the degraded record.
pub const DEGRADED_SCORE: u8 = 3;
/// Analysis text of the degraded record.
pub const DEGRADED_ANALYSIS: &str = "AI 分析失败，无法解析响应。";
/// Recommendation of the degraded record.
pub const DEGRADED_RECOMMENDATION: &str = "请重新尝试分析。";

/// Lowest valid fecal score.
pub const MIN_SCORE: u8 = 1;
/// Highest valid fecal score.
pub const MAX_SCORE: u8 = 7;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Fields as the model produced them. Anything may be missing or mistyped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFields {
    pub score: Option<Value>,
    pub consistency: Option<Value>,
    pub color: Option<Value>,
    pub findings: Option<Value>,
    pub analysis: Option<Value>,
    pub recommendation: Option<Value>,
}

/// Fully populated analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFields {
    /// Fecal score in `[1,7]`, or [`UNSCORED`]
    pub score: u8,
    pub consistency: String,
    pub color: String,
    pub findings: Vec<String>,
    pub analysis: String,
    pub recommendation: String,
}

/// Which recovery stage produced the fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStage {
    /// Whole response parsed as the object
    Direct,
    /// Object extracted from surrounding text
    Braced,
    /// Nothing usable, safe default record substituted
    Degraded,
}

/// Outcome of [`recover`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recovery {
    pub fields: RawFields,
    pub stage: RecoveryStage,
}

impl RawFields {
    /// The safe record used when the response cannot be parsed at all.
    pub fn degraded() -> Self {
        Self {
            score: Some(Value::from(DEGRADED_SCORE)),
            consistency: Some(Value::from(UNKNOWN)),
            color: Some(Value::from(UNKNOWN)),
            findings: Some(Value::Array(Vec::new())),
            analysis: Some(Value::from(DEGRADED_ANALYSIS)),
            recommendation: Some(Value::from(DEGRADED_RECOMMENDATION)),
        }
    }

    /// Replace every absent or invalid field with its default.
    pub fn into_report_fields(self) -> ReportFields {
        ReportFields {
            score: self.score.as_ref().and_then(normalize_score).unwrap_or(UNSCORED),
            consistency: text_or(self.consistency.as_ref(), UNKNOWN),
            color: text_or(self.color.as_ref(), UNKNOWN),
            findings: self.findings.as_ref().map(normalize_findings).unwrap_or_default(),
            analysis: text_or(self.analysis.as_ref(), DEFAULT_ANALYSIS),
            recommendation: text_or(self.recommendation.as_ref(), DEFAULT_RECOMMENDATION),
        }
    }
}

/// Stage 1: parse the whole response as the result object.
pub fn parse_direct(text: &str) -> ExtractionResult<RawFields> {
    let value: Value = serde_json::from_str(text.trim())?;
    object_fields(value)
}

/// Stage 2: parse the first balanced `{...}` span in the response.
pub fn parse_braced(text: &str) -> ExtractionResult<RawFields> {
    let span = first_balanced_object(text).ok_or_else(|| {
        ExtractionError::InvalidFormat("No balanced JSON object found in response".into())
    })?;
    let value: Value = serde_json::from_str(span)?;
    object_fields(value)
}

/// Run the full recovery chain. Never fails.
pub fn recover(text: &str) -> Recovery {
    match parse_direct(text) {
        Ok(fields) => {
            return Recovery {
                fields,
                stage: RecoveryStage::Direct,
            }
        }
        Err(e) => tracing::debug!(error = %e, "Direct parse failed, trying brace extraction"),
    }

    match parse_braced(text) {
        Ok(fields) => Recovery {
            fields,
            stage: RecoveryStage::Braced,
        },
        Err(e) => {
            tracing::warn!(
                error = %e,
                response_len = text.len(),
                "Could not recover analysis JSON, substituting default record"
            );
            Recovery {
                fields: RawFields::degraded(),
                stage: RecoveryStage::Degraded,
            }
        }
    }
}

/// Locate the first balanced brace span, ignoring braces inside string literals.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

fn object_fields(value: Value) -> ExtractionResult<RawFields> {
    if !value.is_object() {
        return Err(ExtractionError::InvalidFormat(
            "Response JSON is not an object".into(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

fn normalize_score(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    let rounded = raw.round();
    if rounded >= f64::from(MIN_SCORE) && rounded <= f64::from(MAX_SCORE) {
        Some(rounded as u8)
    } else {
        None
    }
}

fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => default.to_string(),
    }
}

fn normalize_findings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Value::String(s) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}
