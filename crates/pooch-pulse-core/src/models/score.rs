//! Fecal score classification.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Valid scores on the 1-7 scale.
pub const SCORE_RANGE: RangeInclusive<u8> = 1..=7;

/// Healthy band of the scale.
pub const IDEAL_BAND: RangeInclusive<u8> = 2..=3;

/// Severity bucket for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// 1: hard and dry
    Constipated,
    /// 2
    Ideal,
    /// 3
    Good,
    /// 4-7: soft through watery
    Loose,
    /// 0 or anything off the scale
    Unscored,
}

/// Badge color shown next to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeColor {
    Green,
    Yellow,
    Red,
}

impl Severity {
    pub fn from_score(score: u8) -> Self {
        match score {
            1 => Severity::Constipated,
            2 => Severity::Ideal,
            3 => Severity::Good,
            4..=7 => Severity::Loose,
            _ => Severity::Unscored,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Constipated => "干硬 (Constipated)",
            Severity::Ideal => "理想 (Ideal)",
            Severity::Good => "良好 (Good)",
            Severity::Loose => "软便/腹泻 (Loose/Diarrhea)",
            Severity::Unscored => "未评分 (Unscored)",
        }
    }

    pub fn badge(&self) -> BadgeColor {
        match self {
            Severity::Ideal => BadgeColor::Green,
            Severity::Constipated | Severity::Loose => BadgeColor::Red,
            Severity::Good | Severity::Unscored => BadgeColor::Yellow,
        }
    }
}

impl BadgeColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeColor::Green => "green",
            BadgeColor::Yellow => "yellow",
            BadgeColor::Red => "red",
        }
    }
}

/// Whether a score falls in the healthy band.
pub fn is_healthy_score(score: u8) -> bool {
    IDEAL_BAND.contains(&score)
}
