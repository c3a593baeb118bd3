//! Severity scoring.
//!
//! The score is the plain product of probability and impact. Inputs are not
//! range-checked here: out-of-scale values are scored with the same formula
//! and threshold table, range validation happens at the API boundary.

pub use crate::models::RiskLevel;

/// Highest score still classified as `LOW`.
pub const LOW_MAX: i32 = 4;
/// Highest score still classified as `MEDIUM`.
pub const MEDIUM_MAX: i32 = 10;
/// Highest score still classified as `HIGH`.
pub const HIGH_MAX: i32 = 20;

pub fn score(probability: i32, impact: i32) -> i32 {
    probability.saturating_mul(impact)
}

/// Map (probability, impact) to a severity tier.
pub fn severity(probability: i32, impact: i32) -> RiskLevel {
    classify_score(score(probability, impact))
}

pub fn classify_score(score: i32) -> RiskLevel {
    if score <= LOW_MAX {
        RiskLevel::Low
    } else if score <= MEDIUM_MAX {
        RiskLevel::Medium
    } else if score <= HIGH_MAX {
        RiskLevel::High
    } else {
        RiskLevel::Critical
    }
}
