use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{RegisterError, Result, UnknownVariant};
use crate::services::scoring;

/// Lowest and highest accepted value for probability and impact at the API boundary.
pub const SCALE_MIN: i32 = 1;
pub const SCALE_MAX: i32 = 5;

/// Severity tier derived from probability × impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    pub fn urgency_label(self) -> &'static str {
        match self {
            RiskLevel::Low => "BAJA URGENCIA",
            RiskLevel::Medium => "URGENCIA MODERADA",
            RiskLevel::High => "ALTA URGENCIA",
            RiskLevel::Critical => "URGENCIA CRÍTICA",
        }
    }

    /// Suggested follow-up horizon printed in the report's next steps.
    pub fn follow_up_horizon(self) -> &'static str {
        match self {
            RiskLevel::Low => "30 días",
            RiskLevel::Medium => "15 días",
            RiskLevel::High => "7 días",
            RiskLevel::Critical => "24 horas",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RiskLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "risk level",
                value: s.to_string(),
            })
    }
}

/// Workflow status. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStatus {
    #[default]
    Open,
    InProgress,
    Closed,
    Mitigated,
}

impl RiskStatus {
    pub const ALL: [RiskStatus; 4] = [
        RiskStatus::Open,
        RiskStatus::InProgress,
        RiskStatus::Closed,
        RiskStatus::Mitigated,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskStatus::Open => "OPEN",
            RiskStatus::InProgress => "IN_PROGRESS",
            RiskStatus::Closed => "CLOSED",
            RiskStatus::Mitigated => "MITIGATED",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        RiskStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "risk status",
                value: s.to_string(),
            })
    }
}

/// A stored risk. `risk_level` and `recommendations` are derived fields
/// written together with probability and impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub probability: i32,
    pub impact: i32,
    pub risk_level: RiskLevel,
    pub status: RiskStatus,
    pub owner: String,
    pub mitigation_plan: Option<String>,
    pub recommendations: String,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Risk {
    pub fn score(&self) -> i32 {
        scoring::score(self.probability, self.impact)
    }
}

/// Client input for creating a risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRisk {
    pub title: String,
    pub description: String,
    pub probability: i32,
    pub impact: i32,
    pub owner: String,
    #[serde(default)]
    pub mitigation_plan: Option<String>,
    pub category_id: i64,
}

impl NewRisk {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("owner", &self.owner)?;
        require_scale("probability", self.probability)?;
        require_scale("impact", self.impact)
    }
}

/// Client input for a partial update. Absent fields are left untouched.
///
/// `mitigation_plan` is the only clearable field: an explicit `null` arrives
/// as `Some(None)` and removes the stored plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub probability: Option<i32>,
    pub impact: Option<i32>,
    pub status: Option<RiskStatus>,
    pub owner: Option<String>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub mitigation_plan: Option<Option<String>>,
    pub category_id: Option<i64>,
}

impl RiskPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_text("title", title)?;
        }
        if let Some(owner) = &self.owner {
            require_text("owner", owner)?;
        }
        if let Some(probability) = self.probability {
            require_scale("probability", probability)?;
        }
        if let Some(impact) = self.impact {
            require_scale("impact", impact)?;
        }
        Ok(())
    }

    /// Whether applying this patch requires the derived fields to be recomputed.
    pub fn touches_scoring(&self) -> bool {
        self.probability.is_some() || self.impact.is_some()
    }
}

/// Complete record handed to a store on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRiskRecord {
    pub title: String,
    pub description: String,
    pub probability: i32,
    pub impact: i32,
    pub risk_level: RiskLevel,
    pub status: RiskStatus,
    pub owner: String,
    pub mitigation_plan: Option<String>,
    pub recommendations: String,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Field set applied by a store in one write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub probability: Option<i32>,
    pub impact: Option<i32>,
    pub risk_level: Option<RiskLevel>,
    pub status: Option<RiskStatus>,
    pub owner: Option<String>,
    pub mitigation_plan: Option<Option<String>>,
    pub recommendations: Option<String>,
    pub category_id: Option<i64>,
}

impl RiskChanges {
    pub fn is_empty(&self) -> bool {
        *self == RiskChanges::default()
    }

    pub fn recommendations(text: impl Into<String>) -> Self {
        Self {
            recommendations: Some(text.into()),
            ..Self::default()
        }
    }

    /// Apply the change set to an in-memory record.
    pub fn apply_to(self, risk: &mut Risk) {
        if let Some(title) = self.title {
            risk.title = title;
        }
        if let Some(description) = self.description {
            risk.description = description;
        }
        if let Some(probability) = self.probability {
            risk.probability = probability;
        }
        if let Some(impact) = self.impact {
            risk.impact = impact;
        }
        if let Some(level) = self.risk_level {
            risk.risk_level = level;
        }
        if let Some(status) = self.status {
            risk.status = status;
        }
        if let Some(owner) = self.owner {
            risk.owner = owner;
        }
        if let Some(plan) = self.mitigation_plan {
            risk.mitigation_plan = plan;
        }
        if let Some(text) = self.recommendations {
            risk.recommendations = text;
        }
        if let Some(category_id) = self.category_id {
            risk.category_id = category_id;
        }
    }
}

impl From<RiskPatch> for RiskChanges {
    fn from(patch: RiskPatch) -> Self {
        Self {
            title: patch.title,
            description: patch.description,
            probability: patch.probability,
            impact: patch.impact,
            risk_level: None,
            status: patch.status,
            owner: patch.owner,
            mitigation_plan: patch.mitigation_plan,
            recommendations: None,
            category_id: patch.category_id,
        }
    }
}

/// Filters recognised by `RiskStore::list`. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFilter {
    pub category_id: Option<i64>,
    pub risk_level: Option<RiskLevel>,
    pub status: Option<RiskStatus>,
    pub probability_min: Option<i32>,
    pub probability_max: Option<i32>,
    pub impact_min: Option<i32>,
    pub impact_max: Option<i32>,
    /// Case-insensitive substring of the owner.
    pub owner: Option<String>,
}

impl RiskFilter {
    pub fn by_category(category_id: i64) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, risk: &Risk) -> bool {
        self.category_id.map_or(true, |id| risk.category_id == id)
            && self.risk_level.map_or(true, |level| risk.risk_level == level)
            && self.status.map_or(true, |status| risk.status == status)
            && self.probability_min.map_or(true, |min| risk.probability >= min)
            && self.probability_max.map_or(true, |max| risk.probability <= max)
            && self.impact_min.map_or(true, |min| risk.impact >= min)
            && self.impact_max.map_or(true, |max| risk.impact <= max)
            && self.owner.as_deref().map_or(true, |needle| {
                risk.owner.to_lowercase().contains(&needle.to_lowercase())
            })
    }
}

/// A risk together with its on-demand detailed report.
#[derive(Debug, Clone, Serialize)]
pub struct RiskWithRecommendations {
    #[serde(flatten)]
    pub risk: Risk,
    pub detailed_recommendations: String,
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegisterError::Validation(format!("{field} must not be blank")));
    }
    Ok(())
}

/// Present-but-null becomes `Some(None)`; `#[serde(default)]` covers absence.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Reject probability or impact values outside `SCALE_MIN..=SCALE_MAX`.
pub fn require_scale(field: &str, value: i32) -> Result<()> {
    if !(SCALE_MIN..=SCALE_MAX).contains(&value) {
        return Err(RegisterError::Validation(format!(
            "{field} must be between {SCALE_MIN} and {SCALE_MAX}, got {value}"
        )));
    }
    Ok(())
}
