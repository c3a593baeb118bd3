//! Risk record lifecycle.
//!
//! Derived fields (`risk_level`, `recommendations`) are computed here and
//! written in the same store call as the fields they derive from. Reads
//! return stored values as-is.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{RegisterError, Result};
use crate::models::{
    NewRisk, NewRiskRecord, Risk, RiskChanges, RiskFilter, RiskPatch, RiskStatus,
    RiskWithRecommendations,
};
use crate::repository::{CategoryStore, RiskStore};
use crate::services::{recommendations, scoring};

#[derive(Clone)]
pub struct RiskService {
    risks: Arc<dyn RiskStore>,
    categories: Arc<dyn CategoryStore>,
}

impl RiskService {
    pub fn new(risks: Arc<dyn RiskStore>, categories: Arc<dyn CategoryStore>) -> Self {
        Self { risks, categories }
    }

    /// Score a new risk, open it and persist it.
    pub async fn create(&self, new: NewRisk) -> Result<Risk> {
        self.ensure_category(new.category_id).await?;

        let level = scoring::severity(new.probability, new.impact);
        let text = recommendations::recommend(level, new.probability, new.impact);

        let record = NewRiskRecord {
            title: new.title,
            description: new.description,
            probability: new.probability,
            impact: new.impact,
            risk_level: level,
            status: RiskStatus::Open,
            owner: new.owner,
            mitigation_plan: new.mitigation_plan,
            recommendations: text,
            category_id: new.category_id,
            created_at: Utc::now(),
        };

        let risk = self.risks.insert(record).await?;
        info!(risk_id = risk.id, risk_level = %risk.risk_level, "risk created");
        Ok(risk)
    }

    pub async fn get(&self, id: i64) -> Result<Risk> {
        self.risks
            .get(id)
            .await?
            .ok_or_else(|| RegisterError::risk_not_found(id))
    }

    pub async fn list(&self, filter: &RiskFilter, offset: i64, limit: i64) -> Result<Vec<Risk>> {
        self.risks.list(filter, offset, limit).await
    }

    /// Apply a partial update.
    ///
    /// When the patch carries probability or impact, the tier and the
    /// recommendations are recomputed from the resulting pair (patched value,
    /// else stored value) and merged into the same write.
    pub async fn update(&self, id: i64, patch: RiskPatch) -> Result<Risk> {
        let current = self.get(id).await?;

        if let Some(category_id) = patch.category_id {
            if category_id != current.category_id {
                self.ensure_category(category_id).await?;
            }
        }

        let rescore = patch.touches_scoring();
        let mut changes = RiskChanges::from(patch);

        if rescore {
            let probability = changes.probability.unwrap_or(current.probability);
            let impact = changes.impact.unwrap_or(current.impact);
            let level = scoring::severity(probability, impact);

            debug!(
                risk_id = id,
                probability,
                impact,
                previous = %current.risk_level,
                risk_level = %level,
                "rescoring risk"
            );

            changes.risk_level = Some(level);
            changes.recommendations = Some(recommendations::recommend(level, probability, impact));
        }

        let updated = self
            .risks
            .update(id, changes)
            .await?
            .ok_or_else(|| RegisterError::risk_not_found(id))?;

        info!(risk_id = id, rescored = rescore, "risk updated");
        Ok(updated)
    }

    /// Overwrite the stored recommendations.
    ///
    /// Non-empty custom text is stored verbatim. Otherwise the text is
    /// regenerated from the stored tier, probability and impact.
    pub async fn refresh_recommendations(&self, id: i64, custom: Option<String>) -> Result<Risk> {
        let current = self.get(id).await?;

        let text = match custom.filter(|text| !text.is_empty()) {
            Some(text) => text,
            None => recommendations::recommend(
                current.risk_level,
                current.probability,
                current.impact,
            ),
        };

        let updated = self
            .risks
            .update(id, RiskChanges::recommendations(text))
            .await?
            .ok_or_else(|| RegisterError::risk_not_found(id))?;

        info!(risk_id = id, "recommendations refreshed");
        Ok(updated)
    }

    /// Remove a risk. Deleting an absent id reports `None`.
    pub async fn delete(&self, id: i64) -> Result<Option<Risk>> {
        let removed = self.risks.delete(id).await?;
        match &removed {
            Some(_) => info!(risk_id = id, "risk deleted"),
            None => debug!(risk_id = id, "delete of absent risk"),
        }
        Ok(removed)
    }

    /// The stored risk plus a detailed report built from its stored fields.
    pub async fn detailed(&self, id: i64) -> Result<RiskWithRecommendations> {
        let risk = self.get(id).await?;
        let detailed_recommendations =
            recommendations::detailed_report(risk.risk_level, risk.probability, risk.impact);

        Ok(RiskWithRecommendations {
            risk,
            detailed_recommendations,
        })
    }

    async fn ensure_category(&self, category_id: i64) -> Result<()> {
        match self.categories.get(category_id).await? {
            Some(_) => Ok(()),
            None => Err(RegisterError::UnknownCategory(category_id)),
        }
    }
}
