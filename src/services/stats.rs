//! Read-only aggregations over the record stores.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Risk, RiskFilter, RiskLevel, RiskStatus};
use crate::repository::{CategoryStore, RiskStore};

const RECENT_RISKS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub closed: usize,
    pub mitigated: usize,
    pub by_level: BTreeMap<RiskLevel, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: RiskLevel,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskSummary {
    pub id: i64,
    pub title: String,
    pub risk_level: RiskLevel,
    pub probability: i32,
    pub impact: i32,
    pub score: i32,
    pub owner: String,
    pub status: RiskStatus,
    pub category_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_risks: usize,
    pub risks_by_level: Vec<LevelSummary>,
    pub critical_risks_count: usize,
    pub high_risks_count: usize,
    pub recent_risks: Vec<RiskSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub category_id: i64,
    pub category_name: String,
    pub risk_count: usize,
    pub average_score: f64,
}

#[derive(Clone)]
pub struct StatsService {
    risks: Arc<dyn RiskStore>,
    categories: Arc<dyn CategoryStore>,
}

impl StatsService {
    pub fn new(risks: Arc<dyn RiskStore>, categories: Arc<dyn CategoryStore>) -> Self {
        Self { risks, categories }
    }

    async fn all_risks(&self) -> Result<Vec<Risk>> {
        self.risks.list(&RiskFilter::default(), 0, i64::MAX).await
    }

    async fn category_names(&self) -> Result<HashMap<i64, String>> {
        Ok(self
            .categories
            .list(0, i64::MAX)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect())
    }

    /// Counts per status and per level.
    pub async fn risk_stats(&self) -> Result<RiskStats> {
        let risks = self.all_risks().await?;
        let count_status = |status: RiskStatus| risks.iter().filter(|r| r.status == status).count();

        Ok(RiskStats {
            total: risks.len(),
            open: count_status(RiskStatus::Open),
            in_progress: count_status(RiskStatus::InProgress),
            closed: count_status(RiskStatus::Closed),
            mitigated: count_status(RiskStatus::Mitigated),
            by_level: count_levels(&risks),
        })
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary> {
        let mut risks = self.all_risks().await?;
        let names = self.category_names().await?;
        let by_level = count_levels(&risks);
        let total = risks.len();

        let risks_by_level = by_level
            .iter()
            .map(|(level, count)| LevelSummary {
                level: *level,
                count: *count,
                percentage: percentage(*count, total),
            })
            .collect();

        risks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let recent_risks = risks
            .into_iter()
            .take(RECENT_RISKS)
            .map(|risk| summarize(risk, &names))
            .collect();

        Ok(DashboardSummary {
            total_risks: total,
            critical_risks_count: by_level[&RiskLevel::Critical],
            high_risks_count: by_level[&RiskLevel::High],
            risks_by_level,
            recent_risks,
        })
    }

    /// Risk count and mean score for every category, including empty ones.
    pub async fn category_stats(&self) -> Result<Vec<CategoryStats>> {
        let risks = self.all_risks().await?;
        let categories = self.categories.list(0, i64::MAX).await?;

        Ok(categories
            .into_iter()
            .map(|category| {
                let scores: Vec<i32> = risks
                    .iter()
                    .filter(|r| r.category_id == category.id)
                    .map(Risk::score)
                    .collect();

                let average_score = if scores.is_empty() {
                    0.0
                } else {
                    round2(scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64)
                };

                CategoryStats {
                    category_id: category.id,
                    category_name: category.name,
                    risk_count: scores.len(),
                    average_score,
                }
            })
            .collect())
    }
}

fn count_levels(risks: &[Risk]) -> BTreeMap<RiskLevel, usize> {
    let mut counts: BTreeMap<RiskLevel, usize> =
        RiskLevel::ALL.iter().map(|level| (*level, 0)).collect();
    for risk in risks {
        *counts.entry(risk.risk_level).or_default() += 1;
    }
    counts
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 * 100.0 / total as f64)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn summarize(risk: Risk, names: &HashMap<i64, String>) -> RiskSummary {
    RiskSummary {
        id: risk.id,
        score: risk.score(),
        category_name: names.get(&risk.category_id).cloned(),
        title: risk.title,
        risk_level: risk.risk_level,
        probability: risk.probability,
        impact: risk.impact,
        owner: risk.owner,
        status: risk.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewCategory, NewRisk, RiskPatch};
    use crate::repository::{MemoryCategoryStore, MemoryRiskStore};
    use crate::services::RiskService;

    async fn populated() -> StatsService {
        let risks: Arc<dyn RiskStore> = Arc::new(MemoryRiskStore::new());
        let categories: Arc<dyn CategoryStore> = Arc::new(MemoryCategoryStore::new());
        let tech = categories
            .insert(NewCategory::new("Tecnológico", None))
            .await
            .unwrap();
        categories
            .insert(NewCategory::new("Legal", None))
            .await
            .unwrap();

        let service = RiskService::new(risks.clone(), categories.clone());
        for (p, i) in [(1, 1), (2, 3), (5, 5), (4, 5)] {
            service
                .create(NewRisk {
                    title: format!("risk {p}x{i}"),
                    description: String::new(),
                    probability: p,
                    impact: i,
                    owner: "it".into(),
                    mitigation_plan: None,
                    category_id: tech.id,
                })
                .await
                .unwrap();
        }
        service
            .update(
                1,
                RiskPatch {
                    status: Some(RiskStatus::Mitigated),
                    ..RiskPatch::default()
                },
            )
            .await
            .unwrap();

        StatsService::new(risks, categories)
    }

    #[tokio::test]
    async fn test_counts_by_status_and_level() {
        let stats = populated().await.risk_stats().await.unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.open, 3);
        assert_eq!(stats.mitigated, 1);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.by_level[&RiskLevel::Low], 1);
        assert_eq!(stats.by_level[&RiskLevel::Medium], 1);
        assert_eq!(stats.by_level[&RiskLevel::High], 1);
        assert_eq!(stats.by_level[&RiskLevel::Critical], 1);
    }

    #[tokio::test]
    async fn test_dashboard_summary() {
        let dashboard = populated().await.dashboard().await.unwrap();

        assert_eq!(dashboard.total_risks, 4);
        assert_eq!(dashboard.critical_risks_count, 1);
        assert_eq!(dashboard.high_risks_count, 1);
        assert_eq!(dashboard.risks_by_level.len(), 4);
        assert!(dashboard.risks_by_level.iter().all(|l| l.percentage == 25.0));
        assert_eq!(dashboard.recent_risks.len(), 4);
        assert!(dashboard
            .recent_risks
            .iter()
            .all(|r| r.category_name.as_deref() == Some("Tecnológico")));
        let max = dashboard.recent_risks.iter().find(|r| r.score == 25).unwrap();
        assert_eq!(max.risk_level, RiskLevel::Critical);
    }

    #[tokio::test]
    async fn test_category_stats_include_empty_categories() {
        let stats = populated().await.category_stats().await.unwrap();

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].risk_count, 4);
        // (1 + 6 + 25 + 20) / 4
        assert_eq!(stats[0].average_score, 13.0);
        assert_eq!(stats[1].risk_count, 0);
        assert_eq!(stats[1].average_score, 0.0);
    }

    #[tokio::test]
    async fn test_empty_register() {
        let service = StatsService::new(
            Arc::new(MemoryRiskStore::new()),
            Arc::new(MemoryCategoryStore::new()),
        );
        let dashboard = service.dashboard().await.unwrap();
        assert_eq!(dashboard.total_risks, 0);
        assert!(dashboard.risks_by_level.iter().all(|l| l.percentage == 0.0));
        assert!(dashboard.recent_risks.is_empty());
    }
}
