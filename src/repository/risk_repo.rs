use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::RiskStore;
use crate::error::{RegisterError, Result};
use crate::models::{NewRiskRecord, Risk, RiskChanges, RiskFilter, RiskLevel, RiskStatus};

#[derive(Clone)]
pub struct RiskRepository {
    pool: SqlitePool,
}

impl RiskRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RiskStore for RiskRepository {
    async fn insert(&self, record: NewRiskRecord) -> Result<Risk> {
        let row = sqlx::query_as::<_, RiskRow>(
            r#"
            INSERT INTO risks (
                title, description, probability, impact, risk_level, status,
                owner, mitigation_plan, recommendations, category_id, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(record.title)
        .bind(record.description)
        .bind(record.probability)
        .bind(record.impact)
        .bind(record.risk_level.as_str())
        .bind(record.status.as_str())
        .bind(record.owner)
        .bind(record.mitigation_plan)
        .bind(record.recommendations)
        .bind(record.category_id)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: i64) -> Result<Option<Risk>> {
        sqlx::query_as::<_, RiskRow>("SELECT * FROM risks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Risk::try_from)
            .transpose()
    }

    async fn list(&self, filter: &RiskFilter, offset: i64, limit: i64) -> Result<Vec<Risk>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM risks WHERE 1 = 1");

        if let Some(category_id) = filter.category_id {
            query.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(level) = filter.risk_level {
            query.push(" AND risk_level = ").push_bind(level.as_str());
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(min) = filter.probability_min {
            query.push(" AND probability >= ").push_bind(min);
        }
        if let Some(max) = filter.probability_max {
            query.push(" AND probability <= ").push_bind(max);
        }
        if let Some(min) = filter.impact_min {
            query.push(" AND impact >= ").push_bind(min);
        }
        if let Some(max) = filter.impact_max {
            query.push(" AND impact <= ").push_bind(max);
        }
        if let Some(owner) = &filter.owner {
            query
                .push(" AND LOWER(owner) LIKE ")
                .push_bind(like_pattern(owner))
                .push(" ESCAPE '\\'");
        }

        query
            .push(" ORDER BY id LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = query
            .build_query_as::<RiskRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Risk::try_from).collect()
    }

    async fn update(&self, id: i64, changes: RiskChanges) -> Result<Option<Risk>> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        let mut query = QueryBuilder::<Sqlite>::new("UPDATE risks SET ");
        let mut fields = query.separated(", ");

        if let Some(title) = changes.title {
            fields.push("title = ").push_bind_unseparated(title);
        }
        if let Some(description) = changes.description {
            fields.push("description = ").push_bind_unseparated(description);
        }
        if let Some(probability) = changes.probability {
            fields.push("probability = ").push_bind_unseparated(probability);
        }
        if let Some(impact) = changes.impact {
            fields.push("impact = ").push_bind_unseparated(impact);
        }
        if let Some(level) = changes.risk_level {
            fields.push("risk_level = ").push_bind_unseparated(level.as_str());
        }
        if let Some(status) = changes.status {
            fields.push("status = ").push_bind_unseparated(status.as_str());
        }
        if let Some(owner) = changes.owner {
            fields.push("owner = ").push_bind_unseparated(owner);
        }
        if let Some(plan) = changes.mitigation_plan {
            fields.push("mitigation_plan = ").push_bind_unseparated(plan);
        }
        if let Some(text) = changes.recommendations {
            fields.push("recommendations = ").push_bind_unseparated(text);
        }
        if let Some(category_id) = changes.category_id {
            fields.push("category_id = ").push_bind_unseparated(category_id);
        }

        query.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        query
            .build_query_as::<RiskRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(Risk::try_from)
            .transpose()
    }

    async fn delete(&self, id: i64) -> Result<Option<Risk>> {
        sqlx::query_as::<_, RiskRow>("DELETE FROM risks WHERE id = ? RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Risk::try_from)
            .transpose()
    }
}

/// Case-insensitive substring pattern with LIKE wildcards escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[derive(sqlx::FromRow)]
struct RiskRow {
    id: i64,
    title: String,
    description: String,
    probability: i32,
    impact: i32,
    risk_level: String,
    status: String,
    owner: String,
    mitigation_plan: Option<String>,
    recommendations: String,
    category_id: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<RiskRow> for Risk {
    type Error = RegisterError;

    fn try_from(row: RiskRow) -> Result<Self> {
        let risk_level = row
            .risk_level
            .parse::<RiskLevel>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let status = row
            .status
            .parse::<RiskStatus>()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

        Ok(Risk {
            id: row.id,
            title: row.title,
            description: row.description,
            probability: row.probability,
            impact: row.impact,
            risk_level,
            status,
            owner: row.owner,
            mitigation_plan: row.mitigation_plan,
            recommendations: row.recommendations,
            category_id: row.category_id,
            created_at: row.created_at,
        })
    }
}
