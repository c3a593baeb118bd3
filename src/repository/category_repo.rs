use async_trait::async_trait;
use sqlx::SqlitePool;

use super::CategoryStore;
use crate::error::{RegisterError, Result};
use crate::models::{Category, NewCategory};

#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for CategoryRepository {
    async fn insert(&self, category: NewCategory) -> Result<Category> {
        sqlx::query_as::<_, CategoryRow>(
            "INSERT INTO risk_categories (name, description) VALUES (?, ?) RETURNING *",
        )
        .bind(&category.name)
        .bind(&category.description)
        .fetch_one(&self.pool)
        .await
        .map(Category::from)
        .map_err(|e| duplicate_name(e, &category.name))
    }

    async fn get(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT * FROM risk_categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Category::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row =
            sqlx::query_as::<_, CategoryRow>("SELECT * FROM risk_categories WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Category::from))
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT * FROM risk_categories ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn update(&self, id: i64, category: NewCategory) -> Result<Option<Category>> {
        sqlx::query_as::<_, CategoryRow>(
            "UPDATE risk_categories SET name = ?, description = ? WHERE id = ? RETURNING *",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map(|row| row.map(Category::from))
        .map_err(|e| duplicate_name(e, &category.name))
    }

    /// A category still referenced by a risk fails the `ON DELETE RESTRICT`
    /// check and is reported as `CategoryInUse`.
    async fn delete(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "DELETE FROM risk_categories WHERE id = ? RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| still_referenced(e, id))?;

        Ok(row.map(Category::from))
    }
}

fn duplicate_name(err: sqlx::Error, name: &str) -> RegisterError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RegisterError::Conflict(format!("category name `{name}` already exists"))
        }
        other => RegisterError::from(other),
    }
}

fn still_referenced(err: sqlx::Error, id: i64) -> RegisterError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            RegisterError::CategoryInUse(id)
        }
        other => RegisterError::from(other),
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}
