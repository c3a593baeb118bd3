use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{RegisterError, Result};
use crate::models::{Category, NewCategory, RiskFilter};
use crate::repository::{CategoryStore, RiskStore};

/// Categories created on first start when they are missing.
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Operacional", "Fallas en procesos, personas o sistemas internos"),
    ("Financiero", "Pérdidas por mercado, crédito o liquidez"),
    ("Tecnológico", "Incidentes de infraestructura, software o seguridad de la información"),
    ("Legal y Cumplimiento", "Incumplimiento normativo, contractual o regulatorio"),
    ("Estratégico", "Decisiones de negocio y cambios del entorno competitivo"),
    ("Reputacional", "Daño a la imagen ante clientes, socios o la opinión pública"),
];

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryStore>,
    risks: Arc<dyn RiskStore>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryStore>, risks: Arc<dyn RiskStore>) -> Self {
        Self { categories, risks }
    }

    pub async fn create(&self, category: NewCategory) -> Result<Category> {
        let created = self.categories.insert(category).await?;
        info!(category_id = created.id, name = %created.name, "category created");
        Ok(created)
    }

    pub async fn get(&self, id: i64) -> Result<Category> {
        self.categories
            .get(id)
            .await?
            .ok_or_else(|| RegisterError::category_not_found(id))
    }

    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Category>> {
        self.categories.list(offset, limit).await
    }

    pub async fn update(&self, id: i64, category: NewCategory) -> Result<Category> {
        self.categories
            .update(id, category)
            .await?
            .ok_or_else(|| RegisterError::category_not_found(id))
    }

    /// Delete a category that no risk references.
    ///
    /// Returns `None` when the id is absent and `CategoryInUse` when at least
    /// one risk still points at it.
    pub async fn delete(&self, id: i64) -> Result<Option<Category>> {
        if self.categories.get(id).await?.is_none() {
            return Ok(None);
        }

        let referencing = self.risks.list(&RiskFilter::by_category(id), 0, 1).await?;
        if !referencing.is_empty() {
            return Err(RegisterError::CategoryInUse(id));
        }

        let removed = self.categories.delete(id).await?;
        info!(category_id = id, "category deleted");
        Ok(removed)
    }

    /// Insert every default category whose name is not taken yet.
    ///
    /// Safe to run on every start; returns how many categories were created.
    pub async fn seed_defaults(&self) -> Result<usize> {
        let mut created = 0;

        for (name, description) in DEFAULT_CATEGORIES {
            if self.categories.find_by_name(name).await?.is_some() {
                continue;
            }

            match self
                .categories
                .insert(NewCategory::new(*name, Some(*description)))
                .await
            {
                Ok(_) => created += 1,
                // another instance seeded it between the check and the insert
                Err(RegisterError::Conflict(_)) => debug!(name, "default category already present"),
                Err(e) => return Err(e),
            }
        }

        if created > 0 {
            info!(created, "seeded default categories");
        }
        Ok(created)
    }
}
