pub mod categories;
pub mod recommendations;
pub mod risks;
pub mod scoring;
pub mod stats;

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::repository::{
    CategoryRepository, CategoryStore, MemoryCategoryStore, MemoryRiskStore, RiskRepository,
    RiskStore,
};

pub use categories::CategoryService;
pub use risks::RiskService;
pub use stats::StatsService;

pub struct AppState {
    pub config: Config,
    pub risks: RiskService,
    pub categories: CategoryService,
    pub stats: StatsService,
}

impl AppState {
    pub fn new(
        config: Config,
        risk_store: Arc<dyn RiskStore>,
        category_store: Arc<dyn CategoryStore>,
    ) -> Self {
        Self {
            config,
            risks: RiskService::new(risk_store.clone(), category_store.clone()),
            categories: CategoryService::new(category_store.clone(), risk_store.clone()),
            stats: StatsService::new(risk_store, category_store),
        }
    }

    /// State backed by the SQLite repositories.
    pub fn with_pool(pool: SqlitePool, config: Config) -> Self {
        Self::new(
            config,
            Arc::new(RiskRepository::new(pool.clone())),
            Arc::new(CategoryRepository::new(pool)),
        )
    }

    /// State backed by empty in-process stores.
    pub fn in_memory(config: Config) -> Self {
        Self::new(
            config,
            Arc::new(MemoryRiskStore::new()),
            Arc::new(MemoryCategoryStore::new()),
        )
    }
}
