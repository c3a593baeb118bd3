//! Record stores for risks and categories.
//!
//! The services only talk to these traits. `RiskRepository` and
//! `CategoryRepository` persist to SQLite; the `memory` stores keep records
//! behind a lock in process.

pub mod category_repo;
pub mod memory;
pub mod risk_repo;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Category, NewCategory, NewRiskRecord, Risk, RiskChanges, RiskFilter};

pub use category_repo::CategoryRepository;
pub use memory::{MemoryCategoryStore, MemoryRiskStore};
pub use risk_repo::RiskRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiskStore: Send + Sync {
    /// Persist a complete record and return it with its assigned id.
    async fn insert(&self, record: NewRiskRecord) -> Result<Risk>;

    async fn get(&self, id: i64) -> Result<Option<Risk>>;

    /// Records matching `filter`, ordered by id.
    async fn list(&self, filter: &RiskFilter, offset: i64, limit: i64) -> Result<Vec<Risk>>;

    /// Apply `changes` in a single write. `None` when the id is absent.
    async fn update(&self, id: i64, changes: RiskChanges) -> Result<Option<Risk>>;

    /// Remove a record, returning it if it existed.
    async fn delete(&self, id: i64) -> Result<Option<Risk>>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Fails with `Conflict` when the name is already taken.
    async fn insert(&self, category: NewCategory) -> Result<Category>;

    async fn get(&self, id: i64) -> Result<Option<Category>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>>;

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Category>>;

    async fn update(&self, id: i64, category: NewCategory) -> Result<Option<Category>>;

    async fn delete(&self, id: i64) -> Result<Option<Category>>;
}
