//! In-process stores. Each operation takes the lock once, so a read-modify-write
//! on one id cannot interleave with another write.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::{CategoryStore, RiskStore};
use crate::error::{RegisterError, Result};
use crate::models::{Category, NewCategory, NewRiskRecord, Risk, RiskChanges, RiskFilter};

struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn page<'a, T: 'a>(
    rows: impl Iterator<Item = &'a T>,
    offset: i64,
    limit: i64,
) -> impl Iterator<Item = &'a T> {
    rows.skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
}

#[derive(Default)]
pub struct MemoryRiskStore {
    table: RwLock<Table<Risk>>,
}

impl MemoryRiskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RiskStore for MemoryRiskStore {
    async fn insert(&self, record: NewRiskRecord) -> Result<Risk> {
        let mut table = self.table.write();
        let id = table.allocate_id();

        let risk = Risk {
            id,
            title: record.title,
            description: record.description,
            probability: record.probability,
            impact: record.impact,
            risk_level: record.risk_level,
            status: record.status,
            owner: record.owner,
            mitigation_plan: record.mitigation_plan,
            recommendations: record.recommendations,
            category_id: record.category_id,
            created_at: record.created_at,
        };
        table.rows.insert(id, risk.clone());

        Ok(risk)
    }

    async fn get(&self, id: i64) -> Result<Option<Risk>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn list(&self, filter: &RiskFilter, offset: i64, limit: i64) -> Result<Vec<Risk>> {
        let table = self.table.read();
        let matching = table.rows.values().filter(|risk| filter.matches(risk));

        Ok(page(matching, offset, limit).cloned().collect())
    }

    async fn update(&self, id: i64, changes: RiskChanges) -> Result<Option<Risk>> {
        let mut table = self.table.write();

        Ok(table.rows.get_mut(&id).map(|risk| {
            changes.apply_to(risk);
            risk.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Risk>> {
        Ok(self.table.write().rows.remove(&id))
    }
}

#[derive(Default)]
pub struct MemoryCategoryStore {
    table: RwLock<Table<Category>>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_unique_name(table: &Table<Category>, name: &str, except: Option<i64>) -> Result<()> {
    let taken = table
        .rows
        .values()
        .any(|existing| existing.name == name && Some(existing.id) != except);

    if taken {
        return Err(RegisterError::Conflict(format!(
            "category name `{name}` already exists"
        )));
    }
    Ok(())
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn insert(&self, category: NewCategory) -> Result<Category> {
        let mut table = self.table.write();
        ensure_unique_name(&table, &category.name, None)?;

        let created = Category {
            id: table.allocate_id(),
            name: category.name,
            description: category.description,
        };
        table.rows.insert(created.id, created.clone());

        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.table.read().rows.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(self
            .table
            .read()
            .rows
            .values()
            .find(|category| category.name == name)
            .cloned())
    }

    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Category>> {
        let table = self.table.read();
        Ok(page(table.rows.values(), offset, limit).cloned().collect())
    }

    async fn update(&self, id: i64, category: NewCategory) -> Result<Option<Category>> {
        let mut table = self.table.write();
        if !table.rows.contains_key(&id) {
            return Ok(None);
        }
        ensure_unique_name(&table, &category.name, Some(id))?;

        Ok(table.rows.get_mut(&id).map(|existing| {
            existing.name = category.name;
            existing.description = category.description;
            existing.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<Option<Category>> {
        Ok(self.table.write().rows.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RiskLevel, RiskStatus};
    use chrono::Utc;

    fn record(owner: &str, probability: i32) -> NewRiskRecord {
        NewRiskRecord {
            title: format!("risk owned by {owner}"),
            description: String::new(),
            probability,
            impact: 1,
            risk_level: RiskLevel::Low,
            status: RiskStatus::Open,
            owner: owner.to_string(),
            mitigation_plan: None,
            recommendations: String::new(),
            category_id: 1,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_assigned_sequentially() {
        let store = MemoryRiskStore::new();
        let first = store.insert(record("a", 1)).await.unwrap();
        let second = store.insert(record("b", 2)).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_list_filters_then_pages() {
        let store = MemoryRiskStore::new();
        for (owner, p) in [("Ana", 1), ("Luis", 4), ("ana maria", 5), ("Pedro", 5)] {
            store.insert(record(owner, p)).await.unwrap();
        }

        let filter = RiskFilter {
            owner: Some("ANA".into()),
            ..RiskFilter::default()
        };
        let owners: Vec<String> = store
            .list(&filter, 0, 100)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.owner)
            .collect();
        assert_eq!(owners, vec!["Ana", "ana maria"]);

        let filter = RiskFilter {
            probability_min: Some(4),
            ..RiskFilter::default()
        };
        let paged = store.list(&filter, 1, 1).await.unwrap();
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].owner, "ana maria");
    }

    #[tokio::test]
    async fn test_update_and_delete_absent_ids() {
        let store = MemoryRiskStore::new();
        assert!(store.update(9, RiskChanges::default()).await.unwrap().is_none());
        assert!(store.delete(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_category_names_are_unique() {
        let store = MemoryCategoryStore::new();
        let legal = store.insert(NewCategory::new("Legal", None)).await.unwrap();
        let other = store.insert(NewCategory::new("Financiero", None)).await.unwrap();

        let dup = store.insert(NewCategory::new("Legal", None)).await;
        assert!(matches!(dup, Err(RegisterError::Conflict(_))));

        // renaming onto an existing name conflicts, keeping its own name does not
        let rename = store.update(other.id, NewCategory::new("Legal", None)).await;
        assert!(matches!(rename, Err(RegisterError::Conflict(_))));
        let same = store
            .update(legal.id, NewCategory::new("Legal", Some("Normativo")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(same.description.as_deref(), Some("Normativo"));

        assert_eq!(store.find_by_name("Financiero").await.unwrap(), Some(other));
    }
}
