//! In-memory store for tests and local development.
//!
//! Mirrors the PostgreSQL store's semantics: unique titles and names,
//! insertion-ordered wizard listing, and `wizard_ids` add/remove performed
//! under a single write lock.
//!
//! ```rust,ignore
//! use grimoire_db::MemoryStore;
//!
//! let store = MemoryStore::new().store();
//! let category = store.categories.insert(new_category).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use grimoire_core::{
    new_id, Category, CategoryPatch, CategoryRepository, Error, HealthCheck, NewCategory,
    NewWizard, Result, Store, Wizard, WizardPatch, WizardRepository,
};

#[derive(Default)]
struct Inner {
    categories: Vec<Category>,
    /// Kept in insertion order; that order is the listing order.
    wizards: Vec<Wizard>,
}

/// Shared in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle this store as injectable handles.
    pub fn store(&self) -> Store {
        Store::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }
}

fn duplicate_title() -> Error {
    Error::Conflict("A category with this title already exists".to_string())
}

fn duplicate_name() -> Error {
    Error::Conflict("A wizard with this name already exists".to_string())
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn insert(&self, new: NewCategory) -> Result<Category> {
        let mut inner = self.inner.write().await;
        if inner.categories.iter().any(|c| c.title == new.title) {
            return Err(duplicate_title());
        }
        let category = Category {
            id: new_id(),
            title: new.title,
            keywords: new.keywords,
            created_at: Utc::now(),
            wizard_ids: Vec::new(),
        };
        inner.categories.push(category.clone());
        Ok(category)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Category>> {
        let inner = self.inner.read().await;
        Ok(inner.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Option<Category>> {
        let mut inner = self.inner.write().await;
        if let Some(title) = &patch.title {
            if inner
                .categories
                .iter()
                .any(|c| c.id != id && &c.title == title)
            {
                return Err(duplicate_title());
            }
        }
        Ok(inner
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .map(|category| {
                patch.apply(category);
                category.clone()
            }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Category>> {
        let mut inner = self.inner.write().await;
        let position = inner.categories.iter().position(|c| c.id == id);
        Ok(position.map(|i| inner.categories.remove(i)))
    }

    async fn add_wizard(&self, category_id: Uuid, wizard_id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.categories.iter_mut().find(|c| c.id == category_id) {
            Some(category) => {
                if !category.wizard_ids.contains(&wizard_id) {
                    category.wizard_ids.push(wizard_id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_wizard(&self, category_id: Uuid, wizard_id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        match inner.categories.iter_mut().find(|c| c.id == category_id) {
            Some(category) => {
                category.wizard_ids.retain(|id| *id != wizard_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl WizardRepository for MemoryStore {
    async fn insert(&self, new: NewWizard) -> Result<Wizard> {
        let mut inner = self.inner.write().await;
        if inner.wizards.iter().any(|w| w.name == new.name) {
            return Err(duplicate_name());
        }
        let wizard = Wizard {
            id: new_id(),
            name: new.name,
            content: new.content,
            timestamp: Utc::now(),
            category_id: new.category_id,
        };
        inner.wizards.push(wizard.clone());
        Ok(wizard)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Wizard>> {
        let inner = self.inner.read().await;
        Ok(inner.wizards.iter().find(|w| w.id == id).cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Wizard>> {
        let inner = self.inner.read().await;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(inner.wizards.iter().skip(skip).take(limit).cloned().collect())
    }

    async fn count(&self) -> Result<i64> {
        let inner = self.inner.read().await;
        Ok(inner.wizards.len() as i64)
    }

    async fn update(&self, id: Uuid, patch: WizardPatch) -> Result<Option<Wizard>> {
        let mut inner = self.inner.write().await;
        if let Some(name) = &patch.name {
            if inner.wizards.iter().any(|w| w.id != id && &w.name == name) {
                return Err(duplicate_name());
            }
        }
        Ok(inner
            .wizards
            .iter_mut()
            .find(|w| w.id == id)
            .map(|wizard| {
                patch.apply(wizard);
                wizard.clone()
            }))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Wizard>> {
        let mut inner = self.inner.write().await;
        let position = inner.wizards.iter().position(|w| w.id == id);
        Ok(position.map(|i| inner.wizards.remove(i)))
    }

    async fn delete_by_category(&self, category_id: Uuid) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.wizards.len();
        inner.wizards.retain(|w| w.category_id != category_id);
        Ok((before - inner.wizards.len()) as u64)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
