//! Relationship manager: keeps `Category::wizard_ids` consistent with the
//! `category_id` of every wizard.
//!
//! Two mutation points carry the bookkeeping:
//! - wizard creation: [`RelationshipManager::ensure_owner`] runs before the
//!   wizard is persisted, [`RelationshipManager::register`] after, and both
//!   complete before creation reports success.
//! - wizard removal: [`RelationshipManager::deregister`] runs after the
//!   delete has committed and before removal reports success.
//!
//! Membership changes use the store's atomic add/remove primitives, so two
//! concurrent creations under one category cannot lose a registration.
//! The steps are still not atomic with the primary mutation; a crash
//! between them leaves the invariant violated until reconciled.

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::models::{Category, Wizard};
use crate::traits::CategoryRepository;

/// Synchronizes category back-references with wizard ownership.
#[derive(Clone)]
pub struct RelationshipManager {
    categories: Arc<dyn CategoryRepository>,
}

impl RelationshipManager {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    /// Resolve the category a new wizard declares as its owner.
    ///
    /// Fails with [`Error::CategoryNotFound`] so the caller aborts before
    /// anything is persisted.
    pub async fn ensure_owner(&self, category_id: uuid::Uuid) -> Result<Category> {
        self.categories
            .get(category_id)
            .await?
            .ok_or(Error::CategoryNotFound(category_id))
    }

    /// Record a freshly persisted wizard in its category's `wizard_ids`.
    pub async fn register(&self, wizard: &Wizard) -> Result<()> {
        let found = self
            .categories
            .add_wizard(wizard.category_id, wizard.id)
            .await?;
        if !found {
            return Err(Error::CategoryNotFound(wizard.category_id));
        }
        debug!(
            subsystem = "core",
            component = "relationships",
            op = "register",
            category_id = %wizard.category_id,
            wizard_id = %wizard.id,
            "Wizard registered with category"
        );
        Ok(())
    }

    /// Drop a deleted wizard from its category's `wizard_ids`.
    ///
    /// The wizard deletion has already committed when this runs, so every
    /// failure is logged as a partial failure before it is returned. An
    /// owner that no longer exists (orphaned wizard) fails with
    /// [`Error::CategoryNotFound`].
    pub async fn deregister(&self, wizard: &Wizard) -> Result<()> {
        let err = match self
            .categories
            .remove_wizard(wizard.category_id, wizard.id)
            .await
        {
            Ok(true) => {
                debug!(
                    subsystem = "core",
                    component = "relationships",
                    op = "deregister",
                    category_id = %wizard.category_id,
                    wizard_id = %wizard.id,
                    "Wizard deregistered from category"
                );
                return Ok(());
            }
            Ok(false) => Error::CategoryNotFound(wizard.category_id),
            Err(e) => e,
        };

        error!(
            subsystem = "core",
            component = "relationships",
            op = "deregister",
            partial_failure = true,
            category_id = %wizard.category_id,
            wizard_id = %wizard.id,
            error = %err,
            "Wizard deleted but category back-reference not updated"
        );
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{new_id, CategoryPatch, NewCategory};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeCategories {
        rows: Mutex<HashMap<Uuid, Category>>,
    }

    impl FakeCategories {
        fn seed(&self) -> Uuid {
            let id = new_id();
            self.rows.lock().unwrap().insert(
                id,
                Category {
                    id,
                    title: format!("cat-{}", id),
                    keywords: vec![],
                    created_at: Utc::now(),
                    wizard_ids: vec![],
                },
            );
            id
        }

        fn wizard_ids(&self, id: Uuid) -> Vec<Uuid> {
            self.rows.lock().unwrap()[&id].wizard_ids.clone()
        }
    }

    #[async_trait]
    impl CategoryRepository for FakeCategories {
        async fn insert(&self, _new: NewCategory) -> Result<Category> {
            Err(Error::Internal("unused".into()))
        }
        async fn get(&self, id: Uuid) -> Result<Option<Category>> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }
        async fn update(&self, _id: Uuid, _patch: CategoryPatch) -> Result<Option<Category>> {
            Err(Error::Internal("unused".into()))
        }
        async fn delete(&self, id: Uuid) -> Result<Option<Category>> {
            Ok(self.rows.lock().unwrap().remove(&id))
        }
        async fn add_wizard(&self, category_id: Uuid, wizard_id: Uuid) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&category_id) {
                Some(c) => {
                    if !c.wizard_ids.contains(&wizard_id) {
                        c.wizard_ids.push(wizard_id);
                    }
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        async fn remove_wizard(&self, category_id: Uuid, wizard_id: Uuid) -> Result<bool> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&category_id) {
                Some(c) => {
                    c.wizard_ids.retain(|w| *w != wizard_id);
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    /// Every call fails, as a lost connection would.
    struct BrokenCategories;

    #[async_trait]
    impl CategoryRepository for BrokenCategories {
        async fn insert(&self, _new: NewCategory) -> Result<Category> {
            Err(Error::Internal("store offline".into()))
        }
        async fn get(&self, _id: Uuid) -> Result<Option<Category>> {
            Err(Error::Internal("store offline".into()))
        }
        async fn update(&self, _id: Uuid, _patch: CategoryPatch) -> Result<Option<Category>> {
            Err(Error::Internal("store offline".into()))
        }
        async fn delete(&self, _id: Uuid) -> Result<Option<Category>> {
            Err(Error::Internal("store offline".into()))
        }
        async fn add_wizard(&self, _category_id: Uuid, _wizard_id: Uuid) -> Result<bool> {
            Err(Error::Internal("store offline".into()))
        }
        async fn remove_wizard(&self, _category_id: Uuid, _wizard_id: Uuid) -> Result<bool> {
            Err(Error::Internal("store offline".into()))
        }
    }

    fn wizard_in(category_id: Uuid) -> Wizard {
        Wizard {
            id: new_id(),
            name: "Gandalf".into(),
            content: "You shall not pass".into(),
            timestamp: Utc::now(),
            category_id,
        }
    }

    #[tokio::test]
    async fn test_ensure_owner_missing_category() {
        let repo = Arc::new(FakeCategories::default());
        let manager = RelationshipManager::new(repo);
        let missing = new_id();
        let err = manager.ensure_owner(missing).await.unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_register_then_deregister() {
        let repo = Arc::new(FakeCategories::default());
        let category_id = repo.seed();
        let manager = RelationshipManager::new(repo.clone());

        let wizard = wizard_in(category_id);
        manager.register(&wizard).await.unwrap();
        assert_eq!(repo.wizard_ids(category_id), vec![wizard.id]);

        // Registering twice keeps set semantics
        manager.register(&wizard).await.unwrap();
        assert_eq!(repo.wizard_ids(category_id).len(), 1);

        manager.deregister(&wizard).await.unwrap();
        assert!(repo.wizard_ids(category_id).is_empty());
    }

    #[tokio::test]
    async fn test_register_without_owner_fails() {
        let repo = Arc::new(FakeCategories::default());
        let manager = RelationshipManager::new(repo);
        let wizard = wizard_in(new_id());
        let err = manager.register(&wizard).await.unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_deregister_orphan_is_category_not_found() {
        let repo = Arc::new(FakeCategories::default());
        let category_id = repo.seed();
        let manager = RelationshipManager::new(repo.clone());
        let wizard = wizard_in(category_id);
        manager.register(&wizard).await.unwrap();

        repo.delete(category_id).await.unwrap();
        let err = manager.deregister(&wizard).await.unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound(id) if id == category_id));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_deregister_store_failure_is_surfaced() {
        let manager = RelationshipManager::new(Arc::new(BrokenCategories));
        let err = manager.deregister(&wizard_in(new_id())).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
