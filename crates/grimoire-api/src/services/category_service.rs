//! Category operations.
//!
//! Ids arrive as raw path strings; a malformed id is reported the same way
//! as an absent one.

use std::sync::Arc;

use tracing::{debug, info};

use grimoire_core::validation::{parse_category_id, validate_category_patch, validate_new_category};
use grimoire_core::{
    Category, CategoryRepository, CreateCategoryRequest, Error, Result, Store,
    UpdateCategoryRequest, WizardRepository,
};

use crate::config::CategoryDeletePolicy;

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    wizards: Arc<dyn WizardRepository>,
    delete_policy: CategoryDeletePolicy,
}

impl CategoryService {
    pub fn new(store: &Store, delete_policy: CategoryDeletePolicy) -> Self {
        Self {
            categories: store.categories.clone(),
            wizards: store.wizards.clone(),
            delete_policy,
        }
    }

    pub async fn create(&self, req: CreateCategoryRequest) -> Result<Category> {
        let new = validate_new_category(req)?;
        let category = self.categories.insert(new).await?;
        info!(
            subsystem = "api",
            component = "categories",
            op = "create",
            category_id = %category.id,
            "Category created"
        );
        Ok(category)
    }

    pub async fn get(&self, raw_id: &str) -> Result<Category> {
        let id = parse_category_id(raw_id)?;
        self.categories
            .get(id)
            .await?
            .ok_or(Error::CategoryNotFound(id))
    }

    /// Apply a partial update. An empty patch returns the current category.
    pub async fn update(&self, raw_id: &str, req: UpdateCategoryRequest) -> Result<Category> {
        let id = parse_category_id(raw_id)?;
        let patch = validate_category_patch(req)?;
        if patch.is_empty() {
            return self
                .categories
                .get(id)
                .await?
                .ok_or(Error::CategoryNotFound(id));
        }
        let category = self
            .categories
            .update(id, patch)
            .await?
            .ok_or(Error::CategoryNotFound(id))?;
        debug!(
            subsystem = "api",
            component = "categories",
            op = "update",
            category_id = %id,
            "Category updated"
        );
        Ok(category)
    }

    /// Delete a category, treating its wizards per the configured policy.
    pub async fn remove(&self, raw_id: &str) -> Result<()> {
        let id = parse_category_id(raw_id)?;

        match self.delete_policy {
            CategoryDeletePolicy::Orphan => {}
            CategoryDeletePolicy::Restrict => {
                let category = self
                    .categories
                    .get(id)
                    .await?
                    .ok_or(Error::CategoryNotFound(id))?;
                if !category.wizard_ids.is_empty() {
                    return Err(Error::Conflict(format!(
                        "Category {} still owns {} wizard(s)",
                        id,
                        category.wizard_ids.len()
                    )));
                }
            }
            CategoryDeletePolicy::Cascade => {
                if self.categories.get(id).await?.is_none() {
                    return Err(Error::CategoryNotFound(id));
                }
                let removed = self.wizards.delete_by_category(id).await?;
                debug!(
                    subsystem = "api",
                    component = "categories",
                    op = "remove",
                    category_id = %id,
                    result_count = removed,
                    "Cascaded to owned wizards"
                );
            }
        }

        self.categories
            .delete(id)
            .await?
            .ok_or(Error::CategoryNotFound(id))?;
        info!(
            subsystem = "api",
            component = "categories",
            op = "remove",
            category_id = %id,
            policy = ?self.delete_policy,
            "Category deleted"
        );
        Ok(())
    }
}
