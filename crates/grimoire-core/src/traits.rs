//! Core traits for grimoire's store abstraction.
//!
//! These traits define the interfaces that concrete stores must satisfy.
//! Handlers and services receive them as injected handles, never as
//! process-wide singletons.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CATEGORY REPOSITORY
// =============================================================================

/// Repository for category CRUD and back-reference maintenance.
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert a new category with empty `wizard_ids`.
    ///
    /// Fails with `Error::Conflict` if the title is taken.
    async fn insert(&self, new: NewCategory) -> Result<Category>;

    /// Fetch a category by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Category>>;

    /// Apply a patch. Returns `None` if the category does not exist.
    ///
    /// Fails with `Error::Conflict` if the patched title is taken.
    async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Option<Category>>;

    /// Delete a category, returning the removed record.
    async fn delete(&self, id: Uuid) -> Result<Option<Category>>;

    /// Add `wizard_id` to the category's `wizard_ids` as one atomic
    /// set-union. Idempotent. Returns `false` if the category does not exist.
    async fn add_wizard(&self, category_id: Uuid, wizard_id: Uuid) -> Result<bool>;

    /// Remove `wizard_id` from the category's `wizard_ids` atomically.
    /// Returns `false` if the category does not exist.
    async fn remove_wizard(&self, category_id: Uuid, wizard_id: Uuid) -> Result<bool>;
}

// =============================================================================
// WIZARD REPOSITORY
// =============================================================================

/// Repository for wizard CRUD and paged listing.
#[async_trait]
pub trait WizardRepository: Send + Sync {
    /// Insert a new wizard.
    ///
    /// Fails with `Error::Conflict` if the name is taken.
    async fn insert(&self, new: NewWizard) -> Result<Wizard>;

    /// Fetch a wizard by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Wizard>>;

    /// List wizards in insertion order, skipping `skip` and returning at
    /// most `limit`.
    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Wizard>>;

    /// Total number of wizards.
    async fn count(&self) -> Result<i64>;

    /// Apply a patch. Returns `None` if the wizard does not exist.
    async fn update(&self, id: Uuid, patch: WizardPatch) -> Result<Option<Wizard>>;

    /// Delete a wizard, returning the removed record.
    async fn delete(&self, id: Uuid) -> Result<Option<Wizard>>;

    /// Delete every wizard whose `category_id` is `category_id`.
    /// Returns the number removed.
    async fn delete_by_category(&self, category_id: Uuid) -> Result<u64>;
}

// =============================================================================
// HEALTH
// =============================================================================

/// Liveness check for the backing store.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Check if the store is reachable.
    async fn health_check(&self) -> Result<bool>;
}

/// Bundle of injected store handles.
#[derive(Clone)]
pub struct Store {
    pub categories: Arc<dyn CategoryRepository>,
    pub wizards: Arc<dyn WizardRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl Store {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        wizards: Arc<dyn WizardRepository>,
        health: Arc<dyn HealthCheck>,
    ) -> Self {
        Self {
            categories,
            wizards,
            health,
        }
    }
}
