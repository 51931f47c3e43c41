//! Wizard operations, including the category bookkeeping around create and
//! remove.
//!
//! ## Create
//!
//! 1. Validate the body (400 before anything else)
//! 2. Resolve the owning category (404, nothing persisted)
//! 3. Persist the wizard (409 on a duplicate name)
//! 4. Register it in the category's `wizardIds`
//!
//! If step 4 fails the wizard is deleted again and the error is returned.
//!
//! ## Remove
//!
//! The wizard is deleted first, then deregistered. A deregistration failure,
//! including an owner that no longer exists, is returned to the caller; the
//! deletion stands.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use grimoire_core::pagination::paginate;
use grimoire_core::validation::{
    parse_wizard_id, validate_new_wizard, validate_wizard_patch, ValidationRules,
};
use grimoire_core::{
    CategoryRepository, CreateWizardRequest, Error, Page, PageLinks, PageRequest,
    RelationshipManager, Result, Store, UpdateWizardRequest, Wizard, WizardDetail,
    WizardRepository,
};

#[derive(Clone)]
pub struct WizardService {
    wizards: Arc<dyn WizardRepository>,
    categories: Arc<dyn CategoryRepository>,
    relationships: RelationshipManager,
    rules: ValidationRules,
}

impl WizardService {
    pub fn new(store: &Store, rules: ValidationRules) -> Self {
        Self {
            wizards: store.wizards.clone(),
            categories: store.categories.clone(),
            relationships: RelationshipManager::new(store.categories.clone()),
            rules,
        }
    }

    pub async fn create(&self, req: CreateWizardRequest) -> Result<Wizard> {
        let new = validate_new_wizard(req, &self.rules)?;
        self.relationships.ensure_owner(new.category_id).await?;

        let wizard = self.wizards.insert(new).await?;

        if let Err(e) = self.relationships.register(&wizard).await {
            error!(
                subsystem = "api",
                component = "wizards",
                op = "create",
                partial_failure = true,
                wizard_id = %wizard.id,
                category_id = %wizard.category_id,
                error = %e,
                "Registration failed, removing persisted wizard"
            );
            if let Err(rollback) = self.wizards.delete(wizard.id).await {
                error!(
                    subsystem = "api",
                    component = "wizards",
                    op = "create",
                    partial_failure = true,
                    wizard_id = %wizard.id,
                    error = %rollback,
                    "Compensating delete failed"
                );
            }
            return Err(e);
        }

        info!(
            subsystem = "api",
            component = "wizards",
            op = "create",
            wizard_id = %wizard.id,
            category_id = %wizard.category_id,
            "Wizard created"
        );
        Ok(wizard)
    }

    /// Fetch a wizard with its owning category expanded. The category is
    /// `None` for an orphaned wizard.
    pub async fn get(&self, raw_id: &str) -> Result<WizardDetail> {
        let id = parse_wizard_id(raw_id)?;
        let wizard = self
            .wizards
            .get(id)
            .await?
            .ok_or(Error::WizardNotFound(id))?;
        let category = self.categories.get(wizard.category_id).await?;
        Ok(WizardDetail { wizard, category })
    }

    pub async fn list(&self, request: PageRequest) -> Result<(Page<Wizard>, PageLinks)> {
        let start = Instant::now();
        let result = paginate(self.wizards.as_ref(), request).await?;
        debug!(
            subsystem = "api",
            component = "wizards",
            op = "list",
            page = request.page,
            result_count = result.0.data.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Wizards listed"
        );
        Ok(result)
    }

    /// Apply a partial update. An empty patch returns the current wizard.
    ///
    /// A `categoryId` change is stored as given; neither category's
    /// `wizardIds` is adjusted.
    pub async fn update(&self, raw_id: &str, req: UpdateWizardRequest) -> Result<Wizard> {
        let id = parse_wizard_id(raw_id)?;
        let patch = validate_wizard_patch(req, &self.rules)?;
        let current = self
            .wizards
            .get(id)
            .await?
            .ok_or(Error::WizardNotFound(id))?;
        if patch.is_empty() {
            return Ok(current);
        }

        if let Some(new_owner) = patch.category_id {
            if new_owner != current.category_id {
                warn!(
                    subsystem = "api",
                    component = "wizards",
                    op = "update",
                    wizard_id = %id,
                    category_id = %new_owner,
                    previous_category_id = %current.category_id,
                    "categoryId changed without re-registration"
                );
            }
        }

        self.wizards
            .update(id, patch)
            .await?
            .ok_or(Error::WizardNotFound(id))
    }

    pub async fn remove(&self, raw_id: &str) -> Result<()> {
        let id = parse_wizard_id(raw_id)?;
        let wizard = self
            .wizards
            .delete(id)
            .await?
            .ok_or(Error::WizardNotFound(id))?;
        self.relationships.deregister(&wizard).await?;
        info!(
            subsystem = "api",
            component = "wizards",
            op = "remove",
            wizard_id = %id,
            category_id = %wizard.category_id,
            "Wizard deleted"
        );
        Ok(())
    }
}
