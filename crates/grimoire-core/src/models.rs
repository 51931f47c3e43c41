//! Entity and request types for categories and wizards.
//!
//! Wire format is camelCase. Request types keep every field optional so that
//! a missing field surfaces as a [`crate::Error::Validation`] from
//! [`crate::validation`] rather than as a body-decoding rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a new time-ordered identifier for a stored entity.
#[inline]
pub fn new_id() -> Uuid {
    Uuid::now_v7()
}

// =============================================================================
// ENTITIES
// =============================================================================

/// A grouping entity owning zero or more wizards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Back-reference: ids of wizards whose `category_id` is this category.
    /// Set semantics, kept in registration order.
    #[serde(default)]
    pub wizard_ids: Vec<Uuid>,
}

impl Category {
    /// True if `wizard_id` is registered with this category.
    pub fn owns(&self, wizard_id: Uuid) -> bool {
        self.wizard_ids.contains(&wizard_id)
    }
}

/// A content record that belongs to exactly one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wizard {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub category_id: Uuid,
}

/// A wizard with its owning category resolved inline.
///
/// `category` is `None` when the owner was deleted under the orphaning
/// delete policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardDetail {
    #[serde(flatten)]
    pub wizard: Wizard,
    pub category: Option<Category>,
}

// =============================================================================
// REQUESTS (unvalidated, as received)
// =============================================================================

/// Body of a category create request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub title: Option<String>,
    pub keywords: Option<Vec<String>>,
}

/// Body of a category update request. Every field is optional; an empty
/// body is a no-op update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub title: Option<String>,
    pub keywords: Option<Vec<String>>,
}

/// Body of a wizard create request.
///
/// `category_id` stays a string until validation so a malformed id can be
/// reported as not-found.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWizardRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    #[serde(alias = "category")]
    pub category_id: Option<String>,
}

/// Body of a wizard update request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWizardRequest {
    pub name: Option<String>,
    pub content: Option<String>,
    #[serde(alias = "category")]
    pub category_id: Option<String>,
}

// =============================================================================
// VALIDATED INPUTS (what repositories accept)
// =============================================================================

/// A category ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub title: String,
    pub keywords: Vec<String>,
}

/// A validated partial update of a category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryPatch {
    pub title: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.keywords.is_none()
    }

    /// Apply the patch to an in-memory category.
    pub fn apply(&self, category: &mut Category) {
        if let Some(title) = &self.title {
            category.title = title.clone();
        }
        if let Some(keywords) = &self.keywords {
            category.keywords = keywords.clone();
        }
    }
}

/// A wizard ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWizard {
    pub name: String,
    pub content: String,
    pub category_id: Uuid,
}

/// A validated partial update of a wizard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardPatch {
    pub name: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<Uuid>,
}

impl WizardPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none() && self.category_id.is_none()
    }

    /// Apply the patch to an in-memory wizard.
    pub fn apply(&self, wizard: &mut Wizard) {
        if let Some(name) = &self.name {
            wizard.name = name.clone();
        }
        if let Some(content) = &self.content {
            wizard.content = content.clone();
        }
        if let Some(category_id) = self.category_id {
            wizard.category_id = category_id;
        }
    }
}
