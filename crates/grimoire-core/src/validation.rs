//! Explicit validation of incoming requests.
//!
//! Each function turns an unvalidated request into the input type a
//! repository accepts, or fails with [`Error::Validation`]. Uniqueness is not
//! checked here; stores enforce it and report [`Error::Conflict`].

use uuid::Uuid;

use crate::defaults::WIZARD_CONTENT_MIN_LEN;
use crate::error::{Error, Result};
use crate::models::{
    CategoryPatch, CreateCategoryRequest, CreateWizardRequest, NewCategory, NewWizard,
    UpdateCategoryRequest, UpdateWizardRequest, WizardPatch,
};

/// Limits applied by the wizard validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    /// Minimum content length in characters.
    pub content_min_len: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            content_min_len: WIZARD_CONTENT_MIN_LEN,
        }
    }
}

/// Parse a category id taken from a path or body.
///
/// A malformed id names nothing that could exist, so it is reported as
/// not-found rather than as a client error.
pub fn parse_category_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::NotFound(format!("Category {} not found", raw)))
}

/// Parse a wizard id taken from a path.
pub fn parse_wizard_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::NotFound(format!("Wizard {} not found", raw)))
}

/// Whitespace-only text counts as missing.
fn require_text(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::Validation(format!("{} is required", field))),
    }
}

fn check_content(content: &str, rules: &ValidationRules) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::Validation("content is required".to_string()));
    }
    if content.chars().count() < rules.content_min_len {
        return Err(Error::Validation(format!(
            "content must be at least {} characters",
            rules.content_min_len
        )));
    }
    Ok(())
}

pub fn validate_new_category(req: CreateCategoryRequest) -> Result<NewCategory> {
    let title = require_text("title", req.title)?;
    Ok(NewCategory {
        title,
        keywords: req.keywords.unwrap_or_default(),
    })
}

/// An empty request yields an empty patch. A title that is present but
/// blank is rejected.
pub fn validate_category_patch(req: UpdateCategoryRequest) -> Result<CategoryPatch> {
    let title = match req.title {
        Some(t) => Some(require_text("title", Some(t))?),
        None => None,
    };
    Ok(CategoryPatch {
        title,
        keywords: req.keywords,
    })
}

/// Validate a wizard create request.
///
/// Name and content are checked before the category id so that an
/// incomplete body is a 400 regardless of what `categoryId` holds. A missing
/// `categoryId` is a validation failure; a present but malformed one is
/// not-found.
pub fn validate_new_wizard(req: CreateWizardRequest, rules: &ValidationRules) -> Result<NewWizard> {
    let name = require_text("name", req.name)?;
    let content = require_text("content", req.content)?;
    check_content(&content, rules)?;
    let raw_category = req
        .category_id
        .ok_or_else(|| Error::Validation("categoryId is required".to_string()))?;
    let category_id = parse_category_id(&raw_category)?;
    Ok(NewWizard {
        name,
        content,
        category_id,
    })
}

pub fn validate_wizard_patch(req: UpdateWizardRequest, rules: &ValidationRules) -> Result<WizardPatch> {
    let name = match req.name {
        Some(n) => Some(require_text("name", Some(n))?),
        None => None,
    };
    let content = match req.content {
        Some(c) => {
            check_content(&c, rules)?;
            Some(c)
        }
        None => None,
    };
    let category_id = req
        .category_id
        .as_deref()
        .map(parse_category_id)
        .transpose()?;
    Ok(WizardPatch {
        name,
        content,
        category_id,
    })
}
