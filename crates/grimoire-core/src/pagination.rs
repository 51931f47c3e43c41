//! Offset pagination over the wizard collection.
//!
//! Page size is fixed at [`WIZARD_PAGE_SIZE`]. A request maps to
//! `skip = page * page_size`; `last_page = floor(total / page_size)`.
//! Navigation links are metadata only and never change the returned window.

use serde::Serialize;
use tracing::debug;

use crate::defaults::{PAGE_INDEX, WIZARD_PAGE_SIZE};
use crate::error::Result;
use crate::models::Wizard;
use crate::traits::WizardRepository;

/// A requested page index, already coerced to be non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: PAGE_INDEX }
    }
}

impl PageRequest {
    pub fn new(page: i64) -> Self {
        Self { page: page.max(0) }
    }

    /// Coerce a raw `page` query value. Missing, non-numeric and negative
    /// input all become page 0.
    pub fn parse(raw: Option<&str>) -> Self {
        let page = raw
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|p| *p >= 0)
            .unwrap_or(PAGE_INDEX);
        Self { page }
    }

    /// Compute the window for this page given the collection size.
    pub fn window(&self, total: i64) -> PageWindow {
        let limit = WIZARD_PAGE_SIZE;
        PageWindow {
            page: self.page,
            skip: self.page.saturating_mul(limit),
            limit,
            total,
            last_page: total.max(0) / limit,
        }
    }
}

/// The slice of the collection a page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub skip: i64,
    pub limit: i64,
    pub total: i64,
    pub last_page: i64,
}

impl PageWindow {
    pub fn links(&self) -> PageLinks {
        PageLinks {
            next: self.page.saturating_add(1).min(self.last_page),
            prev: self.page.saturating_sub(1).max(0),
            last: self.last_page,
        }
    }
}

/// Page indices for navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLinks {
    pub next: i64,
    pub prev: i64,
    pub last: i64,
}

impl PageLinks {
    /// Render as an RFC 8288 `Link` header value.
    ///
    /// `base` is prefixed verbatim, so an empty base yields relative URLs.
    pub fn to_header_value(&self, base: &str, path: &str) -> String {
        let base = base.trim_end_matches('/');
        [("next", self.next), ("prev", self.prev), ("last", self.last)]
            .iter()
            .map(|(rel, page)| format!("<{}{}?page={}>; rel=\"{}\"", base, path, page, rel))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Response body of a paged listing.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Total items across all pages.
    pub count: i64,
    pub data: Vec<T>,
}

/// Fetch one page of wizards plus the navigation metadata for it.
pub async fn paginate(
    wizards: &dyn WizardRepository,
    request: PageRequest,
) -> Result<(Page<Wizard>, PageLinks)> {
    let total = wizards.count().await?;
    let window = request.window(total);

    let data = if window.skip >= total {
        Vec::new()
    } else {
        wizards.list(window.skip, window.limit).await?
    };

    debug!(
        subsystem = "core",
        component = "pagination",
        op = "list",
        page = window.page,
        last_page = window.last_page,
        result_count = data.len(),
        "Wizard page computed"
    );

    Ok((Page { count: total, data }, window.links()))
}
