//! # grimoire-core
//!
//! Core types, traits, and abstractions for the grimoire category/wizard API.
//!
//! This crate owns the parts of the system that carry invariants:
//! - the [`Category`] and [`Wizard`] entities and their request/patch types
//! - explicit validation functions ([`validation`])
//! - the repository traits that every store implements ([`traits`])
//! - the [`RelationshipManager`], which keeps `Category::wizard_ids` in step
//!   with wizard ownership
//! - the pagination engine ([`pagination`])

pub mod defaults;
pub mod error;
pub mod models;
pub mod pagination;
pub mod relationships;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use pagination::{Page, PageLinks, PageRequest, PageWindow};
pub use relationships::RelationshipManager;
pub use traits::*;
