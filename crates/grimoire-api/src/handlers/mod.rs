//! HTTP handlers for grimoire-api.

pub mod categories;
pub mod wizards;
