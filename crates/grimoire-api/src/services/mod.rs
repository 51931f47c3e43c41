//! Service layer for business logic.

pub mod category_service;
pub mod wizard_service;

pub use category_service::CategoryService;
pub use wizard_service::WizardService;
