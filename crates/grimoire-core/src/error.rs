//! Error types for grimoire.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using grimoire's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for grimoire operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A required field is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(Uuid),

    /// Wizard not found
    #[error("Wizard not found: {0}")]
    WizardNotFound(Uuid),

    /// Uniqueness violation or a state that forbids the operation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True for every not-found flavour (generic, category, wizard).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::CategoryNotFound(_) | Error::WizardNotFound(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("title is required".to_string());
        assert_eq!(err.to_string(), "Validation error: title is required");
    }

    #[test]
    fn test_error_display_category_not_found() {
        let id = Uuid::nil();
        let err = Error::CategoryNotFound(id);
        assert_eq!(err.to_string(), format!("Category not found: {}", id));
    }

    #[test]
    fn test_error_display_wizard_not_found() {
        let id = Uuid::new_v4();
        let err = Error::WizardNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("title already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: title already exists");
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound("x".into()).is_not_found());
        assert!(Error::CategoryNotFound(Uuid::nil()).is_not_found());
        assert!(Error::WizardNotFound(Uuid::nil()).is_not_found());
        assert!(!Error::Conflict("x".into()).is_not_found());
        assert!(!Error::Validation("x".into()).is_not_found());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
