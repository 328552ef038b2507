//! Custom error types for budgetree
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for budgetree operations
#[derive(Error, Debug)]
pub enum BudgetError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models and drafts
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Deletes blocked by rows that still reference the node
    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    /// A code collision the two-phase rewrite failed to resolve
    #[error("Code conflict: {0}")]
    Conflict(String),

    /// Transaction-level failures (timeout, serialization, commit)
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Malformed tree shape (cyclic or dangling parent references)
    #[error("Structural error: {0}")]
    Structural(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BudgetError {
    /// Create a "not found" error for budget items
    pub fn item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget item",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for periods
    pub fn period_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Period",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a referential-integrity error
    pub fn is_referential_integrity(&self) -> bool {
        matches!(self, Self::ReferentialIntegrity(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<rusqlite::Error> for BudgetError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _) => match e.code {
                rusqlite::ErrorCode::ConstraintViolation => Self::Conflict(err.to_string()),
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    Self::Transaction(err.to_string())
                }
                _ => Self::Storage(err.to_string()),
            },
            _ => Self::Storage(err.to_string()),
        }
    }
}

/// Result type alias for budgetree operations
pub type BudgetResult<T> = Result<T, BudgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BudgetError::Validation("name cannot be empty".into());
        assert_eq!(err.to_string(), "Validation error: name cannot be empty");
    }

    #[test]
    fn test_not_found_error() {
        let err = BudgetError::item_not_found("itm-42");
        assert_eq!(err.to_string(), "Budget item not found: itm-42");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_referential_integrity_error() {
        let err = BudgetError::ReferentialIntegrity("item 7 has realizations".into());
        assert!(err.is_referential_integrity());
        assert_eq!(
            err.to_string(),
            "Referential integrity error: item 7 has realizations"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BudgetError = io_err.into();
        assert!(matches!(err, BudgetError::Io(_)));
    }

    #[test]
    fn test_from_sqlite_busy() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".into()),
        );
        let err: BudgetError = sqlite_err.into();
        assert!(matches!(err, BudgetError::Transaction(_)));
    }
}
