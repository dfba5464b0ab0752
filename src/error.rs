//! Custom error types for GlobalBudget
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. The HTTP layer maps each variant onto a
//! status code in `api::error`.

use thiserror::Error;

/// The main error type for GlobalBudget operations
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

    /// Bad input shape or range
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Report type name not recognized
    #[error("Unsupported report type: {0}")]
    UnsupportedReportType(String),

    /// A stored record could not be decoded
    #[error("Corrupted record {id}: {reason}")]
    Serialization { id: String, reason: String },

    /// Missing or malformed bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl BudgetError {
    /// Create a "not found" error for departments
    pub fn department_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Department",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for reports
    pub fn report_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Report",
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

    /// Whether the error stems from the caller's input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::NotFound { .. }
                | Self::Duplicate { .. }
                | Self::UnsupportedReportType(_)
                | Self::Unauthorized(_)
        )
    }
}

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

/// Result type alias for GlobalBudget operations
pub type BudgetResult<T> = Result<T, BudgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BudgetError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = BudgetError::department_not_found("FINANCE");
        assert_eq!(err.to_string(), "Department not found: FINANCE");
        assert!(err.is_not_found());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_unsupported_report_type() {
        let err = BudgetError::UnsupportedReportType("unknown-type".into());
        assert_eq!(err.to_string(), "Unsupported report type: unknown-type");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_storage_errors_are_not_client_errors() {
        assert!(!BudgetError::Storage("disk full".into()).is_client_error());
        assert!(!BudgetError::Serialization {
            id: "rpt-1".into(),
            reason: "eof".into()
        }
        .is_client_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BudgetError = io_err.into();
        assert!(matches!(err, BudgetError::Io(_)));
    }
}
