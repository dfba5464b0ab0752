//! Error responses
//!
//! Client errors carry their own message. Internal errors are logged with
//! detail and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::error::BudgetError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    status: u16,
}

impl BudgetError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::UnsupportedReportType(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Duplicate { .. } => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Config(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Serialization { .. }
            | Self::Export(_)
            | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BudgetError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorBody {
                message,
                status: status.as_u16(),
            }),
        )
            .into_response()
    }
}

/// Result type for handlers
pub type ApiResult<T = Response> = Result<T, BudgetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BudgetError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BudgetError::UnsupportedReportType("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BudgetError::department_not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BudgetError::Duplicate {
                entity_type: "Department",
                identifier: "HR".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            BudgetError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            BudgetError::Serialization {
                id: "1".into(),
                reason: "bad".into()
            }
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_errors_agree_with_status() {
        let errors = [
            BudgetError::Validation("x".into()),
            BudgetError::report_not_found("x"),
            BudgetError::Storage("x".into()),
            BudgetError::Export("x".into()),
        ];
        for err in errors {
            assert_eq!(err.is_client_error(), err.status_code().is_client_error());
        }
    }
}
