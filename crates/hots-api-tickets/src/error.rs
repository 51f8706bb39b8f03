//! API error types for ticket endpoints.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use hots_workflow::WorkflowError;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for client handling.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Ticket API error type.
#[derive(Debug, Error)]
pub enum ApiTicketsError {
    /// Domain error from the workflow engine.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication required.
    #[error("Authentication required")]
    Unauthorized,

    /// Access denied.
    #[error("Access denied")]
    Forbidden,

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Database error.
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiTicketsError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            Self::Workflow(e) => {
                if e.is_not_found() {
                    (StatusCode::NOT_FOUND, "not_found", e.to_string())
                } else if e.is_conflict() {
                    (StatusCode::CONFLICT, "conflict", e.to_string())
                } else if e.is_forbidden() {
                    (StatusCode::FORBIDDEN, "forbidden", e.to_string())
                } else {
                    match e {
                        WorkflowError::RejectionRemarkRequired
                        | WorkflowError::DetailSlotsExceeded { .. }
                        | WorkflowError::InvalidWorkflowSteps(_) => {
                            (StatusCode::BAD_REQUEST, "validation_error", e.to_string())
                        }
                        WorkflowError::Database(db_err) => {
                            tracing::error!("WorkflowError::Database: {:?}", db_err);
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                "database_error",
                                "Database error".to_string(),
                            )
                        }
                        _ => {
                            tracing::error!("Unhandled workflow error: {:?}", e);
                            (
                                StatusCode::INTERNAL_SERVER_ERROR,
                                "internal_error",
                                "An internal error occurred".to_string(),
                            )
                        }
                    }
                }
            }
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Access denied".to_string(),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Self::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            Self::Database(e) => {
                tracing::error!("Database error in ticket API: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiTicketsError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiTicketsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn status_of(err: ApiTicketsError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiTicketsError::Workflow(WorkflowError::TicketNotFound(Uuid::new_v4()));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let err =
            ApiTicketsError::Workflow(WorkflowError::TicketNotAwaitingApproval(Uuid::new_v4()));
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let err = ApiTicketsError::Workflow(WorkflowError::NotDesignatedApprover { step_order: 1 });
        assert_eq!(status_of(err), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_remark_required_maps_to_400() {
        let err = ApiTicketsError::Workflow(WorkflowError::RejectionRemarkRequired);
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }
}
