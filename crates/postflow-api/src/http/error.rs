//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use postflow_core::workflow::catalog::CatalogError;
use postflow_core::workflow::definition::DraftError;
use postflow_core::workflow::executor::ExecutorError;

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Catalog mutation failure (duplicate id, invalid draft).
    Catalog(CatalogError),
    /// Execution failure (unresolvable workflow id).
    Executor(ExecutorError),
    /// Requested resource does not exist.
    NotFound(String),
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        AppError::Catalog(e)
    }
}

impl From<ExecutorError> for AppError {
    fn from(e: ExecutorError) -> Self {
        AppError::Executor(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Catalog(CatalogError::DuplicateWorkflow(id)) => (
                StatusCode::CONFLICT,
                "DUPLICATE_WORKFLOW",
                format!("Workflow id '{id}' already exists"),
            ),
            AppError::Catalog(CatalogError::Invalid(DraftError::ParseError(msg))) => (
                StatusCode::BAD_REQUEST,
                "PARSE_ERROR",
                msg.clone(),
            ),
            AppError::Catalog(CatalogError::Invalid(DraftError::ValidationError(msg))) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
            ),
            AppError::Executor(ExecutorError::UnknownWorkflow(id)) => (
                StatusCode::NOT_FOUND,
                "UNKNOWN_WORKFLOW",
                format!("Workflow '{id}' not found"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
        };

        let envelope = ApiResponse::error(code, &message, String::new(), 0);
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let conflict =
            AppError::Catalog(CatalogError::DuplicateWorkflow("publish".to_string()))
                .into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let missing =
            AppError::Executor(ExecutorError::UnknownWorkflow("nope".to_string()))
                .into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid = AppError::Catalog(CatalogError::Invalid(DraftError::ValidationError(
            "workflow must have at least one step".to_string(),
        )))
        .into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }
}
