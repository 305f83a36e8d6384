//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use crate::catalog::validation::ValidationErrors;
use crate::storage::{FileStoreError, RecordStoreError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Product with the given ID was not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Submitted product form failed one or more field rules
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Request body could not be read (e.g., malformed multipart data)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error occurred in the record store
    #[error("Record store error: {0}")]
    RecordStore(#[from] RecordStoreError),

    /// Error occurred in the file store
    #[error("File store error: {0}")]
    FileStore(#[from] FileStoreError),

    /// Route belongs to a feature that is not served here
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ProductNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::Validation(errors) => {
                let status = StatusCode::UNPROCESSABLE_ENTITY;
                let body = Json(json!({
                    "error": errors.to_string(),
                    "status": status.as_u16(),
                    "errors": errors,
                }));
                return (status, body).into_response();
            }
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::NotImplemented(_) => (StatusCode::NOT_IMPLEMENTED, self.to_string()),
            AppError::RecordStore(_) | AppError::FileStore(_) | AppError::Internal(_) => {
                // Storage details stay in the log, the client gets a generic failure
                error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::ProductNotFound("7".to_string()), StatusCode::NOT_FOUND),
            (
                AppError::InvalidRequest("bad multipart".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotImplemented("dashboard".to_string()),
                StatusCode::NOT_IMPLEMENTED,
            ),
            (
                AppError::RecordStore(RecordStoreError::Missing(7)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::FileStore(FileStoreError::Unavailable("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Validation(ValidationErrors::default()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
