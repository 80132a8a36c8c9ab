//! Error types for the storage boundary and the HTTP-facing service layer.
//!
//! Storage backends report [`StorageError`]. The service layer classifies those
//! into [`AppError`], which carries a stable machine-readable code and renders as
//! an HTTP response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Errors produced by [`crate::domain::repositories::ConversionRepository`] implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code already exists: {0}")]
    Duplicate(String),
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("storage: empty result")]
    EmptyResult,
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("database query failed: {0}")]
    Database(String),
}

/// Serialized error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Service-level error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Gone { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    /// Lookup succeeded but there is nothing to return.
    #[error("{message}")]
    Empty { message: String },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn gone(message: impl Into<String>, details: Value) -> Self {
        Self::Gone {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn empty(message: impl Into<String>) -> Self {
        Self::Empty {
            message: message.into(),
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Gone { .. } => (StatusCode::GONE, "gone"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "conflict"),
            AppError::Empty { .. } => (StatusCode::NO_CONTENT, "empty"),
            AppError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Converts the error into its serializable form.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (_, code) = self.status_and_code();
        let details = match self {
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Gone { details, .. }
            | AppError::Conflict { details, .. }
            | AppError::Internal { details, .. } => details.clone(),
            AppError::Empty { .. } => json!({}),
        };

        ErrorInfo {
            code,
            message: self.to_string(),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();

        if let AppError::Empty { .. } = self {
            return status.into_response();
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::bad_request("Request validation failed", json!(errors))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate(code) => AppError::conflict(
                "Short code already exists",
                json!({ "code": code }),
            ),
            StorageError::NotFound(key) => {
                AppError::not_found("Item not found", json!({ "key": key }))
            }
            StorageError::EmptyResult => AppError::empty("No items found"),
            other => {
                tracing::error!(error = %other, "Storage failure");
                AppError::internal("Internal storage error", json!({}))
            }
        }
    }
}

/// Classifies a driver error at the storage boundary.
///
/// Unique violations are not handled here; callers that insert check them first
/// so the conflicting key ends up in [`StorageError::Duplicate`].
pub fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_) => StorageError::InvalidData(message),
        sqlx::Error::RowNotFound => StorageError::NotFound(message),
        _ => StorageError::Database(message),
    }
}

/// Returns true if the driver error is a unique constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err: AppError = StorageError::Duplicate("1389853602".to_string()).into();
        assert!(matches!(err, AppError::Conflict { .. }));
    }

    #[test]
    fn test_empty_result_maps_to_empty() {
        let err: AppError = StorageError::EmptyResult.into();
        assert!(matches!(err, AppError::Empty { .. }));
    }

    #[test]
    fn test_io_error_is_opaque() {
        let io = std::io::Error::other("disk on fire");
        let err: AppError = StorageError::Io(io).into();

        assert!(matches!(err, AppError::Internal { .. }));
        assert!(!err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::gone("gone", json!({})), StatusCode::GONE),
            (AppError::empty("none"), StatusCode::NO_CONTENT),
            (
                AppError::not_found("missing", json!({})),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
