//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how each
//! variant is rendered as an HTTP response.

use crate::config::ConfigError;
use crate::web::dto::ConflictDto;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use timetable_core::TimetableError;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A domain error returned by a timetable operation.
    #[error(transparent)]
    Core(#[from] TimetableError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request body is not valid JSON for the endpoint.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
}

/// Convenience type alias for handler return values.
pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut conflict = None;
        let (status, code, message) = match &self {
            ApiError::Core(core) => match core {
                TimetableError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                TimetableError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                TimetableError::Conflict(info) => {
                    tracing::warn!(class = %info.class, section = %info.section, "Booking conflict");
                    conflict = Some(ConflictDto::from(info.clone()));
                    (StatusCode::CONFLICT, "CONFLICT", core.to_string())
                }
                TimetableError::AlreadyExists(msg) => {
                    (StatusCode::CONFLICT, "ALREADY_EXISTS", msg.clone())
                }
                TimetableError::Storage(err) => {
                    tracing::error!(error = %err, "Storage failure");
                    internal()
                }
            },

            ApiError::Database(err) => classify_sqlx_error(err),

            ApiError::InvalidBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                rejection.body_text(),
            ),

            ApiError::Config(_) | ApiError::Io(_) => {
                tracing::error!(error = %self, "Internal error");
                internal()
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = conflict {
            body["conflict"] = json!({ "conflictWith": details });
        }

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            // PostgreSQL unique constraint violation: error code 23505
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return (
                        StatusCode::CONFLICT,
                        "ALREADY_EXISTS",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
