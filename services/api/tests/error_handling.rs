//! Tests for `ApiError` → HTTP response mapping.
//!
//! These tests call `IntoResponse` directly on `ApiError` values; no router
//! is involved.

use api_lib::config::ConfigError;
use api_lib::error::ApiError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use timetable_core::{ConflictInfo, Day, PortError, TimetableError};

/// Helper: convert an `ApiError` into its status code and parsed JSON body.
async fn error_to_response(err: ApiError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: validation errors map to 400 with VALIDATION_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = ApiError::Core(TimetableError::Validation(
        "End time must be after start time".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "End time must be after start time");
}

// ---------------------------------------------------------------------------
// Test: not found maps to 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = ApiError::Core(TimetableError::NotFound("Section 42 not found".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Section 42 not found");
}

// ---------------------------------------------------------------------------
// Test: booking conflicts map to 409 and carry the blocking booking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn conflict_error_returns_409_with_details() {
    let err = ApiError::Core(TimetableError::Conflict(ConflictInfo {
        class: "Grade 9".into(),
        section: "C".into(),
        day: Day::Wednesday,
        period: "Period 4".into(),
        time: "11:00 - 12:00".into(),
        room: None,
    }));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(
        json["error"],
        "Teacher is already assigned to Grade 9 - Section C at this time (Period 4)"
    );
    assert_eq!(json["conflict"]["conflictWith"]["day"], "Wednesday");
    assert!(json["conflict"]["conflictWith"]["room"].is_null());
}

// ---------------------------------------------------------------------------
// Test: unique violations from storage surface as "already exists"
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unique_violation_returns_409_already_exists() {
    let core: TimetableError = PortError::unique("uq_sections_class_name").into();

    let (status, json) = error_to_response(ApiError::Core(core)).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "ALREADY_EXISTS");
    assert_eq!(json["error"], "Section already exists for this class");
}

// ---------------------------------------------------------------------------
// Test: storage and internal failures map to 500 and sanitize the message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn storage_error_returns_500_and_sanitizes_message() {
    let err = ApiError::Core(TimetableError::Storage(PortError::Unexpected(
        "connection refused at 10.0.0.5".into(),
    )));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn config_error_returns_500() {
    let err = ApiError::Config(ConfigError::MissingVar("DATABASE_URL".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
}

// ---------------------------------------------------------------------------
// Test: sqlx RowNotFound maps to 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(ApiError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}
