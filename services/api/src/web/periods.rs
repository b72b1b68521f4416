//! services/api/src/web/periods.rs
//!
//! Handlers for the period grid: manual editing, generation preview and
//! bulk apply.

use crate::error::ApiResult;
use crate::web::dto::{
    ApplyPeriodsPayload, ApplyPeriodsResponse, CreatePeriodPayload, PreviewPayload,
    PreviewResponse, ReorderPayload, TimePeriodResponse, UpdatePeriodPayload,
};
use crate::web::extract::ApiJson;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use timetable_core::generator::{generate_preview, GeneratePeriodsRequest};
use timetable_core::periods::{self, CreatePeriodRequest, UpdatePeriodRequest};
use timetable_core::school;
use timetable_core::TimetableError;
use uuid::Uuid;

/// List periods by order index.
#[utoipa::path(
    get,
    path = "/time-periods",
    responses((status = 200, description = "The period grid", body = [TimePeriodResponse])),
    tag = "time-periods"
)]
pub async fn list_periods_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TimePeriodResponse>>> {
    let periods = periods::list_periods(app_state.db.as_ref()).await?;
    Ok(Json(periods.into_iter().map(Into::into).collect()))
}

/// Append a period after the current last one.
#[utoipa::path(
    post,
    path = "/time-periods",
    request_body = CreatePeriodPayload,
    responses(
        (status = 201, description = "Period created", body = TimePeriodResponse),
        (status = 400, description = "Missing field or end before start")
    ),
    tag = "time-periods"
)]
pub async fn create_period_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreatePeriodPayload>,
) -> ApiResult<impl IntoResponse> {
    let period = periods::create_period(
        app_state.db.as_ref(),
        CreatePeriodRequest {
            period_name: payload.period_name,
            start_time: payload.start_time,
            end_time: payload.end_time,
            is_break: payload.is_break,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(TimePeriodResponse::from(period))))
}

#[utoipa::path(
    put,
    path = "/time-periods/{id}",
    params(("id" = Uuid, Path, description = "Period id")),
    request_body = UpdatePeriodPayload,
    responses(
        (status = 200, description = "Period updated", body = TimePeriodResponse),
        (status = 400, description = "End before start"),
        (status = 404, description = "Period not found")
    ),
    tag = "time-periods"
)]
pub async fn update_period_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdatePeriodPayload>,
) -> ApiResult<Json<TimePeriodResponse>> {
    let period = periods::update_period(
        app_state.db.as_ref(),
        id,
        UpdatePeriodRequest {
            period_name: payload.period_name,
            start_time: payload.start_time,
            end_time: payload.end_time,
            is_break: payload.is_break,
        },
    )
    .await?;
    Ok(Json(period.into()))
}

/// Delete a period and renumber the rest. Its timetable entries go with it.
#[utoipa::path(
    delete,
    path = "/time-periods/{id}",
    params(("id" = Uuid, Path, description = "Period id")),
    responses(
        (status = 204, description = "Period deleted"),
        (status = 404, description = "Period not found")
    ),
    tag = "time-periods"
)]
pub async fn delete_period_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    periods::delete_period(app_state.db.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/time-periods/reorder",
    request_body = ReorderPayload,
    responses(
        (status = 200, description = "Periods in their new order", body = [TimePeriodResponse]),
        (status = 400, description = "Ids are not a permutation of the stored periods"),
        (status = 404, description = "Unknown period id")
    ),
    tag = "time-periods"
)]
pub async fn reorder_periods_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ReorderPayload>,
) -> ApiResult<Json<Vec<TimePeriodResponse>>> {
    let periods = periods::reorder_periods(app_state.db.as_ref(), &payload.period_ids).await?;
    Ok(Json(periods.into_iter().map(Into::into).collect()))
}

/// Delete every period and every timetable entry.
#[utoipa::path(
    post,
    path = "/time-periods/clear",
    responses((status = 204, description = "Grid cleared")),
    tag = "time-periods"
)]
pub async fn clear_periods_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<StatusCode> {
    periods::clear_periods(app_state.db.as_ref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Generate a period grid without storing it.
///
/// School hours left out of the request are taken from the settings.
#[utoipa::path(
    post,
    path = "/time-periods/preview",
    request_body = PreviewPayload,
    responses(
        (status = 200, description = "Generated periods and summary", body = PreviewResponse),
        (status = 400, description = "The periods do not fit")
    ),
    tag = "time-periods"
)]
pub async fn preview_periods_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<PreviewPayload>,
) -> ApiResult<Json<PreviewResponse>> {
    let total_periods = payload.total_periods.ok_or_else(|| {
        TimetableError::Validation(
            "Total periods, school start time, and end time are required".to_string(),
        )
    })?;
    let (school_start_time, school_end_time) =
        match (payload.school_start_time, payload.school_end_time) {
            (Some(start), Some(end)) => (start, end),
            (start, end) => {
                let settings = school::get_settings(app_state.db.as_ref()).await?;
                (
                    start.unwrap_or(settings.start_time),
                    end.unwrap_or(settings.end_time),
                )
            }
        };

    let generated = generate_preview(&GeneratePeriodsRequest {
        school_start_time,
        school_end_time,
        total_periods,
        period_duration: payload.period_duration,
        include_break: payload.include_break,
        break_start_time: payload.break_start_time,
        break_end_time: payload.break_end_time,
    })?;
    Ok(Json(generated.into()))
}

/// Replace the stored grid with the given periods. Clears the timetable.
#[utoipa::path(
    post,
    path = "/time-periods/apply",
    request_body = ApplyPeriodsPayload,
    responses(
        (status = 201, description = "Grid replaced", body = ApplyPeriodsResponse),
        (status = 400, description = "Missing or invalid period")
    ),
    tag = "time-periods"
)]
pub async fn apply_periods_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ApplyPeriodsPayload>,
) -> ApiResult<impl IntoResponse> {
    let records = payload.periods.into_iter().map(Into::into).collect();
    let applied = periods::apply_periods(app_state.db.as_ref(), records).await?;
    Ok((StatusCode::CREATED, Json(ApplyPeriodsResponse::from(applied))))
}
