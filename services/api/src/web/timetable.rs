//! services/api/src/web/timetable.rs
//!
//! Handlers for timetable entries, batch commits, grid resets and teacher
//! availability.

use crate::error::ApiResult;
use crate::web::dto::{
    parse_day, ApplyGridPayload, AssignSlotPayload, AvailabilityQuery, BatchPayload,
    BatchResponse, GridSummaryDto, TeacherResponse, TimetableEntryDetailsResponse,
    TimetableEntryResponse, UpdateSlotPayload,
};
use crate::web::extract::ApiJson;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use timetable_core::assignment::{self, UpdateSlotRequest};
use timetable_core::availability::get_available_teachers;
use timetable_core::domain::TimetableScope;
use timetable_core::grid::{apply_grid, ApplyGridRequest};
use timetable_core::staging::StagingBuffer;
use uuid::Uuid;

/// Assign a cell, or overwrite the existing entry at that cell.
#[utoipa::path(
    post,
    path = "/timetable",
    request_body = AssignSlotPayload,
    responses(
        (status = 201, description = "Entry saved", body = TimetableEntryResponse),
        (status = 400, description = "Missing day, teacher or subject"),
        (status = 404, description = "Section, period or teacher not found"),
        (status = 409, description = "Teacher already booked at this day and period")
    ),
    tag = "timetable"
)]
pub async fn assign_slot_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<AssignSlotPayload>,
) -> ApiResult<impl IntoResponse> {
    let entry = assignment::assign_slot(app_state.db.as_ref(), payload.into_request()?).await?;
    Ok((StatusCode::CREATED, Json(TimetableEntryResponse::from(entry))))
}

/// Change the teacher, subject or room of an existing entry.
#[utoipa::path(
    put,
    path = "/timetable/{id}",
    params(("id" = Uuid, Path, description = "Entry id")),
    request_body = UpdateSlotPayload,
    responses(
        (status = 200, description = "Entry updated", body = TimetableEntryResponse),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Teacher already booked at this day and period")
    ),
    tag = "timetable"
)]
pub async fn update_slot_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateSlotPayload>,
) -> ApiResult<Json<TimetableEntryResponse>> {
    let entry = assignment::update_slot(
        app_state.db.as_ref(),
        id,
        UpdateSlotRequest {
            teacher_id: payload.teacher_id,
            subject: payload.subject,
            room: payload.room,
        },
    )
    .await?;
    Ok(Json(entry.into()))
}

#[utoipa::path(
    delete,
    path = "/timetable/{id}",
    params(("id" = Uuid, Path, description = "Entry id")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found")
    ),
    tag = "timetable"
)]
pub async fn delete_slot_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    assignment::delete_slot(app_state.db.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Commit a batch of drafts, each through the normal assignment checks.
///
/// Drafts for the same cell replace earlier ones. Accepted and rejected
/// drafts are reported separately.
#[utoipa::path(
    post,
    path = "/timetable/batch",
    request_body = BatchPayload,
    responses(
        (status = 200, description = "Per-draft outcome", body = BatchResponse),
        (status = 400, description = "A draft names an unknown day")
    ),
    tag = "timetable"
)]
pub async fn commit_batch_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<BatchPayload>,
) -> ApiResult<Json<BatchResponse>> {
    let mut buffer = StagingBuffer::new();
    for draft in payload.entries {
        buffer.stage(draft.into_request()?);
    }
    let report = buffer.commit(app_state.db.as_ref()).await;
    Ok(Json(report.into()))
}

/// Reset whole section days to empty cells, one per period.
#[utoipa::path(
    post,
    path = "/timetable/apply-grid",
    request_body = ApplyGridPayload,
    responses(
        (status = 200, description = "Days reset", body = GridSummaryDto),
        (status = 400, description = "No days given"),
        (status = 404, description = "Section not found")
    ),
    tag = "timetable"
)]
pub async fn apply_grid_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ApplyGridPayload>,
) -> ApiResult<Json<GridSummaryDto>> {
    let days = payload
        .days
        .iter()
        .map(|d| parse_day(d))
        .collect::<ApiResult<Vec<_>>>()?;
    let summary = apply_grid(
        app_state.db.as_ref(),
        ApplyGridRequest {
            days,
            section_ids: payload.section_ids,
        },
    )
    .await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/timetable/section/{sectionId}",
    params(("sectionId" = Uuid, Path, description = "Section id")),
    responses(
        (status = 200, description = "Entries by period order", body = [TimetableEntryDetailsResponse]),
        (status = 404, description = "Section not found")
    ),
    tag = "timetable"
)]
pub async fn section_timetable_handler(
    State(app_state): State<Arc<AppState>>,
    Path(section_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TimetableEntryDetailsResponse>>> {
    let entries =
        assignment::get_timetable(app_state.db.as_ref(), TimetableScope::Section(section_id))
            .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/timetable/teacher/{teacherId}",
    params(("teacherId" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Entries by period order", body = [TimetableEntryDetailsResponse]),
        (status = 404, description = "Teacher not found")
    ),
    tag = "timetable"
)]
pub async fn teacher_timetable_handler(
    State(app_state): State<Arc<AppState>>,
    Path(teacher_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TimetableEntryDetailsResponse>>> {
    let entries =
        assignment::get_timetable(app_state.db.as_ref(), TimetableScope::Teacher(teacher_id))
            .await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Teachers with no booking at the given day and period.
#[utoipa::path(
    get,
    path = "/timetable/available-teachers",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free teachers by name", body = [TeacherResponse]),
        (status = 400, description = "Missing or unknown day"),
        (status = 404, description = "Period not found")
    ),
    tag = "timetable"
)]
pub async fn available_teachers_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<Vec<TeacherResponse>>> {
    let day = parse_day(&query.day)?;
    let teachers = get_available_teachers(
        app_state.db.as_ref(),
        day,
        query.time_period_id,
        query.exclude_entry_id,
    )
    .await?;
    Ok(Json(teachers.into_iter().map(Into::into).collect()))
}
