//! services/api/src/web/rest.rs
//!
//! Wires the REST handlers into a router and holds the master definition
//! for the OpenAPI specification.

use crate::web::dto::{
    ApplyGridPayload, ApplyPeriodsPayload, ApplyPeriodsResponse, AppliedCounts,
    AssignSlotPayload, BatchPayload, BatchResponse, ClassResponse, ClassWithSectionsResponse,
    ConflictDto, CreatePeriodPayload, CreateSectionPayload, GenerationSummaryDto, GridSummaryDto,
    NamePayload, PeriodRecordDto, PreviewPayload, PreviewResponse, RejectedEntryDto,
    ReorderPayload, SectionResponse, SettingsPayload, SettingsResponse, TeacherPayload,
    TeacherResponse, TimePeriodResponse, TimetableEntryDetailsResponse, TimetableEntryResponse,
    UpdatePeriodPayload, UpdateSlotPayload,
};
use crate::web::state::AppState;
use crate::web::{periods, school, timetable};
use axum::{
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        school::get_settings_handler,
        school::update_settings_handler,
        school::list_classes_handler,
        school::create_class_handler,
        school::rename_class_handler,
        school::delete_class_handler,
        school::list_sections_handler,
        school::create_section_handler,
        school::rename_section_handler,
        school::delete_section_handler,
        school::list_teachers_handler,
        school::list_teachers_by_class_handler,
        school::create_teacher_handler,
        school::update_teacher_handler,
        school::delete_teacher_handler,
        periods::list_periods_handler,
        periods::create_period_handler,
        periods::update_period_handler,
        periods::delete_period_handler,
        periods::reorder_periods_handler,
        periods::clear_periods_handler,
        periods::preview_periods_handler,
        periods::apply_periods_handler,
        timetable::assign_slot_handler,
        timetable::update_slot_handler,
        timetable::delete_slot_handler,
        timetable::commit_batch_handler,
        timetable::apply_grid_handler,
        timetable::section_timetable_handler,
        timetable::teacher_timetable_handler,
        timetable::available_teachers_handler,
    ),
    components(
        schemas(
            HealthResponse,
            SettingsPayload, SettingsResponse,
            NamePayload, CreateSectionPayload, ClassResponse, SectionResponse,
            ClassWithSectionsResponse, TeacherPayload, TeacherResponse,
            TimePeriodResponse, CreatePeriodPayload, UpdatePeriodPayload, ReorderPayload,
            PreviewPayload, PreviewResponse, PeriodRecordDto, GenerationSummaryDto,
            ApplyPeriodsPayload, ApplyPeriodsResponse, AppliedCounts,
            AssignSlotPayload, UpdateSlotPayload, TimetableEntryResponse,
            TimetableEntryDetailsResponse, ConflictDto, BatchPayload, BatchResponse,
            RejectedEntryDto, ApplyGridPayload, GridSummaryDto,
        )
    ),
    tags(
        (name = "School Timetable API", description = "Period grids, timetable entries and teacher availability.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Health
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: &'static str,
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

//=========================================================================================
// Router
//=========================================================================================

/// Every REST route, bound to the shared state.
pub fn api_routes(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/settings",
            get(school::get_settings_handler).put(school::update_settings_handler),
        )
        .route(
            "/classes",
            get(school::list_classes_handler).post(school::create_class_handler),
        )
        .route(
            "/classes/{id}",
            put(school::rename_class_handler).delete(school::delete_class_handler),
        )
        .route("/classes/{id}/sections", get(school::list_sections_handler))
        .route("/sections", post(school::create_section_handler))
        .route(
            "/sections/{id}",
            put(school::rename_section_handler).delete(school::delete_section_handler),
        )
        .route(
            "/teachers",
            get(school::list_teachers_handler).post(school::create_teacher_handler),
        )
        .route(
            "/teachers/{id}",
            put(school::update_teacher_handler).delete(school::delete_teacher_handler),
        )
        .route(
            "/teachers/class/{classId}",
            get(school::list_teachers_by_class_handler),
        )
        .route(
            "/time-periods",
            get(periods::list_periods_handler).post(periods::create_period_handler),
        )
        .route(
            "/time-periods/{id}",
            put(periods::update_period_handler).delete(periods::delete_period_handler),
        )
        .route("/time-periods/preview", post(periods::preview_periods_handler))
        .route("/time-periods/apply", post(periods::apply_periods_handler))
        .route("/time-periods/reorder", post(periods::reorder_periods_handler))
        .route("/time-periods/clear", post(periods::clear_periods_handler))
        .route("/timetable", post(timetable::assign_slot_handler))
        .route(
            "/timetable/{id}",
            put(timetable::update_slot_handler).delete(timetable::delete_slot_handler),
        )
        .route("/timetable/batch", post(timetable::commit_batch_handler))
        .route("/timetable/apply-grid", post(timetable::apply_grid_handler))
        .route(
            "/timetable/section/{sectionId}",
            get(timetable::section_timetable_handler),
        )
        .route(
            "/timetable/teacher/{teacherId}",
            get(timetable::teacher_timetable_handler),
        )
        .route(
            "/timetable/available-teachers",
            get(timetable::available_teachers_handler),
        )
        .with_state(app_state)
}
