//! services/api/src/web/school.rs
//!
//! Handlers for school settings, classes, sections and teachers.

use crate::error::ApiResult;
use crate::web::dto::{
    ClassResponse, ClassWithSectionsResponse, CreateSectionPayload, NamePayload, SectionResponse,
    SettingsPayload, SettingsResponse, TeacherPayload, TeacherResponse,
};
use crate::web::extract::ApiJson;
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use timetable_core::domain::NewTeacher;
use timetable_core::school;
use uuid::Uuid;

//=========================================================================================
// Settings
//=========================================================================================

/// Get the school hours (08:00-14:00 until first saved).
#[utoipa::path(
    get,
    path = "/settings",
    responses((status = 200, description = "Current school hours", body = SettingsResponse)),
    tag = "settings"
)]
pub async fn get_settings_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<SettingsResponse>> {
    let settings = school::get_settings(app_state.db.as_ref()).await?;
    Ok(Json(settings.into()))
}

/// Create or update the school hours.
#[utoipa::path(
    put,
    path = "/settings",
    request_body = SettingsPayload,
    responses(
        (status = 200, description = "Settings saved", body = SettingsResponse),
        (status = 400, description = "Malformed time or end before start")
    ),
    tag = "settings"
)]
pub async fn update_settings_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SettingsPayload>,
) -> ApiResult<Json<SettingsResponse>> {
    let settings =
        school::update_settings(app_state.db.as_ref(), &payload.start_time, &payload.end_time)
            .await?;
    Ok(Json(settings.into()))
}

//=========================================================================================
// Classes
//=========================================================================================

/// List classes with their sections, ordered by name.
#[utoipa::path(
    get,
    path = "/classes",
    responses((status = 200, description = "All classes", body = [ClassWithSectionsResponse])),
    tag = "classes"
)]
pub async fn list_classes_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ClassWithSectionsResponse>>> {
    let classes = school::list_classes(app_state.db.as_ref()).await?;
    Ok(Json(classes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/classes",
    request_body = NamePayload,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Name missing"),
        (status = 409, description = "Class name already exists")
    ),
    tag = "classes"
)]
pub async fn create_class_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NamePayload>,
) -> ApiResult<impl IntoResponse> {
    let class = school::create_class(app_state.db.as_ref(), &payload.name).await?;
    Ok((StatusCode::CREATED, Json(ClassResponse::from(class))))
}

#[utoipa::path(
    put,
    path = "/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    request_body = NamePayload,
    responses(
        (status = 200, description = "Class renamed", body = ClassResponse),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Class name already exists")
    ),
    tag = "classes"
)]
pub async fn rename_class_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<NamePayload>,
) -> ApiResult<Json<ClassResponse>> {
    let class = school::rename_class(app_state.db.as_ref(), id, &payload.name).await?;
    Ok(Json(class.into()))
}

/// Delete a class with all its sections and their timetables.
#[utoipa::path(
    delete,
    path = "/classes/{id}",
    params(("id" = Uuid, Path, description = "Class id")),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 404, description = "Class not found")
    ),
    tag = "classes"
)]
pub async fn delete_class_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    school::delete_class(app_state.db.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/classes/{id}/sections",
    params(("id" = Uuid, Path, description = "Class id")),
    responses(
        (status = 200, description = "Sections of the class", body = [SectionResponse]),
        (status = 404, description = "Class not found")
    ),
    tag = "classes"
)]
pub async fn list_sections_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<SectionResponse>>> {
    let sections = school::list_sections(app_state.db.as_ref(), id).await?;
    Ok(Json(sections.into_iter().map(Into::into).collect()))
}

//=========================================================================================
// Sections
//=========================================================================================

#[utoipa::path(
    post,
    path = "/sections",
    request_body = CreateSectionPayload,
    responses(
        (status = 201, description = "Section created", body = SectionResponse),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Section already exists for this class")
    ),
    tag = "sections"
)]
pub async fn create_section_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<CreateSectionPayload>,
) -> ApiResult<impl IntoResponse> {
    let section =
        school::create_section(app_state.db.as_ref(), payload.class_id, &payload.name).await?;
    Ok((StatusCode::CREATED, Json(SectionResponse::from(section))))
}

#[utoipa::path(
    put,
    path = "/sections/{id}",
    params(("id" = Uuid, Path, description = "Section id")),
    request_body = NamePayload,
    responses(
        (status = 200, description = "Section renamed", body = SectionResponse),
        (status = 404, description = "Section not found")
    ),
    tag = "sections"
)]
pub async fn rename_section_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<NamePayload>,
) -> ApiResult<Json<SectionResponse>> {
    let section = school::rename_section(app_state.db.as_ref(), id, &payload.name).await?;
    Ok(Json(section.into()))
}

/// Delete a section. Refused while it still has timetable entries.
#[utoipa::path(
    delete,
    path = "/sections/{id}",
    params(("id" = Uuid, Path, description = "Section id")),
    responses(
        (status = 204, description = "Section deleted"),
        (status = 400, description = "Section still has timetable entries"),
        (status = 404, description = "Section not found")
    ),
    tag = "sections"
)]
pub async fn delete_section_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    school::delete_section(app_state.db.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Teachers
//=========================================================================================

impl From<TeacherPayload> for NewTeacher {
    fn from(p: TeacherPayload) -> Self {
        NewTeacher {
            name: p.name,
            subjects: p.subjects,
            class_ids: p.class_ids,
        }
    }
}

#[utoipa::path(
    get,
    path = "/teachers",
    responses((status = 200, description = "All teachers", body = [TeacherResponse])),
    tag = "teachers"
)]
pub async fn list_teachers_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TeacherResponse>>> {
    let teachers = school::list_teachers(app_state.db.as_ref()).await?;
    Ok(Json(teachers.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/teachers/class/{classId}",
    params(("classId" = Uuid, Path, description = "Class id")),
    responses(
        (status = 200, description = "Teachers assigned to the class", body = [TeacherResponse]),
        (status = 404, description = "Class not found")
    ),
    tag = "teachers"
)]
pub async fn list_teachers_by_class_handler(
    State(app_state): State<Arc<AppState>>,
    Path(class_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TeacherResponse>>> {
    let teachers = school::list_teachers_by_class(app_state.db.as_ref(), class_id).await?;
    Ok(Json(teachers.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/teachers",
    request_body = TeacherPayload,
    responses(
        (status = 201, description = "Teacher created", body = TeacherResponse),
        (status = 400, description = "Name and at least one subject are required")
    ),
    tag = "teachers"
)]
pub async fn create_teacher_handler(
    State(app_state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<TeacherPayload>,
) -> ApiResult<impl IntoResponse> {
    let teacher = school::create_teacher(app_state.db.as_ref(), payload.into()).await?;
    Ok((StatusCode::CREATED, Json(TeacherResponse::from(teacher))))
}

#[utoipa::path(
    put,
    path = "/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher id")),
    request_body = TeacherPayload,
    responses(
        (status = 200, description = "Teacher updated", body = TeacherResponse),
        (status = 404, description = "Teacher or class not found")
    ),
    tag = "teachers"
)]
pub async fn update_teacher_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<TeacherPayload>,
) -> ApiResult<Json<TeacherResponse>> {
    let teacher = school::update_teacher(app_state.db.as_ref(), id, payload.into()).await?;
    Ok(Json(teacher.into()))
}

#[utoipa::path(
    delete,
    path = "/teachers/{id}",
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 204, description = "Teacher deleted with their bookings"),
        (status = 404, description = "Teacher not found")
    ),
    tag = "teachers"
)]
pub async fn delete_teacher_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    school::delete_teacher(app_state.db.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
