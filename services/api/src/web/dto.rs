//! services/api/src/web/dto.rs
//!
//! JSON payloads of the REST API. Every field is camelCase on the wire. The
//! core types stay free of serialization concerns; conversions live here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timetable_core::assignment::AssignSlotRequest;
use timetable_core::domain::{
    Class, ClassWithSections, Day, SchoolSettings, Section, Teacher, TimePeriod, TimetableEntry,
    TimetableEntryDetails,
};
use timetable_core::generator::{GeneratedPeriods, GenerationSummary, PeriodRecord};
use timetable_core::grid::GridSummary;
use timetable_core::periods::AppliedSummary;
use timetable_core::staging::{CommitReport, RejectedEntry};
use timetable_core::{ConflictInfo, TimetableError};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiResult;

/// Parses a day name from a request. Unknown names are validation errors.
pub fn parse_day(raw: &str) -> ApiResult<Day> {
    if raw.trim().is_empty() {
        return Err(TimetableError::Validation("Day is required".to_string()).into());
    }
    raw.parse::<Day>()
        .map_err(|e| TimetableError::Validation(e.to_string()).into())
}

//=========================================================================================
// School Structure
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub start_time: String,
    pub end_time: String,
    /// Absent until the settings are first saved.
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<SchoolSettings> for SettingsResponse {
    fn from(s: SchoolSettings) -> Self {
        Self {
            start_time: s.start_time,
            end_time: s.end_time,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct NamePayload {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionPayload {
    pub class_id: Uuid,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct ClassResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Class> for ClassResponse {
    fn from(c: Class) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub id: Uuid,
    pub class_id: Uuid,
    pub name: String,
}

impl From<Section> for SectionResponse {
    fn from(s: Section) -> Self {
        Self {
            id: s.id,
            class_id: s.class_id,
            name: s.name,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ClassWithSectionsResponse {
    pub id: Uuid,
    pub name: String,
    pub sections: Vec<SectionResponse>,
}

impl From<ClassWithSections> for ClassWithSectionsResponse {
    fn from(c: ClassWithSections) -> Self {
        Self {
            id: c.class.id,
            name: c.class.name,
            sections: c.sections.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub class_ids: Vec<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherResponse {
    pub id: Uuid,
    pub name: String,
    pub subjects: Vec<String>,
    pub class_ids: Vec<Uuid>,
}

impl From<Teacher> for TeacherResponse {
    fn from(t: Teacher) -> Self {
        Self {
            id: t.id,
            name: t.name,
            subjects: t.subjects,
            class_ids: t.class_ids,
        }
    }
}

//=========================================================================================
// Time Periods
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriodResponse {
    pub id: Uuid,
    pub period_name: String,
    pub start_time: String,
    pub end_time: String,
    pub is_break: bool,
    pub order_index: i32,
}

impl From<TimePeriod> for TimePeriodResponse {
    fn from(p: TimePeriod) -> Self {
        Self {
            id: p.id,
            period_name: p.period_name,
            start_time: p.start_time,
            end_time: p.end_time,
            is_break: p.is_break,
            order_index: p.order_index,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeriodPayload {
    #[serde(default)]
    pub period_name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub is_break: bool,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePeriodPayload {
    pub period_name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_break: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPayload {
    pub period_ids: Vec<Uuid>,
}

/// Generator input. Omitted school hours come from the stored settings.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviewPayload {
    pub school_start_time: Option<String>,
    pub school_end_time: Option<String>,
    pub total_periods: Option<u32>,
    /// Minutes. Omitted or 0 derives it from the available time.
    pub period_duration: Option<u32>,
    #[serde(default)]
    pub include_break: bool,
    pub break_start_time: Option<String>,
    pub break_end_time: Option<String>,
}

/// A generated or hand-edited period that has not been stored yet.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodRecordDto {
    #[serde(default)]
    pub period_name: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub is_break: bool,
    #[serde(default)]
    pub order_index: i32,
}

impl From<PeriodRecord> for PeriodRecordDto {
    fn from(p: PeriodRecord) -> Self {
        Self {
            period_name: p.period_name,
            start_time: p.start_time,
            end_time: p.end_time,
            is_break: p.is_break,
            order_index: p.order_index,
        }
    }
}

impl From<PeriodRecordDto> for PeriodRecord {
    fn from(p: PeriodRecordDto) -> Self {
        Self {
            period_name: p.period_name,
            start_time: p.start_time,
            end_time: p.end_time,
            is_break: p.is_break,
            order_index: p.order_index,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummaryDto {
    pub total_periods: u32,
    pub periods_before_break: u32,
    pub periods_after_break: u32,
    pub period_duration: u32,
    pub break_included: bool,
    pub break_duration: u32,
}

impl From<GenerationSummary> for GenerationSummaryDto {
    fn from(s: GenerationSummary) -> Self {
        Self {
            total_periods: s.total_periods,
            periods_before_break: s.periods_before_break,
            periods_after_break: s.periods_after_break,
            period_duration: s.period_duration,
            break_included: s.break_included,
            break_duration: s.break_duration,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PreviewResponse {
    pub periods: Vec<PeriodRecordDto>,
    pub summary: GenerationSummaryDto,
}

impl From<GeneratedPeriods> for PreviewResponse {
    fn from(g: GeneratedPeriods) -> Self {
        Self {
            periods: g.periods.into_iter().map(Into::into).collect(),
            summary: g.summary.into(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ApplyPeriodsPayload {
    #[serde(default)]
    pub periods: Vec<PeriodRecordDto>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCounts {
    pub total_periods: usize,
    pub class_periods: usize,
    pub break_periods: usize,
}

#[derive(Serialize, ToSchema)]
pub struct ApplyPeriodsResponse {
    pub message: String,
    pub periods: Vec<TimePeriodResponse>,
    pub summary: AppliedCounts,
}

impl From<AppliedSummary> for ApplyPeriodsResponse {
    fn from(a: AppliedSummary) -> Self {
        Self {
            message: format!("Successfully created {} time periods", a.total),
            periods: a.periods.into_iter().map(Into::into).collect(),
            summary: AppliedCounts {
                total_periods: a.total,
                class_periods: a.class_count,
                break_periods: a.break_count,
            },
        }
    }
}

//=========================================================================================
// Timetable
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AssignSlotPayload {
    pub section_id: Uuid,
    #[serde(default)]
    pub day: String,
    pub time_period_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub subject: Option<String>,
    pub room: Option<String>,
}

impl AssignSlotPayload {
    pub fn into_request(self) -> ApiResult<AssignSlotRequest> {
        Ok(AssignSlotRequest {
            section_id: self.section_id,
            day: parse_day(&self.day)?,
            time_period_id: self.time_period_id,
            teacher_id: self.teacher_id,
            subject: self.subject,
            room: self.room,
        })
    }
}

impl From<AssignSlotRequest> for AssignSlotPayload {
    fn from(r: AssignSlotRequest) -> Self {
        Self {
            section_id: r.section_id,
            day: r.day.to_string(),
            time_period_id: r.time_period_id,
            teacher_id: r.teacher_id,
            subject: r.subject,
            room: r.room,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlotPayload {
    pub teacher_id: Option<Uuid>,
    pub subject: Option<String>,
    pub room: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntryResponse {
    pub id: Uuid,
    pub section_id: Uuid,
    pub day: String,
    pub time_period_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub subject: Option<String>,
    pub room: Option<String>,
}

impl From<TimetableEntry> for TimetableEntryResponse {
    fn from(e: TimetableEntry) -> Self {
        Self {
            id: e.id,
            section_id: e.section_id,
            day: e.day.to_string(),
            time_period_id: e.time_period_id,
            teacher_id: e.teacher_id,
            subject: e.subject,
            room: e.room,
        }
    }
}

/// An entry joined with the names a timetable view displays.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntryDetailsResponse {
    #[serde(flatten)]
    pub entry: TimetableEntryResponse,
    pub class_id: Uuid,
    pub class_name: String,
    pub section_name: String,
    pub teacher_name: Option<String>,
    pub time_period: TimePeriodResponse,
}

impl From<TimetableEntryDetails> for TimetableEntryDetailsResponse {
    fn from(d: TimetableEntryDetails) -> Self {
        Self {
            entry: d.entry.into(),
            class_id: d.class_id,
            class_name: d.class_name,
            section_name: d.section_name,
            teacher_name: d.teacher_name,
            time_period: d.period.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ConflictDto {
    pub class: String,
    pub section: String,
    pub day: String,
    pub period: String,
    pub time: String,
    pub room: Option<String>,
}

impl From<ConflictInfo> for ConflictDto {
    fn from(c: ConflictInfo) -> Self {
        Self {
            class: c.class,
            section: c.section,
            day: c.day.to_string(),
            period: c.period,
            time: c.time,
            room: c.room,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct BatchPayload {
    #[serde(default)]
    pub entries: Vec<AssignSlotPayload>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectedEntryDto {
    pub entry: AssignSlotPayload,
    pub reason: String,
    pub conflict_with: Option<ConflictDto>,
}

impl From<RejectedEntry> for RejectedEntryDto {
    fn from(r: RejectedEntry) -> Self {
        Self {
            entry: r.request.into(),
            reason: r.reason,
            conflict_with: r.conflict.map(Into::into),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct BatchResponse {
    pub committed: Vec<TimetableEntryResponse>,
    pub rejected: Vec<RejectedEntryDto>,
}

impl From<CommitReport> for BatchResponse {
    fn from(r: CommitReport) -> Self {
        Self {
            committed: r.committed.into_iter().map(Into::into).collect(),
            rejected: r.rejected.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyGridPayload {
    #[serde(default)]
    pub days: Vec<String>,
    /// Omit to target every section.
    pub section_ids: Option<Vec<Uuid>>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GridSummaryDto {
    pub sections_affected: usize,
    pub days_affected: usize,
    pub entries_created: u64,
}

impl From<GridSummary> for GridSummaryDto {
    fn from(g: GridSummary) -> Self {
        Self {
            sections_affected: g.sections_affected,
            days_affected: g.days_affected,
            entries_created: g.entries_created,
        }
    }
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub day: String,
    pub time_period_id: Uuid,
    /// The entry being edited; its teacher stays available.
    pub exclude_entry_id: Option<Uuid>,
}
