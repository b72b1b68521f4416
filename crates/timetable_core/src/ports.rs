//! crates/timetable_core/src/ports.rs
//!
//! Defines the storage contract for the timetable core.
//! The trait forms the boundary of the hexagonal architecture, allowing the core
//! to be independent of a specific database.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Class, Day, NewTeacher, NewTimePeriod, NewTimetableEntry, SchoolSettings, Section, Teacher,
    TimePeriod, TimetableEntry, TimetableEntryDetails, TimetableScope,
};

//=========================================================================================
// Constraint Names
//=========================================================================================

/// Unique class names.
pub const CLASS_NAME_CONSTRAINT: &str = "uq_classes_name";
/// Unique section names within a class.
pub const SECTION_NAME_CONSTRAINT: &str = "uq_sections_class_name";
/// At most one entry per (section, day, time period).
pub const ENTRY_SLOT_CONSTRAINT: &str = "uq_timetable_slot";
/// At most one entry per (teacher, day, time period): the no-double-booking rule.
pub const TEACHER_SLOT_CONSTRAINT: &str = "uq_timetable_teacher_slot";

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from the underlying database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    pub fn unique(constraint: &str) -> Self {
        PortError::UniqueViolation {
            constraint: constraint.to_string(),
        }
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Port
//=========================================================================================

/// Every implementation must enforce the four unique constraints above
/// atomically and run each bulk operation as a single all-or-nothing batch.
#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Classes ---
    async fn create_class(&self, name: &str) -> PortResult<Class>;

    async fn get_class(&self, class_id: Uuid) -> PortResult<Class>;

    /// Ordered by name.
    async fn list_classes(&self) -> PortResult<Vec<Class>>;

    async fn rename_class(&self, class_id: Uuid, name: &str) -> PortResult<Class>;

    /// Cascades to sections, their timetable entries and teacher assignments.
    async fn delete_class(&self, class_id: Uuid) -> PortResult<()>;

    // --- Sections ---
    async fn create_section(&self, class_id: Uuid, name: &str) -> PortResult<Section>;

    async fn get_section(&self, section_id: Uuid) -> PortResult<Section>;

    /// Sections of one class, ordered by name.
    async fn list_sections(&self, class_id: Uuid) -> PortResult<Vec<Section>>;

    /// Every section in the school, ordered by class then name.
    async fn list_all_sections(&self) -> PortResult<Vec<Section>>;

    async fn rename_section(&self, section_id: Uuid, name: &str) -> PortResult<Section>;

    async fn delete_section(&self, section_id: Uuid) -> PortResult<()>;

    async fn count_entries_for_section(&self, section_id: Uuid) -> PortResult<u64>;

    // --- Teachers ---
    async fn create_teacher(&self, teacher: NewTeacher) -> PortResult<Teacher>;

    async fn get_teacher(&self, teacher_id: Uuid) -> PortResult<Teacher>;

    /// Ordered by name.
    async fn list_teachers(&self) -> PortResult<Vec<Teacher>>;

    /// Teachers assigned to the class, ordered by name.
    async fn list_teachers_by_class(&self, class_id: Uuid) -> PortResult<Vec<Teacher>>;

    /// Replaces name, subjects and class assignments.
    async fn update_teacher(&self, teacher_id: Uuid, teacher: NewTeacher) -> PortResult<Teacher>;

    /// Cascades to the teacher's timetable entries.
    async fn delete_teacher(&self, teacher_id: Uuid) -> PortResult<()>;

    // --- Time Periods ---
    /// Ordered by `order_index`.
    async fn list_time_periods(&self) -> PortResult<Vec<TimePeriod>>;

    async fn get_time_period(&self, period_id: Uuid) -> PortResult<TimePeriod>;

    async fn create_time_period(&self, period: NewTimePeriod) -> PortResult<TimePeriod>;

    /// Overwrites name, times and break flag; keeps `order_index`. When the
    /// period is a break, its entries lose teacher, subject and room in the
    /// same batch.
    async fn update_time_period(&self, period: TimePeriod) -> PortResult<TimePeriod>;

    /// Cascades to timetable entries referencing the period, then renumbers
    /// the remaining periods to 0..n-1 in their current order. One batch.
    async fn delete_time_period(&self, period_id: Uuid) -> PortResult<()>;

    /// Applies every `(id, order_index)` pair in one batch.
    async fn set_order_indexes(&self, order: &[(Uuid, i32)]) -> PortResult<()>;

    /// Deletes every timetable entry and time period, then inserts `periods`,
    /// as one batch.
    async fn replace_time_periods(&self, periods: Vec<NewTimePeriod>)
        -> PortResult<Vec<TimePeriod>>;

    // --- Timetable ---
    async fn get_entry(&self, entry_id: Uuid) -> PortResult<TimetableEntry>;

    async fn find_entry_by_slot(
        &self,
        section_id: Uuid,
        day: Day,
        period_id: Uuid,
    ) -> PortResult<Option<TimetableEntry>>;

    /// The entry booking `teacher_id` at (day, period), ignoring `exclude_entry_id`.
    async fn find_teacher_booking(
        &self,
        teacher_id: Uuid,
        day: Day,
        period_id: Uuid,
        exclude_entry_id: Option<Uuid>,
    ) -> PortResult<Option<TimetableEntryDetails>>;

    /// Non-null teacher ids booked at (day, period), ignoring `exclude_entry_id`.
    async fn busy_teacher_ids(
        &self,
        day: Day,
        period_id: Uuid,
        exclude_entry_id: Option<Uuid>,
    ) -> PortResult<Vec<Uuid>>;

    /// Creates or overwrites the entry at the (section, day, period) slot.
    /// Fails with `UniqueViolation(TEACHER_SLOT_CONSTRAINT)` on a double booking.
    async fn upsert_entry(&self, entry: NewTimetableEntry) -> PortResult<TimetableEntry>;

    async fn delete_entry(&self, entry_id: Uuid) -> PortResult<()>;

    async fn list_entries(&self, scope: TimetableScope) -> PortResult<Vec<TimetableEntryDetails>>;

    /// Deletes every entry for each (section, day) target, then inserts
    /// `entries`, as one batch. Returns the number of inserted entries.
    async fn replace_day_grids(
        &self,
        targets: &[(Uuid, Day)],
        entries: Vec<NewTimetableEntry>,
    ) -> PortResult<u64>;

    // --- School Settings ---
    async fn get_school_settings(&self) -> PortResult<Option<SchoolSettings>>;

    async fn upsert_school_settings(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> PortResult<SchoolSettings>;
}
