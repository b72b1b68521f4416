//! crates/timetable_core/src/domain.rs
//!
//! Defines the pure, core data structures for the timetable application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Day of the Week
//=========================================================================================

/// A school day. Timetables run Monday through Saturday; there is no Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Day {
    pub const ALL: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the six school days.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a school day (expected Monday to Saturday)")]
pub struct InvalidDay(pub String);

impl FromStr for Day {
    type Err = InvalidDay;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Day::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidDay(s.to_string()))
    }
}

//=========================================================================================
// School Structure
//=========================================================================================

/// A class (grade), e.g. "Grade 7". Names are unique across the school.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub id: Uuid,
    pub name: String,
}

/// A section of a class, e.g. "A". Names are unique within their class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: Uuid,
    pub class_id: Uuid,
    pub name: String,
}

/// A class together with all of its sections.
#[derive(Debug, Clone)]
pub struct ClassWithSections {
    pub class: Class,
    pub sections: Vec<Section>,
}

/// A teacher. `class_ids` is a filtering hint for callers, not an
/// enforcement boundary: a teacher can be booked outside assigned classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: Uuid,
    pub name: String,
    pub subjects: Vec<String>,
    pub class_ids: Vec<Uuid>,
}

/// The data needed to create or fully replace a teacher.
#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub name: String,
    pub subjects: Vec<String>,
    pub class_ids: Vec<Uuid>,
}

//=========================================================================================
// Time Periods
//=========================================================================================

/// A named interval of the school day. `order_index` is dense (0..n-1) and
/// defines display and iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePeriod {
    pub id: Uuid,
    pub period_name: String,
    pub start_time: String,
    pub end_time: String,
    pub is_break: bool,
    pub order_index: i32,
}

/// A time period that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimePeriod {
    pub period_name: String,
    pub start_time: String,
    pub end_time: String,
    pub is_break: bool,
    pub order_index: i32,
}

//=========================================================================================
// Timetable Entries
//=========================================================================================

/// The assignment of a single (section, day, time period) slot.
///
/// Break slots never carry a teacher, subject or room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableEntry {
    pub id: Uuid,
    pub section_id: Uuid,
    pub day: Day,
    pub time_period_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub subject: Option<String>,
    pub room: Option<String>,
}

/// An entry to be written. Storage upserts on (section_id, day, time_period_id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimetableEntry {
    pub section_id: Uuid,
    pub day: Day,
    pub time_period_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub subject: Option<String>,
    pub room: Option<String>,
}

/// A stored entry joined with the names of everything it references.
#[derive(Debug, Clone)]
pub struct TimetableEntryDetails {
    pub entry: TimetableEntry,
    pub class_id: Uuid,
    pub class_name: String,
    pub section_name: String,
    pub teacher_name: Option<String>,
    pub period: TimePeriod,
}

/// Selects whose timetable to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimetableScope {
    Section(Uuid),
    Teacher(Uuid),
}

//=========================================================================================
// School Settings
//=========================================================================================

/// The single school-hours record. `updated_at` is `None` until the
/// settings have been saved at least once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolSettings {
    pub start_time: String,
    pub end_time: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SchoolSettings {
    fn default() -> Self {
        Self {
            start_time: "08:00".to_string(),
            end_time: "14:00".to_string(),
            updated_at: None,
        }
    }
}
