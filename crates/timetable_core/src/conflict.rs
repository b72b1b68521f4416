//! Teacher double-booking detection.
//!
//! Two bookings conflict when they name the same teacher on the same day in
//! the same time period record. Periods are compared by identity only: two
//! distinct periods that overlap in wall-clock time do not conflict.

use tracing::debug;
use uuid::Uuid;

use crate::domain::{Day, TimetableEntryDetails};
use crate::error::TimetableResult;
use crate::ports::DatabaseService;

/// Identifies the booking that blocks a proposed assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictInfo {
    pub class: String,
    pub section: String,
    pub day: Day,
    pub period: String,
    /// "HH:MM - HH:MM"
    pub time: String,
    pub room: Option<String>,
}

impl From<&TimetableEntryDetails> for ConflictInfo {
    fn from(details: &TimetableEntryDetails) -> Self {
        Self {
            class: details.class_name.clone(),
            section: details.section_name.clone(),
            day: details.entry.day,
            period: details.period.period_name.clone(),
            time: format!(
                "{} - {}",
                details.period.start_time, details.period.end_time
            ),
            room: details.entry.room.clone(),
        }
    }
}

/// Returns the existing booking of `teacher_id` at (`day`, `period_id`), if any.
///
/// `exclude_entry_id` skips one entry so that re-saving a slot does not
/// conflict with itself.
pub async fn check_conflict(
    db: &dyn DatabaseService,
    teacher_id: Uuid,
    day: Day,
    period_id: Uuid,
    exclude_entry_id: Option<Uuid>,
) -> TimetableResult<Option<ConflictInfo>> {
    let booking = db
        .find_teacher_booking(teacher_id, day, period_id, exclude_entry_id)
        .await?;

    if let Some(details) = &booking {
        debug!(
            %teacher_id,
            %day,
            %period_id,
            conflicting_entry = %details.entry.id,
            "Teacher already booked"
        );
    }
    Ok(booking.as_ref().map(ConflictInfo::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDatabase;
    use crate::testing::Fixture;

    #[tokio::test]
    async fn no_conflict_for_free_teacher() {
        let fx = Fixture::new().await;
        let db = &fx.db as &dyn DatabaseService;
        let found = check_conflict(db, fx.teacher_a, Day::Monday, fx.periods[0], None)
            .await
            .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn reports_details_of_existing_booking() {
        let fx = Fixture::new().await;
        fx.book(fx.section_a, Day::Monday, 0, fx.teacher_a, Some("R12")).await;

        let found = check_conflict(&fx.db, fx.teacher_a, Day::Monday, fx.periods[0], None)
            .await
            .unwrap()
            .expect("conflict expected");

        assert_eq!(found.class, "Grade 7");
        assert_eq!(found.section, "A");
        assert_eq!(found.day, Day::Monday);
        assert_eq!(found.period, "Period 1");
        assert_eq!(found.time, "08:00 - 09:00");
        assert_eq!(found.room.as_deref(), Some("R12"));
    }

    #[tokio::test]
    async fn excluded_entry_does_not_conflict_with_itself() {
        let fx = Fixture::new().await;
        let entry = fx.book(fx.section_a, Day::Monday, 0, fx.teacher_a, None).await;

        let found = check_conflict(
            &fx.db,
            fx.teacher_a,
            Day::Monday,
            fx.periods[0],
            Some(entry.id),
        )
        .await
        .unwrap();
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn other_day_or_period_does_not_conflict() {
        let fx = Fixture::new().await;
        fx.book(fx.section_a, Day::Monday, 0, fx.teacher_a, None).await;

        let tuesday = check_conflict(&fx.db, fx.teacher_a, Day::Tuesday, fx.periods[0], None)
            .await
            .unwrap();
        let period_two = check_conflict(&fx.db, fx.teacher_a, Day::Monday, fx.periods[1], None)
            .await
            .unwrap();
        assert_eq!(tuesday, None);
        assert_eq!(period_two, None);
    }

    #[tokio::test]
    async fn identical_times_on_distinct_periods_do_not_conflict() {
        let db = InMemoryDatabase::new();
        let fx = Fixture::with_db(db.clone()).await;
        let twin = db
            .create_time_period(crate::domain::NewTimePeriod {
                period_name: "Period 1 (lab)".into(),
                start_time: "08:00".into(),
                end_time: "09:00".into(),
                is_break: false,
                order_index: 99,
            })
            .await
            .unwrap();
        fx.book(fx.section_a, Day::Monday, 0, fx.teacher_a, None).await;

        let found = check_conflict(&db, fx.teacher_a, Day::Monday, twin.id, None)
            .await
            .unwrap();
        assert_eq!(found, None);
    }
}
