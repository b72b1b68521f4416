//! Teacher availability at a day and period.
//!
//! Uses the same (day, period id) identity as [`crate::conflict`], so a
//! teacher listed here can always be assigned without a conflict.

use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::{Day, Teacher};
use crate::error::TimetableResult;
use crate::ports::DatabaseService;

/// Every teacher without a booking at (`day`, `period_id`), ordered by name.
///
/// `exclude_entry_id` ignores one booking, so the teacher of the entry being
/// edited stays selectable.
pub async fn get_available_teachers(
    db: &dyn DatabaseService,
    day: Day,
    period_id: Uuid,
    exclude_entry_id: Option<Uuid>,
) -> TimetableResult<Vec<Teacher>> {
    db.get_time_period(period_id).await?;

    let busy: HashSet<Uuid> = db
        .busy_teacher_ids(day, period_id, exclude_entry_id)
        .await?
        .into_iter()
        .collect();

    let mut teachers: Vec<Teacher> = db
        .list_teachers()
        .await?
        .into_iter()
        .filter(|t| !busy.contains(&t.id))
        .collect();
    teachers.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(teachers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::{assign_slot, AssignSlotRequest};
    use crate::conflict::check_conflict;
    use crate::error::TimetableError;
    use crate::testing::Fixture;

    fn names(teachers: &[Teacher]) -> Vec<&str> {
        teachers.iter().map(|t| t.name.as_str()).collect()
    }

    #[tokio::test]
    async fn everyone_is_free_in_an_empty_timetable() {
        let fx = Fixture::new().await;
        let free = get_available_teachers(&fx.db, Day::Monday, fx.periods[0], None)
            .await
            .unwrap();
        assert_eq!(names(&free), vec!["Alice", "Bob", "Carol"]);
    }

    #[tokio::test]
    async fn booked_teacher_is_excluded() {
        let fx = Fixture::new().await;
        assign_slot(
            &fx.db,
            AssignSlotRequest {
                section_id: fx.section_a,
                day: Day::Monday,
                time_period_id: fx.periods[0],
                teacher_id: Some(fx.teacher_a),
                subject: Some("Math".into()),
                room: None,
            },
        )
        .await
        .unwrap();

        let free = get_available_teachers(&fx.db, Day::Monday, fx.periods[0], None)
            .await
            .unwrap();
        assert_eq!(names(&free), vec!["Bob", "Carol"]);

        let other_day = get_available_teachers(&fx.db, Day::Tuesday, fx.periods[0], None)
            .await
            .unwrap();
        assert_eq!(other_day.len(), 3);
    }

    #[tokio::test]
    async fn excluded_entry_frees_its_teacher() {
        let fx = Fixture::new().await;
        let entry = fx.book(fx.section_a, Day::Monday, 0, fx.teacher_a, None).await;

        let free = get_available_teachers(&fx.db, Day::Monday, fx.periods[0], Some(entry.id))
            .await
            .unwrap();
        assert_eq!(names(&free), vec!["Alice", "Bob", "Carol"]);
    }

    #[tokio::test]
    async fn unknown_period_is_not_found() {
        let fx = Fixture::new().await;
        let err = get_available_teachers(&fx.db, Day::Monday, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TimetableError::NotFound(_)));
    }

    #[tokio::test]
    async fn availability_agrees_with_conflict_checks() {
        let fx = Fixture::new().await;
        fx.book(fx.section_a, Day::Monday, 0, fx.teacher_a, None).await;
        fx.book(fx.section_b, Day::Monday, 1, fx.teacher_b, None).await;
        fx.book(fx.section_a, Day::Friday, 3, fx.teacher_c, None).await;

        for day in [Day::Monday, Day::Friday] {
            for &period in &fx.periods {
                let free: HashSet<Uuid> = get_available_teachers(&fx.db, day, period, None)
                    .await
                    .unwrap()
                    .iter()
                    .map(|t| t.id)
                    .collect();
                for teacher in [fx.teacher_a, fx.teacher_b, fx.teacher_c] {
                    let conflict = check_conflict(&fx.db, teacher, day, period, None)
                        .await
                        .unwrap();
                    assert_eq!(free.contains(&teacher), conflict.is_none());
                }
            }
        }
    }
}
