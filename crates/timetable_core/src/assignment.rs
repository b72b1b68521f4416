//! Slot assignment: creating, editing and clearing single timetable cells.
//!
//! Each (section, day, period) cell is independently empty, a break, or
//! assigned to a teacher. Writes are validated, checked for teacher
//! double-booking and then upserted on the cell's identity.

use tracing::{info, warn};
use uuid::Uuid;

use crate::conflict::check_conflict;
use crate::domain::{
    Day, NewTimetableEntry, TimetableEntry, TimetableEntryDetails, TimetableScope,
};
use crate::error::{TimetableError, TimetableResult};
use crate::ports::{DatabaseService, PortError, TEACHER_SLOT_CONSTRAINT};

//=========================================================================================
// Requests
//=========================================================================================

/// A proposed assignment of one cell. Teacher and subject are required for
/// class periods and ignored for breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignSlotRequest {
    pub section_id: Uuid,
    pub day: Day,
    pub time_period_id: Uuid,
    pub teacher_id: Option<Uuid>,
    pub subject: Option<String>,
    pub room: Option<String>,
}

/// New contents for an existing entry, addressed by the entry's id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSlotRequest {
    pub teacher_id: Option<Uuid>,
    pub subject: Option<String>,
    pub room: Option<String>,
}

//=========================================================================================
// Operations
//=========================================================================================

/// Creates or overwrites the entry at the requested cell.
pub async fn assign_slot(
    db: &dyn DatabaseService,
    req: AssignSlotRequest,
) -> TimetableResult<TimetableEntry> {
    db.get_section(req.section_id).await?;
    let existing = db
        .find_entry_by_slot(req.section_id, req.day, req.time_period_id)
        .await?;
    commit(db, req, existing.map(|e| e.id)).await
}

/// Overwrites teacher, subject and room of an existing entry. The entry is
/// excluded from its own conflict check.
pub async fn update_slot(
    db: &dyn DatabaseService,
    entry_id: Uuid,
    req: UpdateSlotRequest,
) -> TimetableResult<TimetableEntry> {
    let entry = db.get_entry(entry_id).await?;
    let assign = AssignSlotRequest {
        section_id: entry.section_id,
        day: entry.day,
        time_period_id: entry.time_period_id,
        teacher_id: req.teacher_id,
        subject: req.subject,
        room: req.room,
    };
    commit(db, assign, Some(entry.id)).await
}

/// Empties a cell by deleting its entry.
pub async fn delete_slot(db: &dyn DatabaseService, entry_id: Uuid) -> TimetableResult<()> {
    db.delete_entry(entry_id).await?;
    info!(%entry_id, "Timetable entry deleted");
    Ok(())
}

/// All entries of a section or a teacher, ordered by period then day.
pub async fn get_timetable(
    db: &dyn DatabaseService,
    scope: TimetableScope,
) -> TimetableResult<Vec<TimetableEntryDetails>> {
    match scope {
        TimetableScope::Section(id) => {
            db.get_section(id).await?;
        }
        TimetableScope::Teacher(id) => {
            db.get_teacher(id).await?;
        }
    }
    let mut entries = db.list_entries(scope).await?;
    entries.sort_by_key(|d| (d.period.order_index, d.entry.day));
    Ok(entries)
}

async fn commit(
    db: &dyn DatabaseService,
    req: AssignSlotRequest,
    exclude_entry_id: Option<Uuid>,
) -> TimetableResult<TimetableEntry> {
    let period = db.get_time_period(req.time_period_id).await?;

    let entry = if period.is_break {
        NewTimetableEntry {
            section_id: req.section_id,
            day: req.day,
            time_period_id: req.time_period_id,
            teacher_id: None,
            subject: None,
            room: None,
        }
    } else {
        let teacher_id = req.teacher_id.ok_or_else(|| {
            TimetableError::Validation("Teacher is required for class periods".to_string())
        })?;
        let subject = non_blank(req.subject).ok_or_else(|| {
            TimetableError::Validation("Subject is required for class periods".to_string())
        })?;
        db.get_teacher(teacher_id).await?;

        if let Some(conflict) =
            check_conflict(db, teacher_id, req.day, req.time_period_id, exclude_entry_id).await?
        {
            warn!(%teacher_id, day = %req.day, period = %conflict.period, "Assignment rejected: teacher already booked");
            return Err(TimetableError::Conflict(conflict));
        }

        NewTimetableEntry {
            section_id: req.section_id,
            day: req.day,
            time_period_id: req.time_period_id,
            teacher_id: Some(teacher_id),
            subject: Some(subject),
            room: non_blank(req.room),
        }
    };

    match db.upsert_entry(entry.clone()).await {
        Ok(saved) => {
            info!(entry_id = %saved.id, section_id = %saved.section_id, day = %saved.day, "Timetable entry saved");
            Ok(saved)
        }
        // Another writer booked the teacher between our check and the write.
        Err(PortError::UniqueViolation { constraint }) if constraint == TEACHER_SLOT_CONSTRAINT => {
            let teacher_id = entry.teacher_id.unwrap_or_default();
            let conflict =
                check_conflict(db, teacher_id, entry.day, entry.time_period_id, exclude_entry_id)
                    .await?
                    .ok_or_else(|| {
                        TimetableError::Storage(PortError::Unexpected(
                            "teacher booking constraint violated without a visible booking"
                                .to_string(),
                        ))
                    })?;
            warn!(%teacher_id, "Assignment lost a race for the teacher's slot");
            Err(TimetableError::Conflict(conflict))
        }
        Err(other) => Err(other.into()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    fn request(fx: &Fixture, section: Uuid, period: usize, teacher: Option<Uuid>) -> AssignSlotRequest {
        AssignSlotRequest {
            section_id: section,
            day: Day::Monday,
            time_period_id: fx.periods[period],
            teacher_id: teacher,
            subject: Some("Math".into()),
            room: Some("R1".into()),
        }
    }

    #[tokio::test]
    async fn assigns_an_empty_slot() {
        let fx = Fixture::new().await;
        let entry = assign_slot(&fx.db, request(&fx, fx.section_a, 0, Some(fx.teacher_a)))
            .await
            .unwrap();

        assert_eq!(entry.teacher_id, Some(fx.teacher_a));
        assert_eq!(entry.subject.as_deref(), Some("Math"));
        assert_eq!(entry.room.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn second_section_same_slot_same_teacher_conflicts() {
        let fx = Fixture::new().await;
        assign_slot(&fx.db, request(&fx, fx.section_a, 0, Some(fx.teacher_a)))
            .await
            .unwrap();

        let err = assign_slot(&fx.db, request(&fx, fx.section_b, 0, Some(fx.teacher_a)))
            .await
            .unwrap_err();

        let conflict = match err {
            TimetableError::Conflict(conflict) => conflict,
            other => panic!("expected conflict, got {other:?}"),
        };
        assert_eq!(conflict.class, "Grade 7");
        assert_eq!(conflict.section, "A");
        assert_eq!(conflict.period, "Period 1");
        assert_eq!(conflict.time, "08:00 - 09:00");
    }

    #[tokio::test]
    async fn reassigning_the_same_cell_is_an_upsert() {
        let fx = Fixture::new().await;
        let first = assign_slot(&fx.db, request(&fx, fx.section_a, 0, Some(fx.teacher_a)))
            .await
            .unwrap();

        let mut again = request(&fx, fx.section_a, 0, Some(fx.teacher_a));
        again.subject = Some("Physics".into());
        let second = assign_slot(&fx.db, again).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.subject.as_deref(), Some("Physics"));
        let stored = get_timetable(&fx.db, TimetableScope::Section(fx.section_a))
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn break_slots_drop_teacher_subject_and_room() {
        let fx = Fixture::new().await;
        // The teacher is booked elsewhere at the break; no conflict is raised.
        fx.book(fx.section_b, Day::Monday, Fixture::BREAK, fx.teacher_a, None)
            .await;

        let entry = assign_slot(
            &fx.db,
            request(&fx, fx.section_a, Fixture::BREAK, Some(fx.teacher_a)),
        )
        .await
        .unwrap();

        assert_eq!(entry.teacher_id, None);
        assert_eq!(entry.subject, None);
        assert_eq!(entry.room, None);
    }

    #[tokio::test]
    async fn class_periods_require_teacher_and_subject() {
        let fx = Fixture::new().await;
        let missing_teacher = assign_slot(&fx.db, request(&fx, fx.section_a, 0, None))
            .await
            .unwrap_err();
        assert_eq!(
            missing_teacher,
            TimetableError::Validation("Teacher is required for class periods".into())
        );

        let mut blank_subject = request(&fx, fx.section_a, 0, Some(fx.teacher_a));
        blank_subject.subject = Some("   ".into());
        let err = assign_slot(&fx.db, blank_subject).await.unwrap_err();
        assert_eq!(
            err,
            TimetableError::Validation("Subject is required for class periods".into())
        );
    }

    #[tokio::test]
    async fn unknown_references_are_not_found() {
        let fx = Fixture::new().await;

        let mut bad_period = request(&fx, fx.section_a, 0, Some(fx.teacher_a));
        bad_period.time_period_id = Uuid::new_v4();
        assert!(matches!(
            assign_slot(&fx.db, bad_period).await,
            Err(TimetableError::NotFound(_))
        ));

        let bad_section = request(&fx, Uuid::new_v4(), 0, Some(fx.teacher_a));
        assert!(matches!(
            assign_slot(&fx.db, bad_section).await,
            Err(TimetableError::NotFound(_))
        ));

        let bad_teacher = request(&fx, fx.section_a, 0, Some(Uuid::new_v4()));
        assert!(matches!(
            assign_slot(&fx.db, bad_teacher).await,
            Err(TimetableError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn editing_an_entry_does_not_conflict_with_itself() {
        let fx = Fixture::new().await;
        let entry = assign_slot(&fx.db, request(&fx, fx.section_a, 0, Some(fx.teacher_a)))
            .await
            .unwrap();

        let edited = update_slot(
            &fx.db,
            entry.id,
            UpdateSlotRequest {
                teacher_id: Some(fx.teacher_a),
                subject: Some("Chemistry".into()),
                room: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(edited.id, entry.id);
        assert_eq!(edited.subject.as_deref(), Some("Chemistry"));
        assert_eq!(edited.room, None);
    }

    #[tokio::test]
    async fn editing_to_a_busy_teacher_conflicts() {
        let fx = Fixture::new().await;
        fx.book(fx.section_b, Day::Monday, 0, fx.teacher_b, None).await;
        let entry = assign_slot(&fx.db, request(&fx, fx.section_a, 0, Some(fx.teacher_a)))
            .await
            .unwrap();

        let err = update_slot(
            &fx.db,
            entry.id,
            UpdateSlotRequest {
                teacher_id: Some(fx.teacher_b),
                subject: Some("Math".into()),
                room: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, TimetableError::Conflict(c) if c.section == "B"));
    }

    #[tokio::test]
    async fn deleting_leaves_the_cell_empty() {
        let fx = Fixture::new().await;
        let entry = assign_slot(&fx.db, request(&fx, fx.section_a, 0, Some(fx.teacher_a)))
            .await
            .unwrap();

        delete_slot(&fx.db, entry.id).await.unwrap();

        assert!(get_timetable(&fx.db, TimetableScope::Section(fx.section_a))
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            delete_slot(&fx.db, entry.id).await,
            Err(TimetableError::NotFound(_))
        ));
        // The freed teacher can be booked by another section.
        assign_slot(&fx.db, request(&fx, fx.section_b, 0, Some(fx.teacher_a)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn timetable_is_ordered_by_period_then_day() {
        let fx = Fixture::new().await;
        fx.book(fx.section_a, Day::Wednesday, 3, fx.teacher_a, None).await;
        fx.book(fx.section_a, Day::Tuesday, 0, fx.teacher_a, None).await;
        fx.book(fx.section_a, Day::Monday, 3, fx.teacher_b, None).await;

        let entries = get_timetable(&fx.db, TimetableScope::Section(fx.section_a))
            .await
            .unwrap();
        let order: Vec<(i32, Day)> = entries
            .iter()
            .map(|d| (d.period.order_index, d.entry.day))
            .collect();
        assert_eq!(
            order,
            vec![(0, Day::Tuesday), (3, Day::Monday), (3, Day::Wednesday)]
        );

        let teacher_view = get_timetable(&fx.db, TimetableScope::Teacher(fx.teacher_a))
            .await
            .unwrap();
        assert_eq!(teacher_view.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_writers_never_double_book() {
        let fx = Fixture::new().await;
        let db = fx.db.clone();
        let a = {
            let db = db.clone();
            let req = request(&fx, fx.section_a, 0, Some(fx.teacher_a));
            tokio::spawn(async move { assign_slot(&db, req).await })
        };
        let b = {
            let db = db.clone();
            let req = request(&fx, fx.section_b, 0, Some(fx.teacher_a));
            tokio::spawn(async move { assign_slot(&db, req).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(TimetableError::Conflict(_)))));
    }
}
