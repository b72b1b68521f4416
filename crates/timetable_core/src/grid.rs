//! Bulk reset of whole section days to the current period grid.

use tracing::info;
use uuid::Uuid;

use crate::domain::{Day, NewTimetableEntry};
use crate::error::{TimetableError, TimetableResult};
use crate::ports::DatabaseService;

#[derive(Debug, Clone, Default)]
pub struct ApplyGridRequest {
    pub days: Vec<Day>,
    /// `None` targets every section in the school.
    pub section_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSummary {
    pub sections_affected: usize,
    pub days_affected: usize,
    pub entries_created: u64,
}

/// Overwrites every targeted (section, day) with one empty cell per stored
/// period. Break cells are recognisable through their period. Existing
/// assignments for those days are discarded; the whole replace is one batch.
pub async fn apply_grid(
    db: &dyn DatabaseService,
    req: ApplyGridRequest,
) -> TimetableResult<GridSummary> {
    let mut days = req.days;
    days.sort();
    days.dedup();
    if days.is_empty() {
        return Err(TimetableError::Validation(
            "Days array is required".to_string(),
        ));
    }

    let section_ids: Vec<Uuid> = match req.section_ids {
        Some(mut ids) => {
            ids.sort();
            ids.dedup();
            for id in &ids {
                db.get_section(*id).await?;
            }
            ids
        }
        None => db.list_all_sections().await?.into_iter().map(|s| s.id).collect(),
    };

    let periods = db.list_time_periods().await?;
    let mut targets = Vec::with_capacity(section_ids.len() * days.len());
    let mut entries = Vec::with_capacity(targets.capacity() * periods.len());
    for section_id in &section_ids {
        for day in &days {
            targets.push((*section_id, *day));
            entries.extend(periods.iter().map(|period| NewTimetableEntry {
                section_id: *section_id,
                day: *day,
                time_period_id: period.id,
                teacher_id: None,
                subject: None,
                room: None,
            }));
        }
    }

    let entries_created = db.replace_day_grids(&targets, entries).await?;
    let summary = GridSummary {
        sections_affected: section_ids.len(),
        days_affected: days.len(),
        entries_created,
    };
    info!(
        sections = summary.sections_affected,
        days = summary.days_affected,
        entries = summary.entries_created,
        "Period grid applied"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimetableScope;
    use crate::testing::Fixture;

    #[tokio::test]
    async fn resets_targeted_days_for_every_section() {
        let fx = Fixture::new().await;
        fx.book(fx.section_a, Day::Monday, 0, fx.teacher_a, Some("R1")).await;
        fx.book(fx.section_a, Day::Friday, 0, fx.teacher_a, None).await;

        let summary = apply_grid(
            &fx.db,
            ApplyGridRequest {
                days: vec![Day::Monday, Day::Tuesday, Day::Monday],
                section_ids: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.sections_affected, 2);
        assert_eq!(summary.days_affected, 2);
        assert_eq!(summary.entries_created, 2 * 2 * fx.periods.len() as u64);

        let section_a = fx.db.list_entries(TimetableScope::Section(fx.section_a)).await.unwrap();
        let monday: Vec<_> = section_a.iter().filter(|d| d.entry.day == Day::Monday).collect();
        assert_eq!(monday.len(), fx.periods.len());
        assert!(monday.iter().all(|d| d.entry.teacher_id.is_none()));
        // Untargeted days are left alone.
        assert!(section_a
            .iter()
            .any(|d| d.entry.day == Day::Friday && d.entry.teacher_id == Some(fx.teacher_a)));
    }

    #[tokio::test]
    async fn can_target_a_single_section() {
        let fx = Fixture::new().await;
        let summary = apply_grid(
            &fx.db,
            ApplyGridRequest {
                days: vec![Day::Saturday],
                section_ids: Some(vec![fx.section_b]),
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.sections_affected, 1);
        assert!(fx
            .db
            .list_entries(TimetableScope::Section(fx.section_a))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn requires_days_and_known_sections() {
        let fx = Fixture::new().await;
        let no_days = apply_grid(&fx.db, ApplyGridRequest::default()).await.unwrap_err();
        assert!(matches!(no_days, TimetableError::Validation(_)));

        let unknown = apply_grid(
            &fx.db,
            ApplyGridRequest {
                days: vec![Day::Monday],
                section_ids: Some(vec![Uuid::new_v4()]),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(unknown, TimetableError::NotFound(_)));
    }
}
