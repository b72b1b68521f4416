//! Time period management: manual edits, reordering and the destructive
//! apply step that replaces the whole period list.

use std::collections::HashSet;
use tracing::info;
use uuid::Uuid;

use crate::domain::{NewTimePeriod, TimePeriod};
use crate::error::{TimetableError, TimetableResult};
use crate::generator::PeriodRecord;
use crate::ports::DatabaseService;
use crate::time::parse_interval;

//=========================================================================================
// Requests and Summaries
//=========================================================================================

#[derive(Debug, Clone)]
pub struct CreatePeriodRequest {
    pub period_name: String,
    pub start_time: String,
    pub end_time: String,
    pub is_break: bool,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePeriodRequest {
    pub period_name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_break: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AppliedSummary {
    pub periods: Vec<TimePeriod>,
    pub total: usize,
    pub class_count: usize,
    pub break_count: usize,
}

//=========================================================================================
// Operations
//=========================================================================================

pub async fn list_periods(db: &dyn DatabaseService) -> TimetableResult<Vec<TimePeriod>> {
    Ok(db.list_time_periods().await?)
}

/// Appends a period after the current last one.
pub async fn create_period(
    db: &dyn DatabaseService,
    req: CreatePeriodRequest,
) -> TimetableResult<TimePeriod> {
    let period_name = required_name(&req.period_name)?;
    parse_interval(&req.start_time, &req.end_time)?;

    let next_index = db
        .list_time_periods()
        .await?
        .iter()
        .map(|p| p.order_index)
        .max()
        .map_or(0, |last| last + 1);

    let period = db
        .create_time_period(NewTimePeriod {
            period_name,
            start_time: req.start_time.trim().to_string(),
            end_time: req.end_time.trim().to_string(),
            is_break: req.is_break,
            order_index: next_index,
        })
        .await?;
    info!(period_id = %period.id, order_index = period.order_index, "Time period created");
    Ok(period)
}

pub async fn update_period(
    db: &dyn DatabaseService,
    period_id: Uuid,
    req: UpdatePeriodRequest,
) -> TimetableResult<TimePeriod> {
    let mut period = db.get_time_period(period_id).await?;

    if let Some(name) = req.period_name {
        period.period_name = required_name(&name)?;
    }
    if let Some(start) = req.start_time {
        period.start_time = start.trim().to_string();
    }
    if let Some(end) = req.end_time {
        period.end_time = end.trim().to_string();
    }
    if let Some(is_break) = req.is_break {
        period.is_break = is_break;
    }
    parse_interval(&period.start_time, &period.end_time)?;

    let updated = db.update_time_period(period).await?;
    if updated.is_break {
        info!(period_id = %updated.id, "Time period is a break; its entries were cleared");
    }
    Ok(updated)
}

/// Deletes a period and closes the gap it leaves in the ordering.
pub async fn delete_period(db: &dyn DatabaseService, period_id: Uuid) -> TimetableResult<()> {
    db.delete_time_period(period_id).await?;
    info!(%period_id, "Time period deleted");
    Ok(())
}

/// Sets the display order to the order of `period_ids`, which must name every
/// stored period exactly once.
pub async fn reorder_periods(
    db: &dyn DatabaseService,
    period_ids: &[Uuid],
) -> TimetableResult<Vec<TimePeriod>> {
    let stored: HashSet<Uuid> = db.list_time_periods().await?.iter().map(|p| p.id).collect();
    let requested: HashSet<Uuid> = period_ids.iter().copied().collect();

    if requested.len() != period_ids.len() {
        return Err(TimetableError::Validation(
            "periodIds must not contain duplicates".to_string(),
        ));
    }
    if let Some(unknown) = requested.difference(&stored).next() {
        return Err(TimetableError::NotFound(format!(
            "Time period {unknown} not found"
        )));
    }
    if requested.len() != stored.len() {
        return Err(TimetableError::Validation(
            "periodIds must list every time period".to_string(),
        ));
    }

    let order: Vec<(Uuid, i32)> = period_ids
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, index as i32))
        .collect();
    db.set_order_indexes(&order).await?;
    Ok(db.list_time_periods().await?)
}

/// Removes every period. Timetable entries go with them.
pub async fn clear_periods(db: &dyn DatabaseService) -> TimetableResult<()> {
    db.replace_time_periods(Vec::new()).await?;
    info!("All time periods cleared");
    Ok(())
}

/// Replaces all stored periods (and therefore all timetable entries) with
/// `periods` in a single batch. Order indexes follow list position.
pub async fn apply_periods(
    db: &dyn DatabaseService,
    periods: Vec<PeriodRecord>,
) -> TimetableResult<AppliedSummary> {
    if periods.is_empty() {
        return Err(TimetableError::Validation(
            "Periods array is required".to_string(),
        ));
    }

    let mut new_periods = Vec::with_capacity(periods.len());
    for (index, record) in periods.into_iter().enumerate() {
        if record.period_name.trim().is_empty()
            || record.start_time.trim().is_empty()
            || record.end_time.trim().is_empty()
        {
            return Err(TimetableError::Validation(
                "Each period must have periodName, startTime, and endTime".to_string(),
            ));
        }
        parse_interval(&record.start_time, &record.end_time).map_err(|e| {
            TimetableError::Validation(format!("Invalid timing for {}: {e}", record.period_name))
        })?;

        new_periods.push(NewTimePeriod {
            period_name: record.period_name.trim().to_string(),
            start_time: record.start_time.trim().to_string(),
            end_time: record.end_time.trim().to_string(),
            is_break: record.is_break,
            order_index: index as i32,
        });
    }

    let created = db.replace_time_periods(new_periods).await?;
    let break_count = created.iter().filter(|p| p.is_break).count();
    let summary = AppliedSummary {
        total: created.len(),
        class_count: created.len() - break_count,
        break_count,
        periods: created,
    };
    info!(
        total = summary.total,
        breaks = summary.break_count,
        "Time periods applied"
    );
    Ok(summary)
}

/// Computes the `(id, order_index)` updates that make the ordering dense
/// (0..n-1) while keeping relative order. Already-dense input yields nothing.
pub fn renumber(periods: &[TimePeriod]) -> Vec<(Uuid, i32)> {
    let mut ordered: Vec<&TimePeriod> = periods.iter().collect();
    ordered.sort_by_key(|p| p.order_index);
    ordered
        .into_iter()
        .enumerate()
        .filter(|(index, p)| p.order_index != *index as i32)
        .map(|(index, p)| (p.id, index as i32))
        .collect()
}

fn required_name(name: &str) -> TimetableResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TimetableError::Validation(
            "Period name, start time, and end time are required".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
