//! Period grid generation.
//!
//! Lays out a day of equal-length class periods around an optional single
//! break by stepping forward from the school start time. The result is only
//! a preview; nothing is written until it is passed to
//! [`crate::periods::apply_periods`].

use crate::error::{TimetableError, TimetableResult};
use crate::time::{minutes_to_time, time_to_minutes};

/// Shortest allowed class period, in minutes.
pub const MIN_PERIOD_MINUTES: u32 = 15;
/// Largest number of class periods in one day.
pub const MAX_PERIODS: u32 = 20;
/// Name given to the generated break.
pub const BREAK_NAME: &str = "Lunch Break";

/// Constraints for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratePeriodsRequest {
    pub school_start_time: String,
    pub school_end_time: String,
    pub total_periods: u32,
    /// `None` or `Some(0)` derives the duration from the available time.
    pub period_duration: Option<u32>,
    pub include_break: bool,
    pub break_start_time: Option<String>,
    pub break_end_time: Option<String>,
}

/// One generated period, ready to be reviewed, edited and applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRecord {
    pub period_name: String,
    pub start_time: String,
    pub end_time: String,
    pub is_break: bool,
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub total_periods: u32,
    pub periods_before_break: u32,
    pub periods_after_break: u32,
    pub period_duration: u32,
    pub break_included: bool,
    pub break_duration: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPeriods {
    pub periods: Vec<PeriodRecord>,
    pub summary: GenerationSummary,
}

struct BreakWindow {
    start: u32,
    end: u32,
    start_time: String,
    end_time: String,
}

/// Produces the period grid described by `req` without touching storage.
///
/// Class periods are placed before the break while they end at or before
/// the break start; the rest follow the break end. Fails if any period
/// would run past the school end time.
pub fn generate_preview(req: &GeneratePeriodsRequest) -> TimetableResult<GeneratedPeriods> {
    if req.total_periods < 1 || req.total_periods > MAX_PERIODS {
        return Err(TimetableError::Validation(format!(
            "Total periods must be between 1 and {MAX_PERIODS}"
        )));
    }

    let school_start = time_to_minutes(&req.school_start_time)?;
    let school_end = time_to_minutes(&req.school_end_time)?;
    if school_start >= school_end {
        return Err(TimetableError::Validation(
            "School end time must be after start time".to_string(),
        ));
    }

    let break_window = if req.include_break {
        Some(break_window(req, school_start, school_end)?)
    } else {
        None
    };
    let break_duration = break_window.as_ref().map_or(0, |b| b.end - b.start);

    let available = (school_end - school_start) - break_duration;
    let duration = match req.period_duration {
        Some(d) if d > 0 => d,
        _ => available / req.total_periods,
    };
    if duration < MIN_PERIOD_MINUTES {
        return Err(TimetableError::Validation(
            "Period duration too short. Please reduce number of periods or increase school hours."
                .to_string(),
        ));
    }
    // Keeps every `cursor + duration` below two days of minutes.
    if duration > school_end - school_start {
        return Err(cannot_fit(req.total_periods));
    }

    let mut periods_before_break = 0;
    if let Some(window) = &break_window {
        let mut cursor = school_start;
        while periods_before_break < req.total_periods && cursor + duration <= window.start {
            periods_before_break += 1;
            cursor += duration;
        }
    }

    let mut periods = Vec::with_capacity(req.total_periods as usize + 1);
    let mut cursor = school_start;

    for number in 1..=periods_before_break {
        push_period(
            &mut periods,
            format!("Period {number}"),
            minutes_to_time(cursor),
            minutes_to_time(cursor + duration),
            false,
        );
        cursor += duration;
    }

    if let Some(window) = &break_window {
        push_period(
            &mut periods,
            BREAK_NAME.to_string(),
            window.start_time.clone(),
            window.end_time.clone(),
            true,
        );
        cursor = window.end;
    }

    let periods_after_break = req.total_periods - periods_before_break;
    for number in (periods_before_break + 1)..=req.total_periods {
        if cursor + duration > school_end {
            return Err(cannot_fit(req.total_periods));
        }
        push_period(
            &mut periods,
            format!("Period {number}"),
            minutes_to_time(cursor),
            minutes_to_time(cursor + duration),
            false,
        );
        cursor += duration;
    }

    Ok(GeneratedPeriods {
        periods,
        summary: GenerationSummary {
            total_periods: req.total_periods,
            periods_before_break,
            periods_after_break,
            period_duration: duration,
            break_included: break_window.is_some(),
            break_duration,
        },
    })
}

fn cannot_fit(total_periods: u32) -> TimetableError {
    TimetableError::Validation(format!(
        "Cannot fit all {total_periods} periods. Please reduce periods or adjust break timing."
    ))
}

fn push_period(
    periods: &mut Vec<PeriodRecord>,
    period_name: String,
    start_time: String,
    end_time: String,
    is_break: bool,
) {
    let order_index = periods.len() as i32;
    periods.push(PeriodRecord {
        period_name,
        start_time,
        end_time,
        is_break,
        order_index,
    });
}

fn break_window(
    req: &GeneratePeriodsRequest,
    school_start: u32,
    school_end: u32,
) -> TimetableResult<BreakWindow> {
    let (Some(start_time), Some(end_time)) = (
        req.break_start_time.as_deref().filter(|s| !s.trim().is_empty()),
        req.break_end_time.as_deref().filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(TimetableError::Validation(
            "Break start and end time are required when including break".to_string(),
        ));
    };

    let start = time_to_minutes(start_time)?;
    let end = time_to_minutes(end_time)?;
    if start >= end {
        return Err(TimetableError::Validation(
            "Break end time must be after start time".to_string(),
        ));
    }
    if start < school_start || end > school_end {
        return Err(TimetableError::Validation(
            "Break must be within school hours".to_string(),
        ));
    }

    Ok(BreakWindow {
        start,
        end,
        start_time: minutes_to_time(start),
        end_time: minutes_to_time(end),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(start: &str, end: &str, total: u32) -> GeneratePeriodsRequest {
        GeneratePeriodsRequest {
            school_start_time: start.to_string(),
            school_end_time: end.to_string(),
            total_periods: total,
            period_duration: None,
            include_break: false,
            break_start_time: None,
            break_end_time: None,
        }
    }

    fn with_break(mut req: GeneratePeriodsRequest, start: &str, end: &str) -> GeneratePeriodsRequest {
        req.include_break = true;
        req.break_start_time = Some(start.to_string());
        req.break_end_time = Some(end.to_string());
        req
    }

    fn spans(generated: &GeneratedPeriods) -> Vec<(String, String, String)> {
        generated
            .periods
            .iter()
            .map(|p| (p.period_name.clone(), p.start_time.clone(), p.end_time.clone()))
            .collect()
    }

    fn validation_message(result: TimetableResult<GeneratedPeriods>) -> String {
        match result {
            Err(TimetableError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn six_hourly_periods_without_break() {
        let generated = generate_preview(&request("08:00", "14:00", 6)).unwrap();

        assert_eq!(generated.periods.len(), 6);
        assert_eq!(generated.summary.period_duration, 60);
        assert_eq!(generated.periods[0].start_time, "08:00");
        assert_eq!(generated.periods[0].end_time, "09:00");
        assert_eq!(generated.periods[5].start_time, "13:00");
        assert_eq!(generated.periods[5].end_time, "14:00");
        assert!(generated.periods.iter().all(|p| !p.is_break));
        let order: Vec<i32> = generated.periods.iter().map(|p| p.order_index).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn overflowing_break_layout_is_rejected() {
        // 270 available minutes over 5 periods gives 54 minutes; only two fit
        // before 10:30 and the third after the break would end at 13:42.
        let req = with_break(request("08:00", "13:00", 5), "10:30", "11:00");
        let msg = validation_message(generate_preview(&req));
        assert!(msg.starts_with("Cannot fit all 5 periods"), "{msg}");
    }

    #[test]
    fn places_periods_around_the_break() {
        let req = with_break(request("08:00", "14:00", 5), "10:00", "11:00");
        let generated = generate_preview(&req).unwrap();

        assert_eq!(
            spans(&generated),
            vec![
                ("Period 1".into(), "08:00".into(), "09:00".into()),
                ("Period 2".into(), "09:00".into(), "10:00".into()),
                (BREAK_NAME.into(), "10:00".into(), "11:00".into()),
                ("Period 3".into(), "11:00".into(), "12:00".into()),
                ("Period 4".into(), "12:00".into(), "13:00".into()),
                ("Period 5".into(), "13:00".into(), "14:00".into()),
            ]
        );
        assert!(generated.periods[2].is_break);
        assert_eq!(generated.summary.periods_before_break, 2);
        assert_eq!(generated.summary.periods_after_break, 3);
        assert_eq!(generated.summary.break_duration, 60);
        assert_eq!(generated.periods[5].order_index, 5);
    }

    #[test]
    fn leaves_gap_before_break_when_periods_do_not_divide_evenly() {
        let mut req = with_break(request("08:00", "13:00", 4), "10:30", "11:00");
        req.period_duration = Some(45);
        let generated = generate_preview(&req).unwrap();

        assert_eq!(generated.periods[2].start_time, "09:30");
        assert_eq!(generated.periods[2].end_time, "10:15");
        assert_eq!(generated.periods[3].period_name, BREAK_NAME);
        assert_eq!(generated.periods[4].start_time, "11:00");
        assert_eq!(generated.periods[4].period_name, "Period 4");
    }

    #[test]
    fn never_emits_more_periods_than_requested_before_a_late_break() {
        let mut req = with_break(request("08:00", "16:00", 2), "14:00", "14:30");
        req.period_duration = Some(60);
        let generated = generate_preview(&req).unwrap();

        let class_periods = generated.periods.iter().filter(|p| !p.is_break).count();
        assert_eq!(class_periods, 2);
        assert_eq!(generated.summary.periods_before_break, 2);
        assert_eq!(generated.summary.periods_after_break, 0);
        assert_eq!(generated.periods.last().unwrap().period_name, BREAK_NAME);
    }

    #[test]
    fn every_period_stays_inside_school_hours() {
        let req = with_break(request("07:45", "15:10", 8), "11:05", "11:50");
        let generated = generate_preview(&req).unwrap();
        let start = time_to_minutes("07:45").unwrap();
        let end = time_to_minutes("15:10").unwrap();

        for period in &generated.periods {
            assert!(time_to_minutes(&period.start_time).unwrap() >= start);
            assert!(time_to_minutes(&period.end_time).unwrap() <= end);
        }
    }

    #[test]
    fn explicit_duration_overrides_the_computed_one() {
        let mut req = request("08:00", "14:00", 4);
        req.period_duration = Some(40);
        let generated = generate_preview(&req).unwrap();

        assert_eq!(generated.summary.period_duration, 40);
        assert_eq!(generated.periods[3].end_time, "10:40");
    }

    #[test]
    fn rejects_period_counts_outside_range() {
        assert!(validation_message(generate_preview(&request("08:00", "14:00", 0)))
            .contains("between 1 and 20"));
        assert!(validation_message(generate_preview(&request("08:00", "20:00", 21)))
            .contains("between 1 and 20"));
    }

    #[test]
    fn rejects_durations_below_the_floor() {
        let msg = validation_message(generate_preview(&request("08:00", "10:00", 9)));
        assert!(msg.starts_with("Period duration too short"));

        let mut req = request("08:00", "14:00", 4);
        req.period_duration = Some(10);
        assert!(validation_message(generate_preview(&req)).starts_with("Period duration too short"));
    }

    #[test]
    fn rejects_inverted_school_hours() {
        let msg = validation_message(generate_preview(&request("14:00", "08:00", 4)));
        assert_eq!(msg, "School end time must be after start time");
    }

    #[test]
    fn rejects_bad_break_windows() {
        let outside = with_break(request("08:00", "14:00", 4), "07:30", "08:30");
        assert_eq!(
            validation_message(generate_preview(&outside)),
            "Break must be within school hours"
        );

        let inverted = with_break(request("08:00", "14:00", 4), "11:00", "10:30");
        assert_eq!(
            validation_message(generate_preview(&inverted)),
            "Break end time must be after start time"
        );

        let mut missing = request("08:00", "14:00", 4);
        missing.include_break = true;
        assert!(validation_message(generate_preview(&missing)).starts_with("Break start and end"));
    }

    #[test]
    fn oversized_duration_is_rejected_instead_of_wrapping() {
        for duration in [u32::MAX, u32::MAX - 100, 361, 24 * 60] {
            let mut req = request("08:00", "14:00", 2);
            req.period_duration = Some(duration);
            let msg = validation_message(generate_preview(&req));
            assert!(msg.starts_with("Cannot fit all 2 periods"), "{duration}: {msg}");
        }
    }

    #[test]
    fn single_period_may_fill_the_whole_day() {
        let mut req = request("08:00", "14:00", 1);
        req.period_duration = Some(360);
        let generated = generate_preview(&req).unwrap();
        assert_eq!(spans(&generated), vec![("Period 1".into(), "08:00".into(), "14:00".into())]);
    }

    #[test]
    fn supplied_durations_either_fit_school_hours_or_fail_validation() {
        let start = time_to_minutes("08:00").unwrap();
        let end = time_to_minutes("14:00").unwrap();
        let layouts = [
            request("08:00", "14:00", 3),
            request("08:00", "14:00", 6),
            with_break(request("08:00", "14:00", 4), "10:00", "10:30"),
            with_break(request("08:00", "14:00", 5), "11:15", "12:00"),
        ];

        for base in &layouts {
            for duration in (MIN_PERIOD_MINUTES..=400).step_by(5) {
                let mut req = base.clone();
                req.period_duration = Some(duration);
                match generate_preview(&req) {
                    Ok(generated) => {
                        let class_periods =
                            generated.periods.iter().filter(|p| !p.is_break).count();
                        assert_eq!(class_periods as u32, req.total_periods);
                        for period in &generated.periods {
                            let p_start = time_to_minutes(&period.start_time).unwrap();
                            let p_end = time_to_minutes(&period.end_time).unwrap();
                            assert!(start <= p_start && p_start < p_end && p_end <= end,
                                "{duration}: {period:?}");
                        }
                    }
                    Err(TimetableError::Validation(_)) => {}
                    Err(other) => panic!("{duration}: unexpected {other:?}"),
                }
            }
        }
    }

    #[test]
    fn break_fields_are_ignored_when_break_is_not_included() {
        let mut req = request("08:00", "12:00", 4);
        req.break_start_time = Some("99:99".to_string());
        let generated = generate_preview(&req).unwrap();
        assert_eq!(generated.periods.len(), 4);
        assert!(!generated.summary.break_included);
    }
}
