//! Clock-time arithmetic.
//!
//! Times travel as "HH:MM" strings on a 24-hour clock and are compared as
//! minute offsets from midnight.

use regex::Regex;
use std::sync::LazyLock;

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("clock time pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    #[error("'{0}' is not a valid HH:MM time")]
    Malformed(String),
    #[error("'{0}' is outside the 24-hour clock")]
    OutOfRange(String),
}

/// Parses "HH:MM" into minutes after midnight.
///
/// Hours must be below 24 and minutes below 60.
pub fn time_to_minutes(time: &str) -> Result<u32, TimeError> {
    let caps = CLOCK_TIME
        .captures(time.trim())
        .ok_or_else(|| TimeError::Malformed(time.to_string()))?;
    let hours: u32 = caps[1]
        .parse()
        .map_err(|_| TimeError::Malformed(time.to_string()))?;
    let minutes: u32 = caps[2]
        .parse()
        .map_err(|_| TimeError::Malformed(time.to_string()))?;

    if hours >= 24 || minutes >= 60 {
        return Err(TimeError::OutOfRange(time.to_string()));
    }
    Ok(hours * 60 + minutes)
}

/// Formats minutes after midnight as zero-padded "HH:MM".
///
/// Does not wrap at midnight: 1500 formats as "25:00".
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parses both ends of an interval and checks that it is non-empty.
pub fn parse_interval(start: &str, end: &str) -> Result<(u32, u32), crate::TimetableError> {
    let start_minutes = time_to_minutes(start)?;
    let end_minutes = time_to_minutes(end)?;
    if start_minutes >= end_minutes {
        return Err(crate::TimetableError::Validation(
            "End time must be after start time".to_string(),
        ));
    }
    Ok((start_minutes, end_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_clock_time_to_minutes() {
        assert_eq!(time_to_minutes("00:00"), Ok(0));
        assert_eq!(time_to_minutes("08:30"), Ok(510));
        assert_eq!(time_to_minutes("8:05"), Ok(485));
        assert_eq!(time_to_minutes("23:59"), Ok(1439));
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "8", "08:5", "08-30", "ab:cd", "08:30:00", "123:00"] {
            assert_eq!(
                time_to_minutes(bad),
                Err(TimeError::Malformed(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert_eq!(
            time_to_minutes("24:00"),
            Err(TimeError::OutOfRange("24:00".to_string()))
        );
        assert_eq!(
            time_to_minutes("10:60"),
            Err(TimeError::OutOfRange("10:60".to_string()))
        );
    }

    #[test]
    fn formats_minutes_with_zero_padding() {
        assert_eq!(minutes_to_time(0), "00:00");
        assert_eq!(minutes_to_time(534), "08:54");
        assert_eq!(minutes_to_time(780), "13:00");
    }

    #[test]
    fn formatting_does_not_wrap_past_midnight() {
        assert_eq!(minutes_to_time(1500), "25:00");
    }

    #[test]
    fn interval_requires_start_before_end() {
        assert_eq!(parse_interval("08:00", "09:00").ok(), Some((480, 540)));
        assert!(parse_interval("09:00", "09:00").is_err());
        assert!(parse_interval("10:00", "09:00").is_err());
    }
}
