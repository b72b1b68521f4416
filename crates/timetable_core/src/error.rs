//! crates/timetable_core/src/error.rs
//!
//! The error type returned by every core operation.

use crate::conflict::ConflictInfo;
use crate::ports::{PortError, CLASS_NAME_CONSTRAINT, SECTION_NAME_CONSTRAINT};
use crate::time::TimeError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimetableError {
    /// Malformed or missing input. The caller can correct it and retry.
    #[error("{0}")]
    Validation(String),

    /// A referenced class, section, teacher, period or entry does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The teacher is already booked at the target day and period.
    #[error(
        "Teacher is already assigned to {} - Section {} at this time ({})",
        .0.class, .0.section, .0.period
    )]
    Conflict(ConflictInfo),

    /// A uniqueness rule other than the teacher booking rule was violated.
    #[error("{0}")]
    AlreadyExists(String),

    /// Any other storage failure.
    #[error("Storage failure: {0}")]
    Storage(PortError),
}

/// A convenience type alias for `Result<T, TimetableError>`.
pub type TimetableResult<T> = Result<T, TimetableError>;

impl From<PortError> for TimetableError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(what) => TimetableError::NotFound(what),
            PortError::UniqueViolation { constraint } => match constraint.as_str() {
                CLASS_NAME_CONSTRAINT => {
                    TimetableError::AlreadyExists("Class name already exists".to_string())
                }
                SECTION_NAME_CONSTRAINT => TimetableError::AlreadyExists(
                    "Section already exists for this class".to_string(),
                ),
                other => TimetableError::AlreadyExists(format!("Record already exists ({other})")),
            },
            other => TimetableError::Storage(other),
        }
    }
}

impl From<TimeError> for TimetableError {
    fn from(err: TimeError) -> Self {
        TimetableError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_port_not_found_to_not_found() {
        let err: TimetableError = PortError::NotFound("Section x not found".into()).into();
        assert_eq!(err, TimetableError::NotFound("Section x not found".into()));
    }

    #[test]
    fn maps_named_unique_violations_to_already_exists() {
        let err: TimetableError = PortError::unique(CLASS_NAME_CONSTRAINT).into();
        assert_eq!(
            err,
            TimetableError::AlreadyExists("Class name already exists".into())
        );
    }

    #[test]
    fn keeps_unexpected_errors_as_storage_failures() {
        let err: TimetableError = PortError::Unexpected("connection reset".into()).into();
        assert!(matches!(err, TimetableError::Storage(_)));
    }
}
