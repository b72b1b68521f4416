pub mod assignment;
pub mod availability;
pub mod conflict;
pub mod domain;
pub mod error;
pub mod generator;
pub mod grid;
pub mod memory;
pub mod periods;
pub mod ports;
pub mod school;
pub mod staging;
pub mod time;

#[cfg(test)]
mod testing;

pub use conflict::ConflictInfo;
pub use domain::{
    Class, ClassWithSections, Day, InvalidDay, NewTeacher, NewTimePeriod, NewTimetableEntry,
    SchoolSettings, Section, Teacher, TimePeriod, TimetableEntry, TimetableEntryDetails,
    TimetableScope,
};
pub use error::{TimetableError, TimetableResult};
pub use memory::InMemoryDatabase;
pub use ports::{DatabaseService, PortError, PortResult};
