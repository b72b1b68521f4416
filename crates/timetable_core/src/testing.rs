//! Shared test school: one class with two sections, three teachers and a
//! four-period day with a lunch break in third position.

use uuid::Uuid;

use crate::domain::{Day, NewTeacher, NewTimePeriod, NewTimetableEntry, TimetableEntry};
use crate::memory::InMemoryDatabase;
use crate::ports::DatabaseService;

pub struct Fixture {
    pub db: InMemoryDatabase,
    pub class_id: Uuid,
    pub section_a: Uuid,
    pub section_b: Uuid,
    pub teacher_a: Uuid,
    pub teacher_b: Uuid,
    pub teacher_c: Uuid,
    /// Period ids in order.
    pub periods: Vec<Uuid>,
}

impl Fixture {
    /// Index of the lunch break in `periods`.
    pub const BREAK: usize = 2;

    pub async fn new() -> Self {
        Self::with_db(InMemoryDatabase::new()).await
    }

    pub async fn with_db(db: InMemoryDatabase) -> Self {
        let class = db.create_class("Grade 7").await.unwrap();
        let section_a = db.create_section(class.id, "A").await.unwrap();
        let section_b = db.create_section(class.id, "B").await.unwrap();

        let mut teachers = Vec::new();
        for (name, subject) in [("Alice", "Math"), ("Bob", "Science"), ("Carol", "English")] {
            let teacher = db
                .create_teacher(NewTeacher {
                    name: name.into(),
                    subjects: vec![subject.into()],
                    class_ids: vec![class.id],
                })
                .await
                .unwrap();
            teachers.push(teacher.id);
        }

        let grid = [
            ("Period 1", "08:00", "09:00", false),
            ("Period 2", "09:00", "10:00", false),
            ("Lunch Break", "10:00", "10:30", true),
            ("Period 3", "10:30", "11:30", false),
        ];
        let periods = db
            .replace_time_periods(
                grid.iter()
                    .enumerate()
                    .map(|(i, (name, start, end, is_break))| NewTimePeriod {
                        period_name: (*name).into(),
                        start_time: (*start).into(),
                        end_time: (*end).into(),
                        is_break: *is_break,
                        order_index: i as i32,
                    })
                    .collect(),
            )
            .await
            .unwrap();

        Self {
            db,
            class_id: class.id,
            section_a: section_a.id,
            section_b: section_b.id,
            teacher_a: teachers[0],
            teacher_b: teachers[1],
            teacher_c: teachers[2],
            periods: periods.into_iter().map(|p| p.id).collect(),
        }
    }

    /// Writes an entry straight to the store, skipping the assignment checks.
    pub async fn book(
        &self,
        section_id: Uuid,
        day: Day,
        period: usize,
        teacher_id: Uuid,
        room: Option<&str>,
    ) -> TimetableEntry {
        self.db
            .upsert_entry(NewTimetableEntry {
                section_id,
                day,
                time_period_id: self.periods[period],
                teacher_id: Some(teacher_id),
                subject: Some("Math".into()),
                room: room.map(str::to_string),
            })
            .await
            .unwrap()
    }
}
