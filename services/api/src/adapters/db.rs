//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use timetable_core::domain::{
    Class, Day, NewTeacher, NewTimePeriod, NewTimetableEntry, SchoolSettings, Section, Teacher,
    TimePeriod, TimetableEntry, TimetableEntryDetails, TimetableScope,
};
use timetable_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Maps a sqlx error to a port error, keeping the name of any violated
/// unique constraint.
fn port_err(err: sqlx::Error) -> PortError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            // unique_violation
            Some("23505") => {
                return PortError::unique(db_err.constraint().unwrap_or("unknown"));
            }
            // foreign_key_violation
            Some("23503") => {
                return PortError::NotFound("Referenced record not found".to_string());
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database query failed");
    PortError::Unexpected(err.to_string())
}

fn found<T>(row: Option<T>, what: &str, id: Uuid) -> PortResult<T> {
    row.ok_or_else(|| PortError::NotFound(format!("{what} {id} not found")))
}

fn affected(rows: u64, what: &str, id: Uuid) -> PortResult<()> {
    if rows == 0 {
        return Err(PortError::NotFound(format!("{what} {id} not found")));
    }
    Ok(())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ClassRecord {
    id: Uuid,
    name: String,
}
impl ClassRecord {
    fn to_domain(self) -> Class {
        Class {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct SectionRecord {
    id: Uuid,
    class_id: Uuid,
    name: String,
}
impl SectionRecord {
    fn to_domain(self) -> Section {
        Section {
            id: self.id,
            class_id: self.class_id,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct TeacherRecord {
    id: Uuid,
    name: String,
    subjects: Vec<String>,
    class_ids: Vec<Uuid>,
}
impl TeacherRecord {
    fn to_domain(self) -> Teacher {
        Teacher {
            id: self.id,
            name: self.name,
            subjects: self.subjects,
            class_ids: self.class_ids,
        }
    }
}

#[derive(FromRow)]
struct TimePeriodRecord {
    id: Uuid,
    period_name: String,
    start_time: String,
    end_time: String,
    is_break: bool,
    order_index: i32,
}
impl TimePeriodRecord {
    fn to_domain(self) -> TimePeriod {
        TimePeriod {
            id: self.id,
            period_name: self.period_name,
            start_time: self.start_time,
            end_time: self.end_time,
            is_break: self.is_break,
            order_index: self.order_index,
        }
    }
}

#[derive(FromRow)]
struct EntryRecord {
    id: Uuid,
    section_id: Uuid,
    day: String,
    time_period_id: Uuid,
    teacher_id: Option<Uuid>,
    subject: Option<String>,
    room: Option<String>,
}
impl EntryRecord {
    fn to_domain(self) -> PortResult<TimetableEntry> {
        Ok(TimetableEntry {
            id: self.id,
            section_id: self.section_id,
            day: parse_day(&self.day)?,
            time_period_id: self.time_period_id,
            teacher_id: self.teacher_id,
            subject: self.subject,
            room: self.room,
        })
    }
}

#[derive(FromRow)]
struct EntryDetailsRecord {
    #[sqlx(flatten)]
    entry: EntryRecord,
    class_id: Uuid,
    class_name: String,
    section_name: String,
    teacher_name: Option<String>,
    period_name: String,
    start_time: String,
    end_time: String,
    is_break: bool,
    order_index: i32,
}
impl EntryDetailsRecord {
    fn to_domain(self) -> PortResult<TimetableEntryDetails> {
        let period = TimePeriod {
            id: self.entry.time_period_id,
            period_name: self.period_name,
            start_time: self.start_time,
            end_time: self.end_time,
            is_break: self.is_break,
            order_index: self.order_index,
        };
        Ok(TimetableEntryDetails {
            entry: self.entry.to_domain()?,
            class_id: self.class_id,
            class_name: self.class_name,
            section_name: self.section_name,
            teacher_name: self.teacher_name,
            period,
        })
    }
}

#[derive(FromRow)]
struct SettingsRecord {
    start_time: String,
    end_time: String,
    updated_at: DateTime<Utc>,
}
impl SettingsRecord {
    fn to_domain(self) -> SchoolSettings {
        SchoolSettings {
            start_time: self.start_time,
            end_time: self.end_time,
            updated_at: Some(self.updated_at),
        }
    }
}

fn parse_day(raw: &str) -> PortResult<Day> {
    raw.parse::<Day>()
        .map_err(|e| PortError::Unexpected(format!("Corrupt day column: {e}")))
}

//=========================================================================================
// Shared SQL
//=========================================================================================

const TEACHER_SELECT: &str = "SELECT t.id, t.name, t.subjects, \
     COALESCE(array_agg(tc.class_id ORDER BY tc.class_id) FILTER (WHERE tc.class_id IS NOT NULL), '{}'::uuid[]) AS class_ids \
     FROM teachers t LEFT JOIN teacher_classes tc ON tc.teacher_id = t.id";

const PERIOD_COLUMNS: &str = "id, period_name, start_time, end_time, is_break, order_index";

const ENTRY_COLUMNS: &str = "id, section_id, day, time_period_id, teacher_id, subject, room";

const DETAILS_SELECT: &str = "SELECT e.id, e.section_id, e.day, e.time_period_id, e.teacher_id, \
     e.subject, e.room, c.id AS class_id, c.name AS class_name, s.name AS section_name, \
     t.name AS teacher_name, p.period_name, p.start_time, p.end_time, p.is_break, p.order_index \
     FROM timetable_entries e \
     JOIN sections s ON s.id = e.section_id \
     JOIN classes c ON c.id = s.class_id \
     JOIN time_periods p ON p.id = e.time_period_id \
     LEFT JOIN teachers t ON t.id = e.teacher_id";

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    // --- Classes ---

    async fn create_class(&self, name: &str) -> PortResult<Class> {
        let record = sqlx::query_as::<_, ClassRecord>(
            "INSERT INTO classes (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(port_err)?;
        Ok(record.to_domain())
    }

    async fn get_class(&self, class_id: Uuid) -> PortResult<Class> {
        let record =
            sqlx::query_as::<_, ClassRecord>("SELECT id, name FROM classes WHERE id = $1")
                .bind(class_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(port_err)?;
        Ok(found(record, "Class", class_id)?.to_domain())
    }

    async fn list_classes(&self) -> PortResult<Vec<Class>> {
        let records =
            sqlx::query_as::<_, ClassRecord>("SELECT id, name FROM classes ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(port_err)?;
        Ok(records.into_iter().map(ClassRecord::to_domain).collect())
    }

    async fn rename_class(&self, class_id: Uuid, name: &str) -> PortResult<Class> {
        let record = sqlx::query_as::<_, ClassRecord>(
            "UPDATE classes SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(class_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(port_err)?;
        Ok(found(record, "Class", class_id)?.to_domain())
    }

    async fn delete_class(&self, class_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(class_id)
            .execute(&self.pool)
            .await
            .map_err(port_err)?;
        affected(result.rows_affected(), "Class", class_id)
    }

    // --- Sections ---

    async fn create_section(&self, class_id: Uuid, name: &str) -> PortResult<Section> {
        let record = sqlx::query_as::<_, SectionRecord>(
            "INSERT INTO sections (id, class_id, name) VALUES ($1, $2, $3) \
             RETURNING id, class_id, name",
        )
        .bind(Uuid::new_v4())
        .bind(class_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(port_err)?;
        Ok(record.to_domain())
    }

    async fn get_section(&self, section_id: Uuid) -> PortResult<Section> {
        let record = sqlx::query_as::<_, SectionRecord>(
            "SELECT id, class_id, name FROM sections WHERE id = $1",
        )
        .bind(section_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(port_err)?;
        Ok(found(record, "Section", section_id)?.to_domain())
    }

    async fn list_sections(&self, class_id: Uuid) -> PortResult<Vec<Section>> {
        let records = sqlx::query_as::<_, SectionRecord>(
            "SELECT id, class_id, name FROM sections WHERE class_id = $1 ORDER BY name",
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(port_err)?;
        Ok(records.into_iter().map(SectionRecord::to_domain).collect())
    }

    async fn list_all_sections(&self) -> PortResult<Vec<Section>> {
        let records = sqlx::query_as::<_, SectionRecord>(
            "SELECT s.id, s.class_id, s.name FROM sections s \
             JOIN classes c ON c.id = s.class_id ORDER BY c.name, s.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(port_err)?;
        Ok(records.into_iter().map(SectionRecord::to_domain).collect())
    }

    async fn rename_section(&self, section_id: Uuid, name: &str) -> PortResult<Section> {
        let record = sqlx::query_as::<_, SectionRecord>(
            "UPDATE sections SET name = $2 WHERE id = $1 RETURNING id, class_id, name",
        )
        .bind(section_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(port_err)?;
        Ok(found(record, "Section", section_id)?.to_domain())
    }

    async fn delete_section(&self, section_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM sections WHERE id = $1")
            .bind(section_id)
            .execute(&self.pool)
            .await
            .map_err(port_err)?;
        affected(result.rows_affected(), "Section", section_id)
    }

    async fn count_entries_for_section(&self, section_id: Uuid) -> PortResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM timetable_entries WHERE section_id = $1")
                .bind(section_id)
                .fetch_one(&self.pool)
                .await
                .map_err(port_err)?;
        Ok(count as u64)
    }

    // --- Teachers ---

    async fn create_teacher(&self, teacher: NewTeacher) -> PortResult<Teacher> {
        let id = Uuid::new_v4();
        let mut tx = self.pool.begin().await.map_err(port_err)?;

        sqlx::query("INSERT INTO teachers (id, name, subjects) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&teacher.name)
            .bind(&teacher.subjects)
            .execute(&mut *tx)
            .await
            .map_err(port_err)?;
        sqlx::query(
            "INSERT INTO teacher_classes (teacher_id, class_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(id)
        .bind(&teacher.class_ids)
        .execute(&mut *tx)
        .await
        .map_err(port_err)?;

        tx.commit().await.map_err(port_err)?;
        Ok(Teacher {
            id,
            name: teacher.name,
            subjects: teacher.subjects,
            class_ids: teacher.class_ids,
        })
    }

    async fn get_teacher(&self, teacher_id: Uuid) -> PortResult<Teacher> {
        let sql = format!("{TEACHER_SELECT} WHERE t.id = $1 GROUP BY t.id");
        let record = sqlx::query_as::<_, TeacherRecord>(&sql)
            .bind(teacher_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_err)?;
        Ok(found(record, "Teacher", teacher_id)?.to_domain())
    }

    async fn list_teachers(&self) -> PortResult<Vec<Teacher>> {
        let sql = format!("{TEACHER_SELECT} GROUP BY t.id ORDER BY t.name");
        let records = sqlx::query_as::<_, TeacherRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(port_err)?;
        Ok(records.into_iter().map(TeacherRecord::to_domain).collect())
    }

    async fn list_teachers_by_class(&self, class_id: Uuid) -> PortResult<Vec<Teacher>> {
        let sql = format!(
            "{TEACHER_SELECT} WHERE EXISTS (SELECT 1 FROM teacher_classes x \
             WHERE x.teacher_id = t.id AND x.class_id = $1) GROUP BY t.id ORDER BY t.name"
        );
        let records = sqlx::query_as::<_, TeacherRecord>(&sql)
            .bind(class_id)
            .fetch_all(&self.pool)
            .await
            .map_err(port_err)?;
        Ok(records.into_iter().map(TeacherRecord::to_domain).collect())
    }

    async fn update_teacher(&self, teacher_id: Uuid, teacher: NewTeacher) -> PortResult<Teacher> {
        let mut tx = self.pool.begin().await.map_err(port_err)?;

        let result = sqlx::query("UPDATE teachers SET name = $2, subjects = $3 WHERE id = $1")
            .bind(teacher_id)
            .bind(&teacher.name)
            .bind(&teacher.subjects)
            .execute(&mut *tx)
            .await
            .map_err(port_err)?;
        affected(result.rows_affected(), "Teacher", teacher_id)?;

        sqlx::query("DELETE FROM teacher_classes WHERE teacher_id = $1")
            .bind(teacher_id)
            .execute(&mut *tx)
            .await
            .map_err(port_err)?;
        sqlx::query(
            "INSERT INTO teacher_classes (teacher_id, class_id) SELECT $1, UNNEST($2::uuid[])",
        )
        .bind(teacher_id)
        .bind(&teacher.class_ids)
        .execute(&mut *tx)
        .await
        .map_err(port_err)?;

        tx.commit().await.map_err(port_err)?;
        Ok(Teacher {
            id: teacher_id,
            name: teacher.name,
            subjects: teacher.subjects,
            class_ids: teacher.class_ids,
        })
    }

    async fn delete_teacher(&self, teacher_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM teachers WHERE id = $1")
            .bind(teacher_id)
            .execute(&self.pool)
            .await
            .map_err(port_err)?;
        affected(result.rows_affected(), "Teacher", teacher_id)
    }

    // --- Time Periods ---

    async fn list_time_periods(&self) -> PortResult<Vec<TimePeriod>> {
        let sql = format!("SELECT {PERIOD_COLUMNS} FROM time_periods ORDER BY order_index");
        let records = sqlx::query_as::<_, TimePeriodRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(port_err)?;
        Ok(records.into_iter().map(TimePeriodRecord::to_domain).collect())
    }

    async fn get_time_period(&self, period_id: Uuid) -> PortResult<TimePeriod> {
        let sql = format!("SELECT {PERIOD_COLUMNS} FROM time_periods WHERE id = $1");
        let record = sqlx::query_as::<_, TimePeriodRecord>(&sql)
            .bind(period_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_err)?;
        Ok(found(record, "Time period", period_id)?.to_domain())
    }

    async fn create_time_period(&self, period: NewTimePeriod) -> PortResult<TimePeriod> {
        let sql = format!(
            "INSERT INTO time_periods ({PERIOD_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PERIOD_COLUMNS}"
        );
        let record = sqlx::query_as::<_, TimePeriodRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(&period.period_name)
            .bind(&period.start_time)
            .bind(&period.end_time)
            .bind(period.is_break)
            .bind(period.order_index)
            .fetch_one(&self.pool)
            .await
            .map_err(port_err)?;
        Ok(record.to_domain())
    }

    async fn update_time_period(&self, period: TimePeriod) -> PortResult<TimePeriod> {
        let sql = format!(
            "UPDATE time_periods SET period_name = $2, start_time = $3, end_time = $4, \
             is_break = $5 WHERE id = $1 RETURNING {PERIOD_COLUMNS}"
        );
        let mut tx = self.pool.begin().await.map_err(port_err)?;
        let record = sqlx::query_as::<_, TimePeriodRecord>(&sql)
            .bind(period.id)
            .bind(&period.period_name)
            .bind(&period.start_time)
            .bind(&period.end_time)
            .bind(period.is_break)
            .fetch_optional(&mut *tx)
            .await
            .map_err(port_err)?;
        let updated = found(record, "Time period", period.id)?.to_domain();

        if updated.is_break {
            sqlx::query(
                "UPDATE timetable_entries SET teacher_id = NULL, subject = NULL, room = NULL \
                 WHERE time_period_id = $1",
            )
            .bind(updated.id)
            .execute(&mut *tx)
            .await
            .map_err(port_err)?;
        }

        tx.commit().await.map_err(port_err)?;
        Ok(updated)
    }

    async fn delete_time_period(&self, period_id: Uuid) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(port_err)?;
        let result = sqlx::query("DELETE FROM time_periods WHERE id = $1")
            .bind(period_id)
            .execute(&mut *tx)
            .await
            .map_err(port_err)?;
        affected(result.rows_affected(), "Time period", period_id)?;

        sqlx::query(
            "UPDATE time_periods AS p SET order_index = ranked.new_index \
             FROM (SELECT id, (ROW_NUMBER() OVER (ORDER BY order_index) - 1)::INTEGER AS new_index \
                   FROM time_periods) AS ranked \
             WHERE p.id = ranked.id AND p.order_index <> ranked.new_index",
        )
        .execute(&mut *tx)
        .await
        .map_err(port_err)?;

        tx.commit().await.map_err(port_err)
    }

    async fn set_order_indexes(&self, order: &[(Uuid, i32)]) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(port_err)?;
        for (id, index) in order {
            let result = sqlx::query("UPDATE time_periods SET order_index = $2 WHERE id = $1")
                .bind(id)
                .bind(index)
                .execute(&mut *tx)
                .await
                .map_err(port_err)?;
            affected(result.rows_affected(), "Time period", *id)?;
        }
        tx.commit().await.map_err(port_err)
    }

    async fn replace_time_periods(
        &self,
        periods: Vec<NewTimePeriod>,
    ) -> PortResult<Vec<TimePeriod>> {
        let mut tx = self.pool.begin().await.map_err(port_err)?;

        sqlx::query("DELETE FROM timetable_entries")
            .execute(&mut *tx)
            .await
            .map_err(port_err)?;
        sqlx::query("DELETE FROM time_periods")
            .execute(&mut *tx)
            .await
            .map_err(port_err)?;

        let sql = format!(
            "INSERT INTO time_periods ({PERIOD_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PERIOD_COLUMNS}"
        );
        let mut created = Vec::with_capacity(periods.len());
        for period in periods {
            let record = sqlx::query_as::<_, TimePeriodRecord>(&sql)
                .bind(Uuid::new_v4())
                .bind(&period.period_name)
                .bind(&period.start_time)
                .bind(&period.end_time)
                .bind(period.is_break)
                .bind(period.order_index)
                .fetch_one(&mut *tx)
                .await
                .map_err(port_err)?;
            created.push(record.to_domain());
        }

        tx.commit().await.map_err(port_err)?;
        Ok(created)
    }

    // --- Timetable Entries ---

    async fn get_entry(&self, entry_id: Uuid) -> PortResult<TimetableEntry> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM timetable_entries WHERE id = $1");
        let record = sqlx::query_as::<_, EntryRecord>(&sql)
            .bind(entry_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_err)?;
        found(record, "Timetable entry", entry_id)?.to_domain()
    }

    async fn find_entry_by_slot(
        &self,
        section_id: Uuid,
        day: Day,
        period_id: Uuid,
    ) -> PortResult<Option<TimetableEntry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM timetable_entries \
             WHERE section_id = $1 AND day = $2 AND time_period_id = $3"
        );
        let record = sqlx::query_as::<_, EntryRecord>(&sql)
            .bind(section_id)
            .bind(day.as_str())
            .bind(period_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_err)?;
        record.map(EntryRecord::to_domain).transpose()
    }

    async fn find_teacher_booking(
        &self,
        teacher_id: Uuid,
        day: Day,
        period_id: Uuid,
        exclude_entry_id: Option<Uuid>,
    ) -> PortResult<Option<TimetableEntryDetails>> {
        let sql = format!(
            "{DETAILS_SELECT} WHERE e.teacher_id = $1 AND e.day = $2 AND e.time_period_id = $3 \
             AND ($4::uuid IS NULL OR e.id <> $4) LIMIT 1"
        );
        let record = sqlx::query_as::<_, EntryDetailsRecord>(&sql)
            .bind(teacher_id)
            .bind(day.as_str())
            .bind(period_id)
            .bind(exclude_entry_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(port_err)?;
        record.map(EntryDetailsRecord::to_domain).transpose()
    }

    async fn busy_teacher_ids(
        &self,
        day: Day,
        period_id: Uuid,
        exclude_entry_id: Option<Uuid>,
    ) -> PortResult<Vec<Uuid>> {
        sqlx::query_scalar(
            "SELECT teacher_id FROM timetable_entries \
             WHERE day = $1 AND time_period_id = $2 AND teacher_id IS NOT NULL \
             AND ($3::uuid IS NULL OR id <> $3)",
        )
        .bind(day.as_str())
        .bind(period_id)
        .bind(exclude_entry_id)
        .fetch_all(&self.pool)
        .await
        .map_err(port_err)
    }

    async fn upsert_entry(&self, entry: NewTimetableEntry) -> PortResult<TimetableEntry> {
        // A second booking of the same teacher fails on uq_timetable_teacher_slot.
        let sql = format!(
            "INSERT INTO timetable_entries ({ENTRY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT ON CONSTRAINT uq_timetable_slot DO UPDATE SET \
             teacher_id = EXCLUDED.teacher_id, subject = EXCLUDED.subject, room = EXCLUDED.room \
             RETURNING {ENTRY_COLUMNS}"
        );
        let record = sqlx::query_as::<_, EntryRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(entry.section_id)
            .bind(entry.day.as_str())
            .bind(entry.time_period_id)
            .bind(entry.teacher_id)
            .bind(&entry.subject)
            .bind(&entry.room)
            .fetch_one(&self.pool)
            .await
            .map_err(port_err)?;
        record.to_domain()
    }

    async fn delete_entry(&self, entry_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM timetable_entries WHERE id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await
            .map_err(port_err)?;
        affected(result.rows_affected(), "Timetable entry", entry_id)
    }

    async fn list_entries(&self, scope: TimetableScope) -> PortResult<Vec<TimetableEntryDetails>> {
        let (filter, id) = match scope {
            TimetableScope::Section(id) => ("e.section_id", id),
            TimetableScope::Teacher(id) => ("e.teacher_id", id),
        };
        let sql = format!("{DETAILS_SELECT} WHERE {filter} = $1");
        let records = sqlx::query_as::<_, EntryDetailsRecord>(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(port_err)?;
        records.into_iter().map(EntryDetailsRecord::to_domain).collect()
    }

    async fn replace_day_grids(
        &self,
        targets: &[(Uuid, Day)],
        entries: Vec<NewTimetableEntry>,
    ) -> PortResult<u64> {
        let mut tx = self.pool.begin().await.map_err(port_err)?;

        for (section_id, day) in targets {
            sqlx::query("DELETE FROM timetable_entries WHERE section_id = $1 AND day = $2")
                .bind(section_id)
                .bind(day.as_str())
                .execute(&mut *tx)
                .await
                .map_err(port_err)?;
        }

        let sql = format!(
            "INSERT INTO timetable_entries ({ENTRY_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        );
        let mut inserted = 0;
        for entry in &entries {
            inserted += sqlx::query(&sql)
                .bind(Uuid::new_v4())
                .bind(entry.section_id)
                .bind(entry.day.as_str())
                .bind(entry.time_period_id)
                .bind(entry.teacher_id)
                .bind(&entry.subject)
                .bind(&entry.room)
                .execute(&mut *tx)
                .await
                .map_err(port_err)?
                .rows_affected();
        }

        tx.commit().await.map_err(port_err)?;
        Ok(inserted)
    }

    // --- School Settings ---

    async fn get_school_settings(&self) -> PortResult<Option<SchoolSettings>> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            "SELECT start_time, end_time, updated_at FROM school_settings",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(port_err)?;
        Ok(record.map(SettingsRecord::to_domain))
    }

    async fn upsert_school_settings(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> PortResult<SchoolSettings> {
        let record = sqlx::query_as::<_, SettingsRecord>(
            "INSERT INTO school_settings (id, start_time, end_time, updated_at) \
             VALUES (TRUE, $1, $2, now()) \
             ON CONFLICT (id) DO UPDATE SET start_time = EXCLUDED.start_time, \
             end_time = EXCLUDED.end_time, updated_at = EXCLUDED.updated_at \
             RETURNING start_time, end_time, updated_at",
        )
        .bind(start_time)
        .bind(end_time)
        .fetch_one(&self.pool)
        .await
        .map_err(port_err)?;
        Ok(record.to_domain())
    }
}
