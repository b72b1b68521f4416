//! crates/timetable_core/src/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. Every call
//! takes one lock over all tables, so each operation (including the bulk
//! replaces) is applied atomically, and the same unique constraints and
//! cascades as the relational schema are enforced.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{
    Class, Day, NewTeacher, NewTimePeriod, NewTimetableEntry, SchoolSettings, Section, Teacher,
    TimePeriod, TimetableEntry, TimetableEntryDetails, TimetableScope,
};
use crate::periods::renumber;
use crate::ports::{
    DatabaseService, PortError, PortResult, CLASS_NAME_CONSTRAINT, ENTRY_SLOT_CONSTRAINT,
    SECTION_NAME_CONSTRAINT, TEACHER_SLOT_CONSTRAINT,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct Tables {
    classes: Vec<Class>,
    sections: Vec<Section>,
    teachers: Vec<Teacher>,
    periods: Vec<TimePeriod>,
    entries: Vec<TimetableEntry>,
    settings: Option<SchoolSettings>,
}

impl Tables {
    fn class(&self, id: Uuid) -> PortResult<&Class> {
        self.classes
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Class {id} not found")))
    }

    fn section(&self, id: Uuid) -> PortResult<&Section> {
        self.sections
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Section {id} not found")))
    }

    fn teacher(&self, id: Uuid) -> PortResult<&Teacher> {
        self.teachers
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Teacher {id} not found")))
    }

    fn period(&self, id: Uuid) -> PortResult<&TimePeriod> {
        self.periods
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Time period {id} not found")))
    }

    fn details(&self, entry: &TimetableEntry) -> PortResult<TimetableEntryDetails> {
        let section = self.section(entry.section_id)?;
        let class = self.class(section.class_id)?;
        let teacher_name = match entry.teacher_id {
            Some(id) => Some(self.teacher(id)?.name.clone()),
            None => None,
        };
        Ok(TimetableEntryDetails {
            entry: entry.clone(),
            class_id: class.id,
            class_name: class.name.clone(),
            section_name: section.name.clone(),
            teacher_name,
            period: self.period(entry.time_period_id)?.clone(),
        })
    }

    fn class_name_taken(&self, name: &str, except: Option<Uuid>) -> bool {
        self.classes
            .iter()
            .any(|c| c.name == name && Some(c.id) != except)
    }

    fn section_name_taken(&self, class_id: Uuid, name: &str, except: Option<Uuid>) -> bool {
        self.sections
            .iter()
            .any(|s| s.class_id == class_id && s.name == name && Some(s.id) != except)
    }

    fn check_references(&self, entry: &NewTimetableEntry) -> PortResult<()> {
        self.section(entry.section_id)?;
        self.period(entry.time_period_id)?;
        if let Some(teacher_id) = entry.teacher_id {
            self.teacher(teacher_id)?;
        }
        Ok(())
    }
}

fn sorted_by_name<'a>(teachers: impl Iterator<Item = &'a Teacher>) -> Vec<Teacher> {
    let mut teachers: Vec<Teacher> = teachers.cloned().collect();
    teachers.sort_by(|a, b| a.name.cmp(&b.name));
    teachers
}

/// Checks both timetable uniqueness rules over a complete set of entries.
fn check_entry_constraints(entries: &[TimetableEntry]) -> PortResult<()> {
    let mut slots = HashSet::new();
    let mut bookings = HashSet::new();
    for e in entries {
        if !slots.insert((e.section_id, e.day, e.time_period_id)) {
            return Err(PortError::unique(ENTRY_SLOT_CONSTRAINT));
        }
        if let Some(teacher_id) = e.teacher_id {
            if !bookings.insert((teacher_id, e.day, e.time_period_id)) {
                return Err(PortError::unique(TEACHER_SLOT_CONSTRAINT));
            }
        }
    }
    Ok(())
}

fn stored_entry(id: Uuid, entry: NewTimetableEntry) -> TimetableEntry {
    TimetableEntry {
        id,
        section_id: entry.section_id,
        day: entry.day,
        time_period_id: entry.time_period_id,
        teacher_id: entry.teacher_id,
        subject: entry.subject,
        room: entry.room,
    }
}

fn stored_period(period: NewTimePeriod) -> TimePeriod {
    TimePeriod {
        id: Uuid::new_v4(),
        period_name: period.period_name,
        start_time: period.start_time,
        end_time: period.end_time,
        is_break: period.is_break,
        order_index: period.order_index,
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn create_class(&self, name: &str) -> PortResult<Class> {
        let mut t = self.tables.lock().await;
        if t.class_name_taken(name, None) {
            return Err(PortError::unique(CLASS_NAME_CONSTRAINT));
        }
        let class = Class {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        t.classes.push(class.clone());
        Ok(class)
    }

    async fn get_class(&self, class_id: Uuid) -> PortResult<Class> {
        self.tables.lock().await.class(class_id).cloned()
    }

    async fn list_classes(&self) -> PortResult<Vec<Class>> {
        let mut classes = self.tables.lock().await.classes.clone();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(classes)
    }

    async fn rename_class(&self, class_id: Uuid, name: &str) -> PortResult<Class> {
        let mut t = self.tables.lock().await;
        t.class(class_id)?;
        if t.class_name_taken(name, Some(class_id)) {
            return Err(PortError::unique(CLASS_NAME_CONSTRAINT));
        }
        let class = t
            .classes
            .iter_mut()
            .find(|c| c.id == class_id)
            .ok_or_else(|| PortError::NotFound(format!("Class {class_id} not found")))?;
        class.name = name.to_string();
        Ok(class.clone())
    }

    async fn delete_class(&self, class_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.lock().await;
        t.class(class_id)?;
        let section_ids: HashSet<Uuid> = t
            .sections
            .iter()
            .filter(|s| s.class_id == class_id)
            .map(|s| s.id)
            .collect();
        t.entries.retain(|e| !section_ids.contains(&e.section_id));
        t.sections.retain(|s| s.class_id != class_id);
        t.classes.retain(|c| c.id != class_id);
        for teacher in &mut t.teachers {
            teacher.class_ids.retain(|id| *id != class_id);
        }
        Ok(())
    }

    async fn create_section(&self, class_id: Uuid, name: &str) -> PortResult<Section> {
        let mut t = self.tables.lock().await;
        t.class(class_id)?;
        if t.section_name_taken(class_id, name, None) {
            return Err(PortError::unique(SECTION_NAME_CONSTRAINT));
        }
        let section = Section {
            id: Uuid::new_v4(),
            class_id,
            name: name.to_string(),
        };
        t.sections.push(section.clone());
        Ok(section)
    }

    async fn get_section(&self, section_id: Uuid) -> PortResult<Section> {
        self.tables.lock().await.section(section_id).cloned()
    }

    async fn list_sections(&self, class_id: Uuid) -> PortResult<Vec<Section>> {
        let t = self.tables.lock().await;
        let mut sections: Vec<Section> = t
            .sections
            .iter()
            .filter(|s| s.class_id == class_id)
            .cloned()
            .collect();
        sections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sections)
    }

    async fn list_all_sections(&self) -> PortResult<Vec<Section>> {
        let t = self.tables.lock().await;
        let mut keyed = Vec::with_capacity(t.sections.len());
        for section in &t.sections {
            let class_name = t.class(section.class_id)?.name.clone();
            keyed.push((class_name, section.clone()));
        }
        keyed.sort_by(|(ca, a), (cb, b)| ca.cmp(cb).then_with(|| a.name.cmp(&b.name)));
        Ok(keyed.into_iter().map(|(_, s)| s).collect())
    }

    async fn rename_section(&self, section_id: Uuid, name: &str) -> PortResult<Section> {
        let mut t = self.tables.lock().await;
        let class_id = t.section(section_id)?.class_id;
        if t.section_name_taken(class_id, name, Some(section_id)) {
            return Err(PortError::unique(SECTION_NAME_CONSTRAINT));
        }
        let section = t
            .sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| PortError::NotFound(format!("Section {section_id} not found")))?;
        section.name = name.to_string();
        Ok(section.clone())
    }

    async fn delete_section(&self, section_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.lock().await;
        t.section(section_id)?;
        t.entries.retain(|e| e.section_id != section_id);
        t.sections.retain(|s| s.id != section_id);
        Ok(())
    }

    async fn count_entries_for_section(&self, section_id: Uuid) -> PortResult<u64> {
        let t = self.tables.lock().await;
        Ok(t.entries.iter().filter(|e| e.section_id == section_id).count() as u64)
    }

    async fn create_teacher(&self, teacher: NewTeacher) -> PortResult<Teacher> {
        let mut t = self.tables.lock().await;
        for class_id in &teacher.class_ids {
            t.class(*class_id)?;
        }
        let created = Teacher {
            id: Uuid::new_v4(),
            name: teacher.name,
            subjects: teacher.subjects,
            class_ids: teacher.class_ids,
        };
        t.teachers.push(created.clone());
        Ok(created)
    }

    async fn get_teacher(&self, teacher_id: Uuid) -> PortResult<Teacher> {
        self.tables.lock().await.teacher(teacher_id).cloned()
    }

    async fn list_teachers(&self) -> PortResult<Vec<Teacher>> {
        let t = self.tables.lock().await;
        Ok(sorted_by_name(t.teachers.iter()))
    }

    async fn list_teachers_by_class(&self, class_id: Uuid) -> PortResult<Vec<Teacher>> {
        let t = self.tables.lock().await;
        Ok(sorted_by_name(
            t.teachers.iter().filter(|te| te.class_ids.contains(&class_id)),
        ))
    }

    async fn update_teacher(&self, teacher_id: Uuid, teacher: NewTeacher) -> PortResult<Teacher> {
        let mut t = self.tables.lock().await;
        t.teacher(teacher_id)?;
        for class_id in &teacher.class_ids {
            t.class(*class_id)?;
        }
        let stored = t
            .teachers
            .iter_mut()
            .find(|te| te.id == teacher_id)
            .ok_or_else(|| PortError::NotFound(format!("Teacher {teacher_id} not found")))?;
        stored.name = teacher.name;
        stored.subjects = teacher.subjects;
        stored.class_ids = teacher.class_ids;
        Ok(stored.clone())
    }

    async fn delete_teacher(&self, teacher_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.lock().await;
        t.teacher(teacher_id)?;
        t.entries.retain(|e| e.teacher_id != Some(teacher_id));
        t.teachers.retain(|te| te.id != teacher_id);
        Ok(())
    }

    async fn list_time_periods(&self) -> PortResult<Vec<TimePeriod>> {
        let mut periods = self.tables.lock().await.periods.clone();
        periods.sort_by_key(|p| p.order_index);
        Ok(periods)
    }

    async fn get_time_period(&self, period_id: Uuid) -> PortResult<TimePeriod> {
        self.tables.lock().await.period(period_id).cloned()
    }

    async fn create_time_period(&self, period: NewTimePeriod) -> PortResult<TimePeriod> {
        let created = stored_period(period);
        self.tables.lock().await.periods.push(created.clone());
        Ok(created)
    }

    async fn update_time_period(&self, period: TimePeriod) -> PortResult<TimePeriod> {
        let mut t = self.tables.lock().await;
        let stored = t
            .periods
            .iter_mut()
            .find(|p| p.id == period.id)
            .ok_or_else(|| PortError::NotFound(format!("Time period {} not found", period.id)))?;
        stored.period_name = period.period_name;
        stored.start_time = period.start_time;
        stored.end_time = period.end_time;
        stored.is_break = period.is_break;
        let updated = stored.clone();

        if updated.is_break {
            for entry in t.entries.iter_mut().filter(|e| e.time_period_id == updated.id) {
                entry.teacher_id = None;
                entry.subject = None;
                entry.room = None;
            }
        }
        Ok(updated)
    }

    async fn delete_time_period(&self, period_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.lock().await;
        t.period(period_id)?;
        t.entries.retain(|e| e.time_period_id != period_id);
        t.periods.retain(|p| p.id != period_id);
        for (id, index) in renumber(&t.periods) {
            if let Some(period) = t.periods.iter_mut().find(|p| p.id == id) {
                period.order_index = index;
            }
        }
        Ok(())
    }

    async fn set_order_indexes(&self, order: &[(Uuid, i32)]) -> PortResult<()> {
        let mut t = self.tables.lock().await;
        for (id, _) in order {
            t.period(*id)?;
        }
        for (id, index) in order {
            if let Some(period) = t.periods.iter_mut().find(|p| p.id == *id) {
                period.order_index = *index;
            }
        }
        Ok(())
    }

    async fn replace_time_periods(
        &self,
        periods: Vec<NewTimePeriod>,
    ) -> PortResult<Vec<TimePeriod>> {
        let mut t = self.tables.lock().await;
        let created: Vec<TimePeriod> = periods.into_iter().map(stored_period).collect();
        t.entries.clear();
        t.periods = created.clone();
        Ok(created)
    }

    async fn get_entry(&self, entry_id: Uuid) -> PortResult<TimetableEntry> {
        let t = self.tables.lock().await;
        t.entries
            .iter()
            .find(|e| e.id == entry_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Timetable entry {entry_id} not found")))
    }

    async fn find_entry_by_slot(
        &self,
        section_id: Uuid,
        day: Day,
        period_id: Uuid,
    ) -> PortResult<Option<TimetableEntry>> {
        let t = self.tables.lock().await;
        Ok(t.entries
            .iter()
            .find(|e| e.section_id == section_id && e.day == day && e.time_period_id == period_id)
            .cloned())
    }

    async fn find_teacher_booking(
        &self,
        teacher_id: Uuid,
        day: Day,
        period_id: Uuid,
        exclude_entry_id: Option<Uuid>,
    ) -> PortResult<Option<TimetableEntryDetails>> {
        let t = self.tables.lock().await;
        t.entries
            .iter()
            .find(|e| {
                e.teacher_id == Some(teacher_id)
                    && e.day == day
                    && e.time_period_id == period_id
                    && Some(e.id) != exclude_entry_id
            })
            .map(|e| t.details(e))
            .transpose()
    }

    async fn busy_teacher_ids(
        &self,
        day: Day,
        period_id: Uuid,
        exclude_entry_id: Option<Uuid>,
    ) -> PortResult<Vec<Uuid>> {
        let t = self.tables.lock().await;
        Ok(t.entries
            .iter()
            .filter(|e| {
                e.day == day && e.time_period_id == period_id && Some(e.id) != exclude_entry_id
            })
            .filter_map(|e| e.teacher_id)
            .collect())
    }

    async fn upsert_entry(&self, entry: NewTimetableEntry) -> PortResult<TimetableEntry> {
        let mut t = self.tables.lock().await;
        t.check_references(&entry)?;

        let existing = t.entries.iter().position(|e| {
            e.section_id == entry.section_id
                && e.day == entry.day
                && e.time_period_id == entry.time_period_id
        });
        let mut candidate = t.entries.clone();
        let saved = match existing {
            Some(index) => {
                let saved = stored_entry(candidate[index].id, entry);
                candidate[index] = saved.clone();
                saved
            }
            None => {
                let saved = stored_entry(Uuid::new_v4(), entry);
                candidate.push(saved.clone());
                saved
            }
        };
        check_entry_constraints(&candidate)?;
        t.entries = candidate;
        Ok(saved)
    }

    async fn delete_entry(&self, entry_id: Uuid) -> PortResult<()> {
        let mut t = self.tables.lock().await;
        let before = t.entries.len();
        t.entries.retain(|e| e.id != entry_id);
        if t.entries.len() == before {
            return Err(PortError::NotFound(format!(
                "Timetable entry {entry_id} not found"
            )));
        }
        Ok(())
    }

    async fn list_entries(&self, scope: TimetableScope) -> PortResult<Vec<TimetableEntryDetails>> {
        let t = self.tables.lock().await;
        t.entries
            .iter()
            .filter(|e| match scope {
                TimetableScope::Section(id) => e.section_id == id,
                TimetableScope::Teacher(id) => e.teacher_id == Some(id),
            })
            .map(|e| t.details(e))
            .collect()
    }

    async fn replace_day_grids(
        &self,
        targets: &[(Uuid, Day)],
        entries: Vec<NewTimetableEntry>,
    ) -> PortResult<u64> {
        let mut t = self.tables.lock().await;
        for entry in &entries {
            t.check_references(entry)?;
        }

        let targeted: HashSet<(Uuid, Day)> = targets.iter().copied().collect();
        let inserted = entries.len() as u64;
        let mut candidate: Vec<TimetableEntry> = t
            .entries
            .iter()
            .filter(|e| !targeted.contains(&(e.section_id, e.day)))
            .cloned()
            .collect();
        candidate.extend(entries.into_iter().map(|e| stored_entry(Uuid::new_v4(), e)));

        check_entry_constraints(&candidate)?;
        t.entries = candidate;
        Ok(inserted)
    }

    async fn get_school_settings(&self) -> PortResult<Option<SchoolSettings>> {
        Ok(self.tables.lock().await.settings.clone())
    }

    async fn upsert_school_settings(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> PortResult<SchoolSettings> {
        let settings = SchoolSettings {
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
            updated_at: Some(Utc::now()),
        };
        self.tables.lock().await.settings = Some(settings.clone());
        Ok(settings)
    }
}
