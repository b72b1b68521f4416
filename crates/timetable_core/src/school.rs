//! Classes, sections, teachers and the school-hours settings record.

use tracing::info;
use uuid::Uuid;

use crate::domain::{Class, ClassWithSections, NewTeacher, SchoolSettings, Section, Teacher};
use crate::error::{TimetableError, TimetableResult};
use crate::ports::DatabaseService;
use crate::time::parse_interval;

//=========================================================================================
// Classes
//=========================================================================================

pub async fn create_class(db: &dyn DatabaseService, name: &str) -> TimetableResult<Class> {
    let name = required(name, "Class name is required")?;
    let class = db.create_class(&name).await?;
    info!(class_id = %class.id, name = %class.name, "Class created");
    Ok(class)
}

/// Every class with its sections, ordered by class name.
pub async fn list_classes(db: &dyn DatabaseService) -> TimetableResult<Vec<ClassWithSections>> {
    let mut classes = Vec::new();
    for class in db.list_classes().await? {
        let sections = db.list_sections(class.id).await?;
        classes.push(ClassWithSections { class, sections });
    }
    Ok(classes)
}

pub async fn rename_class(
    db: &dyn DatabaseService,
    class_id: Uuid,
    name: &str,
) -> TimetableResult<Class> {
    let name = required(name, "Class name is required")?;
    Ok(db.rename_class(class_id, &name).await?)
}

/// Deletes the class together with its sections and their timetables.
pub async fn delete_class(db: &dyn DatabaseService, class_id: Uuid) -> TimetableResult<()> {
    db.delete_class(class_id).await?;
    info!(%class_id, "Class deleted");
    Ok(())
}

//=========================================================================================
// Sections
//=========================================================================================

pub async fn create_section(
    db: &dyn DatabaseService,
    class_id: Uuid,
    name: &str,
) -> TimetableResult<Section> {
    let name = required(name, "Section name and classId are required")?;
    db.get_class(class_id).await?;
    let section = db.create_section(class_id, &name).await?;
    info!(section_id = %section.id, %class_id, name = %section.name, "Section created");
    Ok(section)
}

pub async fn list_sections(
    db: &dyn DatabaseService,
    class_id: Uuid,
) -> TimetableResult<Vec<Section>> {
    db.get_class(class_id).await?;
    Ok(db.list_sections(class_id).await?)
}

pub async fn rename_section(
    db: &dyn DatabaseService,
    section_id: Uuid,
    name: &str,
) -> TimetableResult<Section> {
    let name = required(name, "Section name is required")?;
    Ok(db.rename_section(section_id, &name).await?)
}

/// Refuses while the section still has timetable entries.
pub async fn delete_section(db: &dyn DatabaseService, section_id: Uuid) -> TimetableResult<()> {
    db.get_section(section_id).await?;
    let entries = db.count_entries_for_section(section_id).await?;
    if entries > 0 {
        return Err(TimetableError::Validation(format!(
            "Cannot delete section with {entries} timetable entries. Delete timetable entries first."
        )));
    }
    db.delete_section(section_id).await?;
    info!(%section_id, "Section deleted");
    Ok(())
}

//=========================================================================================
// Teachers
//=========================================================================================

pub async fn create_teacher(
    db: &dyn DatabaseService,
    teacher: NewTeacher,
) -> TimetableResult<Teacher> {
    let teacher = validate_teacher(db, teacher).await?;
    let created = db.create_teacher(teacher).await?;
    info!(teacher_id = %created.id, name = %created.name, "Teacher created");
    Ok(created)
}

pub async fn update_teacher(
    db: &dyn DatabaseService,
    teacher_id: Uuid,
    teacher: NewTeacher,
) -> TimetableResult<Teacher> {
    let teacher = validate_teacher(db, teacher).await?;
    Ok(db.update_teacher(teacher_id, teacher).await?)
}

pub async fn list_teachers(db: &dyn DatabaseService) -> TimetableResult<Vec<Teacher>> {
    Ok(db.list_teachers().await?)
}

pub async fn list_teachers_by_class(
    db: &dyn DatabaseService,
    class_id: Uuid,
) -> TimetableResult<Vec<Teacher>> {
    db.get_class(class_id).await?;
    Ok(db.list_teachers_by_class(class_id).await?)
}

/// Deletes the teacher; their bookings are removed with them.
pub async fn delete_teacher(db: &dyn DatabaseService, teacher_id: Uuid) -> TimetableResult<()> {
    db.delete_teacher(teacher_id).await?;
    info!(%teacher_id, "Teacher deleted");
    Ok(())
}

async fn validate_teacher(
    db: &dyn DatabaseService,
    teacher: NewTeacher,
) -> TimetableResult<NewTeacher> {
    const MESSAGE: &str = "Name and at least one subject are required";
    let name = required(&teacher.name, MESSAGE)?;

    let mut subjects: Vec<String> = Vec::with_capacity(teacher.subjects.len());
    for subject in teacher.subjects {
        let subject = subject.trim().to_string();
        if !subject.is_empty() && !subjects.contains(&subject) {
            subjects.push(subject);
        }
    }
    if subjects.is_empty() {
        return Err(TimetableError::Validation(MESSAGE.to_string()));
    }

    let mut class_ids = teacher.class_ids;
    class_ids.sort_unstable();
    class_ids.dedup();
    for class_id in &class_ids {
        db.get_class(*class_id).await?;
    }

    Ok(NewTeacher {
        name,
        subjects,
        class_ids,
    })
}

//=========================================================================================
// School Settings
//=========================================================================================

/// The stored school hours, or the 08:00-14:00 defaults.
pub async fn get_settings(db: &dyn DatabaseService) -> TimetableResult<SchoolSettings> {
    Ok(db.get_school_settings().await?.unwrap_or_default())
}

/// Creates or updates the single settings record.
pub async fn update_settings(
    db: &dyn DatabaseService,
    start_time: &str,
    end_time: &str,
) -> TimetableResult<SchoolSettings> {
    parse_interval(start_time, end_time)?;
    let settings = db
        .upsert_school_settings(start_time.trim(), end_time.trim())
        .await?;
    info!(start = %settings.start_time, end = %settings.end_time, "School settings saved");
    Ok(settings)
}

fn required(value: &str, message: &str) -> TimetableResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TimetableError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}
