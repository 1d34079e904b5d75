//! Input validation for timetabling instances.
//!
//! Checks structural integrity of courses, rooms, teachers and the slot
//! domain before an [`Instance`](crate::models::Instance) is built. Detects:
//! - Duplicate IDs and duplicate slots
//! - Empty slot domain, or no rooms/teachers while courses exist
//! - Courses without teaching hours
//! - Qualifications naming unknown courses
//! - Availability or preferences outside the slot domain
//!
//! Capacity feasibility (total hours against `slots × rooms`) is not a
//! validation concern; the optimizer reports it separately.

use crate::models::{Course, Room, Teacher, TimeSlot};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// The same slot appears twice in the domain.
    DuplicateSlot,
    /// The slot domain is empty.
    EmptySlotDomain,
    /// Courses exist but there is nothing to assign them to.
    MissingResources,
    /// A course requires zero hours.
    ZeroHours,
    /// A teacher is qualified for a course that doesn't exist.
    UnknownCourseReference,
    /// Availability or preference names a slot outside the domain.
    UnknownSlotReference,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates the input records of a timetabling instance.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_instance(
    courses: &[Course],
    rooms: &[Room],
    teachers: &[Teacher],
    slots: &[TimeSlot],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut slot_set = HashSet::new();
    for slot in slots {
        if !slot_set.insert(*slot) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateSlot,
                format!("Duplicate time slot: {slot}"),
            ));
        }
    }
    if slots.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptySlotDomain,
            "Time slot domain is empty",
        ));
    }

    let mut course_ids = HashSet::new();
    for course in courses {
        if !course_ids.insert(course.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", course.id),
            ));
        }
        if course.required_hours == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroHours,
                format!("Course '{}' requires no hours", course.id),
            ));
        }
        for slot in &course.preferred_slots {
            if !slot_set.contains(slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSlotReference,
                    format!("Course '{}' prefers unknown slot {slot}", course.id),
                ));
            }
        }
    }

    let mut room_ids = HashSet::new();
    for room in rooms {
        if !room_ids.insert(room.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", room.id),
            ));
        }
    }

    let mut teacher_ids = HashSet::new();
    for teacher in teachers {
        if !teacher_ids.insert(teacher.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", teacher.id),
            ));
        }
        for course_id in &teacher.qualified_courses {
            if !course_ids.contains(course_id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownCourseReference,
                    format!(
                        "Teacher '{}' is qualified for unknown course '{}'",
                        teacher.id, course_id
                    ),
                ));
            }
        }
        for slot in &teacher.availability {
            if !slot_set.contains(slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownSlotReference,
                    format!("Teacher '{}' is available in unknown slot {slot}", teacher.id),
                ));
            }
        }
    }

    if !courses.is_empty() {
        if rooms.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingResources,
                "Courses exist but no rooms were given",
            ));
        }
        if teachers.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingResources,
                "Courses exist but no teachers were given",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
