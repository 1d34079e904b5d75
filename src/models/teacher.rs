//! Teacher model.
//!
//! Teachers carry an availability set, a weekly hour cap and the set of
//! courses they are qualified to teach.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::TimeSlot;

/// A teacher that can be assigned to lessons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Slots in which the teacher can teach.
    #[serde(default)]
    pub availability: BTreeSet<TimeSlot>,
    /// Maximum teaching hours per week.
    #[serde(default = "unbounded_hours")]
    pub max_hours_per_week: u32,
    /// Course IDs the teacher is qualified for.
    #[serde(default)]
    pub qualified_courses: BTreeSet<String>,
}

fn unbounded_hours() -> u32 {
    u32::MAX
}

impl Teacher {
    /// Creates a teacher with no availability, no qualifications and no hour cap.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            availability: BTreeSet::new(),
            max_hours_per_week: unbounded_hours(),
            qualified_courses: BTreeSet::new(),
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the weekly hour cap.
    pub fn with_max_hours(mut self, hours: u32) -> Self {
        self.max_hours_per_week = hours;
        self
    }

    /// Adds one available slot.
    pub fn available_at(mut self, slot: TimeSlot) -> Self {
        self.availability.insert(slot);
        self
    }

    /// Adds every slot of the iterator to the availability set.
    pub fn with_availability(mut self, slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        self.availability.extend(slots);
        self
    }

    /// Adds a qualification.
    pub fn qualified_for(mut self, course_id: impl Into<String>) -> Self {
        self.qualified_courses.insert(course_id.into());
        self
    }

    /// Whether the teacher may teach the course.
    pub fn is_qualified_for(&self, course_id: &str) -> bool {
        self.qualified_courses.contains(course_id)
    }

    /// Whether the teacher is available in the slot.
    pub fn is_available_at(&self, slot: &TimeSlot) -> bool {
        self.availability.contains(slot)
    }
}
