//! Course model.
//!
//! A course demands a number of weekly teaching hours. Each hour becomes
//! one lesson in the timetable and needs a teacher, a room and a slot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::TimeSlot;

/// A course to be timetabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Weekly teaching hours (one lesson per hour).
    pub required_hours: u32,
    /// Number of enrolled students.
    #[serde(default)]
    pub group_size: u32,
    /// Minimum room capacity requested explicitly.
    #[serde(default)]
    pub required_capacity: u32,
    /// Features a room must provide (e.g. "lab", "projector").
    #[serde(default)]
    pub required_features: BTreeSet<String>,
    /// Student cohort attending this course. Courses of the same group
    /// must not share a slot.
    #[serde(default)]
    pub group: Option<String>,
    /// Preferred slots. Empty means no preference.
    #[serde(default)]
    pub preferred_slots: BTreeSet<TimeSlot>,
}

impl Course {
    /// Creates a course with the given weekly hours.
    pub fn new(id: impl Into<String>, required_hours: u32) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            required_hours,
            group_size: 0,
            required_capacity: 0,
            required_features: BTreeSet::new(),
            group: None,
            preferred_slots: BTreeSet::new(),
        }
    }

    /// Sets the course name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the enrolled group size.
    pub fn with_group_size(mut self, size: u32) -> Self {
        self.group_size = size;
        self
    }

    /// Sets the explicitly required room capacity.
    pub fn with_required_capacity(mut self, capacity: u32) -> Self {
        self.required_capacity = capacity;
        self
    }

    /// Adds a required room feature.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.required_features.insert(feature.into());
        self
    }

    /// Sets the student cohort.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Adds a preferred slot.
    pub fn with_preferred_slot(mut self, slot: TimeSlot) -> Self {
        self.preferred_slots.insert(slot);
        self
    }

    /// Seats a room must offer: the larger of group size and explicit capacity.
    #[inline]
    pub fn min_room_capacity(&self) -> u32 {
        self.group_size.max(self.required_capacity)
    }

    /// Whether the course expresses any slot preference.
    #[inline]
    pub fn has_preferences(&self) -> bool {
        !self.preferred_slots.is_empty()
    }
}
