//! Schedule (candidate solution) model.
//!
//! A schedule is an ordered sequence of timetable entries, one per lesson
//! of the instance. Position `i` always carries the course of lesson `i`,
//! so every required course-hour appears exactly once. Operators may only
//! change the teacher, room and slot of an entry, never its course.

use serde::{Deserialize, Serialize};

use super::{Instance, TimeSlot};

/// One scheduled hour: course × teacher × room × slot (all by index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimetableEntry {
    /// Course index.
    pub course: usize,
    /// Teacher index.
    pub teacher: usize,
    /// Room index.
    pub room: usize,
    /// Slot index.
    pub slot: usize,
}

impl TimetableEntry {
    /// Creates an entry.
    pub fn new(course: usize, teacher: usize, room: usize, slot: usize) -> Self {
        Self {
            course,
            teacher,
            room,
            slot,
        }
    }
}

/// A lesson resolved to record IDs, for consumers outside the optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledLesson {
    /// Course ID.
    pub course_id: String,
    /// Teacher ID.
    pub teacher_id: String,
    /// Room ID.
    pub room_id: String,
    /// Time slot.
    pub slot: TimeSlot,
}

/// A complete candidate timetable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schedule {
    entries: Vec<TimetableEntry>,
}

impl Schedule {
    /// Wraps entries laid out in lesson order.
    ///
    /// Callers are responsible for the lesson layout; see
    /// [`Schedule::satisfies_structure`].
    pub fn from_entries(entries: Vec<TimetableEntry>) -> Self {
        Self { entries }
    }

    /// Entries in lesson order.
    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }

    /// Entry at a lesson position.
    #[inline]
    pub fn entry(&self, index: usize) -> TimetableEntry {
        self.entries[index]
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schedule has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves the lesson at `index` to another teacher, room and slot,
    /// keeping its course. Returns the previous entry.
    pub fn reassign(
        &mut self,
        index: usize,
        teacher: usize,
        room: usize,
        slot: usize,
    ) -> TimetableEntry {
        let previous = self.entries[index];
        self.entries[index] = TimetableEntry::new(previous.course, teacher, room, slot);
        previous
    }

    /// Structural invariant: one entry per lesson, each carrying its
    /// lesson's course.
    pub fn satisfies_structure(&self, instance: &Instance) -> bool {
        self.entries.len() == instance.total_required_hours()
            && self
                .entries
                .iter()
                .zip(instance.lessons())
                .all(|(e, l)| e.course == l.course)
    }

    /// Number of positions at which two schedules differ.
    pub fn distance(&self, other: &Schedule) -> usize {
        self.entries
            .iter()
            .zip(&other.entries)
            .filter(|(a, b)| a != b)
            .count()
            + self.entries.len().abs_diff(other.entries.len())
    }

    /// Entries taught by a teacher.
    pub fn entries_for_teacher(&self, teacher: usize) -> Vec<&TimetableEntry> {
        self.entries.iter().filter(|e| e.teacher == teacher).collect()
    }

    /// Entries held in a room.
    pub fn entries_for_room(&self, room: usize) -> Vec<&TimetableEntry> {
        self.entries.iter().filter(|e| e.room == room).collect()
    }

    /// Resolves every entry to record IDs, sorted by slot then room.
    pub fn to_lessons(&self, instance: &Instance) -> Vec<ScheduledLesson> {
        let mut lessons: Vec<ScheduledLesson> = self
            .entries
            .iter()
            .map(|e| ScheduledLesson {
                course_id: instance.courses()[e.course].id.clone(),
                teacher_id: instance.teachers()[e.teacher].id.clone(),
                room_id: instance.rooms()[e.room].id.clone(),
                slot: instance.slots()[e.slot],
            })
            .collect();
        lessons.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.room_id.cmp(&b.room_id)));
        lessons
    }
}
