//! Immutable problem instance.
//!
//! The instance is a read-only snapshot of courses, rooms, teachers and
//! the slot domain. Construction validates the records and precomputes
//! dense lookup tables so that feasibility predicates and scoring run on
//! plain indices.
//!
//! # Indexing
//!
//! Courses, rooms, teachers and slots are addressed by their position in
//! the input vectors. A *lesson* is one required course-hour; lessons are
//! laid out course by course in input order, so course `c` owns the
//! contiguous range [`Instance::lessons_of`]`(c)`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::ops::Range;

use super::{Course, Room, Teacher, TimeSlot};
use crate::error::{OptimizerError, Result};
use crate::validation::validate_instance;

/// One required course-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lesson {
    /// Course index.
    pub course: usize,
    /// Hour number within the course (0-based).
    pub hour: u32,
}

/// Serializable instance records, as supplied by the surrounding application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceData {
    /// Courses in input order.
    pub courses: Vec<Course>,
    /// Rooms in input order.
    pub rooms: Vec<Room>,
    /// Teachers in input order.
    pub teachers: Vec<Teacher>,
    /// The slot domain.
    pub slots: Vec<TimeSlot>,
}

/// Validated, immutable timetabling instance.
#[derive(Debug, Clone)]
pub struct Instance {
    courses: Vec<Course>,
    rooms: Vec<Room>,
    teachers: Vec<Teacher>,
    slots: Vec<TimeSlot>,

    lessons: Vec<Lesson>,
    course_lessons: Vec<Range<usize>>,

    // Dense day/period coordinates of each slot.
    slot_day: Vec<usize>,
    slot_period: Vec<usize>,
    num_days: usize,
    num_periods: usize,

    course_group: Vec<Option<usize>>,
    num_groups: usize,

    // course * teachers + teacher
    qualified: Vec<bool>,
    // teacher * slots + slot
    available: Vec<bool>,
    // course * rooms + room
    capacity_ok: Vec<bool>,
    features_ok: Vec<bool>,
    // course * slots + slot
    preferred: Vec<bool>,

    candidate_teachers: Vec<Vec<usize>>,
    suitable_rooms: Vec<Vec<usize>>,
    all_teachers: Vec<usize>,
    all_rooms: Vec<usize>,

    course_index: HashMap<String, usize>,
    teacher_index: HashMap<String, usize>,
    room_index: HashMap<String, usize>,
    slot_index: HashMap<TimeSlot, usize>,
}

impl TryFrom<InstanceData> for Instance {
    type Error = OptimizerError;

    fn try_from(data: InstanceData) -> Result<Self> {
        Instance::new(data.courses, data.rooms, data.teachers, data.slots)
    }
}

impl Instance {
    /// Validates the records and builds the lookup tables.
    ///
    /// # Errors
    /// [`OptimizerError::InvalidInstance`] with every detected issue.
    pub fn new(
        courses: Vec<Course>,
        rooms: Vec<Room>,
        teachers: Vec<Teacher>,
        slots: Vec<TimeSlot>,
    ) -> Result<Self> {
        validate_instance(&courses, &rooms, &teachers, &slots)
            .map_err(OptimizerError::InvalidInstance)?;

        let days: BTreeSet<u32> = slots.iter().map(|s| s.day).collect();
        let periods: BTreeSet<u32> = slots.iter().map(|s| s.period).collect();
        let day_pos: HashMap<u32, usize> = days.iter().enumerate().map(|(i, &d)| (d, i)).collect();
        let period_pos: HashMap<u32, usize> =
            periods.iter().enumerate().map(|(i, &p)| (p, i)).collect();
        let slot_day = slots.iter().map(|s| day_pos[&s.day]).collect();
        let slot_period = slots.iter().map(|s| period_pos[&s.period]).collect();

        let mut lessons = Vec::new();
        let mut course_lessons = Vec::with_capacity(courses.len());
        for (c, course) in courses.iter().enumerate() {
            let start = lessons.len();
            lessons.extend((0..course.required_hours).map(|hour| Lesson { course: c, hour }));
            course_lessons.push(start..lessons.len());
        }

        let mut group_ids: HashMap<&str, usize> = HashMap::new();
        let course_group = courses
            .iter()
            .map(|c| {
                c.group.as_deref().map(|g| {
                    let next = group_ids.len();
                    *group_ids.entry(g).or_insert(next)
                })
            })
            .collect();
        let num_groups = group_ids.len();

        let (nc, nr, nt, ns) = (courses.len(), rooms.len(), teachers.len(), slots.len());

        let mut qualified = vec![false; nc * nt];
        let mut candidate_teachers = vec![Vec::new(); nc];
        for (c, course) in courses.iter().enumerate() {
            for (t, teacher) in teachers.iter().enumerate() {
                if teacher.is_qualified_for(&course.id) {
                    qualified[c * nt + t] = true;
                    candidate_teachers[c].push(t);
                }
            }
        }

        let mut available = vec![false; nt * ns];
        for (t, teacher) in teachers.iter().enumerate() {
            for (s, slot) in slots.iter().enumerate() {
                available[t * ns + s] = teacher.is_available_at(slot);
            }
        }

        let mut capacity_ok = vec![false; nc * nr];
        let mut features_ok = vec![false; nc * nr];
        let mut suitable_rooms = vec![Vec::new(); nc];
        for (c, course) in courses.iter().enumerate() {
            for (r, room) in rooms.iter().enumerate() {
                let cap = room.capacity >= course.min_room_capacity();
                let feat = room.has_features(&course.required_features);
                capacity_ok[c * nr + r] = cap;
                features_ok[c * nr + r] = feat;
                if cap && feat {
                    suitable_rooms[c].push(r);
                }
            }
        }

        let mut preferred = vec![false; nc * ns];
        for (c, course) in courses.iter().enumerate() {
            for (s, slot) in slots.iter().enumerate() {
                preferred[c * ns + s] = course.preferred_slots.contains(slot);
            }
        }

        let course_index = courses.iter().enumerate().map(|(i, c)| (c.id.clone(), i)).collect();
        let teacher_index = teachers.iter().enumerate().map(|(i, t)| (t.id.clone(), i)).collect();
        let room_index = rooms.iter().enumerate().map(|(i, r)| (r.id.clone(), i)).collect();
        let slot_index = slots.iter().enumerate().map(|(i, s)| (*s, i)).collect();

        Ok(Self {
            lessons,
            course_lessons,
            slot_day,
            slot_period,
            num_days: days.len(),
            num_periods: periods.len(),
            course_group,
            num_groups,
            qualified,
            available,
            capacity_ok,
            features_ok,
            preferred,
            candidate_teachers,
            suitable_rooms,
            all_teachers: (0..nt).collect(),
            all_rooms: (0..nr).collect(),
            course_index,
            teacher_index,
            room_index,
            slot_index,
            courses,
            rooms,
            teachers,
            slots,
        })
    }

    // ---------------------------------------------------------------- records

    /// Courses in input order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Rooms in input order.
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Teachers in input order.
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    /// The slot domain in input order.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Number of slots.
    #[inline]
    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    /// Number of distinct days in the slot domain.
    #[inline]
    pub fn num_days(&self) -> usize {
        self.num_days
    }

    /// Number of distinct periods in the slot domain.
    #[inline]
    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    /// Number of distinct student groups.
    #[inline]
    pub fn num_groups(&self) -> usize {
        self.num_groups
    }

    /// Dense day index (0..num_days) of a slot.
    #[inline]
    pub fn slot_day(&self, slot: usize) -> usize {
        self.slot_day[slot]
    }

    /// Dense period index (0..num_periods) of a slot.
    #[inline]
    pub fn slot_period(&self, slot: usize) -> usize {
        self.slot_period[slot]
    }

    /// Dense group index of a course, if it belongs to a cohort.
    #[inline]
    pub fn course_group(&self, course: usize) -> Option<usize> {
        self.course_group[course]
    }

    // ---------------------------------------------------------------- lessons

    /// All required course-hours, course by course.
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Positions of a course's lessons.
    pub fn lessons_of(&self, course: usize) -> Range<usize> {
        self.course_lessons[course].clone()
    }

    /// Total required course-hours.
    #[inline]
    pub fn total_required_hours(&self) -> usize {
        self.lessons.len()
    }

    /// Number of (slot, room) cells: the upper bound on placeable lessons.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len() * self.rooms.len()
    }

    /// Fails with [`OptimizerError::InfeasibleInstance`] when the lessons
    /// cannot fit into the slot-room grid even ignoring every other rule.
    pub fn check_capacity(&self) -> Result<()> {
        if self.total_required_hours() > self.capacity() {
            return Err(OptimizerError::InfeasibleInstance {
                required_hours: self.total_required_hours(),
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------- predicates

    /// Whether the teacher is qualified for the course.
    #[inline]
    pub fn is_qualified(&self, course: usize, teacher: usize) -> bool {
        self.qualified[course * self.teachers.len() + teacher]
    }

    /// Whether the teacher is available in the slot.
    #[inline]
    pub fn is_available(&self, teacher: usize, slot: usize) -> bool {
        self.available[teacher * self.slots.len() + slot]
    }

    /// Whether the room seats the course.
    #[inline]
    pub fn room_has_capacity(&self, course: usize, room: usize) -> bool {
        self.capacity_ok[course * self.rooms.len() + room]
    }

    /// Whether the room offers every feature the course needs.
    #[inline]
    pub fn room_has_features(&self, course: usize, room: usize) -> bool {
        self.features_ok[course * self.rooms.len() + room]
    }

    /// Whether the room is suitable (capacity and features) for the course.
    #[inline]
    pub fn room_fits(&self, course: usize, room: usize) -> bool {
        self.room_has_capacity(course, room) && self.room_has_features(course, room)
    }

    /// Whether the slot contradicts the course's stated preferences.
    #[inline]
    pub fn is_preference_mismatch(&self, course: usize, slot: usize) -> bool {
        self.courses[course].has_preferences() && !self.preferred[course * self.slots.len() + slot]
    }

    /// Local feasibility of a single assignment: the teacher is qualified
    /// and available, and the room is suitable.
    ///
    /// Clashes with other lessons are not considered; they depend on the
    /// rest of the schedule.
    pub fn can_assign(&self, course: usize, teacher: usize, room: usize, slot: usize) -> bool {
        self.is_qualified(course, teacher)
            && self.is_available(teacher, slot)
            && self.room_fits(course, room)
    }

    /// Teachers qualified for the course.
    pub fn candidate_teachers(&self, course: usize) -> &[usize] {
        &self.candidate_teachers[course]
    }

    /// Rooms suitable for the course.
    pub fn suitable_rooms(&self, course: usize) -> &[usize] {
        &self.suitable_rooms[course]
    }

    /// Qualified teachers, or every teacher when nobody is qualified.
    pub fn teacher_pool(&self, course: usize) -> &[usize] {
        if self.candidate_teachers[course].is_empty() {
            &self.all_teachers
        } else {
            &self.candidate_teachers[course]
        }
    }

    /// Suitable rooms, or every room when none is suitable.
    pub fn room_pool(&self, course: usize) -> &[usize] {
        if self.suitable_rooms[course].is_empty() {
            &self.all_rooms
        } else {
            &self.suitable_rooms[course]
        }
    }

    // ---------------------------------------------------------------- lookups

    /// Index of a course by ID.
    pub fn course_index(&self, id: &str) -> Option<usize> {
        self.course_index.get(id).copied()
    }

    /// Index of a teacher by ID.
    pub fn teacher_index(&self, id: &str) -> Option<usize> {
        self.teacher_index.get(id).copied()
    }

    /// Index of a room by ID.
    pub fn room_index(&self, id: &str) -> Option<usize> {
        self.room_index.get(id).copied()
    }

    /// Index of a slot.
    pub fn slot_index(&self, slot: &TimeSlot) -> Option<usize> {
        self.slot_index.get(slot).copied()
    }
}
