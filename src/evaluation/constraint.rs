//! Constraint kinds and their pure cost functions.
//!
//! Every constraint is a variant of [`ConstraintKind`]. Each variant maps a
//! schedule to a non-negative integer cost; hard kinds count violations,
//! soft kinds count penalty units that are weighted later by the
//! [`Evaluator`](super::Evaluator).
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling"

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Instance, Schedule};

/// A timetabling constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    /// Pairs of lessons sharing a teacher in the same slot.
    TeacherClash,
    /// Pairs of lessons sharing a room in the same slot.
    RoomClash,
    /// Pairs of lessons of the same student group in the same slot.
    GroupClash,
    /// Lessons taught by an unqualified teacher.
    TeacherUnqualified,
    /// Lessons placed outside the teacher's availability.
    TeacherUnavailable,
    /// Lessons in a room with too few seats.
    RoomCapacity,
    /// Lessons in a room lacking a required feature.
    RoomFeatures,
    /// Teaching hours above a teacher's weekly cap.
    TeacherOverload,
    /// Idle periods between a teacher's first and last lesson of a day.
    TeacherGaps,
    /// Extra rooms used by a course beyond its first.
    RoomChanges,
    /// Lessons outside the course's preferred slots.
    TimePreference,
}

impl ConstraintKind {
    /// Number of constraint kinds.
    pub const COUNT: usize = 11;

    /// Every kind, hard kinds first.
    pub const ALL: [ConstraintKind; Self::COUNT] = [
        ConstraintKind::TeacherClash,
        ConstraintKind::RoomClash,
        ConstraintKind::GroupClash,
        ConstraintKind::TeacherUnqualified,
        ConstraintKind::TeacherUnavailable,
        ConstraintKind::RoomCapacity,
        ConstraintKind::RoomFeatures,
        ConstraintKind::TeacherOverload,
        ConstraintKind::TeacherGaps,
        ConstraintKind::RoomChanges,
        ConstraintKind::TimePreference,
    ];

    /// Position in [`ConstraintKind::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether a violation makes the timetable unusable.
    #[inline]
    pub fn is_hard(self) -> bool {
        !matches!(
            self,
            ConstraintKind::TeacherGaps
                | ConstraintKind::RoomChanges
                | ConstraintKind::TimePreference
        )
    }

    /// Raw (unweighted) cost of this constraint over a schedule.
    pub fn cost(self, schedule: &Schedule, instance: &Instance) -> u64 {
        match self {
            ConstraintKind::TeacherClash => {
                clash_pairs(schedule.entries().iter().map(|e| (e.teacher, e.slot)))
            }
            ConstraintKind::RoomClash => {
                clash_pairs(schedule.entries().iter().map(|e| (e.room, e.slot)))
            }
            ConstraintKind::GroupClash => clash_pairs(
                schedule
                    .entries()
                    .iter()
                    .filter_map(|e| instance.course_group(e.course).map(|g| (g, e.slot))),
            ),
            ConstraintKind::TeacherUnqualified => count_entries(schedule, |e| {
                !instance.is_qualified(e.course, e.teacher)
            }),
            ConstraintKind::TeacherUnavailable => count_entries(schedule, |e| {
                !instance.is_available(e.teacher, e.slot)
            }),
            ConstraintKind::RoomCapacity => count_entries(schedule, |e| {
                !instance.room_has_capacity(e.course, e.room)
            }),
            ConstraintKind::RoomFeatures => count_entries(schedule, |e| {
                !instance.room_has_features(e.course, e.room)
            }),
            ConstraintKind::TeacherOverload => teacher_overload(schedule, instance),
            ConstraintKind::TeacherGaps => teacher_gaps(schedule, instance),
            ConstraintKind::RoomChanges => room_changes(schedule, instance),
            ConstraintKind::TimePreference => count_entries(schedule, |e| {
                instance.is_preference_mismatch(e.course, e.slot)
            }),
        }
    }
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Raw costs of every constraint kind, indexed by [`ConstraintKind::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintCosts([u64; ConstraintKind::COUNT]);

impl ConstraintCosts {
    /// Evaluates every kind from scratch.
    pub fn compute(schedule: &Schedule, instance: &Instance) -> Self {
        let mut costs = Self::default();
        for kind in ConstraintKind::ALL {
            costs.0[kind.index()] = kind.cost(schedule, instance);
        }
        costs
    }

    /// Cost of one kind.
    #[inline]
    pub fn get(&self, kind: ConstraintKind) -> u64 {
        self.0[kind.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, kind: ConstraintKind) -> &mut u64 {
        &mut self.0[kind.index()]
    }

    /// Total number of hard violations.
    pub fn hard_total(&self) -> u64 {
        ConstraintKind::ALL
            .iter()
            .filter(|k| k.is_hard())
            .map(|k| self.get(*k))
            .sum()
    }

    /// `(kind, cost)` pairs with non-zero cost.
    pub fn nonzero(&self) -> Vec<(ConstraintKind, u64)> {
        ConstraintKind::ALL
            .iter()
            .map(|&k| (k, self.get(k)))
            .filter(|(_, c)| *c > 0)
            .collect()
    }
}

fn count_entries<F>(schedule: &Schedule, violated: F) -> u64
where
    F: Fn(&crate::models::TimetableEntry) -> bool,
{
    schedule.entries().iter().filter(|e| violated(e)).count() as u64
}

/// Number of unordered pairs sharing the same key.
fn clash_pairs(keys: impl Iterator<Item = (usize, usize)>) -> u64 {
    let mut counts: HashMap<(usize, usize), u64> = HashMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts.values().map(|&n| n * (n - 1) / 2).sum()
}

fn teacher_overload(schedule: &Schedule, instance: &Instance) -> u64 {
    let mut hours = vec![0u64; instance.teachers().len()];
    for e in schedule.entries() {
        hours[e.teacher] += 1;
    }
    hours
        .iter()
        .zip(instance.teachers())
        .map(|(&h, t)| h.saturating_sub(u64::from(t.max_hours_per_week)))
        .sum()
}

fn teacher_gaps(schedule: &Schedule, instance: &Instance) -> u64 {
    let days = instance.num_days();
    let periods = instance.num_periods();
    let mut occupied = vec![false; instance.teachers().len() * days * periods];
    for e in schedule.entries() {
        let day = instance.slot_day(e.slot);
        let period = instance.slot_period(e.slot);
        occupied[(e.teacher * days + day) * periods + period] = true;
    }
    occupied
        .chunks(periods.max(1))
        .map(|row| day_gaps(row.iter().map(|&b| b as u32)))
        .sum()
}

/// Idle periods strictly between the first and last occupied period.
pub(crate) fn day_gaps(row: impl Iterator<Item = u32>) -> u64 {
    let mut first = None;
    let mut last = 0;
    let mut busy = 0u64;
    for (p, n) in row.enumerate() {
        if n > 0 {
            first.get_or_insert(p);
            last = p;
            busy += 1;
        }
    }
    match first {
        Some(first) => (last - first + 1) as u64 - busy,
        None => 0,
    }
}

fn room_changes(schedule: &Schedule, instance: &Instance) -> u64 {
    let rooms = instance.rooms().len();
    let mut used = vec![false; instance.courses().len() * rooms];
    for e in schedule.entries() {
        used[e.course * rooms + e.room] = true;
    }
    used.chunks(rooms.max(1))
        .map(|row| row.iter().filter(|&&u| u).count().saturating_sub(1) as u64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Course, Room, Teacher, TimeSlot, TimetableEntry};

    // 2 days × 4 periods; slot index = day * 4 + period.
    fn instance() -> Instance {
        let slots = TimeSlot::grid(2, 4);
        Instance::new(
            vec![
                Course::new("C1", 2).with_group_size(30).with_group("g"),
                Course::new("C2", 2).with_feature("lab").with_group("g"),
                Course::new("C3", 1).with_preferred_slot(TimeSlot::new(0, 0)),
            ],
            vec![Room::new("R1", 40), Room::new("R2", 20).with_feature("lab")],
            vec![
                Teacher::new("T1")
                    .with_availability(TimeSlot::grid(1, 4))
                    .with_max_hours(2)
                    .qualified_for("C1")
                    .qualified_for("C2"),
                Teacher::new("T2")
                    .with_availability(slots.clone())
                    .qualified_for("C3"),
            ],
            slots,
        )
        .unwrap()
    }

    fn schedule(entries: &[(usize, usize, usize, usize)]) -> Schedule {
        Schedule::from_entries(
            entries
                .iter()
                .map(|&(c, t, r, s)| TimetableEntry::new(c, t, r, s))
                .collect(),
        )
    }

    #[test]
    fn test_kind_table() {
        for (i, k) in ConstraintKind::ALL.iter().enumerate() {
            assert_eq!(k.index(), i);
        }
        assert_eq!(ConstraintKind::ALL.iter().filter(|k| k.is_hard()).count(), 8);
    }

    #[test]
    fn test_clean_schedule_has_no_hard_cost() {
        let inst = instance();
        let s = schedule(&[(0, 0, 0, 0), (0, 0, 0, 1), (1, 1, 1, 4), (1, 1, 1, 7), (2, 1, 1, 0)]);
        let costs = ConstraintCosts::compute(&s, &inst);
        // T2 is not qualified for C2.
        assert_eq!(costs.get(ConstraintKind::TeacherUnqualified), 2);
        assert_eq!(costs.get(ConstraintKind::TeacherClash), 0);
        assert_eq!(costs.get(ConstraintKind::RoomClash), 0);
        assert_eq!(costs.get(ConstraintKind::GroupClash), 0);
        assert_eq!(costs.get(ConstraintKind::TeacherGaps), 2);
        assert_eq!(costs.hard_total(), 2);
    }

    #[test]
    fn test_clash_pairs_counting() {
        let inst = instance();
        // Three lessons of T1 in slot 0: 3 teacher pairs; rooms R1,R1,R2: 1 pair.
        let s = schedule(&[(0, 0, 0, 0), (0, 0, 0, 0), (1, 0, 1, 0), (1, 0, 1, 1), (2, 1, 0, 7)]);
        let costs = ConstraintCosts::compute(&s, &inst);
        assert_eq!(costs.get(ConstraintKind::TeacherClash), 3);
        assert_eq!(costs.get(ConstraintKind::RoomClash), 1);
        assert_eq!(costs.get(ConstraintKind::GroupClash), 3);
    }

    #[test]
    fn test_unary_constraints() {
        let inst = instance();
        // C1 (30 seats) in R2 (20): capacity; C2 in R1: features;
        // T1 on day 1: unavailable; C3 outside preference.
        let s = schedule(&[(0, 0, 1, 0), (0, 0, 0, 1), (1, 0, 0, 4), (1, 0, 1, 2), (2, 1, 0, 3)]);
        let costs = ConstraintCosts::compute(&s, &inst);
        assert_eq!(costs.get(ConstraintKind::RoomCapacity), 1);
        assert_eq!(costs.get(ConstraintKind::RoomFeatures), 1);
        assert_eq!(costs.get(ConstraintKind::TeacherUnavailable), 1);
        assert_eq!(costs.get(ConstraintKind::TimePreference), 1);
        // T1 teaches 4 hours with a cap of 2.
        assert_eq!(costs.get(ConstraintKind::TeacherOverload), 2);
    }

    #[test]
    fn test_room_changes() {
        let inst = instance();
        let s = schedule(&[(0, 0, 0, 0), (0, 0, 1, 1), (1, 0, 1, 2), (1, 0, 1, 3), (2, 1, 0, 0)]);
        assert_eq!(ConstraintKind::RoomChanges.cost(&s, &inst), 1);
    }

    #[test]
    fn test_day_gaps() {
        assert_eq!(day_gaps([0, 0, 0].into_iter()), 0);
        assert_eq!(day_gaps([1, 0, 0, 1].into_iter()), 2);
        assert_eq!(day_gaps([0, 1, 2, 0, 1].into_iter()), 1);
    }

    #[test]
    fn test_nonzero_breakdown() {
        let inst = instance();
        let s = schedule(&[(0, 0, 0, 0), (0, 0, 0, 0), (1, 0, 1, 1), (1, 0, 1, 2), (2, 1, 0, 0)]);
        let costs = ConstraintCosts::compute(&s, &inst);
        let nz = costs.nonzero();
        assert!(nz.iter().any(|(k, _)| *k == ConstraintKind::TeacherClash));
        assert!(nz.iter().all(|(_, c)| *c > 0));
    }
}
