//! Configurable genetic operators for timetables.
//!
//! Provides runtime-selectable crossover granularity and the per-entry
//! reassignment mutation via [`GeneticOperators`]. Every operator keeps
//! position `i` bound to lesson `i`'s course, so offspring always satisfy
//! the structural invariant.
//!
//! # Usage
//!
//! ```
//! use u_timetable::ga::{CrossoverKind, GeneticOperators};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_kind, CrossoverKind::ByCourse);
//! assert_eq!(ops.mutation_rate, 0.1);
//! ```

use std::collections::BTreeSet;

use rand::Rng;
use rand::prelude::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::models::{Instance, Schedule, TimetableEntry};

/// Crossover granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossoverKind {
    /// Each course's lessons are inherited as a block from one parent.
    #[default]
    ByCourse,
    /// Lessons held on a random subset of days come from one parent, the
    /// rest from the other; the pooled entries are then repaired.
    ByDay,
    /// Single cut point over the lesson sequence.
    OnePoint,
}

/// Which schedule dimension a reassignment changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    /// The time slot.
    Slot,
    /// The room.
    Room,
    /// The teacher.
    Teacher,
}

impl Dimension {
    /// All dimensions in enumeration order.
    pub const ALL: [Dimension; 3] = [Dimension::Slot, Dimension::Room, Dimension::Teacher];

    /// The entry's current value in this dimension.
    #[inline]
    pub fn value_of(self, entry: &TimetableEntry) -> usize {
        match self {
            Dimension::Slot => entry.slot,
            Dimension::Room => entry.room,
            Dimension::Teacher => entry.teacher,
        }
    }

    /// `(teacher, room, slot)` of the entry with this dimension replaced.
    #[inline]
    pub fn replaced(self, entry: &TimetableEntry, value: usize) -> (usize, usize, usize) {
        match self {
            Dimension::Slot => (entry.teacher, entry.room, value),
            Dimension::Room => (entry.teacher, value, entry.slot),
            Dimension::Teacher => (value, entry.room, entry.slot),
        }
    }
}

/// Two children and how many of them needed repair.
#[derive(Debug, Clone)]
pub struct Offspring {
    /// First child.
    pub first: Schedule,
    /// Second child.
    pub second: Schedule,
    /// Children whose pooled entries had to be repaired (0..=2).
    pub repairs: usize,
}

/// Runtime-selectable genetic operators for the timetable GA.
///
/// # Example
///
/// ```
/// use u_timetable::ga::{CrossoverKind, GeneticOperators};
///
/// let ops = GeneticOperators {
///     crossover_kind: CrossoverKind::OnePoint,
///     crossover_rate: 0.9,
///     mutation_rate: 0.05,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_kind: CrossoverKind,
    /// Probability that a parent pair is recombined.
    pub crossover_rate: f64,
    /// Per-entry mutation probability.
    pub mutation_rate: f64,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            crossover_kind: CrossoverKind::ByCourse,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
        }
    }
}

impl GeneticOperators {
    /// Recombines two parents with probability `crossover_rate`, returning
    /// `None` when the pair is passed through unchanged.
    pub fn recombine<R: Rng>(
        &self,
        p1: &Schedule,
        p2: &Schedule,
        instance: &Instance,
        rng: &mut R,
    ) -> Option<Offspring> {
        if rng.random_bool(self.crossover_rate) {
            Some(self.crossover(p1, p2, instance, rng))
        } else {
            None
        }
    }

    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &Schedule,
        p2: &Schedule,
        instance: &Instance,
        rng: &mut R,
    ) -> Offspring {
        match self.crossover_kind {
            CrossoverKind::ByCourse => course_crossover(p1, p2, instance, rng),
            CrossoverKind::ByDay => day_crossover(p1, p2, instance, rng),
            CrossoverKind::OnePoint => one_point_crossover(p1, p2, rng),
        }
    }

    /// Reassigns each entry with probability `mutation_rate` along one
    /// random dimension. When that dimension has no feasible alternative
    /// the others are tried in turn; an entry with none stays as it is.
    /// Returns the number of entries changed.
    pub fn mutate<R: Rng>(
        &self,
        schedule: &mut Schedule,
        instance: &Instance,
        rng: &mut R,
    ) -> usize {
        let mut changed = 0;
        for i in 0..schedule.len() {
            if !rng.random_bool(self.mutation_rate) {
                continue;
            }
            let entry = schedule.entry(i);
            let n = Dimension::ALL.len();
            let first = rng.random_range(0..n);
            let picked = (0..n)
                .map(|k| Dimension::ALL[(first + k) % n])
                .find_map(|d| mutation_value(instance, &entry, d, rng).map(|v| (d, v)));
            if let Some((dimension, value)) = picked {
                let (t, r, s) = dimension.replaced(&entry, value);
                schedule.reassign(i, t, r, s);
                changed += 1;
            }
        }
        changed
    }
}

/// Picks a different feasible value for one dimension: a slot the
/// teacher is available in, a room from the course's pool, or a pooled
/// teacher available in the entry's slot.
fn mutation_value<R: Rng>(
    instance: &Instance,
    entry: &TimetableEntry,
    dimension: Dimension,
    rng: &mut R,
) -> Option<usize> {
    let current = dimension.value_of(entry);
    let candidates: Vec<usize> = match dimension {
        Dimension::Slot => (0..instance.num_slots())
            .filter(|&s| instance.is_available(entry.teacher, s))
            .collect(),
        Dimension::Room => instance.room_pool(entry.course).to_vec(),
        Dimension::Teacher => instance
            .teacher_pool(entry.course)
            .iter()
            .copied()
            .filter(|&t| instance.is_available(t, entry.slot))
            .collect(),
    };
    let others: Vec<usize> = candidates.into_iter().filter(|&v| v != current).collect();
    others.choose(rng).copied()
}

fn course_crossover<R: Rng>(
    p1: &Schedule,
    p2: &Schedule,
    instance: &Instance,
    rng: &mut R,
) -> Offspring {
    let from_first: Vec<bool> = (0..instance.courses().len())
        .map(|_| rng.random_bool(0.5))
        .collect();

    let mut a = Vec::with_capacity(p1.len());
    let mut b = Vec::with_capacity(p1.len());
    for (e1, e2) in p1.entries().iter().zip(p2.entries()) {
        if from_first[e1.course] {
            a.push(*e1);
            b.push(*e2);
        } else {
            a.push(*e2);
            b.push(*e1);
        }
    }
    Offspring {
        first: Schedule::from_entries(a),
        second: Schedule::from_entries(b),
        repairs: 0,
    }
}

fn one_point_crossover<R: Rng>(p1: &Schedule, p2: &Schedule, rng: &mut R) -> Offspring {
    let n = p1.len();
    if n < 2 {
        return Offspring {
            first: p1.clone(),
            second: p2.clone(),
            repairs: 0,
        };
    }
    let cut = rng.random_range(1..n);
    let splice = |head: &Schedule, tail: &Schedule| {
        let mut entries = head.entries()[..cut].to_vec();
        entries.extend_from_slice(&tail.entries()[cut..]);
        Schedule::from_entries(entries)
    };
    Offspring {
        first: splice(p1, p2),
        second: splice(p2, p1),
        repairs: 0,
    }
}

fn day_crossover<R: Rng>(
    p1: &Schedule,
    p2: &Schedule,
    instance: &Instance,
    rng: &mut R,
) -> Offspring {
    let days: BTreeSet<usize> = (0..instance.num_days())
        .filter(|_| rng.random_bool(0.5))
        .collect();
    let on_days = |e: &&TimetableEntry| days.contains(&instance.slot_day(e.slot));

    let pool_a: Vec<TimetableEntry> = p1
        .entries()
        .iter()
        .filter(on_days)
        .chain(p2.entries().iter().filter(|e| !on_days(e)))
        .copied()
        .collect();
    let pool_b: Vec<TimetableEntry> = p2
        .entries()
        .iter()
        .filter(on_days)
        .chain(p1.entries().iter().filter(|e| !on_days(e)))
        .copied()
        .collect();

    let (first, fixed_a) = repair(instance, pool_a, p1);
    let (second, fixed_b) = repair(instance, pool_b, p2);
    Offspring {
        first,
        second,
        repairs: usize::from(fixed_a) + usize::from(fixed_b),
    }
}

/// Lays pooled entries back onto the lesson positions.
///
/// Each course takes its pooled entries in order; surplus entries are
/// dropped and missing hours are filled from `fallback` at the same
/// position. Returns the schedule and whether anything had to change.
pub fn repair(
    instance: &Instance,
    pool: Vec<TimetableEntry>,
    fallback: &Schedule,
) -> (Schedule, bool) {
    let mut buckets: Vec<Vec<TimetableEntry>> = vec![Vec::new(); instance.courses().len()];
    for e in pool {
        buckets[e.course].push(e);
    }

    let mut repaired = false;
    let mut entries = Vec::with_capacity(instance.total_required_hours());
    for (course, bucket) in buckets.into_iter().enumerate() {
        let range = instance.lessons_of(course);
        if bucket.len() != range.len() {
            repaired = true;
        }
        let mut pooled = bucket.into_iter();
        for i in range {
            entries.push(pooled.next().unwrap_or_else(|| fallback.entry(i)));
        }
    }
    (Schedule::from_entries(entries), repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Evaluator;
    use crate::ga::construct;
    use crate::models::{Course, Room, Teacher, TimeSlot};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn instance() -> Instance {
        let slots = TimeSlot::grid(3, 3);
        Instance::new(
            vec![
                Course::new("C1", 3),
                Course::new("C2", 2).with_feature("lab"),
                Course::new("C3", 2),
            ],
            vec![Room::new("R1", 30), Room::new("R2", 30).with_feature("lab")],
            vec![
                Teacher::new("T1")
                    .with_availability(slots.clone())
                    .qualified_for("C1")
                    .qualified_for("C2"),
                Teacher::new("T2")
                    .with_availability(TimeSlot::grid(1, 3))
                    .qualified_for("C3"),
                Teacher::new("T3").with_availability(slots.clone()),
            ],
            slots,
        )
        .unwrap()
    }

    fn parents(inst: &Instance, rng: &mut SmallRng) -> (Schedule, Schedule) {
        (construct(inst, rng), construct(inst, rng))
    }

    #[test]
    fn test_default_operators() {
        let ops = GeneticOperators::default();
        assert_eq!(ops.crossover_kind, CrossoverKind::ByCourse);
        assert_eq!(ops.crossover_rate, 0.8);
    }

    #[test]
    fn test_every_crossover_keeps_structure() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(42);
        for kind in [CrossoverKind::ByCourse, CrossoverKind::ByDay, CrossoverKind::OnePoint] {
            let ops = GeneticOperators {
                crossover_kind: kind,
                ..GeneticOperators::default()
            };
            for _ in 0..20 {
                let (p1, p2) = parents(&inst, &mut rng);
                let off = ops.crossover(&p1, &p2, &inst, &mut rng);
                assert!(off.first.satisfies_structure(&inst), "{kind:?}");
                assert!(off.second.satisfies_structure(&inst), "{kind:?}");
            }
        }
    }

    #[test]
    fn test_course_crossover_inherits_whole_courses() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(5);
        let (p1, p2) = parents(&inst, &mut rng);
        let off = course_crossover(&p1, &p2, &inst, &mut rng);
        for c in 0..inst.courses().len() {
            let range = inst.lessons_of(c);
            let child = &off.first.entries()[range.clone()];
            assert!(child == &p1.entries()[range.clone()] || child == &p2.entries()[range]);
        }
    }

    #[test]
    fn test_one_point_is_prefix_and_suffix() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(8);
        let (p1, p2) = parents(&inst, &mut rng);
        let off = one_point_crossover(&p1, &p2, &mut rng);
        let n = p1.len();
        let cut = (1..n)
            .find(|&k| off.first.entries()[k..] == p2.entries()[k..])
            .unwrap();
        assert_eq!(off.first.entries()[..cut], p1.entries()[..cut]);
        assert_eq!(off.second.entries()[..cut], p2.entries()[..cut]);
    }

    #[test]
    fn test_repair_fills_and_trims() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(3);
        let fallback = construct(&inst, &mut rng);

        // Four C1 entries (one surplus), no C2, one C3 (one missing).
        let pool = vec![
            TimetableEntry::new(0, 0, 0, 0),
            TimetableEntry::new(0, 0, 0, 1),
            TimetableEntry::new(0, 0, 0, 2),
            TimetableEntry::new(0, 0, 0, 3),
            TimetableEntry::new(2, 1, 0, 4),
        ];
        let (s, repaired) = repair(&inst, pool, &fallback);
        assert!(repaired);
        assert!(s.satisfies_structure(&inst));
        assert_eq!(s.entry(2), TimetableEntry::new(0, 0, 0, 2));
        assert_eq!(s.entry(3), fallback.entry(3));
        assert_eq!(s.entry(5), TimetableEntry::new(2, 1, 0, 4));
        assert_eq!(s.entry(6), fallback.entry(6));
    }

    #[test]
    fn test_repair_untouched_when_complete() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(4);
        let s = construct(&inst, &mut rng);
        let (back, repaired) = repair(&inst, s.entries().to_vec(), &s);
        assert!(!repaired);
        assert_eq!(back, s);
    }

    #[test]
    fn test_mutation_rate_zero_is_identity() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(1);
        let ops = GeneticOperators {
            mutation_rate: 0.0,
            ..GeneticOperators::default()
        };
        let mut s = construct(&inst, &mut rng);
        let before = s.clone();
        assert_eq!(ops.mutate(&mut s, &inst, &mut rng), 0);
        assert_eq!(s, before);
    }

    #[test]
    fn test_mutation_rate_one_changes_every_entry() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(2);
        let ops = GeneticOperators {
            mutation_rate: 1.0,
            ..GeneticOperators::default()
        };
        let mut s = construct(&inst, &mut rng);
        let before = s.clone();
        let changed = ops.mutate(&mut s, &inst, &mut rng);
        assert!(s.satisfies_structure(&inst));
        assert_eq!(changed, s.len());
        assert_eq!(s.distance(&before), s.len());
    }

    #[test]
    fn test_mutation_value_prefers_feasible_candidates() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(6);
        for _ in 0..20 {
            // C1 taught by unqualified T3: the only qualified teacher is T1.
            let e = TimetableEntry::new(0, 2, 0, 0);
            assert_eq!(mutation_value(&inst, &e, Dimension::Teacher, &mut rng), Some(0));

            // C2 in R1: only R2 has the lab.
            let e = TimetableEntry::new(1, 0, 0, 0);
            assert_eq!(mutation_value(&inst, &e, Dimension::Room, &mut rng), Some(1));

            // T2 is available in the first three slots only.
            let e = TimetableEntry::new(2, 1, 0, 0);
            let s = mutation_value(&inst, &e, Dimension::Slot, &mut rng).unwrap();
            assert!(s == 1 || s == 2);
        }
    }

    #[test]
    fn test_mutation_value_none_without_feasible_alternative() {
        let inst = instance();
        let mut rng = SmallRng::seed_from_u64(7);
        // C1 already with its sole qualified teacher.
        let e = TimetableEntry::new(0, 0, 0, 0);
        assert_eq!(mutation_value(&inst, &e, Dimension::Teacher, &mut rng), None);
        // C2 already in the only lab.
        let e = TimetableEntry::new(1, 0, 1, 0);
        assert_eq!(mutation_value(&inst, &e, Dimension::Room, &mut rng), None);
    }

    #[test]
    fn test_mutation_keeps_feasible_schedule_feasible() {
        // One slot and one room; T2 is not qualified for C1.
        let slots = TimeSlot::grid(1, 1);
        let inst = Instance::new(
            vec![Course::new("C1", 1)],
            vec![Room::new("R1", 30)],
            vec![
                Teacher::new("T1")
                    .with_availability(slots.clone())
                    .qualified_for("C1"),
                Teacher::new("T2").with_availability(slots.clone()),
            ],
            slots,
        )
        .unwrap();
        let ops = GeneticOperators {
            mutation_rate: 1.0,
            ..GeneticOperators::default()
        };
        let evaluator = Evaluator::default();
        let feasible = Schedule::from_entries(vec![TimetableEntry::new(0, 0, 0, 0)]);
        assert_eq!(evaluator.evaluate(&feasible, &inst).hard_violations, 0);

        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..30 {
            let mut s = feasible.clone();
            assert_eq!(ops.mutate(&mut s, &inst, &mut rng), 0);
            assert_eq!(s, feasible);
            assert_eq!(evaluator.evaluate(&s, &inst).hard_violations, 0);
        }
    }

    #[test]
    fn test_mutation_tries_other_dimensions() {
        let inst = instance();
        let ops = GeneticOperators {
            mutation_rate: 1.0,
            ..GeneticOperators::default()
        };
        let mut rng = SmallRng::seed_from_u64(12);
        // Teacher and room are fixed for C2; only the slot can move.
        let before = Schedule::from_entries(vec![
            TimetableEntry::new(0, 0, 0, 0),
            TimetableEntry::new(0, 0, 0, 1),
            TimetableEntry::new(0, 0, 0, 2),
            TimetableEntry::new(1, 0, 1, 3),
            TimetableEntry::new(1, 0, 1, 4),
            TimetableEntry::new(2, 1, 0, 0),
            TimetableEntry::new(2, 1, 0, 1),
        ]);
        for _ in 0..20 {
            let mut s = before.clone();
            assert_eq!(ops.mutate(&mut s, &inst, &mut rng), s.len());
            for i in 3..5 {
                let (b, a) = (before.entry(i), s.entry(i));
                assert_eq!((a.teacher, a.room), (b.teacher, b.room));
                assert_ne!(a.slot, b.slot);
            }
        }
    }
}
