//! Incremental evaluation state.
//!
//! Keeps occupancy counters next to a schedule so that reassigning one
//! entry updates every constraint cost in `O(periods)` instead of a full
//! re-scan. Local search evaluates a candidate move by applying it,
//! reading the score and applying the returned previous entry again.
//!
//! The running costs always equal [`ConstraintCosts::compute`] on the
//! current schedule.

use super::constraint::day_gaps;
use super::{ConstraintCosts, ConstraintKind, Evaluation, Evaluator};
use crate::models::{Instance, Schedule, TimetableEntry};

/// A schedule together with its incrementally maintained costs.
#[derive(Debug, Clone)]
pub struct EvaluationState<'a> {
    instance: &'a Instance,
    schedule: Schedule,
    costs: ConstraintCosts,

    // teacher * slots + slot
    teacher_slot: Vec<u32>,
    // room * slots + slot
    room_slot: Vec<u32>,
    // group * slots + slot
    group_slot: Vec<u32>,
    teacher_hours: Vec<u32>,
    // (teacher * days + day) * periods + period
    teacher_day_period: Vec<u32>,
    // course * rooms + room
    course_room: Vec<u32>,
    course_rooms_used: Vec<u32>,
}

impl<'a> EvaluationState<'a> {
    /// Builds counters for a schedule.
    pub fn new(instance: &'a Instance, schedule: Schedule) -> Self {
        let ns = instance.num_slots();
        let nt = instance.teachers().len();
        let nr = instance.rooms().len();
        let nc = instance.courses().len();
        let mut state = Self {
            instance,
            schedule: Schedule::default(),
            costs: ConstraintCosts::default(),
            teacher_slot: vec![0; nt * ns],
            room_slot: vec![0; nr * ns],
            group_slot: vec![0; instance.num_groups() * ns],
            teacher_hours: vec![0; nt],
            teacher_day_period: vec![0; nt * instance.num_days() * instance.num_periods()],
            course_room: vec![0; nc * nr],
            course_rooms_used: vec![0; nc],
        };
        for e in schedule.entries() {
            state.insert(*e);
        }
        state.schedule = schedule;
        state
    }

    /// The current schedule.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Consumes the state, returning the schedule.
    pub fn into_schedule(self) -> Schedule {
        self.schedule
    }

    /// Current raw costs.
    pub fn costs(&self) -> &ConstraintCosts {
        &self.costs
    }

    /// Scores the current schedule.
    pub fn evaluate(&self, evaluator: &Evaluator) -> Evaluation {
        evaluator.score(self.costs)
    }

    /// Reassigns the entry at `index`, returning the previous entry.
    ///
    /// Passing the returned entry's teacher, room and slot back in undoes
    /// the change exactly.
    pub fn apply(
        &mut self,
        index: usize,
        teacher: usize,
        room: usize,
        slot: usize,
    ) -> TimetableEntry {
        let old = self.schedule.entry(index);
        self.remove(old);
        self.insert(TimetableEntry::new(old.course, teacher, room, slot));
        self.schedule.reassign(index, teacher, room, slot)
    }

    fn day_row(&self, teacher: usize, day: usize) -> std::ops::Range<usize> {
        let periods = self.instance.num_periods();
        let start = (teacher * self.instance.num_days() + day) * periods;
        start..start + periods
    }

    fn gaps_of(&self, teacher: usize, day: usize) -> u64 {
        day_gaps(self.teacher_day_period[self.day_row(teacher, day)].iter().copied())
    }

    fn remove(&mut self, e: TimetableEntry) {
        let inst = self.instance;
        let ns = inst.num_slots();

        let n = &mut self.teacher_slot[e.teacher * ns + e.slot];
        *n -= 1;
        *self.costs.get_mut(ConstraintKind::TeacherClash) -= u64::from(*n);

        let n = &mut self.room_slot[e.room * ns + e.slot];
        *n -= 1;
        *self.costs.get_mut(ConstraintKind::RoomClash) -= u64::from(*n);

        if let Some(g) = inst.course_group(e.course) {
            let n = &mut self.group_slot[g * ns + e.slot];
            *n -= 1;
            *self.costs.get_mut(ConstraintKind::GroupClash) -= u64::from(*n);
        }

        self.adjust_unary(e, false);

        let h = &mut self.teacher_hours[e.teacher];
        if *h > inst.teachers()[e.teacher].max_hours_per_week {
            *self.costs.get_mut(ConstraintKind::TeacherOverload) -= 1;
        }
        *h -= 1;

        let day = inst.slot_day(e.slot);
        let before = self.gaps_of(e.teacher, day);
        let cell = self.day_row(e.teacher, day).start + inst.slot_period(e.slot);
        self.teacher_day_period[cell] -= 1;
        let after = self.gaps_of(e.teacher, day);
        let gaps = self.costs.get_mut(ConstraintKind::TeacherGaps);
        *gaps = *gaps - before + after;

        let n = &mut self.course_room[e.course * inst.rooms().len() + e.room];
        *n -= 1;
        if *n == 0 {
            let used = &mut self.course_rooms_used[e.course];
            *used -= 1;
            if *used >= 1 {
                *self.costs.get_mut(ConstraintKind::RoomChanges) -= 1;
            }
        }
    }

    fn insert(&mut self, e: TimetableEntry) {
        let inst = self.instance;
        let ns = inst.num_slots();

        let n = &mut self.teacher_slot[e.teacher * ns + e.slot];
        *self.costs.get_mut(ConstraintKind::TeacherClash) += u64::from(*n);
        *n += 1;

        let n = &mut self.room_slot[e.room * ns + e.slot];
        *self.costs.get_mut(ConstraintKind::RoomClash) += u64::from(*n);
        *n += 1;

        if let Some(g) = inst.course_group(e.course) {
            let n = &mut self.group_slot[g * ns + e.slot];
            *self.costs.get_mut(ConstraintKind::GroupClash) += u64::from(*n);
            *n += 1;
        }

        self.adjust_unary(e, true);

        let h = &mut self.teacher_hours[e.teacher];
        *h += 1;
        if *h > inst.teachers()[e.teacher].max_hours_per_week {
            *self.costs.get_mut(ConstraintKind::TeacherOverload) += 1;
        }

        let day = inst.slot_day(e.slot);
        let before = self.gaps_of(e.teacher, day);
        let cell = self.day_row(e.teacher, day).start + inst.slot_period(e.slot);
        self.teacher_day_period[cell] += 1;
        let after = self.gaps_of(e.teacher, day);
        let gaps = self.costs.get_mut(ConstraintKind::TeacherGaps);
        *gaps = *gaps - before + after;

        let n = &mut self.course_room[e.course * inst.rooms().len() + e.room];
        if *n == 0 {
            let used = &mut self.course_rooms_used[e.course];
            *used += 1;
            if *used >= 2 {
                *self.costs.get_mut(ConstraintKind::RoomChanges) += 1;
            }
        }
        *n += 1;
    }

    fn adjust_unary(&mut self, e: TimetableEntry, add: bool) {
        let inst = self.instance;
        let checks = [
            (ConstraintKind::TeacherUnqualified, !inst.is_qualified(e.course, e.teacher)),
            (ConstraintKind::TeacherUnavailable, !inst.is_available(e.teacher, e.slot)),
            (ConstraintKind::RoomCapacity, !inst.room_has_capacity(e.course, e.room)),
            (ConstraintKind::RoomFeatures, !inst.room_has_features(e.course, e.room)),
            (ConstraintKind::TimePreference, inst.is_preference_mismatch(e.course, e.slot)),
        ];
        for (kind, violated) in checks {
            if violated {
                let c = self.costs.get_mut(kind);
                if add {
                    *c += 1;
                } else {
                    *c -= 1;
                }
            }
        }
    }
}
