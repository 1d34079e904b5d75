//! Timetable quality report.
//!
//! Summarizes a finished schedule for consumers outside the optimizer.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Hard violations | Sum of hard constraint costs |
//! | Soft penalty | Weighted sum of soft constraint costs |
//! | Room utilization | Occupied slots / total slots, per room |
//! | Teacher load | Scheduled hours / weekly maximum, per teacher |

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::evaluation::{ConstraintCosts, ConstraintKind, Evaluator};
use crate::models::{Instance, Schedule, ScheduledLesson};

/// Raw and weighted cost of one constraint kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintCost {
    /// Constraint kind.
    pub kind: ConstraintKind,
    /// Unweighted cost.
    pub raw: u64,
    /// Cost after weighting.
    pub weighted: f64,
}

/// Hours taught by one teacher.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeacherLoad {
    /// Scheduled lessons.
    pub hours: u32,
    /// Weekly maximum.
    pub max_hours: u32,
    /// `hours / max_hours`, or 0 when unbounded.
    pub load: f64,
}

/// Schedule quality indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimetableReport {
    /// Total hard violations.
    pub hard_violations: u64,
    /// Weighted soft penalty.
    pub soft_penalty: f64,
    /// Combined fitness.
    pub fitness: f64,
    /// Per-kind costs in fixed kind order.
    pub breakdown: Vec<ConstraintCost>,
    /// Fraction of slots in which each room is used, by room ID.
    pub room_utilization: BTreeMap<String, f64>,
    /// Mean room utilization.
    pub avg_room_utilization: f64,
    /// Load per teacher ID.
    pub teacher_load: BTreeMap<String, TeacherLoad>,
    /// Lessons resolved to IDs, sorted by slot then room.
    pub lessons: Vec<ScheduledLesson>,
}

impl TimetableReport {
    /// Computes the report for a schedule.
    pub fn calculate(schedule: &Schedule, instance: &Instance, evaluator: &Evaluator) -> Self {
        let costs = ConstraintCosts::compute(schedule, instance);
        let evaluation = evaluator.score(costs);
        let breakdown = evaluator
            .breakdown(&costs)
            .into_iter()
            .map(|(kind, weighted)| ConstraintCost {
                kind,
                raw: costs.get(kind),
                weighted,
            })
            .collect();

        let slots = instance.num_slots().max(1) as f64;
        let room_utilization: BTreeMap<String, f64> = instance
            .rooms()
            .iter()
            .enumerate()
            .map(|(r, room)| {
                let used: BTreeSet<usize> =
                    schedule.entries_for_room(r).iter().map(|e| e.slot).collect();
                (room.id.clone(), used.len() as f64 / slots)
            })
            .collect();
        let avg_room_utilization = if room_utilization.is_empty() {
            0.0
        } else {
            room_utilization.values().sum::<f64>() / room_utilization.len() as f64
        };

        let teacher_load = instance
            .teachers()
            .iter()
            .enumerate()
            .map(|(t, teacher)| {
                let hours = schedule.entries_for_teacher(t).len() as u32;
                let max_hours = teacher.max_hours_per_week;
                let load = if max_hours == u32::MAX || max_hours == 0 {
                    0.0
                } else {
                    f64::from(hours) / f64::from(max_hours)
                };
                (
                    teacher.id.clone(),
                    TeacherLoad {
                        hours,
                        max_hours,
                        load,
                    },
                )
            })
            .collect();

        Self {
            hard_violations: evaluation.hard_violations,
            soft_penalty: evaluation.soft_penalty,
            fitness: evaluation.fitness,
            breakdown,
            room_utilization,
            avg_room_utilization,
            teacher_load,
            lessons: schedule.to_lessons(instance),
        }
    }

    /// Constraint kinds with a non-zero cost.
    pub fn violated(&self) -> impl Iterator<Item = &ConstraintCost> {
        self.breakdown.iter().filter(|c| c.raw > 0)
    }

    /// Whether the schedule is within the given quality thresholds.
    pub fn meets_thresholds(&self, max_soft_penalty: f64, min_utilization: f64) -> bool {
        self.hard_violations == 0
            && self.soft_penalty <= max_soft_penalty
            && self.avg_room_utilization >= min_utilization
    }
}
