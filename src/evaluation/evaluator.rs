//! Weighted scoring of constraint costs.
//!
//! # Fitness
//!
//! ```text
//! soft    = w_gap·gaps + w_room·room_changes + w_pref·preference_mismatches
//! fitness = 1 / (1 + hard_weight·hard + soft_weight·soft)
//! ```
//!
//! Fitness lies in (0, 1], equals 1 only for a perfect timetable, and
//! strictly decreases in both the hard count and the soft penalty
//! whenever the corresponding weight is positive.

use serde::{Deserialize, Serialize};

use super::{ConstraintCosts, ConstraintKind};
use crate::models::{Instance, Schedule};

/// Per-kind weights inside the soft penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftWeights {
    /// Weight of one idle period in a teacher's day.
    pub teacher_gap: f64,
    /// Weight of one extra room used by a course.
    pub room_change: f64,
    /// Weight of one lesson outside the preferred slots.
    pub time_preference: f64,
}

impl Default for SoftWeights {
    fn default() -> Self {
        Self {
            teacher_gap: 1.0,
            room_change: 1.0,
            time_preference: 1.0,
        }
    }
}

/// Score of one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Number of hard violations; zero for an acceptable timetable.
    pub hard_violations: u64,
    /// Weighted soft penalty (non-negative).
    pub soft_penalty: f64,
    /// Combined fitness in (0, 1]; higher is better.
    pub fitness: f64,
    /// Raw cost of every constraint kind.
    pub costs: ConstraintCosts,
}

impl Evaluation {
    /// Whether no hard constraint is violated.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.hard_violations == 0
    }

    /// Whether nothing at all can be improved.
    #[inline]
    pub fn is_perfect(&self) -> bool {
        self.hard_violations == 0 && self.soft_penalty <= 0.0
    }

    /// Ranking used everywhere a "better" schedule is chosen: higher
    /// fitness first, then fewer hard violations.
    #[inline]
    pub fn is_better_than(&self, other: &Evaluation) -> bool {
        self.fitness > other.fitness
            || (self.fitness == other.fitness && self.hard_violations < other.hard_violations)
    }
}

/// Pure scoring function over schedules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluator {
    /// Multiplier of the hard violation count.
    pub hard_weight: f64,
    /// Multiplier of the soft penalty.
    pub soft_weight: f64,
    /// Weights inside the soft penalty.
    pub soft_weights: SoftWeights,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            hard_weight: 1000.0,
            soft_weight: 1.0,
            soft_weights: SoftWeights::default(),
        }
    }
}

impl Evaluator {
    /// Creates an evaluator with default soft weights.
    pub fn new(hard_weight: f64, soft_weight: f64) -> Self {
        Self {
            hard_weight,
            soft_weight,
            soft_weights: SoftWeights::default(),
        }
    }

    /// Sets the per-kind soft weights.
    pub fn with_soft_weights(mut self, weights: SoftWeights) -> Self {
        self.soft_weights = weights;
        self
    }

    /// Scores a schedule from scratch.
    pub fn evaluate(&self, schedule: &Schedule, instance: &Instance) -> Evaluation {
        self.score(ConstraintCosts::compute(schedule, instance))
    }

    /// Turns raw costs into an [`Evaluation`].
    pub fn score(&self, costs: ConstraintCosts) -> Evaluation {
        let hard = costs.hard_total();
        let soft = self.soft_penalty(&costs);
        Evaluation {
            hard_violations: hard,
            soft_penalty: soft,
            fitness: self.fitness(hard, soft),
            costs,
        }
    }

    /// Weighted soft penalty of raw costs.
    pub fn soft_penalty(&self, costs: &ConstraintCosts) -> f64 {
        let w = &self.soft_weights;
        w.teacher_gap * costs.get(ConstraintKind::TeacherGaps) as f64
            + w.room_change * costs.get(ConstraintKind::RoomChanges) as f64
            + w.time_preference * costs.get(ConstraintKind::TimePreference) as f64
    }

    /// `1 / (1 + hard_weight·hard + soft_weight·soft)`.
    #[inline]
    pub fn fitness(&self, hard: u64, soft: f64) -> f64 {
        1.0 / (1.0 + self.hard_weight * hard as f64 + self.soft_weight * soft)
    }

    /// Weighted cost per constraint kind, hard kinds scaled by
    /// `hard_weight`, soft kinds by `soft_weight` and their own weight.
    pub fn breakdown(&self, costs: &ConstraintCosts) -> Vec<(ConstraintKind, f64)> {
        let w = &self.soft_weights;
        ConstraintKind::ALL
            .iter()
            .map(|&k| {
                let raw = costs.get(k) as f64;
                let weighted = match k {
                    ConstraintKind::TeacherGaps => self.soft_weight * w.teacher_gap * raw,
                    ConstraintKind::RoomChanges => self.soft_weight * w.room_change * raw,
                    ConstraintKind::TimePreference => self.soft_weight * w.time_preference * raw,
                    _ => self.hard_weight * raw,
                };
                (k, weighted)
            })
            .collect()
    }
}
