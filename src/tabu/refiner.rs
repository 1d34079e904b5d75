//! Steepest-descent tabu search over single-entry moves.
//!
//! Each iteration scans every (entry, dimension, value) neighbor, scoring
//! it by applying the move to an [`EvaluationState`] and undoing it. The
//! best admissible neighbor is taken even when it is worse than the
//! current schedule. After a move, its reverse is made tabu so the search
//! cannot immediately return.
//!
//! A tabu neighbor is still admissible when its fitness beats the
//! aspiration level: the larger of the caller's global best and the
//! best fitness this refinement has reached.
//!
//! The refiner uses no randomness, so results do not depend on thread
//! scheduling when several refinements run in parallel.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::moves::candidate_values;
use super::{Move, TabuList};
use crate::evaluation::{Evaluation, EvaluationState, Evaluator};
use crate::ga::Dimension;
use crate::models::{Instance, Schedule};

/// Tabu search budget and memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabuSettings {
    /// Tabu list length.
    pub tenure: usize,
    /// Maximum number of applied moves.
    pub max_iterations: usize,
    /// Stop after this many moves without a new refinement best.
    pub max_no_improve: usize,
}

impl Default for TabuSettings {
    fn default() -> Self {
        Self {
            tenure: 10,
            max_iterations: 100,
            max_no_improve: 25,
        }
    }
}

/// A move the refiner actually applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedMove {
    /// The move.
    pub mv: Move,
    /// Its reverse, which became tabu.
    pub reverse: Move,
    /// Whether the move was tabu and admitted by aspiration.
    pub via_aspiration: bool,
    /// Fitness after the move.
    pub fitness: f64,
}

/// Result of one refinement.
#[derive(Debug, Clone)]
pub struct RefineOutcome {
    /// Best schedule visited.
    pub schedule: Schedule,
    /// Its evaluation.
    pub evaluation: Evaluation,
    /// Evaluation of the starting schedule.
    pub initial: Evaluation,
    /// Moves applied.
    pub iterations: usize,
    /// Applied moves in order.
    pub moves: Vec<AppliedMove>,
}

impl RefineOutcome {
    /// Whether the best visited schedule is strictly fitter than the start.
    pub fn improved(&self) -> bool {
        self.evaluation.fitness > self.initial.fitness
    }
}

/// Tabu search refiner bound to one instance.
#[derive(Debug, Clone)]
pub struct TabuRefiner<'a> {
    instance: &'a Instance,
    evaluator: Evaluator,
    settings: TabuSettings,
}

impl<'a> TabuRefiner<'a> {
    /// Creates a refiner.
    pub fn new(instance: &'a Instance, evaluator: Evaluator, settings: TabuSettings) -> Self {
        Self {
            instance,
            evaluator,
            settings,
        }
    }

    /// Refines `schedule`, returning the best schedule visited.
    ///
    /// `global_best_fitness` seeds the aspiration level; pass `0.0` when
    /// no global best is known.
    pub fn refine(&self, schedule: &Schedule, global_best_fitness: f64) -> RefineOutcome {
        let mut state = EvaluationState::new(self.instance, schedule.clone());
        let initial = state.evaluate(&self.evaluator);
        let mut best = schedule.clone();
        let mut best_eval = initial;

        let mut tabu = TabuList::new(self.settings.tenure.max(1));
        let mut moves = Vec::new();
        let mut no_improve = 0;

        while moves.len() < self.settings.max_iterations && !best_eval.is_perfect() {
            let aspiration = global_best_fitness.max(best_eval.fitness);
            let Some((mv, eval, via_aspiration)) = self.best_neighbor(&mut state, &tabu, aspiration)
            else {
                break;
            };

            let entry = state.schedule().entry(mv.entry);
            let (t, r, s) = mv.dimension.replaced(&entry, mv.value);
            let previous = state.apply(mv.entry, t, r, s);
            let reverse = mv.reverse(&previous);
            tabu.push(reverse);
            moves.push(AppliedMove {
                mv,
                reverse,
                via_aspiration,
                fitness: eval.fitness,
            });

            if eval.is_better_than(&best_eval) {
                best_eval = eval;
                best = state.schedule().clone();
                no_improve = 0;
            } else {
                no_improve += 1;
                if no_improve >= self.settings.max_no_improve {
                    break;
                }
            }
        }

        debug!(
            iterations = moves.len(),
            initial_fitness = initial.fitness,
            best_fitness = best_eval.fitness,
            hard = best_eval.hard_violations,
            "tabu refinement finished"
        );

        RefineOutcome {
            schedule: best,
            evaluation: best_eval,
            initial,
            iterations: moves.len(),
            moves,
        }
    }

    /// Scans the whole neighborhood. Ties keep the earliest neighbor in
    /// (entry, dimension, value) order unless a later one has fewer hard
    /// violations.
    fn best_neighbor(
        &self,
        state: &mut EvaluationState<'_>,
        tabu: &TabuList,
        aspiration: f64,
    ) -> Option<(Move, Evaluation, bool)> {
        let mut chosen: Option<(Move, Evaluation, bool)> = None;

        for i in 0..state.schedule().len() {
            let entry = state.schedule().entry(i);
            for dimension in Dimension::ALL {
                for value in candidate_values(self.instance, &entry, dimension) {
                    let mv = Move::new(i, dimension, value);
                    let (t, r, s) = dimension.replaced(&entry, value);
                    state.apply(i, t, r, s);
                    let eval = state.evaluate(&self.evaluator);
                    state.apply(i, entry.teacher, entry.room, entry.slot);

                    let is_tabu = tabu.contains(&mv);
                    if is_tabu && eval.fitness <= aspiration {
                        continue;
                    }
                    let better = match &chosen {
                        None => true,
                        Some((_, current, _)) => eval.is_better_than(current),
                    };
                    if better {
                        chosen = Some((mv, eval, is_tabu));
                    }
                }
            }
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::construct;
    use crate::models::{Course, Room, Teacher, TimeSlot, TimetableEntry};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn instance() -> Instance {
        let slots = TimeSlot::grid(2, 4);
        Instance::new(
            vec![
                Course::new("C1", 3).with_group("g1"),
                Course::new("C2", 2).with_group("g1").with_feature("lab"),
                Course::new("C3", 2).with_preferred_slot(TimeSlot::new(1, 0)),
            ],
            vec![Room::new("R1", 30), Room::new("R2", 30).with_feature("lab")],
            vec![
                Teacher::new("T1")
                    .with_availability(slots.clone())
                    .qualified_for("C1")
                    .qualified_for("C3"),
                Teacher::new("T2")
                    .with_availability(TimeSlot::grid(1, 4))
                    .qualified_for("C2"),
            ],
            slots,
        )
        .unwrap()
    }

    fn clashing(inst: &Instance) -> Schedule {
        // Everything in slot 0, room 0, teacher 0.
        Schedule::from_entries(
            inst.lessons()
                .iter()
                .map(|l| TimetableEntry::new(l.course, 0, 0, 0))
                .collect(),
        )
    }

    #[test]
    fn test_refine_reduces_violations() {
        let inst = instance();
        let refiner = TabuRefiner::new(&inst, Evaluator::default(), TabuSettings::default());
        let start = clashing(&inst);
        let out = refiner.refine(&start, 0.0);

        assert!(out.improved());
        assert!(out.evaluation.hard_violations < out.initial.hard_violations);
        assert!(out.schedule.satisfies_structure(&inst));
        assert_eq!(
            Evaluator::default().evaluate(&out.schedule, &inst),
            out.evaluation
        );
    }

    #[test]
    fn test_refine_never_returns_worse() {
        let inst = instance();
        let refiner = TabuRefiner::new(&inst, Evaluator::default(), TabuSettings::default());
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..5 {
            let s = construct(&inst, &mut rng);
            let out = refiner.refine(&s, 0.0);
            assert!(out.evaluation.fitness >= out.initial.fitness);
        }
    }

    #[test]
    fn test_refine_deterministic() {
        let inst = instance();
        let refiner = TabuRefiner::new(&inst, Evaluator::default(), TabuSettings::default());
        let start = clashing(&inst);
        let a = refiner.refine(&start, 0.0);
        let b = refiner.refine(&start, 0.0);
        assert_eq!(a.schedule, b.schedule);
        assert_eq!(a.moves, b.moves);
    }

    #[test]
    fn test_reverse_not_reapplied_within_tenure() {
        let inst = instance();
        let settings = TabuSettings {
            tenure: 4,
            max_iterations: 60,
            max_no_improve: 60,
        };
        let refiner = TabuRefiner::new(&inst, Evaluator::default(), settings);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..3 {
            let out = refiner.refine(&construct(&inst, &mut rng), 0.0);
            for (k, later) in out.moves.iter().enumerate() {
                let window = k.saturating_sub(settings.tenure)..k;
                for earlier in &out.moves[window] {
                    if later.mv == earlier.reverse {
                        assert!(later.via_aspiration, "tabu move reapplied at {k}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_stops_on_iteration_budget() {
        let inst = instance();
        let settings = TabuSettings {
            tenure: 3,
            max_iterations: 2,
            max_no_improve: 10,
        };
        let refiner = TabuRefiner::new(&inst, Evaluator::default(), settings);
        let out = refiner.refine(&clashing(&inst), 0.0);
        assert!(out.iterations <= 2);
    }

    #[test]
    fn test_perfect_schedule_untouched() {
        let slots = TimeSlot::grid(1, 2);
        let inst = Instance::new(
            vec![Course::new("C1", 1)],
            vec![Room::new("R1", 10)],
            vec![Teacher::new("T1")
                .with_availability(slots.clone())
                .qualified_for("C1")],
            slots,
        )
        .unwrap();
        let s = Schedule::from_entries(vec![TimetableEntry::new(0, 0, 0, 0)]);
        let refiner = TabuRefiner::new(&inst, Evaluator::default(), TabuSettings::default());
        let out = refiner.refine(&s, 0.0);
        assert_eq!(out.iterations, 0);
        assert_eq!(out.schedule, s);
        assert!(!out.improved());
    }
}
