//! Constraint evaluation.
//!
//! Scores candidate schedules against hard and soft constraints.
//!
//! # Submodules
//!
//! - `constraint`: the fixed set of [`ConstraintKind`]s and their pure cost functions
//! - `evaluator`: weighting of raw costs into an [`Evaluation`]
//! - `state`: [`EvaluationState`], incremental costs for single-entry moves
//!
//! Evaluation is deterministic and side-effect-free given the schedule,
//! the instance and the weights, which makes it safe to fan out across
//! threads.

mod constraint;
mod evaluator;
mod state;

pub use constraint::{ConstraintCosts, ConstraintKind};
pub use evaluator::{Evaluation, Evaluator, SoftWeights};
pub use state::EvaluationState;
