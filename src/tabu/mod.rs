//! Tabu search refinement of individual timetables.
//!
//! # Submodules
//!
//! - `moves`: single-entry reassignment [`Move`]s and their neighborhoods
//! - `tabu_list`: fixed-tenure FIFO memory of reversed moves
//! - `refiner`: the steepest-descent [`TabuRefiner`] with aspiration
//!
//! # Reference
//! - Glover (1989), "Tabu Search, Part I"

mod moves;
mod refiner;
mod tabu_list;

pub use moves::Move;
pub use refiner::{AppliedMove, RefineOutcome, TabuRefiner, TabuSettings};
pub use tabu_list::TabuList;
