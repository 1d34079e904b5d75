//! Genetic algorithm over timetables.
//!
//! # Encoding
//!
//! A chromosome is a [`Schedule`](crate::models::Schedule): one
//! (teacher, room, slot) gene per lesson, with lesson `i` fixed to
//! position `i`. Operators only ever rewrite genes in place, so the
//! course-hour multiset is preserved by construction.
//!
//! # Submodules
//!
//! - `construction`: randomized greedy seeding with a relaxation ladder
//! - [`operators`]: runtime-selectable crossover and per-entry mutation
//! - `population`: sorting, tournament selection and elitist replacement
//!
//! # Reference
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod construction;
pub mod operators;
mod population;

pub use construction::{Placement, construct};
pub use operators::{CrossoverKind, Dimension, GeneticOperators, Offspring, repair};
pub use population::{GaCounters, GaEngine, GenerationStats, Individual, Population};
