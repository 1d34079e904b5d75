//! Course timetabling with a hybrid genetic algorithm and tabu search.
//!
//! Assigns every course-hour to a time slot, a room and a teacher so that
//! no hard constraint is violated and soft preferences are met as far as
//! possible. A genetic algorithm explores the assignment space; elites are
//! periodically polished by tabu search.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Room`, `Teacher`, `TimeSlot`,
//!   `Instance`, `Schedule`, `TimetableEntry`
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown references)
//! - **`evaluation`**: Hard/soft constraint costs, fitness, incremental deltas
//! - **`ga`**: Construction, crossover, mutation, selection and replacement
//! - **`tabu`**: Tabu search refinement over single-entry moves
//! - **`hybrid`**: The orchestrating loop, global best, cancellation, progress
//! - **`config`**: Run configuration and its validation
//! - **`report`**: Timetable quality indicators
//!
//! # Example
//!
//! ```
//! use u_timetable::{HybridOptimizer, OptimizerConfig};
//! use u_timetable::models::{Course, Instance, Room, Teacher, TimeSlot};
//!
//! let slots = TimeSlot::grid(2, 3);
//! let instance = Instance::new(
//!     vec![Course::new("MATH", 2), Course::new("CHEM", 1).with_feature("lab")],
//!     vec![Room::new("A101", 30), Room::new("LAB1", 20).with_feature("lab")],
//!     vec![
//!         Teacher::new("ALICE").with_availability(slots.clone()).qualified_for("MATH"),
//!         Teacher::new("BOB").with_availability(slots.clone()).qualified_for("CHEM"),
//!     ],
//!     slots,
//! )?;
//!
//! let config = OptimizerConfig::default().with_population_size(20).with_seed(42);
//! let result = HybridOptimizer::new(&instance, config)?.run();
//! assert_eq!(result.evaluation.hard_violations, 0);
//! # Ok::<(), u_timetable::OptimizerError>(())
//! ```
//!
//! # Logging
//!
//! Progress is emitted through `tracing`; install a subscriber in the
//! application to see it.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Glover & Laguna (1997), "Tabu Search"

pub mod config;
pub mod error;
pub mod evaluation;
pub mod ga;
pub mod hybrid;
pub mod models;
pub mod report;
pub mod tabu;
pub mod validation;

pub use config::OptimizerConfig;
pub use error::{OptimizerError, Result};
pub use evaluation::{Evaluation, Evaluator};
pub use hybrid::{CancellationToken, HybridOptimizer, OptimizationResult, StopReason};
pub use models::{Instance, Schedule};
pub use report::TimetableReport;
