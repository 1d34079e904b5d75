//! Hybrid orchestration of the GA and tabu search.
//!
//! [`HybridOptimizer`] owns the generation loop. It keeps the global best
//! in a [`GlobalBest`], polls a [`CancellationToken`] and reports to a
//! [`ProgressObserver`] at every generation boundary.

mod incumbent;
mod monitor;
mod optimizer;

pub use incumbent::GlobalBest;
pub use monitor::{CancellationToken, GenerationProgress, NoopObserver, ProgressObserver};
pub use optimizer::{HybridOptimizer, OptimizationResult, RunCounters, StopReason};
