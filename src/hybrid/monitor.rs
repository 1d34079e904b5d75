//! Cancellation and progress reporting.
//!
//! The optimizer never performs I/O itself. Callers observe a run through
//! a [`ProgressObserver`] and stop it through a [`CancellationToken`];
//! both are consulted only at generation boundaries.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::ga::{GaCounters, GenerationStats};
use crate::tabu::RefineOutcome;

/// Cloneable stop flag shared between the caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the run to stop at the next generation boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Snapshot emitted after every generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationProgress {
    /// Generation number; 0 is the initial population.
    pub generation: usize,
    /// Fitness of the global best.
    pub best_fitness: f64,
    /// Hard violations of the global best.
    pub best_hard_violations: u64,
    /// Soft penalty of the global best.
    pub best_soft_penalty: f64,
    /// Population statistics of this generation.
    pub stats: GenerationStats,
    /// Cumulative operator counts up to this generation.
    pub counters: GaCounters,
}

/// Receives progress notifications from a running optimizer.
pub trait ProgressObserver {
    /// Called once per generation, including generation 0.
    fn on_generation(&mut self, progress: &GenerationProgress);

    /// Called after the elites of a generation were refined.
    fn on_refinement(&mut self, _generation: usize, _outcomes: &[RefineOutcome]) {}
}

impl<F> ProgressObserver for F
where
    F: FnMut(&GenerationProgress),
{
    fn on_generation(&mut self, progress: &GenerationProgress) {
        self(progress)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_generation(&mut self, _progress: &GenerationProgress) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shared_between_clones() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_closure_observer() {
        let mut seen = Vec::new();
        {
            let mut observer = |p: &GenerationProgress| seen.push(p.generation);
            let progress = GenerationProgress {
                generation: 3,
                best_fitness: 0.5,
                best_hard_violations: 0,
                best_soft_penalty: 1.0,
                stats: GenerationStats::default(),
                counters: GaCounters::default(),
            };
            observer.on_generation(&progress);
            observer.on_refinement(3, &[]);
        }
        assert_eq!(seen, vec![3]);
    }
}
