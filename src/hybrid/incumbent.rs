//! The best schedule seen so far.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::evaluation::Evaluation;
use crate::models::Schedule;

/// Global best schedule, installed only by strictly fitter candidates.
///
/// The fitness is mirrored in an atomic so readers can check the
/// aspiration level without taking the lock.
#[derive(Debug)]
pub struct GlobalBest {
    /// `f64::to_bits` of the best fitness; 0 while empty.
    fitness: AtomicU64,
    best: Mutex<Option<(Schedule, Evaluation)>>,
}

impl Default for GlobalBest {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalBest {
    /// Creates an empty incumbent.
    pub fn new() -> Self {
        Self {
            fitness: AtomicU64::new(0f64.to_bits()),
            best: Mutex::new(None),
        }
    }

    /// Fitness of the incumbent, or 0 when nothing is installed.
    #[inline]
    pub fn fitness(&self) -> f64 {
        f64::from_bits(self.fitness.load(Ordering::Relaxed))
    }

    /// A copy of the incumbent.
    pub fn snapshot(&self) -> Option<(Schedule, Evaluation)> {
        self.best
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Evaluation of the incumbent.
    pub fn evaluation(&self) -> Option<Evaluation> {
        self.best
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(_, e)| *e)
    }

    /// Installs the candidate if it is better than the incumbent.
    /// Returns `true` if it was installed.
    pub fn try_install(&self, schedule: &Schedule, evaluation: &Evaluation) -> bool {
        if evaluation.fitness < self.fitness() {
            return false;
        }

        let mut guard = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        // Compare against the locked value, not the hint read above.
        if let Some((_, current)) = guard.as_ref() {
            if !evaluation.is_better_than(current) {
                return false;
            }
        }

        *guard = Some((schedule.clone(), *evaluation));
        self.fitness
            .store(evaluation.fitness.to_bits(), Ordering::Relaxed);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::{ConstraintCosts, Evaluator};
    use crate::models::TimetableEntry;
    use std::sync::Arc;

    fn eval(fitness: f64, hard: u64) -> Evaluation {
        let mut e = Evaluator::default().score(ConstraintCosts::default());
        e.fitness = fitness;
        e.hard_violations = hard;
        e
    }

    fn schedule(slot: usize) -> Schedule {
        Schedule::from_entries(vec![TimetableEntry::new(0, 0, 0, slot)])
    }

    #[test]
    fn test_empty() {
        let best = GlobalBest::new();
        assert_eq!(best.fitness(), 0.0);
        assert!(best.snapshot().is_none());
        assert!(best.evaluation().is_none());
    }

    #[test]
    fn test_installs_only_strictly_better() {
        let best = GlobalBest::new();
        assert!(best.try_install(&schedule(0), &eval(0.5, 1)));
        assert!(!best.try_install(&schedule(1), &eval(0.4, 0)));
        assert!(!best.try_install(&schedule(2), &eval(0.5, 1)));
        assert!(best.try_install(&schedule(3), &eval(0.5, 0)));
        assert!(best.try_install(&schedule(4), &eval(0.9, 0)));

        let (s, e) = best.snapshot().unwrap();
        assert_eq!(s, schedule(4));
        assert_eq!(e.fitness, 0.9);
        assert_eq!(best.fitness(), 0.9);
    }

    #[test]
    fn test_concurrent_installs_keep_maximum() {
        let best = Arc::new(GlobalBest::new());
        let handles: Vec<_> = (1..=8)
            .map(|i| {
                let best = Arc::clone(&best);
                std::thread::spawn(move || {
                    best.try_install(&schedule(i), &eval(i as f64 / 10.0, 0));
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(best.fitness(), 0.8);
        assert_eq!(best.snapshot().unwrap().0, schedule(8));
    }
}
