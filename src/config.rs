//! Run configuration.
//!
//! [`OptimizerConfig`] gathers every knob of a hybrid run. Defaults follow
//! common timetabling practice; partial JSON documents deserialize with
//! the remaining fields at their defaults.
//!
//! ```
//! use u_timetable::config::OptimizerConfig;
//!
//! let config = OptimizerConfig::default()
//!     .with_population_size(30)
//!     .with_generations(200)
//!     .with_seed(7);
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};
use crate::evaluation::{Evaluator, SoftWeights};
use crate::ga::CrossoverKind;
use crate::tabu::TabuSettings;

/// Configuration of a hybrid GA + tabu search run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Maximum number of generations.
    pub generations: usize,
    /// Per-entry mutation probability.
    pub mutation_rate: f64,
    /// Probability that a parent pair is recombined.
    pub crossover_rate: f64,
    /// Individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Tournament size for parent selection.
    pub tournament_size: usize,
    /// Crossover granularity.
    pub crossover_kind: CrossoverKind,

    /// Tabu list length.
    pub tabu_tenure: usize,
    /// Refine elites every this many generations.
    pub tabu_interval_generations: usize,
    /// Move budget of one refinement.
    pub tabu_iterations: usize,
    /// Refinement stops after this many iterations without improvement.
    pub tabu_max_no_improve: usize,
    /// Number of top individuals refined; `None` means `max(elite_count, 1)`.
    pub tabu_elites: Option<usize>,

    /// Multiplier of the hard violation count in the fitness.
    pub hard_weight: f64,
    /// Multiplier of the soft penalty in the fitness.
    pub soft_weight: f64,
    /// Weights inside the soft penalty.
    pub soft_weights: SoftWeights,

    /// Seed of the run's generator; drawn from entropy when absent.
    pub random_seed: Option<u64>,
    /// Wall-clock budget, checked at generation boundaries.
    pub time_limit: Option<Duration>,
    /// Stop when the best fitness has not improved for this many generations.
    pub stagnation_generations: Option<usize>,
    /// Stop once a feasible schedule with at most this soft penalty is found.
    pub target_soft_penalty: f64,
    /// Evaluate individuals and refine elites on the rayon pool.
    pub parallel: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elite_count: 2,
            tournament_size: 3,
            crossover_kind: CrossoverKind::default(),
            tabu_tenure: 10,
            tabu_interval_generations: 10,
            tabu_iterations: 100,
            tabu_max_no_improve: 25,
            tabu_elites: None,
            hard_weight: 1000.0,
            soft_weight: 1.0,
            soft_weights: SoftWeights::default(),
            random_seed: None,
            time_limit: None,
            stagnation_generations: None,
            target_soft_penalty: 0.0,
            parallel: true,
        }
    }
}

impl OptimizerConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation limit.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Sets the per-entry mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the elite count.
    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the crossover kind.
    pub fn with_crossover_kind(mut self, kind: CrossoverKind) -> Self {
        self.crossover_kind = kind;
        self
    }

    /// Sets the tabu tenure.
    pub fn with_tabu_tenure(mut self, tenure: usize) -> Self {
        self.tabu_tenure = tenure;
        self
    }

    /// Sets how often elites are refined.
    pub fn with_tabu_interval(mut self, generations: usize) -> Self {
        self.tabu_interval_generations = generations;
        self
    }

    /// Sets the refinement budget.
    pub fn with_tabu_iterations(mut self, iterations: usize, max_no_improve: usize) -> Self {
        self.tabu_iterations = iterations;
        self.tabu_max_no_improve = max_no_improve;
        self
    }

    /// Sets how many top individuals are refined.
    pub fn with_tabu_elites(mut self, count: usize) -> Self {
        self.tabu_elites = Some(count);
        self
    }

    /// Sets the fitness weights.
    pub fn with_weights(mut self, hard_weight: f64, soft_weight: f64) -> Self {
        self.hard_weight = hard_weight;
        self.soft_weight = soft_weight;
        self
    }

    /// Sets the per-kind soft weights.
    pub fn with_soft_weights(mut self, weights: SoftWeights) -> Self {
        self.soft_weights = weights;
        self
    }

    /// Fixes the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets a wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Enables stagnation stopping.
    pub fn with_stagnation(mut self, generations: usize) -> Self {
        self.stagnation_generations = Some(generations);
        self
    }

    /// Sets the soft penalty at which a feasible schedule ends the run.
    pub fn with_target_soft_penalty(mut self, target: f64) -> Self {
        self.target_soft_penalty = target;
        self
    }

    /// Enables or disables rayon fan-out.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Number of individuals handed to the tabu refiner.
    pub fn effective_tabu_elites(&self) -> usize {
        self.tabu_elites
            .unwrap_or_else(|| self.elite_count.max(1))
            .min(self.population_size)
    }

    /// The evaluator described by the weights.
    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.hard_weight, self.soft_weight).with_soft_weights(self.soft_weights)
    }

    /// The tabu refiner settings.
    pub fn tabu_settings(&self) -> TabuSettings {
        TabuSettings {
            tenure: self.tabu_tenure,
            max_iterations: self.tabu_iterations,
            max_no_improve: self.tabu_max_no_improve,
        }
    }

    /// Checks every parameter against its range.
    ///
    /// # Errors
    /// [`OptimizerError::InvalidConfiguration`] naming the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        positive("population_size", self.population_size)?;
        positive("generations", self.generations)?;
        positive("tournament_size", self.tournament_size)?;
        positive("tabu_tenure", self.tabu_tenure)?;
        positive("tabu_interval_generations", self.tabu_interval_generations)?;
        positive("tabu_iterations", self.tabu_iterations)?;
        positive("tabu_max_no_improve", self.tabu_max_no_improve)?;
        probability("mutation_rate", self.mutation_rate)?;
        probability("crossover_rate", self.crossover_rate)?;
        non_negative("hard_weight", self.hard_weight)?;
        non_negative("soft_weight", self.soft_weight)?;
        non_negative("soft_weights.teacher_gap", self.soft_weights.teacher_gap)?;
        non_negative("soft_weights.room_change", self.soft_weights.room_change)?;
        non_negative("soft_weights.time_preference", self.soft_weights.time_preference)?;
        non_negative("target_soft_penalty", self.target_soft_penalty)?;

        if self.elite_count > self.population_size {
            return Err(OptimizerError::config(
                "elite_count",
                format!(
                    "{} exceeds population_size {}",
                    self.elite_count, self.population_size
                ),
            ));
        }
        if let Some(k) = self.tabu_elites {
            positive("tabu_elites", k)?;
        }
        if let Some(g) = self.stagnation_generations {
            positive("stagnation_generations", g)?;
        }
        if self.time_limit.is_some_and(|d| d.is_zero()) {
            return Err(OptimizerError::config("time_limit", "must be positive"));
        }
        Ok(())
    }
}

fn positive(parameter: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(OptimizerError::config(parameter, "must be greater than 0"));
    }
    Ok(())
}

fn probability(parameter: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(OptimizerError::config(
            parameter,
            format!("{value} is not within [0, 1]"),
        ));
    }
    Ok(())
}

fn non_negative(parameter: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(OptimizerError::config(
            parameter,
            format!("{value} is not a finite non-negative number"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_parameter(config: &OptimizerConfig) -> &'static str {
        match config.validate() {
            Err(OptimizerError::InvalidConfiguration { parameter, .. }) => parameter,
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let c = OptimizerConfig::default();
        assert_eq!(c.population_size, 50);
        assert_eq!(c.generations, 100);
        assert_eq!(c.elite_count, 2);
        assert_eq!(c.tabu_tenure, 10);
        assert_eq!(c.tabu_interval_generations, 10);
        assert_eq!(c.hard_weight, 1000.0);
        assert_eq!(c.soft_weight, 1.0);
        assert_eq!(c.crossover_kind, CrossoverKind::ByCourse);
        assert!(c.random_seed.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let c = OptimizerConfig::default().with_population_size(0);
        assert_eq!(bad_parameter(&c), "population_size");

        let c = OptimizerConfig::default().with_mutation_rate(1.5);
        assert_eq!(bad_parameter(&c), "mutation_rate");

        let c = OptimizerConfig::default().with_crossover_rate(f64::NAN);
        assert_eq!(bad_parameter(&c), "crossover_rate");

        let c = OptimizerConfig::default().with_weights(-1.0, 1.0);
        assert_eq!(bad_parameter(&c), "hard_weight");

        let c = OptimizerConfig::default().with_tabu_tenure(0);
        assert_eq!(bad_parameter(&c), "tabu_tenure");

        let c = OptimizerConfig::default()
            .with_population_size(4)
            .with_elite_count(5);
        assert_eq!(bad_parameter(&c), "elite_count");

        let c = OptimizerConfig::default().with_time_limit(Duration::ZERO);
        assert_eq!(bad_parameter(&c), "time_limit");
    }

    #[test]
    fn test_boundary_values_accepted() {
        let c = OptimizerConfig::default()
            .with_mutation_rate(0.0)
            .with_crossover_rate(1.0)
            .with_elite_count(0)
            .with_weights(0.0, 0.0);
        assert!(c.validate().is_ok());

        let c = OptimizerConfig::default()
            .with_population_size(3)
            .with_elite_count(3);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_effective_tabu_elites() {
        let c = OptimizerConfig::default().with_elite_count(0);
        assert_eq!(c.effective_tabu_elites(), 1);
        let c = OptimizerConfig::default().with_elite_count(4);
        assert_eq!(c.effective_tabu_elites(), 4);
        let c = OptimizerConfig::default()
            .with_population_size(3)
            .with_tabu_elites(10);
        assert_eq!(c.effective_tabu_elites(), 3);
    }

    #[test]
    fn test_partial_json() {
        let c: OptimizerConfig =
            serde_json::from_str(r#"{"population_size": 12, "random_seed": 5}"#).unwrap();
        assert_eq!(c.population_size, 12);
        assert_eq!(c.random_seed, Some(5));
        assert_eq!(c.generations, 100);
        assert_eq!(c.crossover_kind, CrossoverKind::ByCourse);
    }

    #[test]
    fn test_derived_components() {
        let c = OptimizerConfig::default()
            .with_weights(10.0, 2.0)
            .with_tabu_iterations(40, 5);
        let ev = c.evaluator();
        assert_eq!(ev.hard_weight, 10.0);
        assert_eq!(ev.soft_weight, 2.0);
        let s = c.tabu_settings();
        assert_eq!(s.max_iterations, 40);
        assert_eq!(s.max_no_improve, 5);
        assert_eq!(s.tenure, 10);
    }
}
