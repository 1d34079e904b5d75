//! The hybrid GA + tabu search loop.
//!
//! # Algorithm
//!
//! 1. Validate the configuration and check `hours <= slots × rooms`.
//! 2. Seed one `SmallRng` and build the initial population (generation 0).
//! 3. Each generation: elitist replacement with tournament selection,
//!    crossover and mutation.
//! 4. Every `tabu_interval_generations`, refine the top individuals with
//!    tabu search; a refined schedule replaces its source only if it is
//!    strictly fitter.
//! 5. Install the best of the generation into the [`GlobalBest`] and
//!    notify the observer.
//! 6. Stop on the generation limit, stagnation, the soft-penalty target,
//!    cancellation or the time limit.

use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{CancellationToken, GenerationProgress, GlobalBest, NoopObserver, ProgressObserver};
use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::evaluation::{Evaluation, Evaluator};
use crate::ga::{GaCounters, GaEngine, GeneticOperators, Individual, Population};
use crate::models::{Instance, Schedule};
use crate::tabu::{RefineOutcome, TabuRefiner};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The configured number of generations ran.
    GenerationLimit,
    /// The best fitness stopped improving.
    Stagnation,
    /// A feasible schedule within the soft-penalty target was found.
    TargetReached,
    /// The caller cancelled the run.
    Cancelled,
    /// The wall-clock budget ran out.
    TimeLimit,
}

/// Cumulative counters of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    /// Genetic operator counters.
    pub ga: GaCounters,
    /// Tabu refinements performed.
    pub refinements: usize,
    /// Refinements that replaced their source individual.
    pub refinement_improvements: usize,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Best schedule found.
    pub schedule: Schedule,
    /// Its evaluation.
    pub evaluation: Evaluation,
    /// Progress after every generation, generation 0 first.
    pub trajectory: Vec<GenerationProgress>,
    /// Why the run ended.
    pub stop_reason: StopReason,
    /// Generations evolved after the initial population.
    pub generations_run: usize,
    /// Seed the run used.
    pub seed: u64,
    /// Operator and refinement counters.
    pub counters: RunCounters,
}

impl OptimizationResult {
    /// Whether the best schedule violates no hard constraint.
    pub fn is_feasible(&self) -> bool {
        self.evaluation.is_feasible()
    }
}

/// Hybrid genetic algorithm with periodic tabu search refinement.
///
/// # Example
///
/// ```
/// use u_timetable::config::OptimizerConfig;
/// use u_timetable::hybrid::HybridOptimizer;
/// use u_timetable::models::{Course, Instance, Room, Teacher, TimeSlot};
///
/// let slots = TimeSlot::grid(1, 2);
/// let instance = Instance::new(
///     vec![Course::new("MATH", 1), Course::new("PHYS", 1)],
///     vec![Room::new("R1", 30)],
///     vec![Teacher::new("T1")
///         .with_availability(slots.clone())
///         .qualified_for("MATH")
///         .qualified_for("PHYS")],
///     slots,
/// )
/// .unwrap();
///
/// let config = OptimizerConfig::default()
///     .with_population_size(10)
///     .with_generations(20)
///     .with_seed(1);
/// let result = HybridOptimizer::new(&instance, config).unwrap().run();
/// assert!(result.is_feasible());
/// ```
#[derive(Debug, Clone)]
pub struct HybridOptimizer<'a> {
    instance: &'a Instance,
    config: OptimizerConfig,
}

impl<'a> HybridOptimizer<'a> {
    /// Prepares a run.
    ///
    /// # Errors
    /// - [`OptimizerError::InvalidConfiguration`](crate::error::OptimizerError::InvalidConfiguration)
    ///   when a parameter is out of range
    /// - [`OptimizerError::InfeasibleInstance`](crate::error::OptimizerError::InfeasibleInstance)
    ///   when more course-hours are required than slot-room cells exist
    pub fn new(instance: &'a Instance, config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        instance.check_capacity()?;
        Ok(Self { instance, config })
    }

    /// The run configuration.
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Runs to completion without observation.
    pub fn run(&self) -> OptimizationResult {
        self.run_with(&CancellationToken::new(), &mut NoopObserver)
    }

    /// Runs, polling `cancel` and notifying `observer` at every generation
    /// boundary. Cancellation returns the best schedule found so far.
    pub fn run_with(
        &self,
        cancel: &CancellationToken,
        observer: &mut dyn ProgressObserver,
    ) -> OptimizationResult {
        let start = Instant::now();
        let config = &self.config;
        let instance = self.instance;
        let seed = config
            .random_seed
            .unwrap_or_else(|| rand::rng().random::<u64>());
        let mut rng = SmallRng::seed_from_u64(seed);

        let evaluator = config.evaluator();
        let engine = GaEngine::new(instance, evaluator)
            .with_operators(GeneticOperators {
                crossover_kind: config.crossover_kind,
                crossover_rate: config.crossover_rate,
                mutation_rate: config.mutation_rate,
            })
            .with_population(config.population_size, config.elite_count)
            .with_tournament_size(config.tournament_size)
            .with_parallel(config.parallel);
        let refiner = TabuRefiner::new(instance, evaluator, config.tabu_settings());

        info!(
            seed,
            lessons = instance.total_required_hours(),
            courses = instance.courses().len(),
            rooms = instance.rooms().len(),
            teachers = instance.teachers().len(),
            slots = instance.num_slots(),
            population = config.population_size,
            generations = config.generations,
            "starting hybrid optimization"
        );

        let global = GlobalBest::new();
        let mut counters = RunCounters::default();
        let mut trajectory = Vec::with_capacity(config.generations + 1);

        let mut population = engine.initial_population(&mut rng);
        install_best(&global, &population);
        report(&global, &population, 0, counters.ga, &mut trajectory, observer);

        let mut generation = 0;
        let mut stagnant = 0;
        let mut last_best = global.fitness();

        let stop_reason = loop {
            if global
                .evaluation()
                .is_some_and(|e| e.is_feasible() && e.soft_penalty <= config.target_soft_penalty)
            {
                break StopReason::TargetReached;
            }
            if generation >= config.generations {
                break StopReason::GenerationLimit;
            }
            if config.stagnation_generations.is_some_and(|n| stagnant >= n) {
                break StopReason::Stagnation;
            }
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                break StopReason::TimeLimit;
            }

            generation += 1;
            population = engine.next_generation(&population, &mut rng, &mut counters.ga);

            if generation % config.tabu_interval_generations == 0 {
                let outcomes =
                    self.refine_elites(&refiner, &mut population, &global, &mut counters);
                observer.on_refinement(generation, &outcomes);
            }
            debug_assert!(population.is_structurally_valid(instance));

            install_best(&global, &population);
            report(
                &global,
                &population,
                generation,
                counters.ga,
                &mut trajectory,
                observer,
            );

            if global.fitness() > last_best {
                last_best = global.fitness();
                stagnant = 0;
            } else {
                stagnant += 1;
            }
        };

        let (schedule, evaluation) = global
            .snapshot()
            .unwrap_or_else(|| empty_result(instance, &evaluator));

        info!(
            ?stop_reason,
            generations = generation,
            best_fitness = evaluation.fitness,
            hard = evaluation.hard_violations,
            soft = evaluation.soft_penalty,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "hybrid optimization finished"
        );
        if !evaluation.is_feasible() {
            warn!(
                hard = evaluation.hard_violations,
                "best schedule still violates hard constraints"
            );
        }

        OptimizationResult {
            schedule,
            evaluation,
            trajectory,
            stop_reason,
            generations_run: generation,
            seed,
            counters,
        }
    }

    /// Refines the top individuals and swaps in strict improvements.
    fn refine_elites(
        &self,
        refiner: &TabuRefiner<'_>,
        population: &mut Population,
        global: &GlobalBest,
        counters: &mut RunCounters,
    ) -> Vec<RefineOutcome> {
        let k = self.config.effective_tabu_elites().min(population.len());
        // The aspiration level must already cover this generation's best.
        install_best(global, population);
        let aspiration = global.fitness();
        let elites = &population.individuals()[..k];
        let outcomes: Vec<RefineOutcome> = if self.config.parallel {
            elites
                .par_iter()
                .map(|ind| refiner.refine(&ind.schedule, aspiration))
                .collect()
        } else {
            elites
                .iter()
                .map(|ind| refiner.refine(&ind.schedule, aspiration))
                .collect()
        };

        counters.refinements += outcomes.len();
        let mut replacements = Vec::new();
        for (index, outcome) in outcomes.iter().enumerate() {
            global.try_install(&outcome.schedule, &outcome.evaluation);
            if outcome.improved() {
                replacements.push((
                    index,
                    Individual {
                        schedule: outcome.schedule.clone(),
                        evaluation: outcome.evaluation,
                    },
                ));
            }
        }
        counters.refinement_improvements += replacements.len();
        debug!(
            refined = outcomes.len(),
            improved = replacements.len(),
            "tabu refinement of elites"
        );
        population.replace(replacements);
        outcomes
    }
}

fn install_best(global: &GlobalBest, population: &Population) {
    if let Some(best) = population.best() {
        global.try_install(&best.schedule, &best.evaluation);
    }
}

fn report(
    global: &GlobalBest,
    population: &Population,
    generation: usize,
    counters: GaCounters,
    trajectory: &mut Vec<GenerationProgress>,
    observer: &mut dyn ProgressObserver,
) {
    let stats = population.stats();
    let best = global.evaluation();
    let progress = GenerationProgress {
        generation,
        best_fitness: global.fitness(),
        best_hard_violations: best.map_or(0, |e| e.hard_violations),
        best_soft_penalty: best.map_or(0.0, |e| e.soft_penalty),
        stats,
        counters,
    };
    debug!(
        generation,
        best = progress.best_fitness,
        hard = progress.best_hard_violations,
        average = stats.average_fitness,
        diversity = stats.diversity,
        "generation"
    );
    observer.on_generation(&progress);
    trajectory.push(progress);
}

fn empty_result(instance: &Instance, evaluator: &Evaluator) -> (Schedule, Evaluation) {
    let schedule = Schedule::default();
    let evaluation = evaluator.evaluate(&schedule, instance);
    (schedule, evaluation)
}
