//! Population, selection and generational replacement.

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::construction::construct;
use super::operators::GeneticOperators;
use crate::evaluation::{Evaluation, Evaluator};
use crate::models::{Instance, Schedule};

/// A schedule with its score.
#[derive(Debug, Clone)]
pub struct Individual {
    /// The candidate timetable.
    pub schedule: Schedule,
    /// Its evaluation.
    pub evaluation: Evaluation,
}

/// Summary of one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Fitness of the best individual.
    pub best_fitness: f64,
    /// Mean fitness.
    pub average_fitness: f64,
    /// Fitness of the worst individual.
    pub worst_fitness: f64,
    /// Mean fraction of differing entries over all individual pairs.
    pub diversity: f64,
}

/// Cumulative operator counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GaCounters {
    /// Parent pairs recombined.
    pub crossovers: usize,
    /// Entries changed by mutation.
    pub mutations: usize,
    /// Children whose crossover output needed repair.
    pub repairs: usize,
}

/// Individuals sorted best first.
///
/// Ordering is by fitness descending, then hard violations ascending; the
/// sort is stable so equal individuals keep their creation order.
#[derive(Debug, Clone, Default)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Wraps individuals and sorts them.
    pub fn from_individuals(mut individuals: Vec<Individual>) -> Self {
        sort_best_first(&mut individuals);
        Self { individuals }
    }

    /// Individuals, best first.
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// The best individual.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    /// Overwrites individuals by position, then restores the ordering.
    /// Positions refer to the ordering before the call.
    pub fn replace<I>(&mut self, replacements: I)
    where
        I: IntoIterator<Item = (usize, Individual)>,
    {
        for (index, individual) in replacements {
            self.individuals[index] = individual;
        }
        sort_best_first(&mut self.individuals);
    }

    /// Tournament selection: samples `size` positions with replacement and
    /// returns the best of them. Ties go to the lower position.
    pub fn tournament<R: Rng>(&self, size: usize, rng: &mut R) -> usize {
        let n = self.individuals.len();
        (0..size.max(1))
            .map(|_| rng.random_range(0..n))
            .min()
            .unwrap_or(0)
    }

    /// Best, average and worst fitness plus diversity.
    pub fn stats(&self) -> GenerationStats {
        let n = self.individuals.len();
        if n == 0 {
            return GenerationStats::default();
        }
        let sum: f64 = self.individuals.iter().map(|i| i.evaluation.fitness).sum();
        GenerationStats {
            best_fitness: self.individuals[0].evaluation.fitness,
            average_fitness: sum / n as f64,
            worst_fitness: self.individuals[n - 1].evaluation.fitness,
            diversity: self.diversity(),
        }
    }

    /// Mean pairwise fraction of differing entries, in [0, 1].
    pub fn diversity(&self) -> f64 {
        let n = self.individuals.len();
        let len = self.individuals.first().map_or(0, |i| i.schedule.len());
        if n < 2 || len == 0 {
            return 0.0;
        }
        let mut total = 0usize;
        for (i, a) in self.individuals.iter().enumerate() {
            for b in &self.individuals[i + 1..] {
                total += a.schedule.distance(&b.schedule);
            }
        }
        let pairs = n * (n - 1) / 2;
        total as f64 / (pairs * len) as f64
    }

    /// Whether every individual satisfies the structural invariant.
    pub fn is_structurally_valid(&self, instance: &Instance) -> bool {
        self.individuals
            .iter()
            .all(|i| i.schedule.satisfies_structure(instance))
    }
}

fn sort_best_first(individuals: &mut [Individual]) {
    individuals.sort_by(|a, b| {
        b.evaluation
            .fitness
            .total_cmp(&a.evaluation.fitness)
            .then(a.evaluation.hard_violations.cmp(&b.evaluation.hard_violations))
    });
}

/// The generational GA over one instance.
#[derive(Debug, Clone)]
pub struct GaEngine<'a> {
    instance: &'a Instance,
    evaluator: Evaluator,
    operators: GeneticOperators,
    population_size: usize,
    elite_count: usize,
    tournament_size: usize,
    parallel: bool,
}

impl<'a> GaEngine<'a> {
    /// Creates an engine with default operators, 50 individuals, 2 elites,
    /// tournaments of 3 and parallel evaluation.
    pub fn new(instance: &'a Instance, evaluator: Evaluator) -> Self {
        Self {
            instance,
            evaluator,
            operators: GeneticOperators::default(),
            population_size: 50,
            elite_count: 2,
            tournament_size: 3,
            parallel: true,
        }
    }

    /// Sets the operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Sets population size and elite count.
    pub fn with_population(mut self, size: usize, elite_count: usize) -> Self {
        self.population_size = size;
        self.elite_count = elite_count.min(size);
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Enables or disables rayon evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Scores schedules, in parallel when enabled. Output order matches
    /// input order.
    pub fn evaluate_all(&self, schedules: Vec<Schedule>) -> Vec<Individual> {
        let score = |schedule: Schedule| {
            let evaluation = self.evaluator.evaluate(&schedule, self.instance);
            Individual {
                schedule,
                evaluation,
            }
        };
        if self.parallel {
            schedules.into_par_iter().map(score).collect()
        } else {
            schedules.into_iter().map(score).collect()
        }
    }

    /// Builds and scores the initial population.
    pub fn initial_population<R: Rng>(&self, rng: &mut R) -> Population {
        let schedules = (0..self.population_size)
            .map(|_| construct(self.instance, rng))
            .collect();
        Population::from_individuals(self.evaluate_all(schedules))
    }

    /// Elites followed by selected, recombined and mutated offspring.
    pub fn next_generation<R: Rng>(
        &self,
        population: &Population,
        rng: &mut R,
        counters: &mut GaCounters,
    ) -> Population {
        let elites = self.elite_count.min(population.len());
        let needed = self.population_size.saturating_sub(elites);
        let mut offspring = Vec::with_capacity(needed + 1);

        while offspring.len() < needed && !population.is_empty() {
            let a = &population.individuals[population.tournament(self.tournament_size, rng)];
            let b = &population.individuals[population.tournament(self.tournament_size, rng)];
            let (first, second) =
                match self
                    .operators
                    .recombine(&a.schedule, &b.schedule, self.instance, rng)
                {
                    Some(children) => {
                        counters.crossovers += 1;
                        counters.repairs += children.repairs;
                        (children.first, children.second)
                    }
                    None => (a.schedule.clone(), b.schedule.clone()),
                };

            for mut child in [first, second] {
                if offspring.len() == needed {
                    break;
                }
                counters.mutations += self.operators.mutate(&mut child, self.instance, rng);
                offspring.push(child);
            }
        }

        let mut individuals: Vec<Individual> = population.individuals[..elites].to_vec();
        individuals.extend(self.evaluate_all(offspring));
        Population::from_individuals(individuals)
    }
}
