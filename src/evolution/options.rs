//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds the parameters of the evolutionary
//! search: population size, number of generations and restarts, operator
//! rates, logging level and the parallelism threshold.
//!
//! ## Example
//!
//! ```rust
//! use blotto::evolution::options::{EvolutionOptions, LogLevel};
//!
//! // Create a new EvolutionOptions instance with custom parameters
//! let custom_options = EvolutionOptions::new(200, LogLevel::Minimal, 300);
//!
//! // Or tune individual operators through the builder
//! let tuned = EvolutionOptions::builder()
//!     .population_size(500)
//!     .mutation_rate(0.2)
//!     .build();
//! assert_eq!(tuned.get_population_size(), 500);
//! assert!(tuned.validate().is_ok());
//! ```
//!
//! ## Defaults
//!
//! | parameter | default |
//! |---|---|
//! | population size | 1500 |
//! | generations | 400 |
//! | restarts | 1000 |
//! | crossover rate | 0.95 |
//! | min change | 1.0 |
//! | mutation rate | 0.3 |
//! | max mutation strength | 40 |
//! | elite twin mutation strength | 5 |

use crate::error::{BlottoError, Result};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Per-generation summaries at `info`, plus restart progress.
    Verbose,
    /// Restart progress and champions only.
    Minimal,
    /// Nothing above `trace`.
    None,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOptions {
    num_generations: usize,
    log_level: LogLevel,
    population_size: usize,
    num_restarts: usize,
    /// Fraction of the population produced by recombination each generation.
    crossover_rate: f64,
    /// Multiple of the average fitness a parent's running sum must reach.
    min_change: f64,
    /// Probability that an offspring is mutated.
    mutation_rate: f64,
    /// Upper bound (inclusive) of a random mutation's strength.
    mutation_num: u32,
    /// Strength of the mutation applied to elites that would duplicate an offspring.
    mutation_min_num: u32,
    /// Minimum number of restarts to run in parallel
    parallel_threshold: usize,
}

impl EvolutionOptions {
    pub fn new(num_generations: usize, log_level: LogLevel, population_size: usize) -> Self {
        Self {
            num_generations,
            log_level,
            population_size,
            ..Self::default()
        }
    }

    pub fn get_num_generations(&self) -> usize {
        self.num_generations
    }

    pub fn get_log_level(&self) -> &LogLevel {
        &self.log_level
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_num_restarts(&self) -> usize {
        self.num_restarts
    }

    pub fn get_crossover_rate(&self) -> f64 {
        self.crossover_rate
    }

    pub fn get_min_change(&self) -> f64 {
        self.min_change
    }

    pub fn get_mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    pub fn get_mutation_num(&self) -> u32 {
        self.mutation_num
    }

    pub fn get_mutation_min_num(&self) -> u32 {
        self.mutation_min_num
    }

    /// Returns the minimum number of restarts to run in parallel.
    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    /// Number of recombination draws per generation: `floor(N * crossover_rate)`.
    pub fn crossover_quota(&self) -> usize {
        (self.population_size as f64 * self.crossover_rate).floor() as usize
    }

    pub fn set_num_generations(&mut self, num_generations: usize) {
        self.num_generations = num_generations;
    }

    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = population_size;
    }

    pub fn set_num_restarts(&mut self, num_restarts: usize) {
        self.num_restarts = num_restarts;
    }

    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Checks that the options describe a runnable search.
    ///
    /// # Errors
    ///
    /// Returns `BlottoError::Configuration` if the population is empty or a
    /// rate is not a probability.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(BlottoError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }

        for (name, rate) in [
            ("Crossover rate", self.crossover_rate),
            ("Mutation rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(BlottoError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, rate
                )));
            }
        }

        if !self.min_change.is_finite() || self.min_change < 0.0 {
            return Err(BlottoError::Configuration(format!(
                "Min change must be a non-negative number, got {}",
                self.min_change
            )));
        }

        Ok(())
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            num_generations: 400,
            log_level: LogLevel::None,
            population_size: 1500,
            num_restarts: 1000,
            crossover_rate: 0.95,
            min_change: 1.0,
            mutation_rate: 0.3,
            mutation_num: 40,
            mutation_min_num: 5,
            parallel_threshold: 1000,
        }
    }
}

/// Builder for `EvolutionOptions`.
///
/// Unset fields take the values of `EvolutionOptions::default()`.
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    num_generations: Option<usize>,
    log_level: Option<LogLevel>,
    population_size: Option<usize>,
    num_restarts: Option<usize>,
    crossover_rate: Option<f64>,
    min_change: Option<f64>,
    mutation_rate: Option<f64>,
    mutation_num: Option<u32>,
    mutation_min_num: Option<u32>,
    parallel_threshold: Option<usize>,
}

impl EvolutionOptionsBuilder {
    pub fn num_generations(mut self, value: usize) -> Self {
        self.num_generations = Some(value);
        self
    }

    pub fn log_level(mut self, value: LogLevel) -> Self {
        self.log_level = Some(value);
        self
    }

    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    pub fn num_restarts(mut self, value: usize) -> Self {
        self.num_restarts = Some(value);
        self
    }

    pub fn crossover_rate(mut self, value: f64) -> Self {
        self.crossover_rate = Some(value);
        self
    }

    pub fn min_change(mut self, value: f64) -> Self {
        self.min_change = Some(value);
        self
    }

    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.mutation_rate = Some(value);
        self
    }

    pub fn mutation_num(mut self, value: u32) -> Self {
        self.mutation_num = Some(value);
        self
    }

    pub fn mutation_min_num(mut self, value: u32) -> Self {
        self.mutation_min_num = Some(value);
        self
    }

    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    /// Builds the `EvolutionOptions` instance.
    pub fn build(self) -> EvolutionOptions {
        let defaults = EvolutionOptions::default();
        EvolutionOptions {
            num_generations: self.num_generations.unwrap_or(defaults.num_generations),
            log_level: self.log_level.unwrap_or(defaults.log_level),
            population_size: self.population_size.unwrap_or(defaults.population_size),
            num_restarts: self.num_restarts.unwrap_or(defaults.num_restarts),
            crossover_rate: self.crossover_rate.unwrap_or(defaults.crossover_rate),
            min_change: self.min_change.unwrap_or(defaults.min_change),
            mutation_rate: self.mutation_rate.unwrap_or(defaults.mutation_rate),
            mutation_num: self.mutation_num.unwrap_or(defaults.mutation_num),
            mutation_min_num: self.mutation_min_num.unwrap_or(defaults.mutation_min_num),
            parallel_threshold: self
                .parallel_threshold
                .unwrap_or(defaults.parallel_threshold),
        }
    }
}
