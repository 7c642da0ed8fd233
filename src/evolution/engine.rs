//! # EvolutionEngine
//!
//! Runs one population through successive generations. A generation is
//! built in three passes over a fresh buffer:
//!
//! 1. **Recombination**: `floor(N * crossover_rate)` roulette-wheel draws;
//!    every successful draw contributes one recombined child of the chosen
//!    parent. Failed draws contribute nothing.
//! 2. **Mutation**: each child is mutated with probability `mutation_rate`,
//!    with a strength drawn from `0..=mutation_num`.
//! 3. **Elitism**: the remaining slots are filled with copies of the previous
//!    generation's best members, in rank order. An elite whose unchanged
//!    twin is already in the buffer is mutated with `mutation_min_num`
//!    before it is inserted.
//!
//! The buffer then replaces the population, and the generation's best and
//! the run's best-ever individual are updated.

use tracing::{debug, info, trace};

use super::{
    challenge::Challenge,
    options::{EvolutionOptions, LogLevel},
};
use crate::{
    allocation::{Allocation, FRONTS},
    error::{BlottoError, Result},
    individual::Individual,
    population::Population,
    rng::RandomNumberGenerator,
};

/// Summary of one generation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// 1-based index of the generation just produced.
    pub generation: usize,
    pub best: Allocation,
    pub best_score: f64,
    pub best_ever: Allocation,
    pub best_ever_score: f64,
    pub average_score: f64,
    /// Number of offspring produced by recombination this generation.
    pub offspring: usize,
}

/// An individual in the buffer of the next generation, tagged with the slot
/// of the previous generation it was derived from.
struct Slot {
    individual: Individual,
    source: usize,
}

pub struct EvolutionEngine<C: Challenge> {
    options: EvolutionOptions,
    challenge: C,
    population: Population,
    generation: usize,
    best: Individual,
    best_ever: Individual,
}

impl<C: Challenge> EvolutionEngine<C> {
    /// Creates an engine with a random initial population.
    ///
    /// # Errors
    ///
    /// Returns `BlottoError::Configuration` if the options are invalid or the
    /// challenge scores allocations of a different width.
    pub fn new(options: EvolutionOptions, challenge: C, rng: &mut RandomNumberGenerator) -> Result<Self> {
        options.validate()?;
        if let Some(fronts) = challenge.fronts() {
            if fronts != FRONTS {
                return Err(BlottoError::Configuration(format!(
                    "Challenge scores {} fronts, allocations have {}",
                    fronts, FRONTS
                )));
            }
        }

        let population = Population::random(options.get_population_size(), &challenge, rng)?;
        let (best, best_ever) = Self::initial_bests(&population, &challenge);

        Ok(Self {
            options,
            challenge,
            population,
            generation: 0,
            best,
            best_ever,
        })
    }

    /// Discards the population and all best-so-far state and starts over
    /// from a new random population.
    pub fn restart(&mut self, rng: &mut RandomNumberGenerator) -> Result<()> {
        self.population =
            Population::random(self.options.get_population_size(), &self.challenge, rng)?;
        let (best, best_ever) = Self::initial_bests(&self.population, &self.challenge);
        self.best = best;
        self.best_ever = best_ever;
        self.generation = 0;
        trace!("Engine restarted");
        Ok(())
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    pub fn challenge(&self) -> &C {
        &self.challenge
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Number of generations evolved since construction or the last restart.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best individual of the current generation.
    pub fn best(&self) -> &Individual {
        &self.best
    }

    /// Best individual seen since construction or the last restart.
    pub fn best_ever(&self) -> &Individual {
        &self.best_ever
    }

    /// Produces the next generation.
    pub fn evolve(&mut self, rng: &mut RandomNumberGenerator) -> Result<GenerationReport> {
        let size = self.options.get_population_size();
        let mut next: Vec<Slot> = Vec::with_capacity(size);

        for _ in 0..self.options.crossover_quota() {
            if let Some(parent) = self
                .population
                .select_parent(self.options.get_min_change(), rng)
            {
                let child = self.population.members()[parent].recombine(&self.challenge, rng);
                next.push(Slot {
                    individual: child,
                    source: parent,
                });
            }
        }
        let offspring = next.len();

        for slot in next.iter_mut() {
            if rng.chance(self.options.get_mutation_rate()) {
                let strength = rng.up_to(self.options.get_mutation_num());
                slot.individual
                    .mutate(to_strength(strength), &self.challenge, rng);
            }
        }

        self.reproduce_elites(&mut next, rng);

        self.population =
            Population::from_members(next.into_iter().map(|slot| slot.individual).collect())?;
        self.best = self.population.best().rescored_copy(&self.challenge);
        if self.best.fitness() > self.best_ever.fitness() {
            self.best_ever = self.best.rescored_copy(&self.challenge);
        }
        self.generation += 1;

        let report = GenerationReport {
            generation: self.generation,
            best: *self.best.allocation(),
            best_score: self.best.fitness(),
            best_ever: *self.best_ever.allocation(),
            best_ever_score: self.best_ever.fitness(),
            average_score: self.population.average_fitness(),
            offspring,
        };
        self.log_report(&report);

        Ok(report)
    }

    /// Evolves until `generations` generations have been produced since
    /// construction or the last restart, returning one report per step.
    pub fn simulate(
        &mut self,
        generations: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<GenerationReport>> {
        let mut reports = Vec::with_capacity(generations.saturating_sub(self.generation));
        while self.generation < generations {
            reports.push(self.evolve(rng)?);
        }
        Ok(reports)
    }

    fn reproduce_elites(&self, next: &mut Vec<Slot>, rng: &mut RandomNumberGenerator) {
        let missing = self.options.get_population_size().saturating_sub(next.len());
        if missing == 0 {
            return;
        }

        let members = self.population.members();
        for source in self.population.ranking().into_iter().take(missing) {
            let elite = &members[source];
            let has_twin = next.iter().any(|slot| {
                slot.source == source && slot.individual.allocation() == elite.allocation()
            });

            let mut copy = elite.rescored_copy(&self.challenge);
            if has_twin {
                copy.mutate(
                    to_strength(self.options.get_mutation_min_num()),
                    &self.challenge,
                    rng,
                );
            }
            next.push(Slot {
                individual: copy,
                source,
            });
        }
    }

    fn initial_bests(population: &Population, challenge: &C) -> (Individual, Individual) {
        let best = population.best().rescored_copy(challenge);
        let mut best_ever = population.members()[0].rescored_copy(challenge);
        if best.fitness() > best_ever.fitness() {
            best_ever = best.rescored_copy(challenge);
        }
        (best, best_ever)
    }

    fn log_report(&self, report: &GenerationReport) {
        match self.options.get_log_level() {
            LogLevel::Verbose => info!(
                generation = report.generation,
                best = %report.best,
                best_score = report.best_score,
                best_ever = %report.best_ever,
                best_ever_score = report.best_ever_score,
                average = report.average_score,
                offspring = report.offspring,
                "Generation evolved"
            ),
            LogLevel::Minimal => debug!(
                generation = report.generation,
                best_score = report.best_score,
                best_ever_score = report.best_ever_score,
                "Generation evolved"
            ),
            LogLevel::None => trace!(generation = report.generation, "Generation evolved"),
        }
    }
}

fn to_strength(units: u32) -> i32 {
    i32::try_from(units).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{allocation::TOTAL, dataset::OpponentTable};

    fn table() -> OpponentTable {
        OpponentTable::from_rows(vec![
            vec![10u32; FRONTS],
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 91],
            vec![0, 0, 0, 0, 20, 20, 20, 20, 20, 0],
            vec![30, 30, 30, 10, 0, 0, 0, 0, 0, 0],
        ])
        .unwrap()
    }

    fn options(population: usize) -> EvolutionOptions {
        EvolutionOptions::builder()
            .population_size(population)
            .num_generations(20)
            .build()
    }

    #[test]
    fn test_population_size_is_kept() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let mut engine = EvolutionEngine::new(options(40), table(), &mut rng).unwrap();
        for _ in 0..10 {
            engine.evolve(&mut rng).unwrap();
            assert_eq!(engine.population().len(), 40);
            for member in engine.population().members() {
                assert_eq!(member.allocation().sum(), TOTAL);
            }
        }
    }

    #[test]
    fn test_best_ever_is_non_decreasing() {
        let mut rng = RandomNumberGenerator::from_seed(2);
        let mut engine = EvolutionEngine::new(options(30), table(), &mut rng).unwrap();
        let mut previous = engine.best_ever().fitness();
        for report in engine.simulate(30, &mut rng).unwrap() {
            assert!(report.best_ever_score >= previous);
            assert!(report.best_ever_score >= report.best_score);
            previous = report.best_ever_score;
        }
    }

    #[test]
    fn test_simulate_stops_at_generation_count() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let mut engine = EvolutionEngine::new(options(10), table(), &mut rng).unwrap();
        let reports = engine.simulate(5, &mut rng).unwrap();
        assert_eq!(reports.len(), 5);
        assert_eq!(reports.last().map(|r| r.generation), Some(5));
        assert!(engine.simulate(5, &mut rng).unwrap().is_empty());
        assert_eq!(engine.simulate(7, &mut rng).unwrap().len(), 2);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut rng = RandomNumberGenerator::from_seed(4);
        let mut engine = EvolutionEngine::new(options(10), table(), &mut rng).unwrap();
        engine.simulate(5, &mut rng).unwrap();
        engine.restart(&mut rng).unwrap();
        assert_eq!(engine.generation(), 0);
        assert!(engine.best_ever().fitness() >= engine.population().members()[0].fitness());
        assert_eq!(engine.best().fitness(), engine.population().best().fitness());
    }

    #[test]
    fn test_rejects_zero_population() {
        let mut rng = RandomNumberGenerator::from_seed(5);
        let result = EvolutionEngine::new(options(0), table(), &mut rng);
        assert!(matches!(result, Err(BlottoError::Configuration(_))));
    }

    #[test]
    fn test_rejects_table_of_other_width() {
        let mut rng = RandomNumberGenerator::from_seed(6);
        let narrow = OpponentTable::from_rows(vec![vec![50u32, 50]]).unwrap();
        let result = EvolutionEngine::new(options(10), narrow, &mut rng);
        assert!(matches!(result, Err(BlottoError::Configuration(_))));
    }

    /// Scores an allocation by the units on its first front.
    struct FirstFront;

    impl Challenge for FirstFront {
        fn score(&self, allocation: &Allocation) -> f64 {
            allocation[0] as f64
        }
    }

    fn spread(first: u32) -> Allocation {
        let rest = (TOTAL - first) / (FRONTS as u32 - 1);
        let mut units = [rest; FRONTS];
        units[0] = first;
        Allocation::new(units)
    }

    /// Engine over three members ranked 1, 0, 2 with a custom twin mutation
    /// strength.
    fn ranked_engine(rng: &mut RandomNumberGenerator) -> EvolutionEngine<FirstFront> {
        let opts = EvolutionOptions::builder()
            .population_size(3)
            .mutation_min_num(7)
            .build();
        let mut engine = EvolutionEngine::new(opts, FirstFront, rng).unwrap();
        engine.population = Population::from_members(
            [19, 28, 10]
                .iter()
                .map(|&first| Individual::from_allocation(spread(first), &FirstFront))
                .collect(),
        )
        .unwrap();
        engine
    }

    #[test]
    fn test_elite_twin_is_mutated() {
        let mut rng = RandomNumberGenerator::from_seed(8);
        let engine = ranked_engine(&mut rng);
        let top = engine.population().members()[1].rescored_copy(&FirstFront);

        let mut next = vec![Slot {
            individual: top.rescored_copy(&FirstFront),
            source: 1,
        }];
        let mut replay = rng.clone();
        engine.reproduce_elites(&mut next, &mut rng);

        let mut expected = top.rescored_copy(&FirstFront);
        expected.mutate(7, &FirstFront, &mut replay);

        assert_eq!(next.len(), 3);
        assert_eq!(next[1].source, 1);
        assert_eq!(next[1].individual, expected);
        assert_eq!(next[1].individual.allocation().sum(), TOTAL);
        // the runner-up has no twin and is copied unchanged
        assert_eq!(next[2].source, 0);
        assert_eq!(next[2].individual.allocation(), &spread(19));
    }

    #[test]
    fn test_elite_with_other_source_or_changed_allocation_is_copied() {
        let mut rng = RandomNumberGenerator::from_seed(9);
        let engine = ranked_engine(&mut rng);

        // same allocation, different source
        let mut next = vec![Slot {
            individual: Individual::from_allocation(spread(28), &FirstFront),
            source: 0,
        }];
        engine.reproduce_elites(&mut next, &mut rng);
        assert_eq!(next[1].source, 1);
        assert_eq!(next[1].individual.allocation(), &spread(28));

        // same source, changed allocation
        let mut next = vec![Slot {
            individual: Individual::from_allocation(spread(10), &FirstFront),
            source: 1,
        }];
        engine.reproduce_elites(&mut next, &mut rng);
        assert_eq!(next[1].source, 1);
        assert_eq!(next[1].individual.allocation(), &spread(28));
        assert_eq!(next[1].individual.fitness(), 28.0);
    }

    #[test]
    fn test_without_recombination_elites_carry_over() {
        let mut rng = RandomNumberGenerator::from_seed(7);
        let opts = EvolutionOptions::builder()
            .population_size(12)
            .crossover_rate(0.0)
            .build();
        let mut engine = EvolutionEngine::new(opts, table(), &mut rng).unwrap();

        let mut before: Vec<Allocation> = engine
            .population()
            .members()
            .iter()
            .map(|m| *m.allocation())
            .collect();
        let report = engine.evolve(&mut rng).unwrap();
        let mut after: Vec<Allocation> = engine
            .population()
            .members()
            .iter()
            .map(|m| *m.allocation())
            .collect();

        assert_eq!(report.offspring, 0);
        before.sort_by_key(|a| *a.units());
        after.sort_by_key(|a| *a.units());
        assert_eq!(before, after);
    }
}
