//! # Population
//!
//! A fixed-size generation of individuals together with the aggregates the
//! engine needs each step: total fitness (for roulette-wheel selection) and
//! the best member.

use std::cmp::Ordering;

use crate::{
    error::{BlottoError, Result},
    evolution::Challenge,
    individual::Individual,
    rng::RandomNumberGenerator,
};

#[derive(Debug)]
pub struct Population {
    members: Vec<Individual>,
    total_fitness: f64,
    best: usize,
}

impl Population {
    /// Builds a population of `size` random individuals.
    pub fn random<C: Challenge>(
        size: usize,
        challenge: &C,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Self> {
        let members = (0..size)
            .map(|_| Individual::random(challenge, rng))
            .collect();
        Self::from_members(members)
    }

    /// Wraps existing individuals and computes the aggregates.
    pub fn from_members(members: Vec<Individual>) -> Result<Self> {
        if members.is_empty() {
            return Err(BlottoError::EmptyPopulation);
        }

        let mut total_fitness = 0.0;
        let mut best = 0;
        for (i, member) in members.iter().enumerate() {
            total_fitness += member.fitness();
            // first of equally fit members wins
            if member.fitness() > members[best].fitness() {
                best = i;
            }
        }

        Ok(Self {
            members,
            total_fitness,
            best,
        })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Individual] {
        &self.members
    }

    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.members.get(index)
    }

    pub fn total_fitness(&self) -> f64 {
        self.total_fitness
    }

    pub fn average_fitness(&self) -> f64 {
        self.total_fitness / self.members.len() as f64
    }

    /// The fittest member; the earliest one on ties.
    pub fn best(&self) -> &Individual {
        &self.members[self.best]
    }

    /// Picks a parent by roulette wheel.
    ///
    /// A target is drawn uniformly from `[0, total_fitness)` and the members
    /// are scanned in order, accumulating fitness. The first member whose
    /// running sum reaches the target *and* is at least
    /// `average_fitness * min_change` is chosen. The second condition keeps
    /// members early in the scan from ever being chosen while the running sum
    /// is small, which shifts selection towards later members.
    ///
    /// Returns `None` if no member satisfies both conditions. Callers treat
    /// that as a skipped draw, not an error.
    pub fn select_parent(&self, min_change: f64, rng: &mut RandomNumberGenerator) -> Option<usize> {
        let target = rng.unit() * self.total_fitness;
        let threshold = self.average_fitness() * min_change;

        let mut cumulative = 0.0;
        for (i, member) in self.members.iter().enumerate() {
            cumulative += member.fitness();
            if cumulative >= target && cumulative >= threshold {
                return Some(i);
            }
        }

        None
    }

    /// Member indices ordered by descending fitness.
    ///
    /// The sort is stable: equally fit members keep their population order.
    pub fn ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.members.len()).collect();
        order.sort_by(|&a, &b| {
            self.members[b]
                .fitness()
                .partial_cmp(&self.members[a].fitness())
                .unwrap_or(Ordering::Equal)
        });
        order
    }
}
