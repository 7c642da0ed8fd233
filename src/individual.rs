//! # Individual
//!
//! An `Individual` is one candidate allocation together with its fitness.
//! The fitness is always the score of the current allocation: every
//! operation that changes the allocation rescores it before returning.
//!
//! Offspring are produced asexually. Swapping the units of two fronts keeps
//! the total fixed, which a two-parent crossover of fixed-sum vectors would
//! not.

use crate::{
    allocation::{Allocation, FRONTS, TOTAL},
    evolution::Challenge,
    rng::RandomNumberGenerator,
};

/// Minimum number of swaps performed by [`Individual::recombine`].
pub const MIN_SWAPS: usize = 2;

// No Deserialize: fitness only ever comes from scoring the allocation.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, PartialEq)]
pub struct Individual {
    allocation: Allocation,
    fitness: f64,
}

impl Individual {
    /// Creates a random allocation by handing each of the `TOTAL` units to a
    /// uniformly chosen front.
    ///
    /// The result is multinomially distributed, so balanced allocations are
    /// far more likely than concentrated ones.
    pub fn random<C: Challenge>(challenge: &C, rng: &mut RandomNumberGenerator) -> Self {
        let mut allocation = Allocation::default();
        for _ in 0..TOTAL {
            allocation.units_mut()[rng.index(FRONTS)] += 1;
        }
        Self::from_allocation(allocation, challenge)
    }

    /// Wraps an allocation and scores it.
    pub fn from_allocation<C: Challenge>(allocation: Allocation, challenge: &C) -> Self {
        let fitness = challenge.score(&allocation);
        Self {
            allocation,
            fitness,
        }
    }

    /// Independent copy of this individual, scored afresh.
    pub fn rescored_copy<C: Challenge>(&self, challenge: &C) -> Self {
        Self::from_allocation(self.allocation, challenge)
    }

    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// Moves single units between fronts `strength` times.
    ///
    /// Each move picks a random source front. An empty source skips the move.
    /// Otherwise one unit goes to a random destination, which may be the
    /// source itself. Non-positive strengths leave the individual untouched.
    pub fn mutate<C: Challenge>(
        &mut self,
        strength: i32,
        challenge: &C,
        rng: &mut RandomNumberGenerator,
    ) {
        if strength <= 0 {
            return;
        }

        let units = self.allocation.units_mut();
        for _ in 0..strength {
            let from = rng.index(FRONTS);
            if units[from] == 0 {
                continue;
            }
            units[from] -= 1;
            units[rng.index(FRONTS)] += 1;
        }

        self.rescore(challenge);
    }

    /// Produces a child by swapping the units of random front pairs.
    ///
    /// The number of swaps is `|u1 - u2| + MIN_SWAPS` for two independent
    /// uniform draws over the fronts.
    pub fn recombine<C: Challenge>(&self, challenge: &C, rng: &mut RandomNumberGenerator) -> Self {
        let mut child = self.allocation;

        let swaps = rng.index(FRONTS).abs_diff(rng.index(FRONTS)) + MIN_SWAPS;
        let units = child.units_mut();
        for _ in 0..swaps {
            let a = rng.index(FRONTS);
            let b = rng.index(FRONTS);
            units.swap(a, b);
        }

        Self::from_allocation(child, challenge)
    }

    fn rescore<C: Challenge>(&mut self, challenge: &C) {
        self.fitness = challenge.score(&self.allocation);
    }
}
