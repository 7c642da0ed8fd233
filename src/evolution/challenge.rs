use std::sync::Arc;

use crate::{allocation::Allocation, dataset::OpponentTable, scoring};

/// Fitness oracle consulted by the search.
///
/// Higher scores are better. Scores must be finite and non-negative, since
/// parents are drawn by fitness-proportionate selection.
pub trait Challenge {
    fn score(&self, allocation: &Allocation) -> f64;

    /// Number of fronts the challenge expects, if it is fixed.
    fn fronts(&self) -> Option<usize> {
        None
    }
}

impl Challenge for OpponentTable {
    fn score(&self, allocation: &Allocation) -> f64 {
        scoring::evaluate(allocation.as_slice(), self)
    }

    fn fronts(&self) -> Option<usize> {
        Some(self.columns())
    }
}

impl<C: Challenge + ?Sized> Challenge for &C {
    fn score(&self, allocation: &Allocation) -> f64 {
        (**self).score(allocation)
    }

    fn fronts(&self) -> Option<usize> {
        (**self).fronts()
    }
}

impl<C: Challenge + ?Sized> Challenge for Arc<C> {
    fn score(&self, allocation: &Allocation) -> f64 {
        (**self).score(allocation)
    }

    fn fronts(&self) -> Option<usize> {
        (**self).fronts()
    }
}
