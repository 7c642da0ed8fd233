//! # Scoring
//!
//! A match-up between two allocations is decided front by front: the side
//! with more units takes the front. Whoever takes more fronts wins the
//! match-up; an equal count is a tie.
//!
//! Against a whole [`OpponentTable`] an allocation scores one point per win
//! and half a point per tie. The value is not normalized by the number of
//! rows, so it is only comparable between allocations scored against the
//! same table.
//!
//! ## Example
//!
//! ```rust
//! use blotto::dataset::OpponentTable;
//! use blotto::scoring::{evaluate, score, Outcome};
//!
//! let opponent = [1, 1, 1, 1, 1, 1, 1, 1, 1, 91];
//! let mine = [2, 2, 2, 2, 2, 2, 2, 2, 2, 82];
//! assert_eq!(score(&mine, &opponent), Outcome::Win);
//!
//! let table = OpponentTable::from_rows(vec![opponent.to_vec()]).unwrap();
//! assert_eq!(evaluate(&mine, &table), 1.0);
//! ```

use std::cmp::Ordering;

use crate::dataset::OpponentTable;

/// Result of a single match-up.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    /// Points awarded for this outcome.
    pub fn points(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Tie => 0.5,
            Outcome::Loss => 0.0,
        }
    }
}

/// Per-outcome counts of an allocation against every row of a table.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub wins: usize,
    pub ties: usize,
    pub losses: usize,
}

impl Tally {
    /// `wins + 0.5 * ties`.
    pub fn points(&self) -> f64 {
        self.wins as f64 + self.ties as f64 / 2.0
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Tie => self.ties += 1,
            Outcome::Loss => self.losses += 1,
        }
    }
}

/// Decides one match-up by majority of fronts.
///
/// Fronts beyond the shorter of the two slices are ignored.
pub fn score(allocation: &[u32], opponent: &[u32]) -> Outcome {
    let mut fronts_won = 0usize;
    let mut fronts_lost = 0usize;

    for (mine, theirs) in allocation.iter().zip(opponent) {
        match mine.cmp(theirs) {
            Ordering::Greater => fronts_won += 1,
            Ordering::Less => fronts_lost += 1,
            Ordering::Equal => {}
        }
    }

    match fronts_won.cmp(&fronts_lost) {
        Ordering::Greater => Outcome::Win,
        Ordering::Equal => Outcome::Tie,
        Ordering::Less => Outcome::Loss,
    }
}

/// Counts wins, ties and losses of `allocation` against every row of `table`.
pub fn tally(allocation: &[u32], table: &OpponentTable) -> Tally {
    let mut tally = Tally::default();
    for opponent in table.rows() {
        tally.record(score(allocation, opponent));
    }
    tally
}

/// Scores `allocation` against every row of `table`: `wins + 0.5 * ties`.
pub fn evaluate(allocation: &[u32], table: &OpponentTable) -> f64 {
    debug_assert_eq!(allocation.len(), table.columns());
    tally(allocation, table).points()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: Vec<Vec<u32>>) -> OpponentTable {
        OpponentTable::from_rows(rows).unwrap()
    }

    #[test]
    fn test_score_majority_rule() {
        assert_eq!(score(&[2, 0, 0], &[1, 1, 1]), Outcome::Loss);
        assert_eq!(score(&[2, 2, 0], &[1, 1, 1]), Outcome::Win);
        assert_eq!(score(&[2, 1, 0], &[1, 1, 1]), Outcome::Tie);
        assert_eq!(score(&[5, 5, 5], &[5, 5, 5]), Outcome::Tie);
    }

    #[test]
    fn test_score_is_antisymmetric() {
        let a = [20, 20, 20, 20, 20, 0, 0, 0, 0, 0];
        let b = [0, 0, 0, 0, 10, 18, 18, 18, 18, 18];
        assert_eq!(score(&a, &b), Outcome::Loss);
        assert_eq!(score(&b, &a), Outcome::Win);
    }

    #[test]
    fn test_single_row_win() {
        let t = table(vec![vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 91]]);
        assert_eq!(evaluate(&[2, 2, 2, 2, 2, 2, 2, 2, 2, 82], &t), 1.0);
    }

    #[test]
    fn test_ties_count_half() {
        let t = table(vec![vec![10; 10], vec![10; 10]]);
        assert_eq!(evaluate(&[10; 10], &t), 1.0);
    }

    #[test]
    fn test_evaluate_matches_sum_of_outcomes() {
        let rows = vec![
            vec![10; 10],
            vec![0, 0, 0, 0, 0, 20, 20, 20, 20, 20],
            vec![25, 25, 25, 25, 0, 0, 0, 0, 0, 0],
            vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 91],
        ];
        let t = table(rows.clone());
        let mine = [11, 11, 11, 11, 11, 11, 11, 11, 6, 6];

        let expected: f64 = rows.iter().map(|r| score(&mine, r).points()).sum();
        assert_eq!(evaluate(&mine, &t), expected);

        let counts = tally(&mine, &t);
        assert_eq!(counts.wins + counts.ties + counts.losses, rows.len());
        assert_eq!(counts.points(), expected);
    }
}
