//! # Exhaustive Search
//!
//! Scores every bounded composition of the unit total against the opponent
//! table and keeps the best one. It is a validation tool for the
//! evolutionary search: the number of compositions grows combinatorially,
//! so it is only practical with a per-front cap like the default of 22.
//!
//! Compositions are visited in lexicographic order and a new maximum must be
//! strictly greater than the current one, so the reported allocation is the
//! lexicographically first optimum.
//!
//! ## Example
//!
//! ```rust
//! use blotto::dataset::OpponentTable;
//! use blotto::exhaustive::{ExhaustiveSearch, SearchOptions};
//!
//! let table = OpponentTable::from_rows(vec![vec![2u32, 2, 2]]).unwrap();
//! let options = SearchOptions::new(6, 6);
//! let outcome = ExhaustiveSearch::new(&table, options).run().unwrap();
//!
//! assert_eq!(outcome.score, 1.0);
//! assert_eq!(outcome.best, vec![0, 3, 3]);
//! ```

pub mod compositions;

pub use compositions::Compositions;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    allocation::{Allocation, TOTAL},
    dataset::OpponentTable,
    error::{BlottoError, Result},
    scoring,
};

/// Per-front cap used for the recorded Blotto field.
pub const DEFAULT_CAP: u32 = 22;

/// Compositions between two progress reports.
pub const DEFAULT_REPORT_INTERVAL: u64 = 10_000_000;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    total: u32,
    cap: u32,
    report_interval: u64,
    stop_at_perfect: bool,
}

impl SearchOptions {
    pub fn new(total: u32, cap: u32) -> Self {
        Self {
            total,
            cap,
            ..Self::default()
        }
    }

    pub fn with_report_interval(mut self, report_interval: u64) -> Self {
        self.report_interval = report_interval;
        self
    }

    /// Stops as soon as an allocation wins against every opponent.
    pub fn with_stop_at_perfect(mut self, stop_at_perfect: bool) -> Self {
        self.stop_at_perfect = stop_at_perfect;
        self
    }

    pub fn get_total(&self) -> u32 {
        self.total
    }

    pub fn get_cap(&self) -> u32 {
        self.cap
    }

    pub fn get_report_interval(&self) -> u64 {
        self.report_interval
    }

    pub fn get_stop_at_perfect(&self) -> bool {
        self.stop_at_perfect
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            total: TOTAL,
            cap: DEFAULT_CAP,
            report_interval: DEFAULT_REPORT_INTERVAL,
            stop_at_perfect: false,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Best composition found.
    pub best: Vec<u32>,
    pub score: f64,
    /// Number of compositions scored.
    pub enumerated: u64,
    /// Whether the search stopped on a perfect score before exhausting the
    /// enumeration.
    pub stopped_early: bool,
}

impl SearchOutcome {
    /// The best composition as an `Allocation`, if it has one part per front.
    pub fn allocation(&self) -> Option<Allocation> {
        Allocation::from_slice(&self.best)
    }
}

#[derive(Debug, Clone)]
struct Best {
    composition: Vec<u32>,
    score: f64,
}

/// Shared counters of one search run.
struct Progress {
    enumerated: AtomicU64,
    perfect_found: AtomicBool,
    /// Bits of the best score over all branches. Scores are non-negative,
    /// so their bit patterns order like the values.
    best_bits: AtomicU64,
}

pub struct ExhaustiveSearch<'a> {
    table: &'a OpponentTable,
    options: SearchOptions,
}

impl<'a> ExhaustiveSearch<'a> {
    pub fn new(table: &'a OpponentTable, options: SearchOptions) -> Self {
        Self { table, options }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Enumerates every composition on the calling thread.
    ///
    /// # Errors
    ///
    /// Returns `BlottoError::Configuration` if no composition of the total
    /// fits under the cap.
    pub fn run(&self) -> Result<SearchOutcome> {
        self.validate()?;
        let progress = Progress::new();
        let compositions =
            Compositions::new(self.table.columns(), self.options.total, self.options.cap)?;
        let best = self.scan(compositions, &progress, true);
        self.finish(best, &progress)
    }

    /// Enumerates on the rayon pool, one branch per value of the first part.
    ///
    /// Without `stop_at_perfect` the outcome is identical to [`run`](Self::run).
    /// With it, the returned allocation is some perfect allocation, not
    /// necessarily the lexicographically first.
    pub fn run_parallel(&self) -> Result<SearchOutcome> {
        self.validate()?;
        let parts = self.table.columns();
        if parts < 2 {
            return self.run();
        }

        let progress = Progress::new();
        let branches: Result<Vec<Option<Best>>> = (0..=self.options.cap.min(self.options.total))
            .into_par_iter()
            .map(|first| -> Result<Option<Best>> {
                let compositions = Compositions::with_first_part(
                    parts,
                    self.options.total,
                    self.options.cap,
                    first,
                )?;
                let best = self.scan(compositions, &progress, false);
                if let Some(b) = best.as_ref() {
                    debug!(first, score = b.score, best = ?b.composition, "Branch finished");
                }
                Ok(best)
            })
            .collect();

        // branches arrive in first-part order; keep the earliest maximum
        let best = branches?.into_iter().flatten().fold(None, |acc: Option<Best>, b| match acc {
            Some(a) if a.score >= b.score => Some(a),
            _ => Some(b),
        });
        self.finish(best, &progress)
    }

    fn validate(&self) -> Result<()> {
        let reachable = u64::from(self.options.cap) * self.table.columns() as u64;
        if reachable < u64::from(self.options.total) {
            return Err(BlottoError::Configuration(format!(
                "{} fronts capped at {} cannot hold {} units",
                self.table.columns(),
                self.options.cap,
                self.options.total
            )));
        }
        if self.options.report_interval == 0 {
            return Err(BlottoError::Configuration(
                "Report interval cannot be zero".to_string(),
            ));
        }
        Ok(())
    }

    fn scan(&self, mut compositions: Compositions, progress: &Progress, announce: bool) -> Option<Best> {
        let perfect = self.table.len() as f64;
        let mut best: Option<Best> = None;

        while let Some(composition) = compositions.next_composition() {
            if self.options.stop_at_perfect && progress.perfect_found.load(Ordering::Relaxed) {
                break;
            }

            let score = scoring::evaluate(composition, self.table);
            if best.as_ref().map_or(true, |b| score > b.score) {
                progress.record_best(score);
                if announce {
                    info!(score, best = ?composition, "New best score");
                }
                best = Some(Best {
                    composition: composition.to_vec(),
                    score,
                });
            }

            let enumerated = progress.enumerated.fetch_add(1, Ordering::Relaxed) + 1;
            if enumerated % self.options.report_interval == 0 {
                match best.as_ref() {
                    Some(b) if announce => info!(
                        enumerated,
                        current = ?composition,
                        current_score = score,
                        best = ?b.composition,
                        best_score = b.score,
                        "Enumeration progress"
                    ),
                    Some(b) => info!(
                        enumerated,
                        current = ?composition,
                        current_score = score,
                        branch_best = ?b.composition,
                        branch_best_score = b.score,
                        best_score = progress.best_score(),
                        "Enumeration progress"
                    ),
                    None => {}
                }
            }

            if self.options.stop_at_perfect && score >= perfect {
                progress.perfect_found.store(true, Ordering::Relaxed);
                break;
            }
        }

        best
    }

    fn finish(&self, best: Option<Best>, progress: &Progress) -> Result<SearchOutcome> {
        let enumerated = progress.enumerated.load(Ordering::Relaxed);
        let best = best.ok_or_else(|| {
            BlottoError::Other("Enumeration produced no compositions".to_string())
        })?;

        info!(
            enumerated,
            score = best.score,
            best = ?best.composition,
            "Exhaustive search finished"
        );

        Ok(SearchOutcome {
            best: best.composition,
            score: best.score,
            enumerated,
            stopped_early: progress.perfect_found.load(Ordering::Relaxed),
        })
    }
}

impl Progress {
    fn new() -> Self {
        Self {
            enumerated: AtomicU64::new(0),
            perfect_found: AtomicBool::new(false),
            best_bits: AtomicU64::new(0f64.to_bits()),
        }
    }

    fn record_best(&self, score: f64) {
        self.best_bits.fetch_max(score.to_bits(), Ordering::Relaxed);
    }

    fn best_score(&self) -> f64 {
        f64::from_bits(self.best_bits.load(Ordering::Relaxed))
    }
}
