use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;
use tracing::{debug, info};

use super::{
    challenge::Challenge,
    engine::EvolutionEngine,
    options::{EvolutionOptions, LogLevel},
};
use crate::{
    allocation::Allocation,
    error::{BlottoError, OptionExt, Result},
    rng::RandomNumberGenerator,
};

/// Restarts between two progress reports.
const PROGRESS_INTERVAL: usize = 25;

/// The champion of a multi-restart search.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionResult {
    /// The best allocation found in any restart.
    pub allocation: Allocation,
    /// Its score against the challenge.
    pub score: f64,
    /// Index of the restart that produced the champion.
    pub restart: usize,
    /// Number of restarts that ran, including an interrupted one.
    pub restarts_run: usize,
    /// Whether the search was stopped through the cancellation flag.
    pub cancelled: bool,
}

/// Best-ever individual of one restart.
#[derive(Debug, Clone)]
struct RestartOutcome {
    restart: usize,
    allocation: Allocation,
    score: f64,
    cancelled: bool,
}

/// Runs independent restarts of the evolutionary search and keeps the
/// single best solution across all of them.
///
/// Every restart evolves on its own generator, seeded from the caller's
/// generator before any restart starts. A seeded search therefore returns the
/// same champion whether its restarts ran sequentially or on the rayon pool.
#[derive(Debug, Clone)]
pub struct EvolutionLauncher<C>
where
    C: Challenge + Sync,
{
    options: EvolutionOptions,
    challenge: C,
}

impl<C> EvolutionLauncher<C>
where
    C: Challenge + Sync,
{
    pub fn new(options: EvolutionOptions, challenge: C) -> Self {
        Self { options, challenge }
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    pub fn challenge(&self) -> &C {
        &self.challenge
    }

    /// Runs `num_restarts` restarts of `num_generations` generations each.
    ///
    /// # Errors
    ///
    /// Returns `BlottoError::Configuration` if the options are invalid or ask
    /// for zero restarts.
    pub fn multi_simulate(&self, rng: &mut RandomNumberGenerator) -> Result<EvolutionResult> {
        self.multi_simulate_with_cancel(rng, None)
    }

    /// Like [`multi_simulate`](Self::multi_simulate), but stops between
    /// generations once `cancel` is set and returns the champion found so
    /// far.
    pub fn multi_simulate_with_cancel(
        &self,
        rng: &mut RandomNumberGenerator,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<EvolutionResult> {
        self.options.validate()?;
        let restarts = self.options.get_num_restarts();
        if restarts == 0 {
            return Err(BlottoError::Configuration(
                "Number of restarts cannot be zero".to_string(),
            ));
        }

        let seeds: Vec<u64> = (0..restarts).map(|_| rng.fork_seed()).collect();
        let cancel = cancel.as_deref();
        let tracker = ProgressTracker::new(!matches!(
            self.options.get_log_level(),
            LogLevel::None
        ));

        let outcomes: Vec<RestartOutcome> = if restarts >= self.options.get_parallel_threshold() {
            debug!(restarts, "Running restarts in parallel");
            let parallel: Result<Vec<Option<RestartOutcome>>> = seeds
                .par_iter()
                .enumerate()
                .map(|(restart, &seed)| -> Result<Option<RestartOutcome>> {
                    let outcome = self.run_restart(restart, seed, cancel)?;
                    if let Some(o) = outcome.as_ref() {
                        tracker.record(o);
                    }
                    Ok(outcome)
                })
                .collect();
            parallel?.into_iter().flatten().collect()
        } else {
            let mut sequential = Vec::with_capacity(restarts);
            for (restart, &seed) in seeds.iter().enumerate() {
                match self.run_restart(restart, seed, cancel)? {
                    Some(outcome) => {
                        tracker.record(&outcome);
                        let stop = outcome.cancelled;
                        sequential.push(outcome);
                        if stop {
                            break;
                        }
                    }
                    None => break,
                }
            }
            sequential
        };

        self.crown(outcomes)
    }

    /// Evolves one restart. Returns `None` if the search was cancelled before
    /// the restart began.
    fn run_restart(
        &self,
        restart: usize,
        seed: u64,
        cancel: Option<&AtomicBool>,
    ) -> Result<Option<RestartOutcome>> {
        if is_cancelled(cancel) {
            return Ok(None);
        }

        let mut rng = RandomNumberGenerator::from_seed(seed);
        let mut engine = EvolutionEngine::new(self.options.clone(), &self.challenge, &mut rng)?;

        let mut cancelled = false;
        while engine.generation() < self.options.get_num_generations() {
            if is_cancelled(cancel) {
                cancelled = true;
                break;
            }
            engine.evolve(&mut rng)?;
        }

        let best_ever = engine.best_ever();
        debug!(
            restart,
            generations = engine.generation(),
            score = best_ever.fitness(),
            "Restart finished"
        );

        Ok(Some(RestartOutcome {
            restart,
            allocation: *best_ever.allocation(),
            score: best_ever.fitness(),
            cancelled,
        }))
    }

    /// Folds restart outcomes in restart order. A later restart takes over
    /// the title when it scores at least as well as the current champion.
    fn crown(&self, outcomes: Vec<RestartOutcome>) -> Result<EvolutionResult> {
        let restarts_run = outcomes.len();
        let cancelled = outcomes.iter().any(|o| o.cancelled)
            || restarts_run < self.options.get_num_restarts();

        let champion = outcomes
            .into_iter()
            .fold(None, |champion: Option<RestartOutcome>, outcome| match champion {
                Some(c) if c.score > outcome.score => Some(c),
                _ => Some(outcome),
            })
            .ok_or_else_blotto(|| {
                BlottoError::Other("Search was cancelled before any restart ran".to_string())
            })?;

        info!(
            restarts = restarts_run,
            generations = self.options.get_num_generations(),
            best_score = champion.score,
            best = %champion.allocation,
            cancelled,
            "Search finished"
        );

        Ok(EvolutionResult {
            allocation: champion.allocation,
            score: champion.score,
            restart: champion.restart,
            restarts_run,
            cancelled,
        })
    }
}

/// Announces new champions and periodic progress while restarts complete,
/// in completion order.
struct ProgressTracker {
    announce: bool,
    completed: AtomicUsize,
    champion: Mutex<Option<(usize, f64, Allocation)>>,
}

impl ProgressTracker {
    fn new(announce: bool) -> Self {
        Self {
            announce,
            completed: AtomicUsize::new(0),
            champion: Mutex::new(None),
        }
    }

    fn record(&self, outcome: &RestartOutcome) {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if !self.announce {
            return;
        }

        let mut champion = match self.champion.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if champion
            .as_ref()
            .map_or(true, |(_, score, _)| *score <= outcome.score)
        {
            info!(
                restart = outcome.restart,
                score = outcome.score,
                allocation = %outcome.allocation,
                "New best"
            );
            *champion = Some((outcome.restart, outcome.score, outcome.allocation));
        }

        if completed % PROGRESS_INTERVAL == 0 {
            if let Some((restart, score, allocation)) = champion.as_ref() {
                info!(
                    completed,
                    best_restart = restart,
                    best_score = score,
                    best = %allocation,
                    "Simulation progress"
                );
            }
        }
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{allocation::FRONTS, dataset::OpponentTable};

    fn table() -> OpponentTable {
        OpponentTable::from_rows(vec![
            vec![10u32; FRONTS],
            vec![0, 0, 0, 0, 20, 20, 20, 20, 20, 0],
            vec![30, 30, 30, 10, 0, 0, 0, 0, 0, 0],
        ])
        .unwrap()
    }

    fn options(restarts: usize, parallel_threshold: usize) -> EvolutionOptions {
        EvolutionOptions::builder()
            .population_size(20)
            .num_generations(5)
            .num_restarts(restarts)
            .parallel_threshold(parallel_threshold)
            .build()
    }

    #[test]
    fn test_zero_restarts_is_rejected() {
        let launcher = EvolutionLauncher::new(options(0, 1000), table());
        let mut rng = RandomNumberGenerator::from_seed(1);
        assert!(matches!(
            launcher.multi_simulate(&mut rng),
            Err(BlottoError::Configuration(_))
        ));
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let sequential = EvolutionLauncher::new(options(6, 1000), table())
            .multi_simulate(&mut RandomNumberGenerator::from_seed(42))
            .unwrap();
        let parallel = EvolutionLauncher::new(options(6, 1), table())
            .multi_simulate(&mut RandomNumberGenerator::from_seed(42))
            .unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(sequential.restarts_run, 6);
        assert!(!sequential.cancelled);
    }

    #[test]
    fn test_cancelled_before_start() {
        let launcher = EvolutionLauncher::new(options(4, 1000), table());
        let flag = Arc::new(AtomicBool::new(true));
        let result =
            launcher.multi_simulate_with_cancel(&mut RandomNumberGenerator::from_seed(3), Some(flag));
        assert!(result.is_err());
    }

    #[test]
    fn test_champion_matches_its_score() {
        let t = table();
        let launcher = EvolutionLauncher::new(options(3, 1000), &t);
        let result = launcher
            .multi_simulate(&mut RandomNumberGenerator::from_seed(8))
            .unwrap();
        assert_eq!(result.score, t.score(&result.allocation));
        assert_eq!(result.allocation.sum(), crate::allocation::TOTAL);
    }
}
