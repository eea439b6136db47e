//! Trial scheduler for the experiment driver.
//!
//! The scheduler builds the full factorial trial set, shuffles it, warms the
//! connection up against a canary repository and then runs every trial one
//! at a time with a fixed pause in between. A transport error fails only its
//! own trial.

use std::time::Duration;

use apibench_core::{
    ApiKind, Complexity, Measurement, Repository, Trial, TrialFailure, TrialOutcome,
};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::client::QueryExecutor;
use crate::config::ExperimentConfig;

/// Every (complexity, API kind, repository, repetition) combination, with
/// 1-based repetitions, in treatment order.
pub fn build_trials(repositories: &[Repository], repetitions: u32) -> Vec<Trial> {
    let mut trials = Vec::with_capacity(
        Complexity::ALL.len() * ApiKind::ALL.len() * repositories.len() * repetitions as usize,
    );
    for complexity in Complexity::ALL {
        for api in ApiKind::ALL {
            for repository in repositories {
                for repetition in 1..=repetitions {
                    trials.push(Trial {
                        api,
                        complexity,
                        repository: repository.clone(),
                        repetition,
                    });
                }
            }
        }
    }
    trials
}

/// Shuffle `trials` uniformly; a seed makes the order reproducible.
pub fn shuffle_trials(trials: &mut [Trial], seed: Option<u64>) {
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    trials.shuffle(&mut rng);
}

/// Runs trials sequentially against a [`QueryExecutor`].
pub struct Scheduler<E> {
    executor: E,
    /// Number of warm-up rounds before the first trial.
    warmup_runs: u32,
    /// Repository the warm-up calls target.
    canary: Repository,
    /// Pause after every trial.
    inter_trial_delay: Duration,
    /// Log progress every this many trials.
    progress_interval: usize,
}

impl<E: QueryExecutor> Scheduler<E> {
    pub fn new(executor: E, config: &ExperimentConfig) -> Self {
        Self {
            executor,
            warmup_runs: config.warmup_runs,
            canary: config.canary_repository.clone(),
            inter_trial_delay: config.inter_trial_delay(),
            progress_interval: config.progress_interval.max(1),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Unrecorded REST simple + GraphQL simple calls against the canary.
    /// Errors are logged and ignored.
    pub async fn warm_up(&self) {
        if self.warmup_runs == 0 {
            return;
        }
        info!(rounds = self.warmup_runs, canary = %self.canary, "warming up");
        for round in 1..=self.warmup_runs {
            for api in ApiKind::ALL {
                if let Err(e) = self
                    .executor
                    .execute(api, Complexity::Simple, &self.canary)
                    .await
                {
                    warn!(round, %api, error = %e, "warm-up call failed");
                }
            }
        }
        info!("warm-up complete");
    }

    /// Execute one trial, turning a transport error into a failure outcome.
    pub async fn run_trial(&self, trial: &Trial) -> TrialOutcome {
        match self
            .executor
            .execute(trial.api, trial.complexity, &trial.repository)
            .await
        {
            Ok(result) => TrialOutcome::Success(Measurement::from_result(trial, result, Utc::now())),
            Err(e) => {
                warn!(%trial, error = %e, "trial failed");
                TrialOutcome::Failure(TrialFailure::new(trial, e.to_string(), Utc::now()))
            }
        }
    }

    /// Warm up, then run `trials` in the given order.
    ///
    /// Returns one outcome per trial, in execution order.
    pub async fn run(&self, trials: &[Trial]) -> Vec<TrialOutcome> {
        self.warm_up().await;

        let total = trials.len();
        info!(total, "starting experiment");

        let mut outcomes = Vec::with_capacity(total);
        for (index, trial) in trials.iter().enumerate() {
            outcomes.push(self.run_trial(trial).await);

            let done = index + 1;
            if done % self.progress_interval == 0 {
                info!(
                    "progress: {}/{} ({:.1}%)",
                    done,
                    total,
                    100.0 * done as f64 / total as f64
                );
            }

            if !self.inter_trial_delay.is_zero() {
                sleep(self.inter_trial_delay).await;
            }
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(total, failed, "experiment complete");
        outcomes
    }
}
