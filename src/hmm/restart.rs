use crate::{
    data::ObservationSequence,
    generate::{clock_seed, restart_seeds},
    hmm::{BaumWelch, FitSummary, HmmError, Model, TrainingConfig, random_model},
};
use log::{debug, info, warn};
use rand_xoshiro::{Xoshiro256PlusPlus, rand_core::SeedableRng};

/// The best model found across restarts, with its log-likelihood.
#[derive(Clone, PartialEq, Debug)]
pub struct BestModel {
    /// A snapshot of the winning model
    pub model:      Model,
    /// ln P(O | λ) for `model`
    pub log_prob:   f64,
    /// The index of the restart that produced `model`
    pub restart:    usize,
    /// The EM iterations that restart performed
    pub iterations: usize,
}

/// Keeps the best candidate offered so far.
///
/// A candidate replaces the current best only when its log-likelihood is
/// strictly greater, so among equal scores the first one offered is kept.
/// Candidates with a non-finite score are never accepted.
#[derive(Clone, Debug, Default)]
pub struct BestTracker {
    best: Option<BestModel>,
}

impl BestTracker {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers a candidate, returning whether it became the new best.
    pub fn offer(&mut self, candidate: BestModel) -> bool {
        if !candidate.log_prob.is_finite() {
            return false;
        }
        let improves = self.best.as_ref().is_none_or(|best| candidate.log_prob > best.log_prob);
        if improves {
            self.best = Some(candidate);
        }
        improves
    }

    /// The best log-likelihood so far, or negative infinity if nothing has
    /// been accepted.
    #[inline]
    #[must_use]
    pub fn best_log_prob(&self) -> f64 {
        self.best.as_ref().map_or(f64::NEG_INFINITY, |b| b.log_prob)
    }

    #[inline]
    #[must_use]
    pub fn best(&self) -> Option<&BestModel> {
        self.best.as_ref()
    }

    /// Consumes the tracker.
    ///
    /// # Errors
    ///
    /// [`HmmError::NoValidModel`] if no candidate was ever accepted.
    pub fn finish(self, restarts: usize) -> Result<BestModel, HmmError> {
        self.best.ok_or(HmmError::NoValidModel { restarts })
    }
}

/// Baum-Welch with random restarts.
///
/// Each restart draws a fresh perturbed-uniform model, trains it to
/// convergence with [`BaumWelch`], and offers the result to a
/// [`BestTracker`]. A restart that hits a numeric degeneracy is logged and
/// skipped. Restarts are independent, and with the `parallel` feature they run
/// concurrently. Per-restart seeds are derived from the master seed up front
/// and results are reduced in restart order, so a fixed seed gives the same
/// best model either way.
///
/// ```
/// # use baum::prelude::*;
/// let obs = Alphabet::Letters.encode(b"abababababababababab");
/// let config = TrainingConfig::new(2, 26).with_restarts(4).with_seed(1);
/// let best = RandomRestartOptimizer::new(config).run(&obs).unwrap();
/// assert!(best.model.is_row_stochastic(1e-9));
/// ```
#[derive(Clone, Debug)]
pub struct RandomRestartOptimizer {
    config: TrainingConfig,
}

impl RandomRestartOptimizer {
    #[inline]
    #[must_use]
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Draws and trains one model.
    fn attempt(&self, restart: usize, seed: u64, obs: &ObservationSequence) -> Result<(Model, FitSummary), HmmError> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut model = random_model(
            &mut rng,
            self.config.n_states,
            self.config.n_symbols,
            &self.config.perturbation,
            self.config.fixed_transitions.as_ref(),
        )?;
        let summary = BaumWelch::new(&self.config).fit(&mut model, obs)?;
        debug!(
            "restart {restart}: log P = {} after {} iterations",
            summary.log_prob, summary.iterations
        );
        Ok((model, summary))
    }

    /// Offers one restart's outcome to `tracker`. Degenerate restarts are
    /// logged and skipped.
    fn record(
        tracker: &mut BestTracker, restart: usize, outcome: Result<(Model, FitSummary), HmmError>,
    ) -> Result<(), HmmError> {
        match outcome {
            Ok((model, summary)) => {
                let previous = tracker.best_log_prob();
                let candidate = BestModel {
                    model,
                    log_prob: summary.log_prob,
                    restart,
                    iterations: summary.iterations,
                };
                if tracker.offer(candidate) {
                    info!("restart {restart}: new best log P = {} (was {previous})", summary.log_prob);
                }
                Ok(())
            }
            Err(HmmError::Degenerate(d)) => {
                warn!("restart {restart} abandoned: {d}");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Runs every restart and returns the best model.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`TrainingConfig::validate`] and
    /// [`TrainingConfig::check_observations`] are returned before any
    /// training, and [`HmmError::NoValidModel`] is returned when every restart
    /// degenerated (or no restart was requested).
    pub fn run(&self, obs: &ObservationSequence) -> Result<BestModel, HmmError> {
        self.config.validate()?;
        self.config.check_observations(obs)?;

        let master = self.config.seed.unwrap_or_else(|| {
            let seed = clock_seed();
            info!("no seed configured, using {seed}");
            seed
        });
        let seeds = restart_seeds(master, self.config.restarts);
        let mut tracker = BestTracker::new();

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let outcomes: Vec<_> = seeds
                .par_iter()
                .enumerate()
                .map(|(restart, &seed)| self.attempt(restart, seed, obs))
                .collect();
            for (restart, outcome) in outcomes.into_iter().enumerate() {
                Self::record(&mut tracker, restart, outcome)?;
            }
        }
        #[cfg(not(feature = "parallel"))]
        for (restart, &seed) in seeds.iter().enumerate() {
            Self::record(&mut tracker, restart, self.attempt(restart, seed, obs))?;
        }

        tracker.finish(self.config.restarts)
    }
}
