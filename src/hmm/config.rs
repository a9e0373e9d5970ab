use crate::{
    data::ObservationSequence,
    hmm::{HmmError, Perturbation, model::STOCHASTIC_TOLERANCE},
    math::Matrix,
};

/// Settings for [`RandomRestartOptimizer`](crate::hmm::RandomRestartOptimizer)
/// and [`BaumWelch`](crate::hmm::BaumWelch).
///
/// The sequence length `T` is not part of the configuration; it is the length
/// of the [`ObservationSequence`] being trained on.
///
/// ```
/// # use baum::prelude::*;
/// let config = TrainingConfig::new(2, 27)
///     .with_min_iters(200)
///     .with_epsilon(1e-9)
///     .with_restarts(10)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct TrainingConfig {
    /// The number of hidden states, `N`
    pub n_states:               usize,
    /// The alphabet size, `M`
    pub n_symbols:              usize,
    /// EM iterations always performed per restart before convergence is
    /// checked. At least one iteration runs even when this is zero.
    pub min_iters:              usize,
    /// An optional hard cap on EM iterations per restart
    pub max_iters:              Option<usize>,
    /// Convergence threshold on the absolute change of the log-likelihood
    /// between consecutive iterations. The log-likelihood grows with `T`, so
    /// the same value is stricter for longer sequences.
    pub epsilon:                f64,
    /// The number of random restarts
    pub restarts:               usize,
    /// Seed for the restart initializations. `None` seeds from the clock.
    pub seed:                   Option<u64>,
    /// Whether `A` is re-estimated. When `false`, `A` keeps its initial value
    /// for the whole restart and only π and `B` are trained.
    pub reestimate_transitions: bool,
    /// Step sizes for the perturbed-uniform initialization
    pub perturbation:           Perturbation,
    /// When set, every restart starts from this `A` instead of a perturbed
    /// one (for example a [digraph matrix](crate::hmm::digraph_transitions))
    pub fixed_transitions:      Option<Matrix<f64>>,
}

impl TrainingConfig {
    pub const DEFAULT_MIN_ITERS: usize = 100;
    pub const DEFAULT_EPSILON: f64 = 1e-7;
    pub const DEFAULT_RESTARTS: usize = 100;

    /// A configuration for `n_states` states over `n_symbols` symbols, with
    /// the remaining settings at their defaults.
    #[must_use]
    pub fn new(n_states: usize, n_symbols: usize) -> Self {
        Self {
            n_states,
            n_symbols,
            min_iters: Self::DEFAULT_MIN_ITERS,
            max_iters: None,
            epsilon: Self::DEFAULT_EPSILON,
            restarts: Self::DEFAULT_RESTARTS,
            seed: None,
            reestimate_transitions: true,
            perturbation: Perturbation::default(),
            fixed_transitions: None,
        }
    }

    #[must_use]
    pub fn with_min_iters(mut self, min_iters: usize) -> Self {
        self.min_iters = min_iters;
        self
    }

    #[must_use]
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = Some(max_iters);
        self
    }

    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    #[must_use]
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_reestimate_transitions(mut self, reestimate_transitions: bool) -> Self {
        self.reestimate_transitions = reestimate_transitions;
        self
    }

    #[must_use]
    pub fn with_perturbation(mut self, perturbation: Perturbation) -> Self {
        self.perturbation = perturbation;
        self
    }

    /// Starts every restart from `transitions` and freezes it, which is how a
    /// substitution cipher is solved from a digraph matrix.
    #[must_use]
    pub fn with_fixed_transitions(mut self, transitions: Matrix<f64>) -> Self {
        self.fixed_transitions = Some(transitions);
        self.reestimate_transitions = false;
        self
    }

    /// Rejects configurations that cannot be trained.
    ///
    /// # Errors
    ///
    /// [`HmmError::ZeroStates`], [`HmmError::ZeroSymbols`],
    /// [`HmmError::InvalidEpsilon`], [`HmmError::InvalidPerturbation`], or,
    /// for the fixed transition matrix, [`HmmError::ShapeMismatch`] and
    /// [`HmmError::NotStochastic`].
    pub fn validate(&self) -> Result<(), HmmError> {
        if self.n_states == 0 {
            return Err(HmmError::ZeroStates);
        }
        if self.n_symbols == 0 {
            return Err(HmmError::ZeroSymbols);
        }
        if self.epsilon.is_nan() || self.epsilon < 0.0 {
            return Err(HmmError::InvalidEpsilon(self.epsilon));
        }
        self.perturbation.validate()?;

        if let Some(a) = &self.fixed_transitions {
            if a.shape() != (self.n_states, self.n_states) {
                return Err(HmmError::ShapeMismatch {
                    what:     "fixed transition matrix",
                    expected: (self.n_states, self.n_states),
                    found:    a.shape(),
                });
            }
            if let Some((row, sum)) = a.first_non_stochastic_row(STOCHASTIC_TOLERANCE) {
                return Err(HmmError::NotStochastic {
                    what: "fixed transition matrix",
                    row,
                    sum,
                });
            }
        }
        Ok(())
    }

    /// Checks that `obs` is non-empty and uses this configuration's alphabet.
    ///
    /// # Errors
    ///
    /// [`HmmError::EmptySequence`] or [`HmmError::ShapeMismatch`].
    pub fn check_observations(&self, obs: &ObservationSequence) -> Result<(), HmmError> {
        if obs.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        if obs.n_symbols() != self.n_symbols {
            return Err(HmmError::ShapeMismatch {
                what:     "observation alphabet",
                expected: (1, self.n_symbols),
                found:    (1, obs.n_symbols()),
            });
        }
        Ok(())
    }
}
