use crate::{
    data::{Alphabet, ObservationSequence},
    hmm::{HmmError, forward, log_likelihood},
    math::{Matrix, Mismatch, NearlyEqual, Tolerance},
};
use std::fmt;

/// Row sums of a model's parameters must be within this distance of one.
pub(crate) const STOCHASTIC_TOLERANCE: f64 = 1e-6;

/// The parameters λ = (A, B, π) of a discrete hidden Markov model with `N`
/// states over an alphabet of `M` symbols.
///
/// * `A` is the `N`×`N` transition matrix: `A[(i, j)]` is the probability of
///   moving to state `j` from state `i`.
/// * `B` is the `N`×`M` emission matrix: `B[(i, k)]` is the probability of
///   emitting symbol `k` in state `i`.
/// * `π` is the length-`N` distribution of the first state.
///
/// Every row of `A` and `B`, and `π` itself, is a probability distribution.
#[derive(Clone, PartialEq, Debug)]
pub struct Model {
    pub(crate) initial:    Vec<f64>,
    pub(crate) transition: Matrix<f64>,
    pub(crate) emission:   Matrix<f64>,
}

impl Model {
    /// Creates a new [`Model`] after checking shapes and that every
    /// distribution sums to one.
    ///
    /// # Errors
    ///
    /// [`HmmError::ZeroStates`] or [`HmmError::ZeroSymbols`] for empty
    /// dimensions, [`HmmError::ShapeMismatch`] if the dimensions disagree, and
    /// [`HmmError::NotStochastic`] for the first row that is not a probability
    /// distribution.
    pub fn new(initial: Vec<f64>, transition: Matrix<f64>, emission: Matrix<f64>) -> Result<Self, HmmError> {
        let n = initial.len();
        if n == 0 {
            return Err(HmmError::ZeroStates);
        }
        if emission.cols() == 0 {
            return Err(HmmError::ZeroSymbols);
        }
        if transition.shape() != (n, n) {
            return Err(HmmError::ShapeMismatch {
                what:     "transition matrix",
                expected: (n, n),
                found:    transition.shape(),
            });
        }
        if emission.rows() != n {
            return Err(HmmError::ShapeMismatch {
                what:     "emission matrix",
                expected: (n, emission.cols()),
                found:    emission.shape(),
            });
        }

        let pi_sum: f64 = initial.iter().sum();
        if initial.iter().any(|&p| p < 0.0 || !p.is_finite()) || (pi_sum - 1.0).abs() > STOCHASTIC_TOLERANCE {
            return Err(HmmError::NotStochastic {
                what: "initial distribution",
                row:  0,
                sum:  pi_sum,
            });
        }
        for (what, m) in [("transition matrix", &transition), ("emission matrix", &emission)] {
            if let Some((row, sum)) = m.first_non_stochastic_row(STOCHASTIC_TOLERANCE) {
                return Err(HmmError::NotStochastic { what, row, sum });
            }
        }

        Ok(Self {
            initial,
            transition,
            emission,
        })
    }

    /// Creates a new [`Model`] without validation.
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(initial: Vec<f64>, transition: Matrix<f64>, emission: Matrix<f64>) -> Self {
        Self {
            initial,
            transition,
            emission,
        }
    }

    /// The number of hidden states, `N`.
    #[inline]
    #[must_use]
    pub fn n_states(&self) -> usize {
        self.initial.len()
    }

    /// The alphabet size, `M`.
    #[inline]
    #[must_use]
    pub fn n_symbols(&self) -> usize {
        self.emission.cols()
    }

    /// The initial state distribution, π.
    #[inline]
    #[must_use]
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// The transition matrix, A.
    #[inline]
    #[must_use]
    pub fn transition(&self) -> &Matrix<f64> {
        &self.transition
    }

    /// The emission matrix, B.
    #[inline]
    #[must_use]
    pub fn emission(&self) -> &Matrix<f64> {
        &self.emission
    }

    /// Whether `π` and every row of `A` and `B` sum to one within
    /// `tolerance`.
    #[must_use]
    pub fn is_row_stochastic(&self, tolerance: f64) -> bool {
        let pi_sum: f64 = self.initial.iter().sum();
        (pi_sum - 1.0).abs() <= tolerance
            && self.initial.iter().all(|&p| p >= 0.0 && p.is_finite())
            && self.transition.is_row_stochastic(tolerance)
            && self.emission.is_row_stochastic(tolerance)
    }

    /// Checks that `obs` can be scored by this model: it must be non-empty and
    /// use the same alphabet size.
    ///
    /// # Errors
    ///
    /// [`HmmError::EmptySequence`] or [`HmmError::ShapeMismatch`].
    pub fn check_observations(&self, obs: &ObservationSequence) -> Result<(), HmmError> {
        if obs.is_empty() {
            return Err(HmmError::EmptySequence);
        }
        if obs.n_symbols() != self.n_symbols() {
            return Err(HmmError::ShapeMismatch {
                what:     "observation alphabet",
                expected: (1, self.n_symbols()),
                found:    (1, obs.n_symbols()),
            });
        }
        Ok(())
    }

    /// Computes ln P(O | λ) with a single scaled forward pass.
    ///
    /// # Errors
    ///
    /// The errors of [`check_observations`](Self::check_observations), or
    /// [`HmmError::Degenerate`] if the sequence has probability zero.
    pub fn log_likelihood(&self, obs: &ObservationSequence) -> Result<f64, HmmError> {
        self.check_observations(obs)?;
        let pass = forward(self, obs)?;
        Ok(log_likelihood(pass.scale())?)
    }

    /// For each symbol, the state most likely to emit it (the first such state
    /// on ties).
    ///
    /// When the states stand for plaintext letters, this is the putative
    /// decryption key of a substitution cipher.
    #[must_use]
    pub fn dominant_states(&self) -> Vec<usize> {
        (0..self.n_symbols())
            .map(|k| {
                let mut best = 0;
                for i in 1..self.n_states() {
                    if self.emission[(i, k)] > self.emission[(best, k)] {
                        best = i;
                    }
                }
                best
            })
            .collect()
    }
}

impl NearlyEqual<f64> for Model {
    fn first_mismatch(&self, other: &Self, tolerance: Tolerance<f64>) -> Result<(), Mismatch<f64>> {
        self.initial.first_mismatch(&other.initial, tolerance)?;
        self.transition.first_mismatch(&other.transition, tolerance)?;
        self.emission.first_mismatch(&other.emission, tolerance)
    }
}

/// Writes a symbol label: a letter for the text alphabets, the code otherwise.
fn write_symbol(f: &mut fmt::Formatter, alphabet: Option<Alphabet>, symbol: usize) -> fmt::Result {
    match alphabet.and_then(|a| a.byte(symbol)) {
        Some(b' ') => write!(f, "' '"),
        Some(b) => write!(f, " {} ", b as char),
        None => write!(f, "{symbol:>3}"),
    }
}

impl fmt::Display for Model {
    /// Prints `A` with row sums, `B` transposed (one line per symbol, with the
    /// dominant state), and `π` with its sum.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "A:")?;
        for row in self.transition.iter_rows() {
            for p in row {
                write!(f, " {p:.6}")?;
            }
            writeln!(f, ", sum = {:.6}", row.iter().sum::<f64>())?;
        }

        writeln!(f, "B^T:")?;
        let alphabet = Alphabet::from_n_symbols(self.n_symbols());
        for (k, state) in self.dominant_states().into_iter().enumerate() {
            write_symbol(f, alphabet, k)?;
            write!(f, " |")?;
            for i in 0..self.n_states() {
                write!(f, " {:.6}", self.emission[(i, k)])?;
            }
            writeln!(f, "  max = {:.6}, state = {state}", self.emission[(state, k)])?;
        }
        write!(f, "row sums:")?;
        for sum in self.emission.row_sums() {
            write!(f, " {sum:.6}")?;
        }
        writeln!(f)?;

        writeln!(f, "pi:")?;
        for p in &self.initial {
            write!(f, " {p:.6}")?;
        }
        writeln!(f, ", sum = {:.6}", self.initial.iter().sum::<f64>())
    }
}
