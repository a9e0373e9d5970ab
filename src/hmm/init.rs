use crate::{
    data::ObservationSequence,
    hmm::{HmmError, Model},
    math::{Float, Matrix},
};
use rand_xoshiro::rand_core::RngCore;

/// How many times a perturbed row is redrawn before giving up on it.
const MAX_ROW_DRAWS: usize = 1_000;

/// The step sizes used to displace each parameter from uniform when a model
/// is initialized.
///
/// Each entry except the last of a row is `1/len ± k·scale` for a random
/// `k` in `1..=9` and a random sign, and the last entry takes up the slack so
/// the row sums to one. The defaults are the values that worked well for
/// English text with a handful of states and 26 or 27 symbols. They do not
/// scale with `N` or `M`, so larger models may want smaller values.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Perturbation {
    /// Step size for π
    pub initial:    f64,
    /// Step size for each row of A
    pub transition: f64,
    /// Step size for each row of B
    pub emission:   f64,
}

impl Default for Perturbation {
    #[inline]
    fn default() -> Self {
        Self {
            initial:    0.003_51,
            transition: 0.002_38,
            emission:   0.000_426,
        }
    }
}

impl Perturbation {
    /// No perturbation at all: every row starts exactly uniform.
    pub const NONE: Self = Self {
        initial:    0.0,
        transition: 0.0,
        emission:   0.0,
    };

    /// # Errors
    ///
    /// [`HmmError::InvalidPerturbation`] for the first scale that is negative
    /// or not finite.
    pub fn validate(&self) -> Result<(), HmmError> {
        for scale in [self.initial, self.transition, self.emission] {
            if !scale.is_finite() || scale < 0.0 {
                return Err(HmmError::InvalidPerturbation(scale));
            }
        }
        Ok(())
    }
}

/// Draws a probability row of length `len` near uniform, redrawing until
/// every entry (including the slack entry) is positive.
///
/// # Errors
///
/// [`HmmError::PerturbationTooLarge`] if no valid row is found.
pub(crate) fn perturbed_row<R: RngCore>(rng: &mut R, len: usize, scale: f64) -> Result<Vec<f64>, HmmError> {
    let uniform = 1.0 / <f64 as Float>::usize_as_self(len);

    for _ in 0..MAX_ROW_DRAWS {
        let mut row = Vec::with_capacity(len);
        let mut sum = 0.0;
        for _ in 1..len {
            let offset = f64::from(rng.next_u32() % 9 + 1) * scale;
            let p = if rng.next_u32() % 2 == 0 {
                uniform + offset
            } else {
                uniform - offset
            };
            sum += p;
            row.push(p);
        }
        row.push(1.0 - sum);

        if row.iter().all(|&p| p > 0.0) {
            return Ok(row);
        }
    }

    Err(HmmError::PerturbationTooLarge { len, scale })
}

/// Draws a fresh model with every distribution perturbed around uniform.
///
/// If `transitions` is given, it is used as `A` instead of a perturbed
/// matrix.
///
/// # Errors
///
/// [`HmmError::PerturbationTooLarge`] if a row cannot be drawn.
pub fn random_model<R: RngCore>(
    rng: &mut R, n_states: usize, n_symbols: usize, perturbation: &Perturbation, transitions: Option<&Matrix<f64>>,
) -> Result<Model, HmmError> {
    let initial = perturbed_row(rng, n_states, perturbation.initial)?;

    let transition = match transitions {
        Some(fixed) => fixed.clone(),
        None => {
            let mut a = Matrix::new(0.0, n_states, n_states);
            for i in 0..n_states {
                a.row_mut(i)
                    .copy_from_slice(&perturbed_row(rng, n_states, perturbation.transition)?);
            }
            a
        }
    };

    let mut emission = Matrix::new(0.0, n_states, n_symbols);
    for i in 0..n_states {
        emission
            .row_mut(i)
            .copy_from_slice(&perturbed_row(rng, n_symbols, perturbation.emission)?);
    }

    Ok(Model::new_unchecked(initial, transition, emission))
}

/// Builds an `M`×`M` transition matrix from the symbol bigrams of `obs`.
///
/// `pseudo_count` is added to every cell before each row is normalized, so
/// no transition is impossible. A row with no counts at all becomes uniform.
///
/// Trained on plaintext in the language of a substitution cipher, this is the
/// fixed `A` used to solve the cipher, where the hidden states are the
/// plaintext letters.
#[must_use]
pub fn digraph_transitions(obs: &ObservationSequence, pseudo_count: u32) -> Matrix<f64> {
    let m = obs.n_symbols();
    let mut counts = Matrix::new(f64::from(pseudo_count), m, m);
    for pair in obs.as_slice().windows(2) {
        counts[(pair[0], pair[1])] += 1.0;
    }

    let uniform = 1.0 / <f64 as Float>::usize_as_self(m);
    for i in 0..m {
        let row = counts.row_mut(i);
        let total: f64 = row.iter().sum();
        if total > 0.0 {
            for p in row.iter_mut() {
                *p /= total;
            }
        } else {
            row.fill(uniform);
        }
    }
    counts
}
