use crate::{
    data::ObservationSequence,
    hmm::{Degeneracy, Model},
    math::{MapFloat, Matrix},
};

/// State occupancy (γ) and transition occupancy (di-gamma) posteriors for one
/// observation sequence.
///
/// `gamma` is `T`×`N` and each row sums to one. `di_gamma` holds one `N`×`N`
/// matrix for each step `t < T-1`. There is none for the last step since
/// there is no transition out of it. For every such `t`, the entries of
/// `di_gamma[t]` sum to one and row `i` of it sums to `gamma[t][i]`.
#[derive(Clone, PartialEq, Debug)]
pub struct Posteriors {
    pub(crate) gamma:    Matrix<f64>,
    pub(crate) di_gamma: Vec<Matrix<f64>>,
}

impl Posteriors {
    /// `gamma[(t, i)]` is the probability of being in state `i` at step `t`
    /// given the whole sequence.
    #[inline]
    #[must_use]
    pub fn gamma(&self) -> &Matrix<f64> {
        &self.gamma
    }

    /// `di_gamma()[t][(i, j)]` is the probability of being in state `i` at
    /// step `t` and state `j` at step `t+1` given the whole sequence.
    #[inline]
    #[must_use]
    pub fn di_gamma(&self) -> &[Matrix<f64>] {
        &self.di_gamma
    }
}

/// Derives [`Posteriors`] from the scaled forward and backward tables.
///
/// For `t < T-1`, `di_gamma[t][(i, j)]` is
/// `alpha[t][i]·A[i][j]·B[j][O[t+1]]·beta[t+1][j]` normalized over all
/// `(i, j)`, and `gamma[t][i]` is the sum of row `i`. The last row of `gamma`
/// is `alpha[T-1]` renormalized.
///
/// # Errors
///
/// [`Degeneracy::PosteriorDenominator`] if a normalizer is zero or not
/// finite.
pub fn posteriors(
    model: &Model, obs: &ObservationSequence, alpha: &Matrix<f64>, beta: &Matrix<f64>,
) -> Result<Posteriors, Degeneracy> {
    let n = model.n_states();
    let t_len = obs.len();

    let mut gamma = Matrix::new(0.0, t_len, n);
    let mut di_gamma = Vec::with_capacity(t_len.saturating_sub(1));

    for t in 0..t_len - 1 {
        let symbol = obs[t + 1];
        let alpha_t = alpha.row(t);
        let beta_next = beta.row(t + 1);

        let mut xi = Matrix::new(0.0, n, n);
        let mut denom = 0.0;
        for (i, &a_i) in alpha_t.iter().enumerate() {
            let transitions = model.transition.row(i);
            for (j, x) in xi.row_mut(i).iter_mut().enumerate() {
                *x = a_i * transitions[j] * model.emission[(j, symbol)] * beta_next[j];
                denom += *x;
            }
        }

        let inv = denom.positive_recip().ok_or(Degeneracy::PosteriorDenominator { t })?;
        let gamma_t = gamma.row_mut(t);
        for (i, g) in gamma_t.iter_mut().enumerate() {
            let row = xi.row_mut(i);
            for x in row.iter_mut() {
                *x *= inv;
            }
            *g = row.iter().sum();
        }
        di_gamma.push(xi);
    }

    let last = t_len - 1;
    let inv = alpha
        .row(last)
        .iter()
        .sum::<f64>()
        .positive_recip()
        .ok_or(Degeneracy::PosteriorDenominator { t: last })?;
    for (g, &a) in gamma.row_mut(last).iter_mut().zip(alpha.row(last)) {
        *g = a * inv;
    }

    Ok(Posteriors { gamma, di_gamma })
}
