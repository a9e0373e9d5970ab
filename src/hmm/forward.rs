use crate::{
    data::ObservationSequence,
    hmm::{Degeneracy, Model, log_likelihood},
    math::{MapFloat, Matrix},
};

/// The output of the scaled forward pass.
///
/// Row `t` of `alpha` is the distribution over states at step `t` given the
/// observations up to and including `t`. `scale[t]` is the reciprocal of the
/// raw forward mass at step `t`, which both normalizes that row and is reused
/// by the backward pass and the log-likelihood.
#[derive(Clone, PartialEq, Debug)]
pub struct ForwardPass {
    pub(crate) alpha: Matrix<f64>,
    pub(crate) scale: Vec<f64>,
}

impl ForwardPass {
    /// The scaled forward probabilities, `T`×`N`.
    #[inline]
    #[must_use]
    pub fn alpha(&self) -> &Matrix<f64> {
        &self.alpha
    }

    /// The scale factors, `c`, of length `T`.
    #[inline]
    #[must_use]
    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// The log-likelihood of the observations under the model that produced
    /// this pass.
    ///
    /// # Errors
    ///
    /// [`Degeneracy::NonFiniteScore`] if the sum is not finite.
    #[inline]
    pub fn log_likelihood(&self) -> Result<f64, Degeneracy> {
        log_likelihood(&self.scale)
    }
}

/// Computes `out[i] = (Σ_j prev[j]·A[j][i])·B[i][symbol]`.
///
/// `transition` and `emission` are the row-major storage of `A` and `B`.
#[cfg_attr(feature = "multiversion", multiversion::multiversion(targets = "simd"))]
fn forward_step(prev: &[f64], transition: &[f64], emission: &[f64], n_symbols: usize, symbol: usize, out: &mut [f64]) {
    let n = out.len();
    out.fill(0.0);

    // Row-wise accumulation keeps the inner loop contiguous
    for (&a_prev, row) in prev.iter().zip(transition.chunks_exact(n)) {
        for (o, &a) in out.iter_mut().zip(row) {
            *o += a_prev * a;
        }
    }

    for (i, o) in out.iter_mut().enumerate() {
        *o *= emission[i * n_symbols + symbol];
    }
}

/// Rescales `row` to sum to one, returning the scale factor used.
#[inline]
fn normalize(row: &mut [f64]) -> Option<f64> {
    let c = row.iter().sum::<f64>().positive_recip()?;
    for p in row.iter_mut() {
        *p *= c;
    }
    Some(c)
}

/// The scaled forward (α) pass.
///
/// `alpha[0][i] = π[i]·B[i][O[0]]` and
/// `alpha[t][i] = (Σ_j alpha[t-1][j]·A[j][i])·B[i][O[t]]`, with each row
/// rescaled by `c[t] = 1 / Σ_i alpha[t][i]` before the next step uses it.
///
/// The observations must be non-empty and use the model's alphabet (see
/// [`Model::check_observations`]).
///
/// # Errors
///
/// [`Degeneracy::ForwardMass`] if the mass at some step is zero or too small
/// to invert.
pub fn forward(model: &Model, obs: &ObservationSequence) -> Result<ForwardPass, Degeneracy> {
    let n = model.n_states();
    let m = model.n_symbols();
    let t_len = obs.len();

    let mut alpha = Matrix::new(0.0, t_len, n);
    let mut scale = vec![0.0; t_len];

    let first = alpha.row_mut(0);
    for (i, a) in first.iter_mut().enumerate() {
        *a = model.initial[i] * model.emission[(i, obs[0])];
    }
    scale[0] = normalize(first).ok_or(Degeneracy::ForwardMass { t: 0 })?;

    for t in 1..t_len {
        let (prev, current) = alpha.row_pair_mut(t - 1, t);
        forward_step(
            prev,
            model.transition.as_slice(),
            model.emission.as_slice(),
            m,
            obs[t],
            current,
        );
        scale[t] = normalize(current).ok_or(Degeneracy::ForwardMass { t })?;
    }

    Ok(ForwardPass { alpha, scale })
}
