use crate::{
    data::ObservationSequence,
    hmm::{Degeneracy, Model},
    math::Matrix,
};

/// Computes `out[i] = c·Σ_j A[i][j]·B[j][symbol]·next[j]`, using `weighted`
/// as scratch space of length `N`.
#[allow(clippy::too_many_arguments)]
#[cfg_attr(feature = "multiversion", multiversion::multiversion(targets = "simd"))]
fn backward_step(
    next: &[f64], transition: &[f64], emission: &[f64], n_symbols: usize, symbol: usize, c: f64, weighted: &mut [f64],
    out: &mut [f64],
) {
    let n = out.len();
    for (j, w) in weighted.iter_mut().enumerate() {
        *w = emission[j * n_symbols + symbol] * next[j];
    }

    for (o, row) in out.iter_mut().zip(transition.chunks_exact(n)) {
        let sum: f64 = row.iter().zip(weighted.iter()).map(|(&a, &w)| a * w).sum();
        *o = sum * c;
    }
}

/// The scaled backward (β) pass.
///
/// `beta[T-1][i] = c[T-1]` and `beta[t][i] = c[t]·Σ_j A[i][j]·B[j][O[t+1]]·beta[t+1][j]`.
/// `scale` must come from the forward pass of the same model on the same
/// observations. Reusing it is what keeps `alpha[t][i]·beta[t][i]`
/// proportional to the posterior state probability.
///
/// With this convention the rows of `beta` do not sum to one. Instead,
/// `Σ_i alpha[t][i]·beta[t][i] = c[t]` at every step.
///
/// # Errors
///
/// [`Degeneracy::BackwardOverflow`] if a value at some step is not finite.
pub fn backward(model: &Model, obs: &ObservationSequence, scale: &[f64]) -> Result<Matrix<f64>, Degeneracy> {
    let n = model.n_states();
    let m = model.n_symbols();
    let t_len = obs.len();

    let mut beta = Matrix::new(0.0, t_len, n);
    let mut weighted = vec![0.0; n];
    beta.row_mut(t_len - 1).fill(scale[t_len - 1]);

    for t in (0..t_len - 1).rev() {
        let (next, current) = beta.row_pair_mut(t + 1, t);
        backward_step(
            next,
            model.transition.as_slice(),
            model.emission.as_slice(),
            m,
            obs[t + 1],
            scale[t],
            &mut weighted,
            current,
        );
        if current.iter().any(|b| !b.is_finite()) {
            return Err(Degeneracy::BackwardOverflow { t });
        }
    }

    Ok(beta)
}
