use crate::{
    data::ObservationSequence,
    hmm::{Degeneracy, Model, Posteriors},
    math::{MapFloat, Matrix},
};

/// The maximization step of Baum-Welch: replaces the parameters of `model`
/// with their re-estimates from `posteriors`.
///
/// * `π'[i] = gamma[0][i]`
/// * `A'[i][j] = Σ_{t<T-1} di_gamma[t][i][j] / Σ_{t<T-1} gamma[t][i]`, only
///   when `reestimate_transitions` is set. Otherwise `A` is left as it is.
/// * `B'[i][k] = Σ_{t: O[t]=k} gamma[t][i] / Σ_t gamma[t][i]`
///
/// The re-estimates are row-stochastic by construction. Nothing is written to
/// `model` unless every row can be re-estimated.
///
/// # Errors
///
/// [`Degeneracy::TransitionOccupancy`] or [`Degeneracy::StateOccupancy`] if
/// a state's occupancy (the denominator) is zero.
pub fn reestimate(
    model: &mut Model, obs: &ObservationSequence, posteriors: &Posteriors, reestimate_transitions: bool,
) -> Result<(), Degeneracy> {
    let n = model.n_states();
    let m = model.n_symbols();
    let gamma = &posteriors.gamma;

    let transition = if reestimate_transitions {
        let mut occupancy = vec![0.0; n];
        let mut numer = Matrix::new(0.0, n, n);
        for (t, xi) in posteriors.di_gamma.iter().enumerate() {
            for (o, &g) in occupancy.iter_mut().zip(gamma.row(t)) {
                *o += g;
            }
            for i in 0..n {
                for (acc, &x) in numer.row_mut(i).iter_mut().zip(xi.row(i)) {
                    *acc += x;
                }
            }
        }

        for (state, &occ) in occupancy.iter().enumerate() {
            let inv = occ.positive_recip().ok_or(Degeneracy::TransitionOccupancy { state })?;
            for a in numer.row_mut(state) {
                *a *= inv;
            }
        }
        Some(numer)
    } else {
        None
    };

    let mut occupancy = vec![0.0; n];
    let mut emission = Matrix::new(0.0, n, m);
    for (t, symbol) in obs.iter().enumerate() {
        for (i, &g) in gamma.row(t).iter().enumerate() {
            occupancy[i] += g;
            emission[(i, symbol)] += g;
        }
    }
    for (state, &occ) in occupancy.iter().enumerate() {
        let inv = occ.positive_recip().ok_or(Degeneracy::StateOccupancy { state })?;
        for b in emission.row_mut(state) {
            *b *= inv;
        }
    }

    model.initial.copy_from_slice(gamma.row(0));
    if let Some(transition) = transition {
        model.transition = transition;
    }
    model.emission = emission;
    Ok(())
}
