use crate::{hmm::Degeneracy, math::MapFloat};

/// Recovers ln P(O | λ) from the scale factors of a forward pass:
/// `-Σ_t ln c[t]`.
///
/// # Errors
///
/// [`Degeneracy::NonFiniteScore`] if the result is not finite.
#[inline]
pub fn log_likelihood(scale: &[f64]) -> Result<f64, Degeneracy> {
    (-scale.iter().map(|c| c.ln()).sum::<f64>())
        .into_option()
        .ok_or(Degeneracy::NonFiniteScore)
}
