use crate::{
    data::ObservationSequence,
    hmm::{Degeneracy, HmmError, Model, TrainingConfig, backward, forward, log_likelihood, posteriors, reestimate},
};
use log::trace;

/// Runs one EM iteration on `model`: forward pass, backward pass,
/// posteriors, then re-estimation in place.
///
/// Returns the log-likelihood of the model as it was *before* re-estimation,
/// since that is the model the forward pass scored.
///
/// The observations must be non-empty and use the model's alphabet (see
/// [`Model::check_observations`]).
///
/// # Errors
///
/// The [`Degeneracy`] of the first stage that failed. `model` is unchanged in
/// that case.
pub fn em_step(model: &mut Model, obs: &ObservationSequence, reestimate_transitions: bool) -> Result<f64, Degeneracy> {
    let pass = forward(model, obs)?;
    let beta = backward(model, obs, &pass.scale)?;
    let posteriors = posteriors(model, obs, &pass.alpha, &beta)?;
    let log_prob = log_likelihood(&pass.scale)?;
    reestimate(model, obs, &posteriors, reestimate_transitions)?;
    Ok(log_prob)
}

/// The result of training one model to convergence.
#[derive(Clone, PartialEq, Debug)]
pub struct FitSummary {
    /// The log-likelihood of the trained model
    pub log_prob:   f64,
    /// The number of EM iterations performed
    pub iterations: usize,
    /// `false` only when `max_iters` stopped training before the change in
    /// log-likelihood dropped to `epsilon`
    pub converged:  bool,
    /// The log-likelihood scored by each iteration, which is non-decreasing up
    /// to rounding
    pub history:    Vec<f64>,
}

/// Baum-Welch training of a single model, without restarts.
///
/// Iterations repeat at least `min_iters` times (and always at least once),
/// then until the absolute change in log-likelihood between consecutive
/// iterations is at most `epsilon`.
#[derive(Copy, Clone, Debug)]
pub struct BaumWelch<'a> {
    config: &'a TrainingConfig,
}

impl<'a> BaumWelch<'a> {
    #[inline]
    #[must_use]
    pub fn new(config: &'a TrainingConfig) -> Self {
        Self { config }
    }

    /// Trains `model` in place on `obs`.
    ///
    /// The reported `log_prob` is scored by one final forward pass, so it is
    /// exactly the log-likelihood of the model left in `model`.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`TrainingConfig::validate`], then
    /// [`HmmError::EmptySequence`] or [`HmmError::ShapeMismatch`] if `obs` does
    /// not fit the model, otherwise [`HmmError::Degenerate`] if any iteration
    /// degenerated. `model` is untouched unless training started.
    pub fn fit(&self, model: &mut Model, obs: &ObservationSequence) -> Result<FitSummary, HmmError> {
        self.config.validate()?;
        model.check_observations(obs)?;

        let mut previous = f64::NEG_INFINITY;
        let mut history = Vec::with_capacity(self.config.min_iters.max(1));
        let mut converged = true;

        loop {
            let log_prob = em_step(model, obs, self.config.reestimate_transitions)?;
            let delta = (log_prob - previous).abs();
            previous = log_prob;
            history.push(log_prob);
            trace!("iteration {}: log P = {log_prob}, delta = {delta}", history.len());

            if history.len() >= self.config.min_iters && delta <= self.config.epsilon {
                break;
            }
            if self.config.max_iters.is_some_and(|max| history.len() >= max) {
                converged = false;
                break;
            }
        }

        Ok(FitSummary {
            log_prob: model.log_likelihood(obs)?,
            iterations: history.len(),
            converged,
            history,
        })
    }
}
