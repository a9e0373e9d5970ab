//! Training discrete hidden Markov models with scaled Baum-Welch.
//!
//! One EM iteration runs five stages in order, each a free function over
//! explicitly owned tables:
//!
//! 1. [`forward`]: the scaled α-pass, producing `alpha` and the scale factors
//!    `c`.
//! 2. [`backward`]: the scaled β-pass, reusing `c`.
//! 3. [`posteriors`]: γ and di-gamma from `alpha`, `beta`, and the model.
//! 4. [`reestimate`]: new π, `B`, and (optionally) `A` from the posteriors.
//! 5. [`log_likelihood`]: ln P(O | λ) = -Σ ln `c[t]`.
//!
//! [`em_step`] chains them, [`BaumWelch`] repeats them to convergence, and
//! [`RandomRestartOptimizer`] repeats that from fresh random models, keeping
//! the best.
//!
//! ## Scaling
//!
//! Raw forward probabilities shrink geometrically with the sequence length
//! and underflow within a few hundred steps. Each row of `alpha` is therefore
//! rescaled to sum to one, and the same factors are applied to `beta`, which
//! cancels out in the posteriors. The factors also carry the likelihood:
//! `P(O | λ) = 1 / Π c[t]`.
//!
//! ## Degeneracy
//!
//! Any stage that would divide by zero (or by something whose reciprocal
//! overflows) returns a [`Degeneracy`] instead of producing `NaN`. The
//! optimizer abandons that restart and moves on. If every restart is
//! abandoned, [`HmmError::NoValidModel`] is returned.
//!
//! ## Frozen transitions
//!
//! With [`TrainingConfig::reestimate_transitions`] off, `A` keeps its initial
//! value and only π and `B` are trained. Combined with a
//! [digraph matrix](digraph_transitions) as a fixed `A`, the states act as
//! plaintext letters and `B` as the cipher key of a substitution cipher.

mod backward;
mod config;
mod errors;
mod forward;
mod init;
mod model;
mod posterior;
mod reestimate;
mod restart;
mod score;
mod train;

#[cfg(test)]
mod test;

pub use backward::*;
pub use config::*;
pub use errors::*;
pub use forward::*;
pub use init::*;
pub use model::*;
pub use posterior::*;
pub use reestimate::*;
pub use restart::*;
pub use score::*;
pub use train::*;
