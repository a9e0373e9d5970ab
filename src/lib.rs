#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::wildcard_imports,
    clippy::enum_glob_use,
    clippy::many_single_char_names
)]

/// Shift ciphers and key recovery scoring.
pub mod cipher;
/// Observation sequences, text alphabets, and error handling helpers.
pub mod data;
/// Hidden Markov models and their Baum-Welch training.
pub mod hmm;

/// Seeds, random observation sequences, and sampling from a model.
pub mod generate;
/// Matrices and floating point utilities.
pub mod math;

/// Common structures and traits re-exported
pub mod prelude {
    pub use crate::cipher::ShiftCipher;
    pub use crate::data::{Alphabet, ObservationSequence, err::OrFail};
    pub use crate::generate::{rand_observations, sample_observations};
    pub use crate::hmm::{
        BaumWelch, BestModel, Degeneracy, FitSummary, HmmError, Model, Perturbation, RandomRestartOptimizer,
        TrainingConfig, digraph_transitions,
    };
    pub use crate::math::Matrix;
}
