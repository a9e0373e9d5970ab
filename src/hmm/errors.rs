use crate::data::err::GetCode;
use std::{error::Error, fmt};

/// The pipeline stage at which a required divisor vanished or a value stopped
/// being finite.
///
/// A degeneracy abandons the restart it occurred in. It is never compared
/// against the best known model.
#[non_exhaustive]
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub enum Degeneracy {
    /// The forward probability mass at step `t` was zero (or its reciprocal
    /// overflowed)
    ForwardMass { t: usize },
    /// A scaled backward probability at step `t` was not finite
    BackwardOverflow { t: usize },
    /// The di-gamma normalizer at step `t` was zero or not finite
    PosteriorDenominator { t: usize },
    /// `state` was never occupied before the last step, so its transition row
    /// cannot be re-estimated
    TransitionOccupancy { state: usize },
    /// `state` was never occupied, so its emission row cannot be re-estimated
    StateOccupancy { state: usize },
    /// The log-likelihood was not finite
    NonFiniteScore,
}

impl fmt::Display for Degeneracy {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Degeneracy::ForwardMass { t } => write!(f, "the forward probability mass vanished at step {t}"),
            Degeneracy::BackwardOverflow { t } => write!(f, "the scaled backward probabilities overflowed at step {t}"),
            Degeneracy::PosteriorDenominator { t } => write!(f, "the posterior normalizer vanished at step {t}"),
            Degeneracy::TransitionOccupancy { state } => {
                write!(f, "state {state} has no occupancy before the last step")
            }
            Degeneracy::StateOccupancy { state } => write!(f, "state {state} has no occupancy"),
            Degeneracy::NonFiniteScore => write!(f, "the log-likelihood was not finite"),
        }
    }
}

impl fmt::Debug for Degeneracy {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// An enum representing errors that can happen when building or training an
/// HMM.
#[non_exhaustive]
#[derive(Clone, PartialEq)]
pub enum HmmError {
    /// The model must have at least one hidden state
    ZeroStates,
    /// The alphabet must have at least one symbol
    ZeroSymbols,
    /// The observation sequence was empty
    EmptySequence,
    /// The convergence threshold was negative or NaN
    InvalidEpsilon(f64),
    /// A perturbation scale was negative or not finite
    InvalidPerturbation(f64),
    /// A row of length `len` could not be drawn with every entry positive
    /// using the perturbation `scale`
    PerturbationTooLarge { len: usize, scale: f64 },
    /// A parameter had the wrong dimensions
    ShapeMismatch {
        what:     &'static str,
        expected: (usize, usize),
        found:    (usize, usize),
    },
    /// A parameter row was not a probability distribution
    NotStochastic { what: &'static str, row: usize, sum: f64 },
    /// An observation symbol was outside `[0, n_symbols)`
    SymbolOutOfRange {
        position:  usize,
        symbol:    usize,
        n_symbols: usize,
    },
    /// The text held too few alphabet symbols
    InsufficientText { needed: usize, found: usize },
    /// A numeric degeneracy abandoned the current attempt
    Degenerate(Degeneracy),
    /// Every restart degenerated, or no restart was requested
    NoValidModel { restarts: usize },
}

impl HmmError {
    /// Whether this error rejects the configuration or model before any
    /// computation starts.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HmmError::ZeroStates
                | HmmError::ZeroSymbols
                | HmmError::EmptySequence
                | HmmError::InvalidEpsilon(_)
                | HmmError::InvalidPerturbation(_)
                | HmmError::PerturbationTooLarge { .. }
                | HmmError::ShapeMismatch { .. }
                | HmmError::NotStochastic { .. }
        )
    }

    /// Whether this error is a recoverable numeric degeneracy.
    #[inline]
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, HmmError::Degenerate(_))
    }
}

impl From<Degeneracy> for HmmError {
    #[inline]
    fn from(d: Degeneracy) -> Self {
        HmmError::Degenerate(d)
    }
}

impl fmt::Display for HmmError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HmmError::ZeroStates => write!(f, "The model must have at least one state!"),
            HmmError::ZeroSymbols => write!(f, "The alphabet must have at least one symbol!"),
            HmmError::EmptySequence => write!(f, "The observation sequence is empty!"),
            HmmError::InvalidEpsilon(eps) => {
                write!(f, "The convergence threshold must be non-negative, but {eps} was given!")
            }
            HmmError::InvalidPerturbation(scale) => {
                write!(f, "Perturbation scales must be finite and non-negative, but {scale} was given!")
            }
            HmmError::PerturbationTooLarge { len, scale } => write!(
                f,
                "A perturbation of {scale} is too large to draw a positive row of length {len} around uniform"
            ),
            HmmError::ShapeMismatch { what, expected, found } => write!(
                f,
                "The {what} should be {}×{}, but it is {}×{}",
                expected.0, expected.1, found.0, found.1
            ),
            HmmError::NotStochastic { what, row, sum } => {
                write!(f, "Row {row} of the {what} is not a probability distribution (sum = {sum})")
            }
            HmmError::SymbolOutOfRange {
                position,
                symbol,
                n_symbols,
            } => write!(
                f,
                "Observation {position} has symbol {symbol}, which is outside of an alphabet of {n_symbols} symbols"
            ),
            HmmError::InsufficientText { needed, found } => {
                write!(f, "{needed} symbols were requested, but the text only has {found}")
            }
            HmmError::Degenerate(d) => write!(f, "Numeric degeneracy: {d}"),
            HmmError::NoValidModel { restarts } => write!(f, "No valid model found after {restarts} restarts!"),
        }
    }
}

impl fmt::Debug for HmmError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Error for HmmError {}
impl GetCode for HmmError {}
