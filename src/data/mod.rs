//! ## Data import and validation functions.
//!
//! Training operates on an [`ObservationSequence`], a validated sequence of
//! symbol codes. Text is turned into one with an [`Alphabet`]:
//!
//! ```
//! # use baum::prelude::*;
//! let obs = Alphabet::LettersAndSpace.encode(b"Attack at dawn");
//! assert_eq!(obs.len(), 14);
//! assert_eq!(obs.n_symbols(), 27);
//! ```

mod alphabet;
mod observations;

#[cfg(feature = "fuzzing")]
pub mod arbitrary;

pub mod err;

pub use alphabet::*;
pub use observations::*;
