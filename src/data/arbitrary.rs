//! Implementations of
//! [`Arbitrary`](https://docs.rs/arbitrary/latest/arbitrary/trait.Arbitrary.html)
//! for models and observation sequences, along with specification structs for
//! generating them with stronger guarantees.
//!
//! <div class="warning note">
//!
//! **Note**
//!
//! You must enable the *fuzzing* feature in your `Cargo.toml` to use these
//! functions.
//!
//! </div>

use crate::{data::ObservationSequence, hmm::Model, math::Matrix};
use arbitrary::{Arbitrary, Result, Unstructured};
use std::ops::RangeInclusive;

/// A specification for generating an arbitrary value of type `Output`.
pub trait ArbitrarySpecs<'a> {
    type Output;

    /// Generates an arbitrary value conforming to the specifications.
    ///
    /// ## Errors
    ///
    /// Any errors from the underlying [`Unstructured`] calls are propagated.
    fn make_arbitrary(&self, u: &mut Unstructured<'a>) -> Result<Self::Output>;
}

/// Fills `row` with a probability distribution built from arbitrary weights.
/// Every entry is positive.
fn stochastic_row(u: &mut Unstructured<'_>, row: &mut [f64]) -> Result<()> {
    let mut total = 0.0;
    for p in row.iter_mut() {
        *p = f64::from(u.int_in_range(1_u16..=1_000)?);
        total += *p;
    }
    for p in row.iter_mut() {
        *p /= total;
    }
    Ok(())
}

/// Specifications for generating an arbitrary [`Model`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ModelSpecs {
    /// The range of the number of hidden states
    pub n_states:  RangeInclusive<usize>,
    /// The range of the alphabet size
    pub n_symbols: RangeInclusive<usize>,
}

impl Default for ModelSpecs {
    fn default() -> Self {
        Self {
            n_states:  1..=4,
            n_symbols: 1..=27,
        }
    }
}

impl<'a> ArbitrarySpecs<'a> for ModelSpecs {
    type Output = Model;

    fn make_arbitrary(&self, u: &mut Unstructured<'a>) -> Result<Self::Output> {
        let n = u.int_in_range(self.n_states.clone())?.max(1);
        let m = u.int_in_range(self.n_symbols.clone())?.max(1);

        let mut initial = vec![0.0; n];
        stochastic_row(u, &mut initial)?;
        let mut transition = Matrix::new(0.0, n, n);
        for i in 0..n {
            stochastic_row(u, transition.row_mut(i))?;
        }
        let mut emission = Matrix::new(0.0, n, m);
        for i in 0..n {
            stochastic_row(u, emission.row_mut(i))?;
        }

        Ok(Model::new_unchecked(initial, transition, emission))
    }
}

impl<'a> Arbitrary<'a> for Model {
    #[inline]
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        ModelSpecs::default().make_arbitrary(u)
    }
}

/// Specifications for generating an arbitrary [`ObservationSequence`].
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ObservationSpecs {
    /// The alphabet size. `None` picks one in `1..=27`.
    pub n_symbols: Option<usize>,
    /// The range of the sequence length
    pub len:       RangeInclusive<usize>,
}

impl Default for ObservationSpecs {
    fn default() -> Self {
        Self {
            n_symbols: None,
            len:       1..=200,
        }
    }
}

impl<'a> ArbitrarySpecs<'a> for ObservationSpecs {
    type Output = ObservationSequence;

    fn make_arbitrary(&self, u: &mut Unstructured<'a>) -> Result<Self::Output> {
        let n_symbols = match self.n_symbols {
            Some(n) => n.max(1),
            None => u.int_in_range(1..=27)?,
        };
        let len = u.int_in_range(self.len.clone())?;
        let symbols = std::iter::repeat_with(|| u.choose_index(n_symbols))
            .take(len)
            .collect::<Result<Vec<_>>>()?;
        Ok(ObservationSequence::new_unchecked(symbols, n_symbols))
    }
}

impl<'a> Arbitrary<'a> for ObservationSequence {
    #[inline]
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        ObservationSpecs::default().make_arbitrary(u)
    }
}

/// A model paired with a non-empty observation sequence over its alphabet,
/// ready for a training step.
#[derive(Clone, Debug)]
pub struct TrainingInput {
    pub model:        Model,
    pub observations: ObservationSequence,
}

impl<'a> Arbitrary<'a> for TrainingInput {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let model = Model::arbitrary(u)?;
        let observations = ObservationSpecs {
            n_symbols: Some(model.n_symbols()),
            ..ObservationSpecs::default()
        }
        .make_arbitrary(u)?;
        Ok(TrainingInput { model, observations })
    }
}
