use crate::hmm::HmmError;
use std::ops::Index;

/// An ordered sequence of symbol codes, each in `[0, n_symbols)`.
///
/// The range check happens once, at construction, so the training engine can
/// index emission columns with the codes directly. The sequence is immutable
/// once built.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ObservationSequence {
    symbols:   Vec<usize>,
    n_symbols: usize,
}

impl ObservationSequence {
    /// Creates a new [`ObservationSequence`] over an alphabet of `n_symbols`
    /// symbols.
    ///
    /// # Errors
    ///
    /// [`HmmError::ZeroSymbols`] if `n_symbols` is zero, or
    /// [`HmmError::SymbolOutOfRange`] for the first code that is not less than
    /// `n_symbols`.
    pub fn new(symbols: Vec<usize>, n_symbols: usize) -> Result<Self, HmmError> {
        if n_symbols == 0 {
            return Err(HmmError::ZeroSymbols);
        }

        if let Some((position, &symbol)) = symbols.iter().enumerate().find(|&(_, &s)| s >= n_symbols) {
            return Err(HmmError::SymbolOutOfRange {
                position,
                symbol,
                n_symbols,
            });
        }

        Ok(Self { symbols, n_symbols })
    }

    /// Creates a new [`ObservationSequence`] without checking the codes.
    ///
    /// The caller must guarantee every code is less than `n_symbols`.
    #[inline]
    #[must_use]
    pub(crate) fn new_unchecked(symbols: Vec<usize>, n_symbols: usize) -> Self {
        Self { symbols, n_symbols }
    }

    /// The sequence length, `T`.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The alphabet size, `M`.
    #[inline]
    #[must_use]
    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.symbols
    }

    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, usize>> {
        self.symbols.iter().copied()
    }

    /// How many times each symbol occurs.
    #[must_use]
    pub fn symbol_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_symbols];
        for s in self.iter() {
            counts[s] += 1;
        }
        counts
    }
}

impl Index<usize> for ObservationSequence {
    type Output = usize;

    #[inline]
    fn index(&self, t: usize) -> &Self::Output {
        &self.symbols[t]
    }
}

impl AsRef<[usize]> for ObservationSequence {
    #[inline]
    fn as_ref(&self) -> &[usize] {
        &self.symbols
    }
}

impl From<ObservationSequence> for Vec<usize> {
    #[inline]
    fn from(obs: ObservationSequence) -> Self {
        obs.symbols
    }
}
