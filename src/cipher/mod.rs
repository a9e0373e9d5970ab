//! Shift (Caesar) ciphers over symbol codes, and scoring a trained model's
//! recovered key against a known shift.
//!
//! ```
//! # use baum::prelude::*;
//! let plain = Alphabet::Letters.encode(b"attackatdawn");
//! let cipher = ShiftCipher::new(3, 26).unwrap();
//! let encrypted = cipher.encrypt(&plain).unwrap();
//! assert_eq!(Alphabet::Letters.decode(encrypted.as_slice()), b"dwwdfndwgdzq");
//! assert_eq!(cipher.decrypt(&encrypted).unwrap(), plain);
//! ```

use crate::{
    data::ObservationSequence,
    hmm::{HmmError, Model},
};

/// Adds a fixed `shift` to every symbol code, modulo the alphabet size.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ShiftCipher {
    shift:   usize,
    modulus: usize,
}

impl ShiftCipher {
    /// Creates a new [`ShiftCipher`]. `shift` is reduced modulo `modulus`.
    ///
    /// # Errors
    ///
    /// [`HmmError::ZeroSymbols`] if `modulus` is zero.
    pub fn new(shift: usize, modulus: usize) -> Result<Self, HmmError> {
        if modulus == 0 {
            return Err(HmmError::ZeroSymbols);
        }
        Ok(Self {
            shift: shift % modulus,
            modulus,
        })
    }

    #[inline]
    #[must_use]
    pub fn shift(&self) -> usize {
        self.shift
    }

    #[inline]
    #[must_use]
    pub fn modulus(&self) -> usize {
        self.modulus
    }

    fn check_alphabet(&self, n_symbols: usize) -> Result<(), HmmError> {
        if n_symbols == self.modulus {
            Ok(())
        } else {
            Err(HmmError::ShapeMismatch {
                what:     "cipher alphabet",
                expected: (1, self.modulus),
                found:    (1, n_symbols),
            })
        }
    }

    fn apply(&self, obs: &ObservationSequence, shift: usize) -> Result<ObservationSequence, HmmError> {
        self.check_alphabet(obs.n_symbols())?;
        let symbols = obs.iter().map(|s| (s + shift) % self.modulus).collect();
        Ok(ObservationSequence::new_unchecked(symbols, self.modulus))
    }

    /// Encrypts `plain` by shifting every code forward.
    ///
    /// # Errors
    ///
    /// [`HmmError::ShapeMismatch`] if the sequence's alphabet size differs from
    /// the modulus.
    #[inline]
    pub fn encrypt(&self, plain: &ObservationSequence) -> Result<ObservationSequence, HmmError> {
        self.apply(plain, self.shift)
    }

    /// Decrypts `encrypted` by shifting every code back.
    ///
    /// # Errors
    ///
    /// [`HmmError::ShapeMismatch`] if the sequence's alphabet size differs from
    /// the modulus.
    #[inline]
    pub fn decrypt(&self, encrypted: &ObservationSequence) -> Result<ObservationSequence, HmmError> {
        self.apply(encrypted, self.modulus - self.shift)
    }

    /// Counts the cipher symbols whose dominant state in `model` is the
    /// plaintext symbol this cipher maps onto them, i.e. how much of the key a
    /// model trained with letter states has recovered.
    ///
    /// # Errors
    ///
    /// [`HmmError::ShapeMismatch`] if the model's alphabet size differs from
    /// the modulus.
    pub fn matching_symbols(&self, model: &Model) -> Result<usize, HmmError> {
        self.check_alphabet(model.n_symbols())?;
        Ok(model
            .dominant_states()
            .into_iter()
            .enumerate()
            .filter(|&(symbol, state)| (state + self.shift) % self.modulus == symbol)
            .count())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::Matrix;

    #[test]
    fn shift_wraps() {
        let cipher = ShiftCipher::new(29, 26).unwrap();
        assert_eq!(cipher.shift(), 3);

        let obs = ObservationSequence::new(vec![0, 23, 25], 26).unwrap();
        assert_eq!(cipher.encrypt(&obs).unwrap().as_slice(), &[3, 0, 2]);
    }

    #[test]
    fn alphabet_must_match() {
        let cipher = ShiftCipher::new(1, 26).unwrap();
        let obs = ObservationSequence::new(vec![0, 26], 27).unwrap();
        assert!(cipher.encrypt(&obs).is_err());
        assert_eq!(ShiftCipher::new(1, 0).unwrap_err(), HmmError::ZeroSymbols);
    }

    #[test]
    fn key_recovery_score() {
        // Three letter states, each emitting the letter one further along
        let emission = Matrix::<f64>::from_rows(&[[0.1, 0.8, 0.1], [0.1, 0.1, 0.8], [0.8, 0.1, 0.1]]).unwrap();
        let model = Model::new(vec![1.0 / 3.0; 3], Matrix::new(1.0 / 3.0, 3, 3), emission).unwrap();
        assert_eq!(model.dominant_states(), vec![2, 0, 1]);

        assert_eq!(ShiftCipher::new(1, 3).unwrap().matching_symbols(&model).unwrap(), 3);
        assert_eq!(ShiftCipher::new(2, 3).unwrap().matching_symbols(&model).unwrap(), 0);
    }
}
