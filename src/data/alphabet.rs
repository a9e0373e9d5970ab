use crate::{data::ObservationSequence, hmm::HmmError};

/// Marks bytes that are dropped during encoding.
const SKIP: u8 = u8::MAX;

/// Builds the byte-to-symbol lookup table for the English letters, folding
/// case, with the space optionally mapped to symbol 26.
const fn letter_table(with_space: bool) -> [u8; 256] {
    let mut table = [SKIP; 256];
    let mut i = 0;
    while i < 26 {
        table[b'a' as usize + i] = i as u8;
        table[b'A' as usize + i] = i as u8;
        i += 1;
    }
    if with_space {
        table[b' ' as usize] = 26;
    }
    table
}

static LETTERS: [u8; 256] = letter_table(false);
static LETTERS_AND_SPACE: [u8; 256] = letter_table(true);

/// The text alphabets used to turn raw text into an [`ObservationSequence`].
///
/// Upper case letters fold onto lower case ones and every other byte is
/// dropped, so `b"Hi, there!"` encodes like `b"hithere"` (or `b"hi there"`
/// with [`Alphabet::LettersAndSpace`]).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Alphabet {
    /// `a` through `z`, 26 symbols
    Letters,
    /// `a` through `z` followed by the space, 27 symbols
    LettersAndSpace,
}

impl Alphabet {
    /// The number of symbols, `M`.
    #[inline]
    #[must_use]
    pub const fn n_symbols(self) -> usize {
        match self {
            Alphabet::Letters => 26,
            Alphabet::LettersAndSpace => 27,
        }
    }

    /// Selects the alphabet with `n_symbols` symbols, if there is one.
    #[inline]
    #[must_use]
    pub const fn from_n_symbols(n_symbols: usize) -> Option<Self> {
        match n_symbols {
            26 => Some(Alphabet::Letters),
            27 => Some(Alphabet::LettersAndSpace),
            _ => None,
        }
    }

    #[inline]
    fn table(self) -> &'static [u8; 256] {
        match self {
            Alphabet::Letters => &LETTERS,
            Alphabet::LettersAndSpace => &LETTERS_AND_SPACE,
        }
    }

    /// The symbol code for `byte`, or `None` if the byte is not part of the
    /// alphabet.
    #[inline]
    #[must_use]
    pub fn symbol(self, byte: u8) -> Option<usize> {
        match self.table()[byte as usize] {
            SKIP => None,
            s => Some(s as usize),
        }
    }

    /// The lower case byte for a symbol code, or `None` if it is out of range.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn byte(self, symbol: usize) -> Option<u8> {
        match symbol {
            0..26 => Some(b'a' + symbol as u8),
            26 if self == Alphabet::LettersAndSpace => Some(b' '),
            _ => None,
        }
    }

    /// Encodes all of `text`, dropping bytes outside the alphabet.
    #[must_use]
    pub fn encode(self, text: &[u8]) -> ObservationSequence {
        let symbols = text.iter().filter_map(|&b| self.symbol(b)).collect();
        ObservationSequence::new_unchecked(symbols, self.n_symbols())
    }

    /// Encodes the first `len` retained symbols of `text`.
    ///
    /// # Errors
    ///
    /// [`HmmError::InsufficientText`] if `text` holds fewer than `len` symbols
    /// of the alphabet.
    pub fn encode_prefix(self, text: &[u8], len: usize) -> Result<ObservationSequence, HmmError> {
        let symbols: Vec<usize> = text.iter().filter_map(|&b| self.symbol(b)).take(len).collect();
        if symbols.len() < len {
            return Err(HmmError::InsufficientText {
                needed: len,
                found:  symbols.len(),
            });
        }
        Ok(ObservationSequence::new_unchecked(symbols, self.n_symbols()))
    }

    /// Decodes symbol codes back into lower case text. Codes outside the
    /// alphabet become `?`.
    #[must_use]
    pub fn decode(self, symbols: &[usize]) -> Vec<u8> {
        symbols.iter().map(|&s| self.byte(s).unwrap_or(b'?')).collect()
    }
}
