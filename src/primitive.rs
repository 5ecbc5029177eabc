//! Conversion of primitive values to and from Ethereum 32-byte words.

use ethaddr::Address;
use ethnum::{I256, U256};

/// An Ethereum 32-byte word.
pub type Word = [u8; 32];

/// The number of bytes in a word.
pub const WORD_SIZE: usize = 32;

/// Trait reprenting any type that can be converted to and from a single
/// Ethereum 32-byte word.
pub trait Primitive {
    /// Converts a primitive type to an Ethereum 32-byte word.
    fn to_word(&self) -> Word;

    /// Reads the type from an Ethereum 32-byte word.
    ///
    /// Note that this has casting semantics, bytes that do not fit in the
    /// type are silently dropped. Callers that care about canonical words
    /// check them before converting.
    fn from_word(word: Word) -> Self;
}

impl Primitive for U256 {
    fn to_word(&self) -> Word {
        self.to_be_bytes()
    }

    fn from_word(word: Word) -> Self {
        Self::from_be_bytes(word)
    }
}

impl Primitive for I256 {
    fn to_word(&self) -> Word {
        self.to_be_bytes()
    }

    fn from_word(word: Word) -> Self {
        Self::from_be_bytes(word)
    }
}

impl Primitive for bool {
    fn to_word(&self) -> Word {
        let mut word = Word::default();
        word[31] = *self as u8;
        word
    }

    fn from_word(word: Word) -> Self {
        word != Word::default()
    }
}

impl Primitive for Address {
    fn to_word(&self) -> Word {
        let mut word = Word::default();
        word[12..].copy_from_slice(&self.0);
        word
    }

    fn from_word(word: Word) -> Self {
        let mut address = [0; 20];
        address.copy_from_slice(&word[12..]);
        Address(address)
    }
}

/// Converts a length or offset to a word.
pub fn usize_to_word(value: usize) -> Word {
    U256::new(value as u128).to_word()
}

/// Converts a word to a `usize` if it fits.
pub fn word_to_usize(word: Word) -> Option<usize> {
    let (hi, lo) = U256::from_word(word).into_words();
    if hi != 0 {
        return None;
    }
    usize::try_from(lo).ok()
}

/// Returns the number of padding bytes needed to round `len` up to a whole
/// number of words.
pub fn padding(len: usize) -> usize {
    (WORD_SIZE - len % WORD_SIZE) % WORD_SIZE
}

/// Pads the specified size to a 32-byte boundry.
pub fn pad32(len: usize) -> usize {
    len + padding(len)
}
