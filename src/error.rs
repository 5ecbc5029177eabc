//! Errors raised while building type trees, encoding and decoding.

use crate::{declaration::ParseError, selector::Selector};
use ethnum::U256;
use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// An ABI encoding or decoding error.
#[derive(Debug, Error)]
pub enum Error {
    /// A schema node's type string does not match any known type family.
    #[error("unrecognized ABI type {0:?}")]
    UnrecognizedType(String),

    /// A value does not fit in the declared width of its type.
    #[error("value too wide for {ty}: needs {width} bytes")]
    ValueTooWide { ty: String, width: usize },

    /// Decoding tried to read past the end of the buffer.
    #[error("read of {len} bytes at offset {offset} out of bounds of {available} byte buffer")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    /// Strict decoding found non-canonical data.
    #[error("strict mode violation: {0}")]
    StrictModeViolation(String),

    /// A pointer resolved to a position outside of the buffer.
    #[error("malformed offset {offset} in {len} byte buffer")]
    MalformedOffset { offset: U256, len: usize },

    /// A value does not have the shape of the type it is encoded as.
    #[error("expected value of type {expected} but got {found}")]
    ValueMismatch { expected: String, found: String },

    /// Calldata does not start with the method's selector.
    #[error("selector mismatch: expected {expected} but got {found}")]
    SelectorMismatch { expected: Selector, found: Selector },

    /// No method is registered for the selector.
    #[error("unknown selector {0}")]
    UnknownSelector(Selector),

    /// A declaration string could not be parsed.
    #[error("invalid declaration: {0}")]
    Declaration(#[from] ParseError),

    /// A JSON ABI could not be deserialized.
    #[error("invalid JSON ABI: {0}")]
    Json(#[from] serde_json::Error),

    /// The ABI item cannot be encoded or decoded as a method.
    #[error("unsupported ABI item: {0}")]
    Unsupported(String),
}

impl Error {
    pub(crate) fn strict(message: impl Into<String>) -> Self {
        Self::StrictModeViolation(message.into())
    }

    pub(crate) fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Self::ValueMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
