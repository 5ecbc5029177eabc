//! Parsed Solidity type strings.
//!
//! A type string like `uint8[2][]` is parsed exactly once into a [`TypeKind`]
//! which the type factory then dispatches on.

use crate::error::{Error, Result};
use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
    str::FromStr,
};

/// An integer bit width.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BitWidth(u32);

impl BitWidth {
    /// Checked bit-width creation.
    ///
    /// Bitwidths must be multiple of 8s between 8 and 256.
    pub fn new(bit_width: u32) -> Option<Self> {
        match bit_width {
            n @ 8..=256 if n % 8 == 0 => Some(Self(bit_width)),
            _ => None,
        }
    }

    /// Returns the width in bytes.
    pub fn bytes(&self) -> usize {
        self.0 as usize / 8
    }
}

impl Default for BitWidth {
    fn default() -> Self {
        Self(256)
    }
}

impl Deref for BitWidth {
    type Target = u32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A fixed byte array length.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ByteLength(usize);

impl ByteLength {
    /// Checked byte length creation.
    ///
    /// Fixed byte arrays are between 1 and 32 bytes long.
    pub fn new(len: usize) -> Option<Self> {
        match len {
            1..=32 => Some(Self(len)),
            _ => None,
        }
    }
}

impl Deref for ByteLength {
    type Target = usize;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// The kind of a Solidity type, as described by its type string.
///
/// Tuples only record that they are tuples, their components come from the
/// schema node the type string belongs to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TypeKind {
    Address,
    Bool,
    Int(BitWidth),
    Uint(BitWidth),
    FixedBytes(ByteLength),
    Bytes,
    String,
    Tuple,
    /// An array of an element kind, with a length for fixed size arrays.
    Array(Box<TypeKind>, Option<usize>),
}

impl TypeKind {
    /// Returns `true` if the innermost element of the kind is a tuple.
    pub fn is_tuple(&self) -> bool {
        match self {
            Self::Tuple => true,
            Self::Array(element, _) => element.is_tuple(),
            _ => false,
        }
    }

    /// Writes the kind with tuples expanded to the specified component
    /// signature, e.g. `(uint256,bool)[]`.
    pub fn fmt_with_components(&self, f: &mut impl fmt::Write, components: &str) -> fmt::Result {
        match self {
            Self::Tuple => f.write_str(components),
            Self::Array(element, length) => {
                element.fmt_with_components(f, components)?;
                fmt_array_suffix(f, *length)
            }
            kind => write!(f, "{kind}"),
        }
    }
}

impl Display for TypeKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::Int(width) => write!(f, "int{}", **width),
            Self::Uint(width) => write!(f, "uint{}", **width),
            Self::FixedBytes(len) => write!(f, "bytes{}", **len),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Tuple => f.write_str("tuple"),
            Self::Array(element, length) => {
                write!(f, "{element}")?;
                fmt_array_suffix(f, *length)
            }
        }
    }
}

impl FromStr for TypeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let unrecognized = || Error::UnrecognizedType(s.to_owned());

        if let Some(rest) = s.strip_suffix(']') {
            let (element, length) = rest.rsplit_once('[').ok_or_else(unrecognized)?;
            let length = match length {
                "" => None,
                n => Some(
                    number(n)
                        .filter(|n| *n > 0)
                        .ok_or_else(unrecognized)?,
                ),
            };
            let element = element.parse().map_err(|_| unrecognized())?;
            return Ok(Self::Array(Box::new(element), length));
        }

        let kind = match s {
            "address" => Self::Address,
            "bool" => Self::Bool,
            "int" => Self::Int(BitWidth::default()),
            "uint" => Self::Uint(BitWidth::default()),
            "bytes" => Self::Bytes,
            "string" => Self::String,
            "tuple" => Self::Tuple,
            _ => {
                if let Some(n) = s.strip_prefix("uint") {
                    Self::Uint(width(n).ok_or_else(unrecognized)?)
                } else if let Some(n) = s.strip_prefix("int") {
                    Self::Int(width(n).ok_or_else(unrecognized)?)
                } else if let Some(n) = s.strip_prefix("bytes") {
                    let len = number(n).and_then(ByteLength::new);
                    Self::FixedBytes(len.ok_or_else(unrecognized)?)
                } else {
                    return Err(unrecognized());
                }
            }
        };
        Ok(kind)
    }
}

fn fmt_array_suffix(f: &mut impl fmt::Write, length: Option<usize>) -> fmt::Result {
    match length {
        Some(n) => write!(f, "[{n}]"),
        None => f.write_str("[]"),
    }
}

/// Parses a decimal number without sign or leading zeros.
fn number(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) || (s.len() > 1 && s.starts_with('0'))
    {
        return None;
    }
    s.parse().ok()
}

fn width(s: &str) -> Option<BitWidth> {
    BitWidth::new(number(s)?.try_into().ok()?)
}
