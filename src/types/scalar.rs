//! One-word types: `address`, `bool`, `intN`, `uintN` and `bytesN`.

use crate::{
    calldata::RawCalldata,
    error::{Error, Result},
    kind::{BitWidth, ByteLength},
    primitive::{Primitive, Word, WORD_SIZE},
    rules::DecodingRules,
    value::Value,
};
use ethaddr::Address;
use ethnum::{I256, U256};
use std::fmt::{self, Display, Formatter};

/// A static type encoded in a single word.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Scalar {
    Address,
    Bool,
    Int(BitWidth),
    Uint(BitWidth),
    FixedBytes(ByteLength),
}

impl Scalar {
    /// Encodes a value into its word.
    ///
    /// Numbers, addresses and booleans are right-aligned, fixed bytes are
    /// left-aligned.
    pub fn encode(&self, value: &Value) -> Result<Word> {
        match (self, value) {
            (Self::Address, Value::Address(address)) => Ok(address.to_word()),
            (Self::Bool, Value::Bool(value)) => Ok(value.to_word()),
            (Self::Int(width), Value::Int(value)) => {
                self.check_width(int_byte_width(*value), width.bytes())?;
                Ok(value.to_word())
            }
            (Self::Uint(width), Value::Uint(value)) => {
                self.check_width(uint_byte_width(*value), width.bytes())?;
                Ok(value.to_word())
            }
            (Self::FixedBytes(len), Value::FixedBytes(bytes)) => {
                self.check_width(bytes.len(), **len)?;
                let mut word = Word::default();
                word[..bytes.len()].copy_from_slice(bytes);
                Ok(word)
            }
            (_, value) => Err(Error::mismatch(self, value.describe())),
        }
    }

    /// Decodes a value from the next word of the calldata.
    pub fn decode(&self, calldata: &mut RawCalldata, rules: &DecodingRules) -> Result<Value> {
        let word = calldata.pop_word()?;
        match self {
            Self::Address => {
                if rules.strict && word[..12] != [0; 12] {
                    return Err(Error::strict("dirty upper bytes in address"));
                }
                Ok(Value::Address(Address::from_word(word)))
            }
            Self::Bool => match U256::from_word(word) {
                value if value <= U256::ONE => Ok(Value::Bool(value == U256::ONE)),
                value => Err(self.too_wide(uint_byte_width(value))),
            },
            Self::Int(width) => {
                let value = I256::from_word(word);
                self.check_width(int_byte_width(value), width.bytes())?;
                Ok(Value::Int(value))
            }
            Self::Uint(width) => {
                let value = U256::from_word(word);
                self.check_width(uint_byte_width(value), width.bytes())?;
                Ok(Value::Uint(value))
            }
            Self::FixedBytes(len) => {
                if rules.strict && word[**len..].iter().any(|b| *b != 0) {
                    return Err(Error::strict(format!("dirty padding in {self}")));
                }
                Ok(Value::FixedBytes(word[..**len].to_vec()))
            }
        }
    }

    /// Returns the value of the all-zero word.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Address => Value::Address(Address([0; 20])),
            Self::Bool => Value::Bool(false),
            Self::Int(_) => Value::Int(I256::ZERO),
            Self::Uint(_) => Value::Uint(U256::ZERO),
            Self::FixedBytes(len) => Value::FixedBytes(vec![0; **len]),
        }
    }

    fn check_width(&self, width: usize, max: usize) -> Result<()> {
        if width > max {
            return Err(self.too_wide(width));
        }
        Ok(())
    }

    fn too_wide(&self, width: usize) -> Error {
        Error::ValueTooWide {
            ty: self.to_string(),
            width,
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::Int(width) => write!(f, "int{}", **width),
            Self::Uint(width) => write!(f, "uint{}", **width),
            Self::FixedBytes(len) => write!(f, "bytes{}", **len),
        }
    }
}

/// Returns the number of bytes needed to represent an unsigned integer.
fn uint_byte_width(value: U256) -> usize {
    let bits = 256 - value.leading_zeros() as usize;
    bits.div_ceil(8)
}

/// Returns the number of bytes needed to represent a signed integer in two's
/// complement, including its sign bit.
fn int_byte_width(value: I256) -> usize {
    let magnitude = if value.is_negative() { !value } else { value };
    let bits = 256 - magnitude.leading_zeros() as usize + 1;
    bits.div_ceil(8).min(WORD_SIZE)
}
