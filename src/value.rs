//! Module containing dynamic Solidity value.

use ethaddr::Address;
use ethnum::{I256, U256};

/// A Solidity value.
///
/// This type is capabable of represenging all Solidity values dynamically,
/// allowing for "dynamic" encoding and decoding against a type tree built at
/// runtime. This is analogous to `serde_json::Value` for Solidity values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Address(Address),
    Bool(bool),
    Int(I256),
    Uint(U256),
    /// A `bytesN` value. Shorter values are right-padded when encoded.
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    /// A fixed or dynamic length array.
    Array(Vec<Value>),
    Tuple(Vec<Value>),
    /// A tuple with named fields.
    Struct(Vec<(String, Value)>),
}

impl Value {
    /// Creates a dynamic `bytes` value.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Creates a fixed `bytesN` value.
    pub fn fixed_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::FixedBytes(bytes.into())
    }

    /// Returns a short description of the value's shape, used in error
    /// messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
            Self::Struct(_) => "struct",
        }
    }

    /// Looks up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Address> for Value {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<U256> for Value {
    fn from(value: U256) -> Self {
        Self::Uint(value)
    }
}

impl From<I256> for Value {
    fn from(value: I256) -> Self {
        Self::Int(value)
    }
}

macro_rules! impl_from_integer {
    ($variant:ident($t:ty): $($i:ty),*) => {$(
        impl From<$i> for Value {
            fn from(value: $i) -> Self {
                Self::$variant(<$t>::from(value))
            }
        }
    )*};
}

impl_from_integer!(Uint(U256): u8, u16, u32, u64, u128);
impl_from_integer!(Int(I256): i8, i16, i32, i64, i128);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}
