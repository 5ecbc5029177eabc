//! The ABI type tree.
//!
//! A [`DataType`] tree is built once from a schema by the
//! [`crate::factory::TypeFactory`] and is then reused, immutably, for any
//! number of encode and decode calls.

pub mod blob;
pub mod pointer;
pub mod scalar;
pub mod set;

pub use self::{
    blob::Blob,
    pointer::Pointer,
    scalar::Scalar,
    set::{Array, Field, Tuple},
};
use crate::{
    calldata::RawCalldata,
    encode::Block,
    error::{Error, Result},
    rules::DecodingRules,
    value::Value,
};
use std::fmt::{self, Display, Formatter};

/// A node of the ABI type tree.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataType {
    /// A one-word type: `address`, `bool`, `intN`, `uintN` or `bytesN`.
    Scalar(Scalar),
    /// A length-prefixed type: `bytes` or `string`.
    Blob(Blob),
    Tuple(Tuple),
    Array(Array),
    /// A dynamic type embedded in a tuple or array.
    Pointer(Pointer),
}

impl DataType {
    /// Returns `true` if the type's encoded width is independent of its value.
    pub fn is_static(&self) -> bool {
        match self {
            Self::Scalar(_) => true,
            Self::Blob(_) | Self::Pointer(_) => false,
            Self::Tuple(tuple) => tuple.is_static(),
            Self::Array(array) => array.is_static(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        !self.is_static()
    }

    /// Returns the number of words of a static type's encoding, `None` for
    /// dynamic types.
    pub fn static_width_in_words(&self) -> Option<usize> {
        match self {
            Self::Scalar(_) => Some(1),
            Self::Blob(_) | Self::Pointer(_) => None,
            Self::Tuple(tuple) => tuple.static_width_in_words(),
            Self::Array(array) => array.static_width_in_words(),
        }
    }

    /// Returns the number of words the type takes up in the head of its
    /// parent.
    pub fn head_width_in_words(&self) -> usize {
        self.static_width_in_words().unwrap_or(1)
    }

    /// Returns the direct children of the node.
    pub fn children(&self) -> Vec<&DataType> {
        match self {
            Self::Scalar(_) | Self::Blob(_) => Vec::new(),
            Self::Tuple(tuple) => tuple.fields().iter().map(|field| &field.ty).collect(),
            Self::Array(array) => vec![array.element()],
            Self::Pointer(pointer) => vec![pointer.target()],
        }
    }

    /// Returns the formatter for the canonical signature of the type, with
    /// tuples expanded to `(type,type,...)`.
    pub fn canonical(&self) -> Canonical<'_> {
        Canonical(self)
    }

    /// ABI-encodes a value as a standalone payload.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(self.encode_block(value, "")?.to_bytes())
    }

    /// ABI-decodes a standalone payload.
    pub fn decode(&self, data: &[u8]) -> Result<Value> {
        self.decode_with_rules(data, &DecodingRules::default())
    }

    /// ABI-decodes a standalone payload with the specified rules.
    pub fn decode_with_rules(&self, data: &[u8], rules: &DecodingRules) -> Result<Value> {
        let mut calldata = RawCalldata::new(data, false)?;
        let value = self.decode_from(&mut calldata, rules)?;
        check_consumed(&calldata, rules)?;
        Ok(value)
    }

    /// Returns the value an all-zero encoding decodes to.
    pub fn default_value(&self) -> Value {
        match self {
            Self::Scalar(scalar) => scalar.default_value(),
            Self::Blob(blob) => blob.default_value(),
            Self::Tuple(tuple) => Value::Tuple(tuple.default_values()),
            Self::Array(array) => array.default_value(),
            Self::Pointer(pointer) => pointer.target().default_value(),
        }
    }

    /// Encodes a value into a layout block.
    pub(crate) fn encode_block(&self, value: &Value, label: &str) -> Result<Block> {
        match self {
            Self::Scalar(scalar) => Ok(Block::word(label, scalar.encode(value)?)),
            Self::Blob(blob) => blob.encode(value, label),
            Self::Tuple(tuple) => tuple.encode(value, label),
            Self::Array(array) => array.encode(value, label),
            Self::Pointer(pointer) => pointer.target().encode_block(value, label),
        }
    }

    /// Decodes a value at the cursor's current position.
    pub(crate) fn decode_from(
        &self,
        calldata: &mut RawCalldata,
        rules: &DecodingRules,
    ) -> Result<Value> {
        match self {
            Self::Scalar(scalar) => scalar.decode(calldata, rules),
            Self::Blob(blob) => blob.decode(calldata, rules),
            Self::Tuple(tuple) => tuple.decode(calldata, rules),
            Self::Array(array) => array.decode(calldata, rules),
            Self::Pointer(pointer) => pointer.decode(calldata, rules),
        }
    }
}

/// Formats the Solidity type of the node, e.g. `uint256`, `tuple[]`.
impl Display for DataType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "{scalar}"),
            Self::Blob(blob) => write!(f, "{blob}"),
            Self::Tuple(_) => f.write_str("tuple"),
            Self::Array(array) => {
                write!(f, "{}", array.element())?;
                array.fmt_suffix(f)
            }
            Self::Pointer(pointer) => write!(f, "{}", pointer.target()),
        }
    }
}

/// Formatter for the canonical representation of a type.
///
/// This is the string representation that is used for hashing in order to
/// compute selectors.
pub struct Canonical<'a>(&'a DataType);

impl Display for Canonical<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.0 {
            DataType::Tuple(tuple) => tuple.fmt_canonical(f),
            DataType::Array(array) => {
                write!(f, "{}", array.element().canonical())?;
                array.fmt_suffix(f)
            }
            DataType::Pointer(pointer) => write!(f, "{}", pointer.target().canonical()),
            ty => write!(f, "{ty}"),
        }
    }
}

/// Fails strict decoding when bytes remain past the furthest byte that was
/// decoded.
pub(crate) fn check_consumed(calldata: &RawCalldata, rules: &DecodingRules) -> Result<()> {
    if rules.strict && calldata.consumed() < calldata.len() {
        return Err(Error::strict(format!(
            "{} trailing bytes after decoded data",
            calldata.len() - calldata.consumed()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{descriptor::TypeDescriptor, factory::TypeFactory};
    use ethaddr::address;
    use ethnum::U256;
    use hex_literal::hex;

    fn create(ty: &str) -> DataType {
        TypeFactory::new()
            .create(&TypeDescriptor::new("", ty))
            .unwrap()
    }

    #[test]
    fn reports_static_types() {
        for (ty, width) in [
            ("address", Some(1)),
            ("bool", Some(1)),
            ("int8", Some(1)),
            ("bytes7", Some(1)),
            ("uint256[3]", Some(3)),
            ("uint8[2][3]", Some(6)),
            ("string", None),
            ("bytes", None),
            ("uint8[]", None),
            ("string[2]", None),
        ] {
            let ty = create(ty);
            assert_eq!(ty.static_width_in_words(), width, "{ty}");
            assert_eq!(ty.is_static(), width.is_some(), "{ty}");
        }
    }

    #[test]
    fn static_encodings_have_fixed_width() {
        let ty = create("uint16[3]");
        for values in [[0_u16, 0, 0], [1, 2, 3], [u16::MAX; 3]] {
            let value = Value::Array(values.into_iter().map(Value::from).collect());
            let encoded = ty.encode(&value).unwrap();
            assert_eq!(encoded.len(), ty.static_width_in_words().unwrap() * 32);
            assert_eq!(ty.decode(&encoded).unwrap(), value);
        }
    }

    #[test]
    fn encodes_dynamic_uint8_array() {
        let ty = create("uint8[]");
        let value = Value::Array(vec![1_u8.into(), 2_u8.into(), 3_u8.into()]);
        let encoded = ty.encode(&value).unwrap();
        assert_eq!(
            encoded,
            hex!(
                "0000000000000000000000000000000000000000000000000000000000000003
                 0000000000000000000000000000000000000000000000000000000000000001
                 0000000000000000000000000000000000000000000000000000000000000002
                 0000000000000000000000000000000000000000000000000000000000000003"
            )
        );
        assert_eq!(ty.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn formats_solidity_types() {
        let ty = TypeFactory::new()
            .create(&TypeDescriptor::tuple(
                "",
                "tuple[2][]",
                vec![
                    TypeDescriptor::new("a", "uint"),
                    TypeDescriptor::new("b", "string[]"),
                ],
            ))
            .unwrap();
        assert_eq!(ty.to_string(), "tuple[2][]");
        assert_eq!(ty.canonical().to_string(), "(uint256,string[])[2][]");
        assert_eq!(ty.children().len(), 1);
    }

    #[test]
    fn default_values() {
        assert_eq!(create("uint8").default_value(), Value::Uint(U256::ZERO));
        assert_eq!(
            create("bytes2[2]").default_value(),
            Value::Array(vec![Value::FixedBytes(vec![0; 2]); 2])
        );
        assert_eq!(create("string[]").default_value(), Value::Array(vec![]));
        assert_eq!(create("bytes").default_value(), Value::Bytes(vec![]));

        let ty = create("address[2]");
        let zero = vec![0; 64];
        assert_eq!(ty.decode(&zero).unwrap(), ty.default_value());
    }

    #[test]
    fn round_trips_nested_values() {
        let ty = TypeFactory::new()
            .create(&TypeDescriptor::tuple(
                "",
                "tuple",
                vec![
                    TypeDescriptor::new("to", "address"),
                    TypeDescriptor::new("memo", "string"),
                    TypeDescriptor::new("amounts", "uint256[][2]"),
                    TypeDescriptor::new("data", "bytes"),
                    TypeDescriptor::new("flag", "bool"),
                ],
            ))
            .unwrap();
        let value = Value::Tuple(vec![
            address!("0x0101010101010101010101010101010101010101").into(),
            "a memo which is more than thirty-two bytes long".into(),
            Value::Array(vec![
                Value::Array(vec![1_u64.into(), 2_u64.into()]),
                Value::Array(vec![]),
            ]),
            Value::bytes(hex!("deadbeef")),
            true.into(),
        ]);

        let encoded = ty.encode(&value).unwrap();
        assert_eq!(ty.decode(&encoded).unwrap(), value);
        assert_eq!(
            ty.decode_with_rules(&encoded, &DecodingRules::new().with_strict(true))
                .unwrap(),
            value
        );

        assert!(matches!(
            ty.decode(&encoded[..encoded.len() - 1]),
            Err(Error::OutOfBounds { .. })
        ));
        for len in 0..encoded.len() {
            assert!(
                ty.decode(&encoded[..len]).is_err(),
                "decoding truncated buffer of {len} bytes"
            );
        }
    }

    #[test]
    fn strict_rejects_trailing_bytes() {
        let ty = create("uint256");
        let mut data = vec![0; 32];
        data.push(0);
        assert!(ty.decode(&data).is_ok());
        assert!(matches!(
            ty.decode_with_rules(&data, &DecodingRules::new().with_strict(true)),
            Err(Error::StrictModeViolation(_))
        ));
    }
}
