//! Composite types: tuples and arrays.
//!
//! Both are encoded as a head of their members, with dynamic members (which
//! the factory wraps in [`super::Pointer`]s) encoded as an offset in the head
//! and their contents in a tail following it.

use super::DataType;
use crate::{
    calldata::RawCalldata,
    encode::{Block, Member},
    error::{Error, Result},
    primitive::{word_to_usize, WORD_SIZE},
    rules::DecodingRules,
    value::Value,
};
use std::{
    borrow::Cow,
    fmt::{self, Formatter},
};

/// A named tuple field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Field {
    /// The field name, empty for unnamed fields.
    pub name: String,
    pub ty: DataType,
}

impl Field {
    /// Returns the key of the field in a struct value: its name, or its
    /// position for unnamed fields.
    pub fn key(&self, index: usize) -> Cow<'_, str> {
        if self.name.is_empty() {
            Cow::Owned(index.to_string())
        } else {
            Cow::Borrowed(&self.name)
        }
    }
}

/// A tuple type.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tuple {
    fields: Vec<Field>,
}

impl Tuple {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn is_static(&self) -> bool {
        self.static_width_in_words().is_some()
    }

    /// Returns the width of the tuple in words if all of its fields are
    /// static, `None` otherwise or when its size in bytes overflows.
    pub fn static_width_in_words(&self) -> Option<usize> {
        self.fields
            .iter()
            .try_fold(0_usize, |width, field| {
                width.checked_add(field.ty.static_width_in_words()?)
            })
            .filter(|width| addressable(*width))
    }

    /// Returns the default value of each field.
    pub fn default_values(&self) -> Vec<Value> {
        self.fields
            .iter()
            .map(|field| field.ty.default_value())
            .collect()
    }

    /// Encodes a tuple or struct value.
    pub fn encode(&self, value: &Value, label: &str) -> Result<Block> {
        match value {
            Value::Tuple(values) => self.encode_values(values, label),
            Value::Struct(entries) => {
                let values = self
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(i, field)| {
                        let key = field.key(i);
                        entries
                            .iter()
                            .find(|(name, _)| *name == key)
                            .map(|(_, value)| value)
                            .ok_or_else(|| Error::mismatch(format!("field {key}"), "struct"))
                    })
                    .collect::<Result<Vec<_>>>()?;
                if entries.len() != values.len() {
                    return Err(self.arity_mismatch(entries.len()));
                }
                self.encode_members(values, label)
            }
            value => Err(Error::mismatch(self.canonical(), value.describe())),
        }
    }

    /// Encodes a list of field values.
    pub fn encode_values(&self, values: &[Value], label: &str) -> Result<Block> {
        if values.len() != self.fields.len() {
            return Err(self.arity_mismatch(values.len()));
        }
        self.encode_members(values.iter().collect(), label)
    }

    fn encode_members(&self, values: Vec<&Value>, label: &str) -> Result<Block> {
        let members = self
            .fields
            .iter()
            .zip(values)
            .enumerate()
            .map(|(i, (field, value))| {
                let key = field.key(i);
                let label = if label.is_empty() {
                    key.into_owned()
                } else {
                    format!("{label}.{key}")
                };
                member(&field.ty, value, &label)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Block::set(label, None, members))
    }

    /// Decodes a tuple at the cursor, as a struct when converting structs.
    pub fn decode(&self, calldata: &mut RawCalldata, rules: &DecodingRules) -> Result<Value> {
        let values = self.decode_fields(calldata, rules)?;
        Ok(if rules.convert_structs {
            Value::Struct(
                self.fields
                    .iter()
                    .enumerate()
                    .zip(values)
                    .map(|((i, field), value)| (field.key(i).into_owned(), value))
                    .collect(),
            )
        } else {
            Value::Tuple(values)
        })
    }

    /// Decodes the field values of a tuple at the cursor.
    pub fn decode_fields(
        &self,
        calldata: &mut RawCalldata,
        rules: &DecodingRules,
    ) -> Result<Vec<Value>> {
        calldata.start_scope();
        let values = self
            .fields
            .iter()
            .map(|field| field.ty.decode_from(calldata, rules))
            .collect::<Result<Vec<_>>>()?;
        calldata.end_scope();
        Ok(values)
    }

    /// Writes the canonical tuple signature, e.g. `(uint256,string)`.
    pub fn fmt_canonical(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i != 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", field.ty.canonical())?;
        }
        f.write_str(")")
    }

    fn canonical(&self) -> String {
        struct Canonical<'a>(&'a Tuple);

        impl fmt::Display for Canonical<'_> {
            fn fmt(&self, f: &mut Formatter) -> fmt::Result {
                self.0.fmt_canonical(f)
            }
        }

        Canonical(self).to_string()
    }

    fn arity_mismatch(&self, found: usize) -> Error {
        Error::mismatch(
            format!("{} with {} fields", self.canonical(), self.fields.len()),
            format!("{found} values"),
        )
    }
}

/// A fixed or dynamic length array type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Array {
    element: Box<DataType>,
    length: Option<usize>,
}

impl Array {
    /// Creates a new array type, with a length for fixed size arrays.
    pub fn new(element: DataType, length: Option<usize>) -> Self {
        Self {
            element: Box::new(element),
            length,
        }
    }

    pub fn element(&self) -> &DataType {
        &self.element
    }

    /// Returns the length of fixed size arrays.
    pub fn length(&self) -> Option<usize> {
        self.length
    }

    pub fn is_static(&self) -> bool {
        self.static_width_in_words().is_some()
    }

    pub fn static_width_in_words(&self) -> Option<usize> {
        self.length?
            .checked_mul(self.element.static_width_in_words()?)
            .filter(|width| addressable(*width))
    }

    pub fn default_value(&self) -> Value {
        match self.length {
            Some(length) => Value::Array(vec![self.element.default_value(); length]),
            None => Value::Array(Vec::new()),
        }
    }

    /// Writes the array suffix, `[N]` or `[]`.
    pub fn fmt_suffix(&self, f: &mut Formatter) -> fmt::Result {
        match self.length {
            Some(length) => write!(f, "[{length}]"),
            None => f.write_str("[]"),
        }
    }

    /// Encodes an array value, with a length prefix for dynamic arrays.
    pub fn encode(&self, value: &Value, label: &str) -> Result<Block> {
        let values = match value {
            Value::Array(values) => values,
            value => return Err(Error::mismatch("array", value.describe())),
        };
        if let Some(length) = self.length {
            if values.len() != length {
                return Err(Error::mismatch(
                    format!("array of length {length}"),
                    format!("array of length {}", values.len()),
                ));
            }
        }

        let members = values
            .iter()
            .enumerate()
            .map(|(i, value)| member(&self.element, value, &format!("{label}[{i}]")))
            .collect::<Result<Vec<_>>>()?;
        let prefix = self.length.is_none().then_some(values.len());
        Ok(Block::set(label, prefix, members))
    }

    /// Decodes an array at the cursor.
    pub fn decode(&self, calldata: &mut RawCalldata, rules: &DecodingRules) -> Result<Value> {
        let length = match self.length {
            Some(length) => length,
            None => {
                let offset = calldata.offset();
                word_to_usize(calldata.pop_word()?).ok_or(Error::OutOfBounds {
                    offset: offset + WORD_SIZE,
                    len: usize::MAX,
                    available: calldata.len(),
                })?
            }
        };

        // Each element takes up at least its head width, and at least one
        // byte for zero-width elements, which bounds the length before
        // anything gets allocated.
        let remaining = calldata.len() - calldata.offset();
        let element_len = self
            .element
            .head_width_in_words()
            .checked_mul(WORD_SIZE)
            .map(|len| len.max(1));
        let head = element_len
            .and_then(|len| length.checked_mul(len))
            .filter(|head| *head <= remaining)
            .ok_or(Error::OutOfBounds {
                offset: calldata.offset(),
                len: element_len.map_or(usize::MAX, |len| length.saturating_mul(len)),
                available: calldata.len(),
            })?;

        calldata.start_scope();
        let mut values = Vec::with_capacity(length.min(head / WORD_SIZE + 1));
        for _ in 0..length {
            values.push(self.element.decode_from(calldata, rules)?);
        }
        calldata.end_scope();
        Ok(Value::Array(values))
    }
}

/// Returns `true` if a static width in words can be expressed in bytes.
fn addressable(width: usize) -> bool {
    width.checked_mul(WORD_SIZE).is_some()
}

/// Encodes a member of a set, in the tail for pointers.
fn member(ty: &DataType, value: &Value, label: &str) -> Result<Member> {
    let block = ty.encode_block(value, label)?;
    Ok(match ty {
        DataType::Pointer(_) => Member::Pointer(block),
        _ => Member::Inline(block),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        descriptor::TypeDescriptor, factory::TypeFactory, kind::BitWidth, types::Scalar,
    };
    use hex_literal::hex;

    fn records() -> DataType {
        TypeFactory::new()
            .create(&TypeDescriptor::tuple(
                "records",
                "tuple[]",
                vec![
                    TypeDescriptor::new("id", "uint256"),
                    TypeDescriptor::new("name", "string"),
                ],
            ))
            .unwrap()
    }

    #[test]
    fn encodes_array_of_dynamic_tuples() {
        let ty = records();
        let value = Value::Array(vec![
            Value::Tuple(vec![1_u8.into(), "a".into()]),
            Value::Tuple(vec![2_u8.into(), "b".into()]),
        ]);

        let encoded = ty.encode(&value).unwrap();
        assert_eq!(
            encoded,
            hex!(
                "0000000000000000000000000000000000000000000000000000000000000002
                 0000000000000000000000000000000000000000000000000000000000000040
                 00000000000000000000000000000000000000000000000000000000000000c0
                 0000000000000000000000000000000000000000000000000000000000000001
                 0000000000000000000000000000000000000000000000000000000000000040
                 0000000000000000000000000000000000000000000000000000000000000001
                 6100000000000000000000000000000000000000000000000000000000000000
                 0000000000000000000000000000000000000000000000000000000000000002
                 0000000000000000000000000000000000000000000000000000000000000040
                 0000000000000000000000000000000000000000000000000000000000000001
                 6200000000000000000000000000000000000000000000000000000000000000"
            )
        );
        assert_eq!(ty.decode(&encoded).unwrap(), value);
    }

    #[test]
    fn converts_structs() {
        let ty = records();
        let value = Value::Array(vec![Value::Struct(vec![
            ("name".to_owned(), "a".into()),
            ("id".to_owned(), 1_u8.into()),
        ])]);

        let encoded = ty.encode(&value).unwrap();
        assert_eq!(
            ty.encode(&Value::Array(vec![Value::Tuple(vec![
                1_u8.into(),
                "a".into()
            ])]))
            .unwrap(),
            encoded
        );

        let decoded = ty
            .decode_with_rules(&encoded, &DecodingRules::new().with_convert_structs(true))
            .unwrap();
        let Value::Array(records) = decoded else {
            panic!("expected array");
        };
        assert_eq!(records[0].field("id"), Some(&Value::from(1_u8)));
        assert_eq!(records[0].field("name"), Some(&Value::from("a")));
    }

    #[test]
    fn unnamed_struct_fields_are_keyed_by_position() {
        let ty = TypeFactory::new()
            .create(&TypeDescriptor::tuple(
                "",
                "tuple",
                vec![
                    TypeDescriptor::new("", "bool"),
                    TypeDescriptor::new("", "uint8"),
                ],
            ))
            .unwrap();
        let encoded = ty
            .encode(&Value::Tuple(vec![true.into(), 7_u8.into()]))
            .unwrap();
        assert_eq!(
            ty.decode_with_rules(&encoded, &DecodingRules::new().with_convert_structs(true))
                .unwrap(),
            Value::Struct(vec![
                ("0".to_owned(), true.into()),
                ("1".to_owned(), 7_u8.into()),
            ])
        );
    }

    #[test]
    fn rejects_wrong_arity() {
        let ty = records();
        assert!(matches!(
            ty.encode(&Value::Array(vec![Value::Tuple(vec![1_u8.into()])])),
            Err(Error::ValueMismatch { .. })
        ));
        assert!(matches!(
            ty.encode(&Value::Array(vec![Value::Struct(vec![(
                "id".to_owned(),
                1_u8.into()
            )])])),
            Err(Error::ValueMismatch { .. })
        ));

        let fixed = TypeFactory::new()
            .create(&TypeDescriptor::new("", "uint8[2]"))
            .unwrap();
        assert!(matches!(
            fixed.encode(&Value::Array(vec![1_u8.into()])),
            Err(Error::ValueMismatch { .. })
        ));
    }

    #[test]
    fn rejects_lengths_exceeding_buffer() {
        let ty = TypeFactory::new()
            .create(&TypeDescriptor::new("", "uint256[]"))
            .unwrap();
        let mut data = vec![0_u8; 64];
        data[31] = 2;
        assert!(matches!(ty.decode(&data), Err(Error::OutOfBounds { .. })));

        let data = [0xff_u8; 32];
        assert!(matches!(ty.decode(&data), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn bounds_lengths_of_zero_width_elements() {
        let ty = DataType::Array(Array::new(DataType::Tuple(Tuple::default()), None));

        let mut data = [0_u8; 32];
        assert_eq!(ty.decode(&data).unwrap(), Value::Array(vec![]));

        data[29..].copy_from_slice(&hex!("989680"));
        assert!(matches!(ty.decode(&data), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn static_width_overflow_makes_arrays_dynamic() {
        let uint256 = DataType::Scalar(Scalar::Uint(BitWidth::new(256).unwrap()));
        let huge = Array::new(uint256, Some(1 << 59));
        assert_eq!(huge.static_width_in_words(), None);
        assert!(!huge.is_static());

        let ty = DataType::Array(Array::new(DataType::Array(huge), Some(1)));
        assert!(ty.is_dynamic());
        assert!(matches!(
            ty.decode(&[0_u8; 32]),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn rejects_pointers_outside_buffer() {
        let ty = TypeFactory::new()
            .create(&TypeDescriptor::new("", "string[]"))
            .unwrap();
        let data = hex!(
            "0000000000000000000000000000000000000000000000000000000000000001
             0000000000000000000000000000000000000000000000000000000000001000"
        );
        assert!(matches!(
            ty.decode(&data),
            Err(Error::MalformedOffset { .. })
        ));
    }
}
