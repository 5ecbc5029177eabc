//! Length-prefixed types: `bytes` and `string`.

use crate::{
    calldata::RawCalldata,
    encode::Block,
    error::{Error, Result},
    primitive::{word_to_usize, WORD_SIZE},
    rules::DecodingRules,
    value::Value,
};
use std::fmt::{self, Display, Formatter};

/// A dynamic, length-prefixed type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Blob {
    Bytes,
    String,
}

impl Blob {
    /// Encodes a value as its length followed by its right-padded contents.
    pub fn encode(&self, value: &Value, label: &str) -> Result<Block> {
        let bytes = match (self, value) {
            (Self::Bytes, Value::Bytes(bytes)) => bytes.clone(),
            (Self::String, Value::String(string)) => string.as_bytes().to_vec(),
            (_, value) => return Err(Error::mismatch(self, value.describe())),
        };
        Ok(Block::blob(label, bytes))
    }

    /// Decodes a value at the cursor, consuming its padding.
    pub fn decode(&self, calldata: &mut RawCalldata, rules: &DecodingRules) -> Result<Value> {
        let offset = calldata.offset();
        let len = word_to_usize(calldata.pop_word()?).ok_or(Error::OutOfBounds {
            offset: offset + WORD_SIZE,
            len: usize::MAX,
            available: calldata.len(),
        })?;

        let words = calldata.pop_words(len.div_ceil(WORD_SIZE))?;
        let (contents, padding) = words.split_at(len);
        if rules.strict && padding.iter().any(|b| *b != 0) {
            return Err(Error::strict(format!("dirty padding in {self}")));
        }

        match self {
            Self::Bytes => Ok(Value::Bytes(contents.to_vec())),
            Self::String if rules.strict => String::from_utf8(contents.to_vec())
                .map(Value::String)
                .map_err(|_| Error::strict("string is not valid UTF-8")),
            Self::String => Ok(Value::String(
                String::from_utf8_lossy(contents).into_owned(),
            )),
        }
    }

    pub fn default_value(&self) -> Value {
        match self {
            Self::Bytes => Value::Bytes(Vec::new()),
            Self::String => Value::String(String::new()),
        }
    }
}

impl Display for Blob {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn decode(blob: Blob, data: &[u8], strict: bool) -> Result<Value> {
        let mut calldata = RawCalldata::new(data, false)?;
        blob.decode(&mut calldata, &DecodingRules::new().with_strict(strict))
    }

    #[test]
    fn encodes_length_then_padded_contents() {
        let block = Blob::String.encode(&Value::from("foobar"), "message").unwrap();
        assert_eq!(
            block.to_bytes(),
            hex!(
                "0000000000000000000000000000000000000000000000000000000000000006
                 666f6f6261720000000000000000000000000000000000000000000000000000"
            )
        );

        let block = Blob::Bytes.encode(&Value::bytes([0xff; 33]), "").unwrap();
        assert_eq!(block.byte_len(), 3 * 32);

        let block = Blob::Bytes.encode(&Value::bytes(Vec::new()), "").unwrap();
        assert_eq!(block.to_bytes(), [0; 32]);
    }

    #[test]
    fn decodes_contents_and_skips_padding() {
        let data = hex!(
            "0000000000000000000000000000000000000000000000000000000000000003
             0102030000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(
            decode(Blob::Bytes, &data, true).unwrap(),
            Value::bytes(hex!("010203"))
        );
        assert!(matches!(
            decode(Blob::Bytes, &data[..63], false),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn strict_mode_checks_padding_and_utf8() {
        let dirty = hex!(
            "0000000000000000000000000000000000000000000000000000000000000001
             6100000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(
            decode(Blob::String, &dirty, false).unwrap(),
            Value::from("a")
        );
        assert!(matches!(
            decode(Blob::String, &dirty, true),
            Err(Error::StrictModeViolation(_))
        ));

        let invalid = hex!(
            "0000000000000000000000000000000000000000000000000000000000000001
             ff00000000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(
            decode(Blob::String, &invalid, false).unwrap(),
            Value::from("\u{fffd}")
        );
        assert!(decode(Blob::String, &invalid, true).is_err());
    }

    #[test]
    fn rejects_huge_lengths() {
        assert!(matches!(
            decode(Blob::Bytes, &[0xff; 64], false),
            Err(Error::OutOfBounds { .. })
        ));
    }
}
