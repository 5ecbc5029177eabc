//! Hexadecimal formatting and parsing helpers.

use hex::FromHexError;
use std::fmt::{self, Debug, Display, Formatter};

/// A `0x`-prefixed hexadecimal formater for byte slices.
pub struct Hex<'a>(pub &'a [u8]);

impl Debug for Hex<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Hex<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("0x")?;
        f.write_str(&hex::encode(self.0))
    }
}

/// Decodes a hex string, with or without `0x` prefix, into a byte vector.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, FromHexError> {
    hex::decode(strip_prefix(s))
}

/// Decodes a hex string, with or without `0x` prefix, into a byte array of
/// exactly the string's length.
pub fn decode_hex_array<const N: usize>(s: &str) -> Result<[u8; N], FromHexError> {
    let mut bytes = [0; N];
    hex::decode_to_slice(strip_prefix(s), &mut bytes)?;
    Ok(bytes)
}

fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_prefix() {
        assert_eq!(Hex(&[0x08, 0xc3, 0x79, 0xa0]).to_string(), "0x08c379a0");
        assert_eq!(format!("{:?}", Hex(&[])), "0x");
    }

    #[test]
    fn decodes_with_optional_prefix() {
        assert_eq!(decode_hex("0xc0ffee").unwrap(), [0xc0, 0xff, 0xee]);
        assert_eq!(decode_hex("c0ffee").unwrap(), [0xc0, 0xff, 0xee]);
        assert_eq!(decode_hex_array::<2>("0xbeef").unwrap(), [0xbe, 0xef]);
        assert!(decode_hex_array::<2>("0xbeefbeef").is_err());
        assert!(decode_hex("0xzz").is_err());
    }
}
