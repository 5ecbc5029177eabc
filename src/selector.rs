//! Function and error selectors, and the canonical signatures they are
//! computed from.

use crate::{
    descriptor::TypeDescriptor,
    error::{Error, Result},
    fmt::{self as hexfmt, Hex},
    primitive::Word,
};
use hex::FromHexError;
use sha3::{Digest as _, Keccak256};
use std::{
    fmt::{self, Debug, Display, Formatter},
    str::FromStr,
};

/// A 4-byte function or error selector.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Computes the selector for a canonical signature such as
    /// `transfer(address,uint256)`.
    ///
    /// The signature is hashed verbatim; use [`canonical_signature`] to
    /// normalize a signature built from a schema first.
    pub fn from_signature(signature: &str) -> Self {
        let digest = keccak256(signature.as_bytes());
        let mut selector = [0; 4];
        selector.copy_from_slice(&digest[..4]);
        Self(selector)
    }

    /// Reads a selector from the start of some calldata.
    pub fn from_calldata(data: &[u8]) -> Result<Self> {
        let bytes = data.get(..4).ok_or(Error::OutOfBounds {
            offset: 0,
            len: 4,
            available: data.len(),
        })?;
        let mut selector = [0; 4];
        selector.copy_from_slice(bytes);
        Ok(Self(selector))
    }
}

impl AsRef<[u8]> for Selector {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<[u8; 4]> for Selector {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl PartialEq<[u8; 4]> for Selector {
    fn eq(&self, other: &[u8; 4]) -> bool {
        self.0 == *other
    }
}

impl FromStr for Selector {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hexfmt::decode_hex_array(s).map(Self)
    }
}

impl Debug for Selector {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Selector").field(&Hex(&self.0)).finish()
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&Hex(&self.0), f)
    }
}

/// Computes the Keccak-256 digest of some data.
pub fn keccak256(data: &[u8]) -> Word {
    let mut word = Word::default();
    word.copy_from_slice(&Keccak256::digest(data));
    word
}

/// Builds the canonical signature `name(type,type,...)` for a list of schema
/// nodes. Field names and whitespace are dropped, type aliases such as `uint`
/// are expanded and tuples are written out as `(type,type,...)`.
pub fn canonical_signature(name: &str, params: &[TypeDescriptor]) -> Result<String> {
    let mut signature = String::from(name);
    signature.push('(');
    for (i, param) in params.iter().enumerate() {
        if i != 0 {
            signature.push(',');
        }
        signature.push_str(&param.canonical_type()?);
    }
    signature.push(')');
    Ok(signature)
}

/// Computes the selector of a compact declaration such as
/// `"Error(string message)"`.
pub fn selector_of(declaration: &str) -> Result<Selector> {
    let declaration = crate::declaration::parse(declaration)?;
    let signature = canonical_signature(&declaration.name, &declaration.inputs)?;
    Ok(Selector::from_signature(&signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn well_known_selectors() {
        assert_eq!(Selector::from_signature("Error(string)"), hex!("08c379a0"));
        assert_eq!(Selector::from_signature("Panic(uint256)"), hex!("4e487b71"));
        assert_eq!(
            Selector::from_signature("transfer(address,uint256)"),
            hex!("a9059cbb")
        );
    }

    #[test]
    fn selector_ignores_field_names_and_whitespace() {
        let a = selector_of("Error(string message)").unwrap();
        let b = selector_of("Error( string   reason )").unwrap();
        let c = selector_of("error Error(string)").unwrap();
        assert_eq!(a, hex!("08c379a0"));
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn expands_type_aliases_and_tuples() {
        let declaration =
            crate::declaration::parse("f(uint a, (int x, bytes32[2] y)[] b)").unwrap();
        assert_eq!(
            canonical_signature(&declaration.name, &declaration.inputs).unwrap(),
            "f(uint256,(int256,bytes32[2])[])",
        );
    }

    #[test]
    fn order_status_error_selector() {
        assert_eq!(
            selector_of("OrderStatusError(bytes32 orderHash, uint8 status)").unwrap(),
            hex!("fdb6ca8d"),
        );
    }

    #[test]
    fn parses_and_formats_hex() {
        let selector = "0x08c379a0".parse::<Selector>().unwrap();
        assert_eq!(selector, hex!("08c379a0"));
        assert_eq!(selector.to_string(), "0x08c379a0");
        assert_eq!(format!("{selector:?}"), "Selector(0x08c379a0)");
        assert!("0x08c379".parse::<Selector>().is_err());
    }

    #[test]
    fn selector_from_short_calldata() {
        assert!(matches!(
            Selector::from_calldata(&[1, 2, 3]),
            Err(Error::OutOfBounds { available: 3, .. })
        ));
    }
}
