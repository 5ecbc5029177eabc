//! JSON contract ABI items.
//!
//! Only the parts of an ABI needed to build methods are modelled. Items are
//! deserialized leniently, so that ABIs produced by older compiler versions
//! (with `constant` and `payable` flags instead of `stateMutability`) are
//! also accepted.

use crate::{
    descriptor::TypeDescriptor,
    error::Result,
    primitive::Word,
    selector::{canonical_signature, keccak256, Selector},
};
use serde::{Deserialize, Serialize};

/// A Solidity JSON ABI - i.e. a vector of items.
pub type Abi = Vec<AbiItem>;

/// Parses a JSON ABI.
pub fn parse_abi(json: &str) -> Result<Abi> {
    Ok(serde_json::from_str(json)?)
}

/// A JSON ABI item.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiItem {
    /// The kind of the item.
    #[serde(rename = "type")]
    pub kind: AbiItemKind,
    /// The name, empty for constructors, fallback and receive functions.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<TypeDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<TypeDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
    /// Whether or not the item modifies state.
    ///
    /// This was provided by older compiler versions and was deprecated in
    /// favour of `state_mutability`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    /// Whether or not the item is payable.
    ///
    /// This was provided by older compiler versions and was deprecated in
    /// favour of `state_mutability`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
    /// Whether or not an event is anonymous.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous: Option<bool>,
}

impl AbiItem {
    /// Retrieves the state mutablility, falling back to constant and payable
    /// flags if not explicitely set.
    pub fn state_mutability(&self) -> StateMutability {
        match (self.state_mutability, self.constant, self.payable) {
            (Some(state_mutability), _, _) => state_mutability,
            (None, Some(constant), Some(payable)) => StateMutability::with_flags(constant, payable),
            _ => StateMutability::Payable,
        }
    }

    /// Returns the canonical signature of the item, e.g.
    /// `transfer(address,uint256)`.
    pub fn signature(&self) -> Result<String> {
        canonical_signature(&self.name, &self.inputs)
    }

    /// Computes the selector of functions and errors.
    pub fn selector(&self) -> Result<Option<Selector>> {
        Ok(match self.kind {
            AbiItemKind::Function | AbiItemKind::Error => {
                Some(Selector::from_signature(&self.signature()?))
            }
            _ => None,
        })
    }

    /// Computes the topic of non-anonymous events.
    pub fn topic(&self) -> Result<Option<Word>> {
        Ok(match self.kind {
            AbiItemKind::Event if self.anonymous != Some(true) => {
                Some(keccak256(self.signature()?.as_bytes()))
            }
            _ => None,
        })
    }
}

/// The kind of ABI item.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiItemKind {
    Function,
    Constructor,
    /// A "receive Ether" function.
    Receive,
    Fallback,
    Event,
    Error,
}

/// Code execution state mutability.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    /// Function that executes without reading blockchain state.
    Pure,
    /// Function that reads, but does not modify, blockchain state.
    View,
    /// Function that potentially modifies blockchain state, but cannot receive
    /// any Ether value.
    #[default]
    NonPayable,
    /// Function that potentially modifies blockchain state, and can receive
    /// Ether value.
    Payable,
}

impl StateMutability {
    /// Returns the state mutability given constant and payable flags.
    fn with_flags(constant: bool, payable: bool) -> StateMutability {
        match (constant, payable) {
            (_, true) => Self::Payable,
            (false, _) => Self::NonPayable,
            (true, _) => Self::View,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const ABI: &str = r#"[
        {
            "type": "function",
            "name": "transfer",
            "inputs": [
                { "name": "to", "type": "address", "internalType": "address" },
                { "name": "value", "type": "uint256", "internalType": "uint256" }
            ],
            "outputs": [{ "name": "", "type": "bool", "internalType": "bool" }],
            "stateMutability": "nonpayable"
        },
        {
            "type": "event",
            "name": "Transfer",
            "inputs": [
                { "name": "from", "type": "address", "indexed": true },
                { "name": "to", "type": "address", "indexed": true },
                { "name": "value", "type": "uint256", "indexed": false }
            ],
            "anonymous": false
        },
        {
            "type": "error",
            "name": "Error",
            "inputs": [{ "name": "message", "type": "string" }]
        },
        {
            "type": "constructor",
            "inputs": [],
            "payable": false,
            "constant": false
        },
        { "type": "fallback", "payable": true }
    ]"#;

    #[test]
    fn parses_json_abi() {
        let abi = parse_abi(ABI).unwrap();
        assert_eq!(
            abi.iter().map(|item| item.kind).collect::<Vec<_>>(),
            [
                AbiItemKind::Function,
                AbiItemKind::Event,
                AbiItemKind::Error,
                AbiItemKind::Constructor,
                AbiItemKind::Fallback,
            ]
        );

        assert_eq!(abi[0].outputs, [TypeDescriptor::new("", "bool")]);
        assert_eq!(abi[0].state_mutability(), StateMutability::NonPayable);
        assert_eq!(abi[3].state_mutability(), StateMutability::NonPayable);
        assert_eq!(abi[4].state_mutability(), StateMutability::Payable);
        assert!(abi[3].name.is_empty());
    }

    #[test]
    fn computes_selectors_and_topics() {
        let abi = parse_abi(ABI).unwrap();
        assert_eq!(abi[0].signature().unwrap(), "transfer(address,uint256)");
        assert_eq!(abi[0].selector().unwrap().unwrap(), hex!("a9059cbb"));
        assert_eq!(abi[2].selector().unwrap().unwrap(), hex!("08c379a0"));
        assert_eq!(abi[1].selector().unwrap(), None);
        assert_eq!(
            abi[1].topic().unwrap().unwrap(),
            hex!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"),
        );
        assert_eq!(abi[0].topic().unwrap(), None);
    }

    #[test]
    fn rejects_invalid_json() {
        assert!(matches!(
            parse_abi(r#"[{ "type": "modifier" }]"#),
            Err(crate::error::Error::Json(_))
        ));
    }
}
