//! Ethereum contract ABI encoding and decoding driven by runtime schemas.
//!
//! Schemas, either JSON ABI parameters or compact declarations such as
//! `"transfer(address to, uint256 amount)"`, are turned into immutable type
//! trees by a [`TypeFactory`]. Trees encode dynamic [`Value`]s into ABI
//! bytes and decode ABI bytes back into values.
//!
//! ```
//! use abi_encoder::{Method, TypeFactory, Value};
//!
//! let factory = TypeFactory::new();
//! let error = Method::from_declaration(&factory, "Error(string message)").unwrap();
//! let data = error.encode(&[Value::from("foobar")]).unwrap();
//! assert_eq!(&data[..4], [0x08, 0xc3, 0x79, 0xa0]);
//! assert_eq!(error.decode(&data).unwrap(), [Value::from("foobar")]);
//! ```

pub mod abi;
pub mod calldata;
pub mod declaration;
pub mod descriptor;
pub mod encode;
pub mod error;
pub mod factory;
pub mod fmt;
pub mod kind;
pub mod method;
pub mod primitive;
pub mod queue;
pub mod registry;
pub mod rules;
pub mod selector;
pub mod types;
pub mod value;

pub use self::{
    abi::{parse_abi, Abi, AbiItem},
    calldata::RawCalldata,
    descriptor::TypeDescriptor,
    encode::Encoded,
    error::{Error, Result},
    factory::TypeFactory,
    method::Method,
    registry::{RevertReason, RevertRegistry},
    rules::{DecodingRules, EncodingRules},
    selector::Selector,
    types::DataType,
    value::Value,
};
pub use ethaddr::{self, Address};
pub use ethnum::{self, I256, U256};
