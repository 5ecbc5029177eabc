//! Contract methods: functions, errors and constructors.
//!
//! A [`Method`] pairs a selector with the tuples of its input and output
//! parameters. It is immutable once built, so a single instance can be
//! shared between threads and used for any number of calls.

use crate::{
    abi::{AbiItem, AbiItemKind},
    calldata::RawCalldata,
    declaration::{self, DeclarationKind},
    descriptor::TypeDescriptor,
    encode::Encoded,
    error::{Error, Result},
    factory::TypeFactory,
    rules::{DecodingRules, EncodingRules},
    selector::{canonical_signature, Selector},
    types::{check_consumed, Tuple},
    value::Value,
};

/// A contract method.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Method {
    name: String,
    selector: Option<Selector>,
    signature: String,
    inputs: Tuple,
    outputs: Tuple,
}

impl Method {
    /// Creates a function or error method, with a selector computed from its
    /// name and inputs.
    pub fn new(
        factory: &TypeFactory,
        name: impl Into<String>,
        inputs: &[TypeDescriptor],
        outputs: &[TypeDescriptor],
    ) -> Result<Self> {
        let name = name.into();
        let signature = canonical_signature(&name, inputs)?;
        let selector = Selector::from_signature(&signature);
        Self::build(factory, name, Some(selector), signature, inputs, outputs)
    }

    /// Creates a method without a selector, for encoding plain tuples of
    /// values.
    pub fn tuple(factory: &TypeFactory, inputs: &[TypeDescriptor]) -> Result<Self> {
        let signature = canonical_signature("", inputs)?;
        Self::build(factory, String::new(), None, signature, inputs, &[])
    }

    /// Creates a constructor method, whose encoded arguments get appended to
    /// contract creation code without a selector.
    pub fn constructor(factory: &TypeFactory, inputs: &[TypeDescriptor]) -> Result<Self> {
        let signature = canonical_signature("constructor", inputs)?;
        Self::build(
            factory,
            "constructor".to_owned(),
            None,
            signature,
            inputs,
            &[],
        )
    }

    /// Creates a method from a compact declaration such as
    /// `"function transfer(address to, uint256 amount) returns (bool)"`.
    pub fn from_declaration(factory: &TypeFactory, declaration: &str) -> Result<Self> {
        let declaration = declaration::parse(declaration)?;
        match declaration.kind {
            DeclarationKind::Constructor => Self::constructor(factory, &declaration.inputs),
            DeclarationKind::Event => Err(Error::Unsupported(format!(
                "event {}",
                declaration.name
            ))),
            _ => Self::new(
                factory,
                declaration.name,
                &declaration.inputs,
                &declaration.outputs,
            ),
        }
    }

    /// Creates a method from a JSON ABI item.
    pub fn from_abi_item(factory: &TypeFactory, item: &AbiItem) -> Result<Self> {
        match item.kind {
            AbiItemKind::Function | AbiItemKind::Error => {
                Self::new(factory, item.name.clone(), &item.inputs, &item.outputs)
            }
            AbiItemKind::Constructor => Self::constructor(factory, &item.inputs),
            kind => Err(Error::Unsupported(format!("{kind:?} {}", item.name))),
        }
    }

    fn build(
        factory: &TypeFactory,
        name: String,
        selector: Option<Selector>,
        signature: String,
        inputs: &[TypeDescriptor],
        outputs: &[TypeDescriptor],
    ) -> Result<Self> {
        let method = Self {
            inputs: factory.create_tuple(inputs)?,
            outputs: factory.create_tuple(outputs)?,
            name,
            selector,
            signature,
        };
        tracing::trace!(signature = %method.signature, selector = ?method.selector, "created method");
        Ok(method)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the method selector, `None` for constructors and plain tuples.
    pub fn selector(&self) -> Option<Selector> {
        self.selector
    }

    /// Returns the canonical signature the selector is computed from.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn inputs(&self) -> &Tuple {
        &self.inputs
    }

    pub fn outputs(&self) -> &Tuple {
        &self.outputs
    }

    /// Encodes a call with the specified input values.
    pub fn encode(&self, values: &[Value]) -> Result<Vec<u8>> {
        Ok(self.encode_with_rules(values, &EncodingRules::default())?.data)
    }

    /// Encodes a call with the specified input values and encoding rules.
    pub fn encode_with_rules(&self, values: &[Value], rules: &EncodingRules) -> Result<Encoded> {
        let block = self.inputs.encode_values(values, "")?;
        Ok(block.finish(self.selector, rules))
    }

    /// Encodes return data with the specified output values.
    pub fn encode_return(&self, values: &[Value]) -> Result<Vec<u8>> {
        Ok(self
            .encode_return_with_rules(values, &EncodingRules::default())?
            .data)
    }

    pub fn encode_return_with_rules(
        &self,
        values: &[Value],
        rules: &EncodingRules,
    ) -> Result<Encoded> {
        let block = self.outputs.encode_values(values, "")?;
        Ok(block.finish(None, rules))
    }

    /// Decodes the input values of a call.
    pub fn decode(&self, data: &[u8]) -> Result<Vec<Value>> {
        self.decode_with_rules(data, &DecodingRules::default())
    }

    /// Decodes the input values of a call with the specified decoding rules.
    ///
    /// The selector is checked against the method's for methods that have one.
    pub fn decode_with_rules(&self, data: &[u8], rules: &DecodingRules) -> Result<Vec<Value>> {
        self.decode_tuple(&self.inputs, data, self.selector, rules)
            .map_err(|err| {
                tracing::debug!(method = %self.signature, ?err, "failed to decode call");
                err
            })
    }

    /// Decodes return data.
    pub fn decode_return(&self, data: &[u8]) -> Result<Vec<Value>> {
        self.decode_return_with_rules(data, &DecodingRules::default())
    }

    pub fn decode_return_with_rules(
        &self,
        data: &[u8],
        rules: &DecodingRules,
    ) -> Result<Vec<Value>> {
        self.decode_tuple(&self.outputs, data, None, rules)
            .map_err(|err| {
                tracing::debug!(method = %self.signature, ?err, "failed to decode return data");
                err
            })
    }

    fn decode_tuple(
        &self,
        tuple: &Tuple,
        data: &[u8],
        selector: Option<Selector>,
        rules: &DecodingRules,
    ) -> Result<Vec<Value>> {
        let mut calldata = RawCalldata::new(data, selector.is_some())?;
        if let (Some(expected), Some(found)) = (selector, calldata.selector()) {
            if expected != found {
                return Err(Error::SelectorMismatch { expected, found });
            }
        }

        let values = tuple.decode_fields(&mut calldata, rules)?;
        check_consumed(&calldata, rules)?;
        Ok(values)
    }
}
