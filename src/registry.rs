//! Decoding of revert data.

use crate::{
    error::{Error, Result},
    factory::TypeFactory,
    method::Method,
    selector::Selector,
    value::Value,
};
use std::collections::HashMap;

/// A table of custom errors keyed by selector, used to decode revert data.
///
/// The table is populated up front and only read afterwards, so it can be
/// shared between threads without locking.
#[derive(Clone, Debug)]
pub struct RevertRegistry {
    errors: HashMap<Selector, Method>,
}

/// A decoded revert reason.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevertReason {
    /// The canonical signature of the matched error, e.g. `Error(string)`.
    pub signature: String,
    pub selector: Selector,
    pub values: Vec<Value>,
}

impl RevertRegistry {
    /// Creates a registry with the built-in `Error(string)` and
    /// `Panic(uint256)` errors.
    pub fn new(factory: &TypeFactory) -> Result<Self> {
        let mut registry = Self::empty();
        registry.register(Method::from_declaration(factory, "Error(string message)")?);
        registry.register(Method::from_declaration(factory, "Panic(uint256 code)")?);
        Ok(registry)
    }

    /// Creates a registry without any errors.
    pub fn empty() -> Self {
        Self {
            errors: HashMap::new(),
        }
    }

    /// Registers an error, replacing any error with the same selector.
    /// Methods without a selector are ignored.
    pub fn register(&mut self, error: Method) {
        if let Some(selector) = error.selector() {
            self.errors.insert(selector, error);
        }
    }

    /// Registers an error from a compact declaration, e.g.
    /// `"error InsufficientBalance(uint256 available, uint256 required)"`.
    pub fn register_declaration(&mut self, factory: &TypeFactory, declaration: &str) -> Result<()> {
        self.register(Method::from_declaration(factory, declaration)?);
        Ok(())
    }

    pub fn get(&self, selector: Selector) -> Option<&Method> {
        self.errors.get(&selector)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Decodes revert data against the registered errors.
    pub fn decode(&self, data: &[u8]) -> Result<RevertReason> {
        let selector = Selector::from_calldata(data)?;
        let error = self
            .get(selector)
            .ok_or(Error::UnknownSelector(selector))?;
        Ok(RevertReason {
            signature: error.signature().to_owned(),
            selector,
            values: error.decode(data)?,
        })
    }
}
