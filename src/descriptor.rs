//! Schema nodes describing ABI types.

use crate::{
    error::{Error, Result},
    kind::TypeKind,
};
use serde::{Deserialize, Serialize};

/// A schema node: a named Solidity type with optional tuple components.
///
/// This is the shape of parameters in a JSON contract ABI, so it can be
/// deserialized directly from one. Extra JSON fields such as `internalType`
/// or `indexed` are ignored.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct TypeDescriptor {
    /// The field name, empty for unnamed parameters.
    #[serde(default)]
    pub name: String,
    /// The Solidity type string, `tuple` (with array suffixes) for structs.
    #[serde(rename = "type")]
    pub ty: String,
    /// The tuple components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Creates a new descriptor for a non-tuple type.
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            components: None,
        }
    }

    /// Creates a new tuple descriptor. The type can carry array suffixes, for
    /// example `tuple[]`.
    pub fn tuple(
        name: impl Into<String>,
        ty: impl Into<String>,
        components: Vec<TypeDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            components: Some(components),
        }
    }

    /// Parses the descriptor's type string.
    pub fn kind(&self) -> Result<TypeKind> {
        self.ty.trim().parse()
    }

    /// Returns the tuple components, failing if a tuple type does not have
    /// any.
    pub fn components(&self) -> Result<&[TypeDescriptor]> {
        self.components
            .as_deref()
            .ok_or_else(|| Error::UnrecognizedType(format!("{} without components", self.ty)))
    }

    /// Returns the canonical type used in signatures, with aliases expanded
    /// and tuples written as `(type,type,...)`.
    pub fn canonical_type(&self) -> Result<String> {
        self.write_type(false)
    }

    /// Returns the canonical type decorated with field names, for example
    /// `(uint256 amount,address to)[] transfers`.
    ///
    /// Unlike the canonical type, this distinguishes schemas whose types
    /// only differ in naming, which matters when decoding to structs.
    pub fn decorated_type(&self) -> Result<String> {
        self.write_type(true)
    }

    fn write_type(&self, names: bool) -> Result<String> {
        let kind = self.kind()?;
        let mut buffer = String::new();
        if kind.is_tuple() {
            let mut components = String::from("(");
            for (i, component) in self.components()?.iter().enumerate() {
                if i != 0 {
                    components.push(',');
                }
                components.push_str(&component.write_type(names)?);
            }
            components.push(')');
            kind.fmt_with_components(&mut buffer, &components)
                .map_err(|_| Error::UnrecognizedType(self.ty.clone()))?;
        } else {
            buffer = kind.to_string();
        }
        if names && !self.name.is_empty() {
            buffer.push(' ');
            buffer.push_str(&self.name);
        }
        Ok(buffer)
    }
}
