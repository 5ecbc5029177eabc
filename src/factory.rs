//! Building type trees from schema nodes.

use crate::{
    descriptor::TypeDescriptor,
    error::{Error, Result},
    kind::TypeKind,
    types::{Array, Blob, DataType, Field, Pointer, Scalar, Tuple},
};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

/// A factory of type trees.
///
/// The factory is an explicit value rather than global state. It is
/// `Send + Sync`, and trees created through [`TypeFactory::create_cached`]
/// are shared between callers asking for the same schema.
#[derive(Debug, Default)]
pub struct TypeFactory {
    cache: RwLock<HashMap<String, Arc<DataType>>>,
}

impl TypeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the root of a type tree.
    ///
    /// The root is never wrapped in a [`Pointer`], even when dynamic.
    pub fn create(&self, descriptor: &TypeDescriptor) -> Result<DataType> {
        let kind = descriptor.kind()?;
        tracing::trace!(name = %descriptor.name, ty = %descriptor.ty, "creating type");
        self.build(&kind, descriptor)
    }

    /// Creates a type that is a member of a tuple or array, wrapping it in a
    /// [`Pointer`] if it is dynamic.
    pub fn create_member(&self, descriptor: &TypeDescriptor) -> Result<DataType> {
        Ok(member(self.create(descriptor)?))
    }

    /// Creates a tuple from its component schema nodes.
    pub fn create_tuple(&self, components: &[TypeDescriptor]) -> Result<Tuple> {
        let fields = components
            .iter()
            .map(|component| {
                Ok(Field {
                    name: component.name.clone(),
                    ty: self.create_member(component)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Tuple::new(fields))
    }

    /// Creates the root of a type tree, reusing a previously created tree for
    /// the same schema.
    ///
    /// Schemas are keyed by their canonical type decorated with field names,
    /// so types that only differ in naming get distinct trees.
    pub fn create_cached(&self, descriptor: &TypeDescriptor) -> Result<Arc<DataType>> {
        let key = descriptor.decorated_type()?;
        if let Some(ty) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            tracing::trace!(%key, "type cache hit");
            return Ok(ty.clone());
        }

        let ty = Arc::new(self.create(descriptor)?);
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.entry(key).or_insert(ty).clone())
    }

    fn build(&self, kind: &TypeKind, descriptor: &TypeDescriptor) -> Result<DataType> {
        let ty = match kind {
            TypeKind::Address => DataType::Scalar(Scalar::Address),
            TypeKind::Bool => DataType::Scalar(Scalar::Bool),
            TypeKind::Int(width) => DataType::Scalar(Scalar::Int(*width)),
            TypeKind::Uint(width) => DataType::Scalar(Scalar::Uint(*width)),
            TypeKind::FixedBytes(len) => DataType::Scalar(Scalar::FixedBytes(*len)),
            TypeKind::Bytes => DataType::Blob(Blob::Bytes),
            TypeKind::String => DataType::Blob(Blob::String),
            TypeKind::Tuple => {
                let components = descriptor.components()?;
                if components.is_empty() {
                    return Err(Error::UnrecognizedType(descriptor.ty.clone()));
                }
                let tuple = self.create_tuple(components)?;
                let all_inline = tuple.fields().iter().all(|field| !is_pointer(&field.ty));
                if all_inline && !tuple.is_static() {
                    return Err(too_large(descriptor));
                }
                DataType::Tuple(tuple)
            }
            TypeKind::Array(element, length) => {
                let element = member(self.build(element, descriptor)?);
                let array_is_fixed = length.is_some() && !is_pointer(&element);
                let array = Array::new(element, *length);
                if array_is_fixed && !array.is_static() {
                    return Err(too_large(descriptor));
                }
                DataType::Array(array)
            }
        };
        Ok(ty)
    }
}

fn is_pointer(ty: &DataType) -> bool {
    matches!(ty, DataType::Pointer(_))
}

/// Error for types made only of static members whose size in bytes does not
/// fit in a `usize`.
fn too_large(descriptor: &TypeDescriptor) -> Error {
    tracing::debug!(ty = %descriptor.ty, "static type too large");
    Error::UnrecognizedType(descriptor.ty.clone())
}

fn member(ty: DataType) -> DataType {
    if ty.is_dynamic() {
        DataType::Pointer(Pointer::new(ty))
    } else {
        ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use std::thread;

    fn order() -> TypeDescriptor {
        TypeDescriptor::tuple(
            "order",
            "tuple",
            vec![
                TypeDescriptor::new("maker", "address"),
                TypeDescriptor::new("tags", "string[]"),
                TypeDescriptor::new("amounts", "uint256[2]"),
            ],
        )
    }

    #[test]
    fn rejects_unrecognized_types() {
        let factory = TypeFactory::new();
        for descriptor in [
            TypeDescriptor::new("", "uint7"),
            TypeDescriptor::new("", "fixed128x18"),
            TypeDescriptor::new("", "tuple"),
            TypeDescriptor::tuple("", "tuple", vec![TypeDescriptor::new("x", "strings")]),
            TypeDescriptor::tuple("", "tuple[]", vec![]),
        ] {
            assert!(
                matches!(factory.create(&descriptor), Err(Error::UnrecognizedType(_))),
                "{descriptor:?}"
            );
        }
    }

    #[test]
    fn wraps_dynamic_members_in_pointers() {
        let factory = TypeFactory::new();
        assert!(matches!(
            factory.create(&TypeDescriptor::new("", "string")).unwrap(),
            DataType::Blob(Blob::String)
        ));
        assert!(matches!(
            factory
                .create_member(&TypeDescriptor::new("", "string"))
                .unwrap(),
            DataType::Pointer(_)
        ));

        let DataType::Tuple(tuple) = factory.create(&order()).unwrap() else {
            panic!("expected tuple");
        };
        let [maker, tags, amounts] = tuple.fields() else {
            panic!("expected three fields");
        };
        assert!(matches!(maker.ty, DataType::Scalar(Scalar::Address)));
        let DataType::Pointer(pointer) = &tags.ty else {
            panic!("expected pointer");
        };
        let DataType::Array(array) = pointer.target() else {
            panic!("expected array");
        };
        assert!(matches!(array.element(), DataType::Pointer(_)));
        assert!(matches!(amounts.ty, DataType::Array(_)));
        assert!(amounts.ty.is_static());
    }

    #[test]
    fn rejects_static_types_too_large_to_address() {
        let factory = TypeFactory::new();
        for ty in [
            "uint256[576460752303423488][1]",
            "uint256[576460752303423488]",
            "uint8[18446744073709551615][2]",
        ] {
            assert!(
                matches!(
                    factory.create(&TypeDescriptor::new("", ty)),
                    Err(Error::UnrecognizedType(_))
                ),
                "{ty}"
            );
        }
        assert!(matches!(
            factory.create(&TypeDescriptor::tuple(
                "",
                "tuple",
                vec![
                    TypeDescriptor::new("a", "uint256[288230376151711744]"),
                    TypeDescriptor::new("b", "uint256[288230376151711744]"),
                ],
            )),
            Err(Error::UnrecognizedType(_))
        ));

        let ty = factory
            .create(&TypeDescriptor::new("", "uint256[576460752303423487]"))
            .unwrap();
        assert!(ty.is_static());
        assert_eq!(ty.static_width_in_words(), Some(576460752303423487));
    }

    #[test]
    fn identical_schemas_create_identical_trees() {
        let factory = TypeFactory::new();
        assert_eq!(
            factory.create(&order()).unwrap(),
            factory.create(&order()).unwrap()
        );
    }

    #[test]
    fn caches_trees_by_decorated_type() {
        let factory = TypeFactory::new();
        let a = factory.create_cached(&order()).unwrap();
        let b = factory.create_cached(&order()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let mut renamed = order();
        renamed.name = "other".to_owned();
        let c = factory.create_cached(&renamed).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(*a, *c);
    }

    #[test]
    fn shares_trees_across_threads() {
        let factory = Arc::new(TypeFactory::new());
        let handles = (0..4_u8)
            .map(|i| {
                let factory = factory.clone();
                thread::spawn(move || {
                    let ty = factory
                        .create_cached(&TypeDescriptor::new("", "uint8[]"))
                        .unwrap();
                    let value = Value::Array(vec![i.into(); usize::from(i)]);
                    assert_eq!(ty.decode(&ty.encode(&value).unwrap()).unwrap(), value);
                    ty
                })
            })
            .collect::<Vec<_>>();

        let trees = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>();
        assert!(trees.windows(2).all(|w| *w[0] == *w[1]));
    }
}
