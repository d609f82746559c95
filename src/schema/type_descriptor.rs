/// Field type descriptors
///
/// A descriptor is the declared type of a field or argument with its list and
/// non-null wrappers kept intact, e.g. `[Cat!]!`.

use async_graphql::parser::types::{BaseType, Type};
use std::fmt;

/// Declared type of a field: a named type wrapped in any number of
/// "list of" / "required" layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Named(String),
    List(Box<TypeDescriptor>),
    Required(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn named(name: impl Into<String>) -> Self {
        TypeDescriptor::Named(name.into())
    }

    pub fn list(inner: TypeDescriptor) -> Self {
        TypeDescriptor::List(Box::new(inner))
    }

    pub fn required(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Required(Box::new(inner))
    }

    /// Strip every list/required wrapper and return the innermost type name.
    ///
    /// `[Cat!]!` → `Cat`
    pub fn base_name(&self) -> &str {
        match self {
            TypeDescriptor::Named(name) => name,
            TypeDescriptor::List(inner) | TypeDescriptor::Required(inner) => inner.base_name(),
        }
    }

    /// True when the outermost non-required layer is a list.
    pub fn is_list(&self) -> bool {
        match self {
            TypeDescriptor::Named(_) => false,
            TypeDescriptor::List(_) => true,
            TypeDescriptor::Required(inner) => inner.is_list(),
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, TypeDescriptor::Required(_))
    }
}

impl From<&Type> for TypeDescriptor {
    fn from(ty: &Type) -> Self {
        let base = match &ty.base {
            BaseType::Named(name) => TypeDescriptor::named(name.as_str()),
            BaseType::List(inner) => TypeDescriptor::list(TypeDescriptor::from(inner.as_ref())),
        };
        if ty.nullable {
            base
        } else {
            TypeDescriptor::required(base)
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Named(name) => write!(f, "{}", name),
            TypeDescriptor::List(inner) => write!(f, "[{}]", inner),
            TypeDescriptor::Required(inner) => write!(f, "{}!", inner),
        }
    }
}
