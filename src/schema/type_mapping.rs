/// Schema type to dynamic GraphQL type mapping
///
/// Converts declared type descriptors into `TypeRef`s for the executable
/// schema, and coerces stored column values back into the scalar the field
/// declares (storage engines do not all keep booleans or IDs as such).

use crate::schema::parser::ParsedSchema;
use crate::schema::type_descriptor::TypeDescriptor;

use async_graphql::dynamic::TypeRef;
use async_graphql::{Name, Value};

/// Map a declared type descriptor to a dynamic `TypeRef`, wrapper for wrapper.
pub fn descriptor_to_type_ref(descriptor: &TypeDescriptor) -> TypeRef {
    match descriptor {
        TypeDescriptor::Named(name) => TypeRef::named(name.clone()),
        TypeDescriptor::List(inner) => TypeRef::List(Box::new(descriptor_to_type_ref(inner))),
        TypeDescriptor::Required(inner) => TypeRef::NonNull(Box::new(descriptor_to_type_ref(inner))),
    }
}

/// How a stored value is turned into a record field's output value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCoercion {
    /// 0/1 integers become booleans
    Boolean,
    /// Numeric keys are rendered as strings
    Id,
    /// Stored text becomes an enum value
    Enum,
    /// JSON text is decoded back into a list
    List,
    /// Another record type: no joins, always null
    Record,
    PassThrough,
}

impl OutputCoercion {
    pub fn for_field(ty: &TypeDescriptor, schema: &ParsedSchema) -> Self {
        let base = ty.base_name();
        if schema.is_record_type(base) {
            return OutputCoercion::Record;
        }
        if ty.is_list() {
            return OutputCoercion::List;
        }
        match base {
            TypeRef::BOOLEAN => OutputCoercion::Boolean,
            TypeRef::ID => OutputCoercion::Id,
            _ if schema.is_enum(base) => OutputCoercion::Enum,
            _ => OutputCoercion::PassThrough,
        }
    }

    pub fn apply(self, value: Value) -> Value {
        match (self, value) {
            (_, Value::Null) => Value::Null,
            (OutputCoercion::Record, _) => Value::Null,
            (OutputCoercion::Boolean, Value::Number(n)) => {
                Value::Boolean(n.as_f64().is_some_and(|f| f != 0.0))
            }
            (OutputCoercion::Boolean, Value::String(s)) => {
                Value::Boolean(matches!(s.as_str(), "true" | "t" | "1"))
            }
            (OutputCoercion::Id, Value::Number(n)) => Value::String(n.to_string()),
            (OutputCoercion::Enum, Value::String(s)) => Value::Enum(Name::new(s)),
            (OutputCoercion::List, Value::String(s)) => serde_json::from_str(&s)
                .ok()
                .and_then(|json| Value::from_json(json).ok())
                .unwrap_or(Value::Null),
            (_, other) => other,
        }
    }
}
