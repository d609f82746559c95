/// Schema definition language parsing
///
/// Turns SDL text into record type definitions plus the field lists of the
/// `Query` and `Mutation` operation roots.

use crate::error::{Result, SchemataError};
use crate::schema::type_descriptor::TypeDescriptor;

use async_graphql::parser::parse_schema;
use async_graphql::parser::types::{
    FieldDefinition as SdlField, InputValueDefinition, TypeKind, TypeSystemDefinition,
};
use async_graphql::parser::Positioned;
use async_graphql::Value;

pub const QUERY_ROOT: &str = "Query";
pub const MUTATION_ROOT: &str = "Mutation";

/// A named argument declared on a field
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentDefinition {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Default declared in the SDL, if any
    pub default_value: Option<Value>,
}

/// A field of an object type (or an entry point of an operation root)
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub name: String,
    pub ty: TypeDescriptor,
    /// Arguments in declaration order
    pub arguments: Vec<ArgumentDefinition>,
    pub description: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            arguments: Vec::new(),
            description: None,
        }
    }

    pub fn with_argument(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.arguments.push(ArgumentDefinition {
            name: name.into(),
            ty,
            default_value: None,
        });
        self
    }

    pub fn argument_names(&self) -> Vec<String> {
        self.arguments.iter().map(|arg| arg.name.clone()).collect()
    }
}

/// An object (or input object) type with its fields in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<String>,
}

/// Everything extracted from one schema text
#[derive(Debug, Clone, Default)]
pub struct ParsedSchema {
    /// Storage-backed object types (never `Query` or `Mutation`)
    pub record_types: Vec<TypeDefinition>,
    pub query: Option<TypeDefinition>,
    pub mutation: Option<TypeDefinition>,
    pub enums: Vec<EnumDefinition>,
    pub input_types: Vec<TypeDefinition>,
    pub scalars: Vec<String>,
}

impl ParsedSchema {
    pub fn query_fields(&self) -> &[FieldDefinition] {
        self.query.as_ref().map(|t| t.fields.as_slice()).unwrap_or(&[])
    }

    pub fn mutation_fields(&self) -> &[FieldDefinition] {
        self.mutation.as_ref().map(|t| t.fields.as_slice()).unwrap_or(&[])
    }

    pub fn record_type(&self, name: &str) -> Option<&TypeDefinition> {
        self.record_types.iter().find(|t| t.name == name)
    }

    pub fn is_record_type(&self, name: &str) -> bool {
        self.record_type(name).is_some()
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enums.iter().any(|e| e.name == name)
    }

    /// Whether `name` is declared anywhere in this document.
    pub fn declares(&self, name: &str) -> bool {
        self.is_record_type(name)
            || self.is_enum(name)
            || self.input_types.iter().any(|t| t.name == name)
            || self.scalars.iter().any(|s| s == name)
            || self.query.as_ref().is_some_and(|t| t.name == name)
            || self.mutation.as_ref().is_some_and(|t| t.name == name)
    }
}

/// Parse schema text into typed definitions.
///
/// Object types named `Query` and `Mutation` become operation roots; every
/// other object type is a record type. `extend type` definitions merge their
/// fields into the type they extend. Interfaces, unions and directive
/// definitions carry no storage meaning and are skipped.
pub fn parse(schema_text: &str) -> Result<ParsedSchema> {
    let document = parse_schema(schema_text).map_err(|e| SchemataError::Parse(e.to_string()))?;

    let mut objects: Vec<TypeDefinition> = Vec::new();
    let mut parsed = ParsedSchema::default();

    for definition in document.definitions {
        let TypeSystemDefinition::Type(type_def) = definition else {
            continue;
        };
        let type_def = type_def.node;
        let name = type_def.name.node.to_string();
        let description = type_def.description.map(|d| d.node);

        match type_def.kind {
            TypeKind::Object(object) => {
                let fields: Vec<FieldDefinition> =
                    object.fields.iter().map(convert_field).collect();
                merge_type(&mut objects, name, description, fields, type_def.extend);
            }
            TypeKind::InputObject(input) => {
                let fields = input.fields.iter().map(convert_input_field).collect();
                merge_type(&mut parsed.input_types, name, description, fields, type_def.extend);
            }
            TypeKind::Enum(enum_type) => {
                let values: Vec<String> = enum_type
                    .values
                    .iter()
                    .map(|v| v.node.value.node.to_string())
                    .collect();
                match parsed.enums.iter_mut().find(|e| e.name == name) {
                    Some(existing) => existing.values.extend(values),
                    None => parsed.enums.push(EnumDefinition { name, values }),
                }
            }
            TypeKind::Scalar => {
                if !parsed.scalars.contains(&name) {
                    parsed.scalars.push(name);
                }
            }
            TypeKind::Interface(_) | TypeKind::Union(_) => {
                tracing::debug!("Skipping non-object type definition '{}'", name);
            }
        }
    }

    for object in objects {
        match object.name.as_str() {
            QUERY_ROOT => parsed.query = Some(object),
            MUTATION_ROOT => parsed.mutation = Some(object),
            _ => parsed.record_types.push(object),
        }
    }

    Ok(parsed)
}

fn merge_type(
    types: &mut Vec<TypeDefinition>,
    name: String,
    description: Option<String>,
    fields: Vec<FieldDefinition>,
    extend: bool,
) {
    if let Some(existing) = types.iter_mut().find(|t| t.name == name) {
        if !extend {
            tracing::warn!("Type '{}' is defined more than once; merging its fields", name);
        }
        existing.fields.extend(fields);
        if existing.description.is_none() {
            existing.description = description;
        }
        return;
    }
    types.push(TypeDefinition {
        name,
        description,
        fields,
    });
}

fn convert_field(field: &Positioned<SdlField>) -> FieldDefinition {
    let field = &field.node;
    FieldDefinition {
        name: field.name.node.to_string(),
        ty: TypeDescriptor::from(&field.ty.node),
        arguments: field
            .arguments
            .iter()
            .map(|arg| ArgumentDefinition {
                name: arg.node.name.node.to_string(),
                ty: TypeDescriptor::from(&arg.node.ty.node),
                default_value: arg.node.default_value.as_ref().map(|v| v.node.clone()),
            })
            .collect(),
        description: field.description.as_ref().map(|d| d.node.clone()),
    }
}

fn convert_input_field(field: &Positioned<InputValueDefinition>) -> FieldDefinition {
    let field = &field.node;
    FieldDefinition {
        name: field.name.node.to_string(),
        ty: TypeDescriptor::from(&field.ty.node),
        arguments: Vec::new(),
        description: field.description.as_ref().map(|d| d.node.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETS: &str = r#"
        type Cat {
          id: ID!
          name: String!
          age: Int
        }

        type Bike {
          id: ID!
          model: String
        }

        type Query {
          cats: [Cat!]!
          cat(id: ID!, name: String): Cat
        }

        type Mutation {
          addBike(id: ID!, model: String): Bike
        }
    "#;

    #[test]
    fn test_partitions_operation_roots() {
        let parsed = parse(PETS).unwrap();

        let names: Vec<&str> = parsed.record_types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Cat", "Bike"]);
        assert_eq!(parsed.query_fields().len(), 2);
        assert_eq!(parsed.mutation_fields().len(), 1);
    }

    #[test]
    fn test_preserves_field_order() {
        let parsed = parse(PETS).unwrap();
        let cat = parsed.record_type("Cat").unwrap();

        let fields: Vec<&str> = cat.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(fields, vec!["id", "name", "age"]);
        assert_eq!(cat.fields[0].ty.to_string(), "ID!");
    }

    #[test]
    fn test_preserves_declared_argument_order() {
        let parsed = parse(PETS).unwrap();
        let cat_field = &parsed.query_fields()[1];

        assert_eq!(cat_field.argument_names(), vec!["id", "name"]);
        assert_eq!(cat_field.ty.base_name(), "Cat");
    }

    #[test]
    fn test_keeps_argument_defaults() {
        let parsed = parse(
            "type Cat { id: ID! } type Query { cats(limit: Int = 10, name: String): [Cat] }",
        )
        .unwrap();
        let cats = &parsed.query_fields()[0];

        assert_eq!(cats.arguments[0].default_value, Some(Value::from(10)));
        assert_eq!(cats.arguments[1].default_value, None);
    }

    #[test]
    fn test_schema_without_mutation() {
        let parsed = parse("type Cat { id: ID! } type Query { cats: [Cat] }").unwrap();
        assert!(parsed.mutation.is_none());
        assert!(parsed.mutation_fields().is_empty());
    }

    #[test]
    fn test_collects_enums_scalars_and_inputs() {
        let parsed = parse(
            r#"
            scalar Date
            enum Mood { HAPPY GRUMPY }
            input CatInput { name: String! }
            type Cat { id: ID! mood: Mood born: Date }
            "#,
        )
        .unwrap();

        assert_eq!(parsed.scalars, vec!["Date".to_string()]);
        assert_eq!(parsed.enums[0].values, vec!["HAPPY", "GRUMPY"]);
        assert_eq!(parsed.input_types[0].name, "CatInput");
        assert!(parsed.declares("Mood"));
        assert!(!parsed.declares("Unknown"));
    }

    #[test]
    fn test_extend_type_merges_fields() {
        let parsed = parse(
            r#"
            type Query { cats: [Cat] }
            type Cat { id: ID! }
            extend type Query { dogs: [Cat] }
            "#,
        )
        .unwrap();

        assert_eq!(parsed.query_fields().len(), 2);
    }

    #[test]
    fn test_invalid_sdl_is_a_parse_error() {
        let result = parse("type Cat { id: ID! ");
        assert!(matches!(result, Err(SchemataError::Parse(_))));
    }
}
