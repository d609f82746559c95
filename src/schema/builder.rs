/// Executable GraphQL schema builder
///
/// This module provides the `SchemaBuilder` which assembles a dynamic
/// async-graphql schema from parsed schema definitions and the resolvers
/// compiled for its operation roots.

use crate::dispatch::{MutationResolver, QueryResolver};
use crate::error::{Result, SchemataError};
use crate::schema::parser::{EnumDefinition, ParsedSchema, TypeDefinition, MUTATION_ROOT, QUERY_ROOT};
use crate::schema::resolver::{create_mutation_field, create_query_field, create_record_object};
use crate::schema::scalars::{is_builtin_scalar, scalar_for};
use crate::schema::type_mapping::descriptor_to_type_ref;
use crate::storage::StorageAdapter;

use async_graphql::dynamic::{Enum, EnumItem, InputObject, InputValue, Object, Schema};
use indexmap::{IndexMap, IndexSet};
use std::sync::Arc;

/// Builds the executable schema for one parsed schema document
pub struct SchemaBuilder<'a> {
    parsed: &'a ParsedSchema,
    adapter: Arc<dyn StorageAdapter>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(parsed: &'a ParsedSchema, adapter: Arc<dyn StorageAdapter>) -> Self {
        Self { parsed, adapter }
    }

    /// Build the executable schema.
    ///
    /// Every `Query` field gets a resolver from `query_resolvers`. `Mutation`
    /// fields without an entry in `mutation_resolvers` are kept in the schema
    /// but always resolve to null.
    pub fn build_schema(
        &self,
        query_resolvers: &IndexMap<String, Arc<QueryResolver>>,
        mutation_resolvers: &IndexMap<String, Arc<MutationResolver>>,
    ) -> Result<Schema> {
        if self.parsed.query.is_none() {
            return Err(SchemataError::Compilation(
                "Schema does not define a Query type".to_string(),
            ));
        }

        let mut query = Object::new(QUERY_ROOT);
        for field in self.parsed.query_fields() {
            let resolver = query_resolvers.get(&field.name).cloned().ok_or_else(|| {
                SchemataError::Compilation(format!("No resolver for query field '{}'", field.name))
            })?;
            query = query.field(create_query_field(field, resolver, self.parsed));
        }

        let mutation = if self.parsed.mutation_fields().is_empty() {
            None
        } else {
            let mut mutation = Object::new(MUTATION_ROOT);
            for field in self.parsed.mutation_fields() {
                let resolver = mutation_resolvers.get(&field.name).cloned();
                mutation = mutation.field(create_mutation_field(field, resolver, self.parsed));
            }
            Some(mutation)
        };

        let mut schema_builder = Schema::build(
            QUERY_ROOT,
            mutation.as_ref().map(|_| MUTATION_ROOT),
            None,
        );

        for record_type in &self.parsed.record_types {
            tracing::debug!("Registering object type {}", record_type.name);
            schema_builder = schema_builder.register(create_record_object(record_type, self.parsed));
        }

        for enum_def in &self.parsed.enums {
            schema_builder = schema_builder.register(build_enum(enum_def));
        }

        for input_type in &self.parsed.input_types {
            schema_builder = schema_builder.register(build_input_object(input_type));
        }

        for scalar in self.scalar_names() {
            schema_builder = schema_builder.register(scalar_for(&scalar));
        }

        schema_builder = schema_builder.register(query);
        if let Some(mutation) = mutation {
            schema_builder = schema_builder.register(mutation);
        }

        // Resolvers reach storage through the schema data
        schema_builder
            .data(Arc::clone(&self.adapter))
            .finish()
            .map_err(|e| SchemataError::Compilation(format!("Failed to build schema: {}", e)))
    }

    /// Declared scalars plus every referenced type name the document never declares
    fn scalar_names(&self) -> IndexSet<String> {
        let mut names: IndexSet<String> = self.parsed.scalars.iter().cloned().collect();

        let types = self
            .parsed
            .record_types
            .iter()
            .chain(&self.parsed.input_types)
            .chain(&self.parsed.query)
            .chain(&self.parsed.mutation);

        for type_def in types {
            for field in &type_def.fields {
                let referenced = std::iter::once(&field.ty).chain(field.arguments.iter().map(|a| &a.ty));
                for ty in referenced {
                    let base = ty.base_name();
                    if !is_builtin_scalar(base) && !self.parsed.declares(base) {
                        names.insert(base.to_string());
                    }
                }
            }
        }

        names
    }
}

fn build_enum(definition: &EnumDefinition) -> Enum {
    let mut enum_type = Enum::new(definition.name.clone());
    for value in &definition.values {
        enum_type = enum_type.item(EnumItem::new(value.clone()));
    }
    enum_type
}

fn build_input_object(definition: &TypeDefinition) -> InputObject {
    let mut input = InputObject::new(definition.name.clone());
    if let Some(description) = &definition.description {
        input = input.description(description.clone());
    }
    for field in &definition.fields {
        input = input.field(InputValue::new(field.name.clone(), descriptor_to_type_ref(&field.ty)));
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parser::parse;
    use crate::storage::SqliteAdapter;

    fn adapter() -> Arc<dyn StorageAdapter> {
        Arc::new(SqliteAdapter::in_memory().unwrap())
    }

    fn resolvers(
        parsed: &ParsedSchema,
    ) -> (IndexMap<String, Arc<QueryResolver>>, IndexMap<String, Arc<MutationResolver>>) {
        let queries = parsed
            .query_fields()
            .iter()
            .map(|f| (f.name.clone(), Arc::new(QueryResolver::from_field(f))))
            .collect();
        let mutations = parsed
            .mutation_fields()
            .iter()
            .filter_map(|f| MutationResolver::from_field(f).map(|r| (f.name.clone(), Arc::new(r))))
            .collect();
        (queries, mutations)
    }

    #[test]
    fn test_build_schema_with_enum_and_custom_scalar() {
        let parsed = parse(
            r#"
            enum Mood { HAPPY GRUMPY }
            type Cat { id: ID! mood: Mood born: Date }
            type Query { cats: [Cat!]! }
            type Mutation { addCat(id: ID!, mood: Mood): Cat }
            "#,
        )
        .unwrap();
        let (queries, mutations) = resolvers(&parsed);

        let schema = SchemaBuilder::new(&parsed, adapter())
            .build_schema(&queries, &mutations)
            .unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("enum Mood"));
        assert!(sdl.contains("scalar Date"));
        assert!(sdl.contains("addCat("));
    }

    #[test]
    fn test_missing_query_type_fails() {
        let parsed = parse("type Cat { id: ID! }").unwrap();
        let result = SchemaBuilder::new(&parsed, adapter()).build_schema(&IndexMap::new(), &IndexMap::new());
        assert!(matches!(result, Err(SchemataError::Compilation(_))));
    }

    #[test]
    fn test_unresolvable_mutation_stays_in_schema() {
        let parsed = parse(
            r#"
            type Cat { id: ID! }
            type Query { cats: [Cat] }
            type Mutation { archiveCat(id: ID!): Cat }
            "#,
        )
        .unwrap();
        let (queries, mutations) = resolvers(&parsed);
        assert!(mutations.is_empty());

        let schema = SchemaBuilder::new(&parsed, adapter())
            .build_schema(&queries, &mutations)
            .unwrap();
        assert!(schema.sdl().contains("archiveCat"));
    }

    #[test]
    fn test_input_object_argument() {
        let parsed = parse(
            r#"
            input CatFilter { name: String }
            type Cat { id: ID! }
            type Query { cats(filter: CatFilter): [Cat] }
            "#,
        )
        .unwrap();
        let (queries, mutations) = resolvers(&parsed);

        let schema = SchemaBuilder::new(&parsed, adapter())
            .build_schema(&queries, &mutations)
            .unwrap();
        assert!(schema.sdl().contains("input CatFilter"));
    }

    #[test]
    fn test_argument_default_survives_in_sdl() {
        let parsed = parse(
            r#"
            type Cat { id: ID! }
            type Query { cats(limit: Int = 10): [Cat] }
            "#,
        )
        .unwrap();
        let (queries, mutations) = resolvers(&parsed);

        let schema = SchemaBuilder::new(&parsed, adapter())
            .build_schema(&queries, &mutations)
            .unwrap();
        assert!(schema.sdl().contains("= 10"));
    }
}
