/// Dynamic field resolvers
///
/// Glue between the executable schema and the dispatch layer: root fields
/// call a `QueryResolver` or `MutationResolver` against the storage adapter
/// held in the schema data, and record object fields read their column out
/// of the parent row.

use crate::dispatch::{MutationResolver, QueryResolver, Resolved};
use crate::dispatch::sql::Arguments;
use crate::schema::parser::{FieldDefinition, ParsedSchema, TypeDefinition};
use crate::schema::type_mapping::{descriptor_to_type_ref, OutputCoercion};
use crate::storage::{row_to_graphql_value, Row, SqlValue, StorageAdapter};

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, ResolverContext};
use async_graphql::Value;
use std::sync::Arc;

/// How a resolved row is handed back to the executor
#[derive(Debug, Clone, Copy)]
struct OutputShape {
    list: bool,
    /// Record types resolve their own fields from the parent row
    object: bool,
}

impl OutputShape {
    fn of(field: &FieldDefinition, schema: &ParsedSchema) -> Self {
        Self {
            list: field.ty.is_list(),
            object: schema.is_record_type(field.ty.base_name()),
        }
    }

    fn row<'a>(self, row: &Row) -> FieldValue<'a> {
        let value = row_to_graphql_value(row);
        if self.object {
            FieldValue::owned_any(value)
        } else {
            FieldValue::value(value)
        }
    }

    /// A list field always gets a list; a single-valued field gets the first row or null.
    fn apply<'a>(self, resolved: Resolved) -> Option<FieldValue<'a>> {
        match (self.list, resolved) {
            (true, Resolved::Rows(rows)) => {
                Some(FieldValue::list(rows.iter().map(|row| self.row(row))))
            }
            (true, Resolved::Row(row)) => {
                Some(FieldValue::list(row.iter().map(|row| self.row(row))))
            }
            (false, Resolved::Rows(rows)) => rows.first().map(|row| self.row(row)),
            (false, Resolved::Row(row)) => row.as_ref().map(|row| self.row(row)),
        }
    }
}

/// Collect supplied arguments in declared order. An explicit `null` counts as supplied.
fn call_arguments(ctx: &ResolverContext<'_>, declared: &[String]) -> Arguments {
    declared
        .iter()
        .filter_map(|name| {
            ctx.args
                .get(name)
                .map(|value| (name.clone(), SqlValue::from_graphql(value.as_value())))
        })
        .collect()
}

fn with_arguments(mut field: Field, definition: &FieldDefinition) -> Field {
    for argument in &definition.arguments {
        let mut input = InputValue::new(argument.name.clone(), descriptor_to_type_ref(&argument.ty));
        if let Some(default) = &argument.default_value {
            input = input.default_value(default.clone());
        }
        field = field.argument(input);
    }
    if let Some(description) = &definition.description {
        field = field.description(description.clone());
    }
    field
}

/// Create the `Query` field backed by `resolver`
pub fn create_query_field(
    definition: &FieldDefinition,
    resolver: Arc<QueryResolver>,
    schema: &ParsedSchema,
) -> Field {
    let shape = OutputShape::of(definition, schema);

    let field = Field::new(
        definition.name.clone(),
        descriptor_to_type_ref(&definition.ty),
        move |ctx: ResolverContext| {
            let resolver = Arc::clone(&resolver);

            FieldFuture::new(async move {
                let adapter = ctx
                    .data::<Arc<dyn StorageAdapter>>()
                    .map_err(|_e| "Failed to get storage adapter")?;

                let args = call_arguments(&ctx, &resolver.arguments);
                let resolved = resolver.resolve(adapter.as_ref(), &args).await.map_err(|e| {
                    tracing::warn!("{}", e);
                    e.to_string()
                })?;

                Ok(shape.apply(resolved))
            })
        },
    );

    with_arguments(field, definition)
}

/// Create a `Mutation` field. Without a resolver the field always yields null.
pub fn create_mutation_field(
    definition: &FieldDefinition,
    resolver: Option<Arc<MutationResolver>>,
    schema: &ParsedSchema,
) -> Field {
    let shape = OutputShape::of(definition, schema);

    let field = Field::new(
        definition.name.clone(),
        descriptor_to_type_ref(&definition.ty),
        move |ctx: ResolverContext| {
            let resolver = resolver.clone();

            FieldFuture::new(async move {
                let Some(resolver) = resolver else {
                    return Ok(None);
                };
                let adapter = ctx
                    .data::<Arc<dyn StorageAdapter>>()
                    .map_err(|_e| "Failed to get storage adapter")?;

                let args = call_arguments(&ctx, &resolver.arguments);
                let row = resolver.resolve(adapter.as_ref(), &args).await.map_err(|e| {
                    tracing::warn!("{}", e);
                    e.to_string()
                })?;

                Ok(shape.apply(Resolved::Row(Some(row))))
            })
        },
    );

    with_arguments(field, definition)
}

/// Build the object type for a record type. Each field reads the column of
/// the same name from the parent row.
/// Read `column` out of a parent row.
///
/// Backends that fold unquoted identifiers (Postgres lowers them) hand back
/// keys that differ from the field name only in case.
fn column_value(parent: &Value, column: &str) -> Value {
    let Value::Object(obj) = parent else {
        return Value::Null;
    };
    obj.get(column)
        .or_else(|| {
            obj.iter()
                .find(|(key, _)| key.as_str().eq_ignore_ascii_case(column))
                .map(|(_, value)| value)
        })
        .cloned()
        .unwrap_or(Value::Null)
}

/// Build the object type for a record type. Each field reads the column of
/// the same name from the parent row.
pub fn create_record_object(definition: &TypeDefinition, schema: &ParsedSchema) -> Object {
    let mut object = Object::new(definition.name.clone());
    if let Some(description) = &definition.description {
        object = object.description(description.clone());
    }

    for field_def in &definition.fields {
        let column = field_def.name.clone();
        let coercion = OutputCoercion::for_field(&field_def.ty, schema);

        let field = Field::new(
            field_def.name.clone(),
            descriptor_to_type_ref(&field_def.ty),
            move |ctx: ResolverContext| {
                let column = column.clone();

                FieldFuture::new(async move {
                    let parent = ctx.parent_value.try_downcast_ref::<Value>()?;

                    Ok(match coercion.apply(column_value(parent, &column)) {
                        Value::Null => None,
                        value => Some(FieldValue::value(value)),
                    })
                })
            },
        );

        object = object.field(with_arguments(field, field_def));
    }

    object
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat_row(id: &str) -> Row {
        let mut row = Row::new();
        row.insert("id".to_string(), SqlValue::Text(id.to_string()));
        row
    }

    fn shape(list: bool) -> OutputShape {
        OutputShape { list, object: false }
    }

    fn as_list(value: Option<FieldValue<'_>>) -> usize {
        value
            .and_then(|v| v.as_list().map(|items| items.len()))
            .unwrap_or(usize::MAX)
    }

    #[test]
    fn test_list_field_with_missing_row_is_empty() {
        assert_eq!(as_list(shape(true).apply(Resolved::Row(None))), 0);
    }

    #[test]
    fn test_list_field_wraps_single_row() {
        assert_eq!(as_list(shape(true).apply(Resolved::Row(Some(cat_row("1"))))), 1);
    }

    #[test]
    fn test_single_field_takes_first_row() {
        let rows = vec![cat_row("1"), cat_row("2")];
        let value = shape(false).apply(Resolved::Rows(rows));
        let expected = row_to_graphql_value(&cat_row("1"));
        assert_eq!(value.and_then(|v| v.as_value().cloned()), Some(expected));
    }

    #[test]
    fn test_single_field_without_rows_is_null() {
        assert!(shape(false).apply(Resolved::Rows(Vec::new())).is_none());
        assert!(shape(false).apply(Resolved::Row(None)).is_none());
    }

    #[test]
    fn test_column_lookup_prefers_exact_name() {
        let mut row = Row::new();
        row.insert("username".to_string(), SqlValue::Text("lower".to_string()));
        row.insert("userName".to_string(), SqlValue::Text("exact".to_string()));
        let parent = row_to_graphql_value(&row);

        assert_eq!(column_value(&parent, "userName"), Value::String("exact".to_string()));
    }

    #[test]
    fn test_column_lookup_matches_case_folded_key() {
        let mut row = Row::new();
        row.insert("id".to_string(), SqlValue::Text("1".to_string()));
        row.insert("username".to_string(), SqlValue::Text("tom".to_string()));
        let parent = row_to_graphql_value(&row);

        assert_eq!(column_value(&parent, "userName"), Value::String("tom".to_string()));
        assert_eq!(column_value(&parent, "nickName"), Value::Null);
        assert_eq!(column_value(&Value::Null, "id"), Value::Null);
    }
}
