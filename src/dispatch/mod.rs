/// Request dispatch for registered schemas
///
/// A `CompiledDispatcher` is the immutable, executable form of one schema
/// version: its resolvers plus the dynamic GraphQL schema wired to them.

mod cache;
pub mod convention;
mod resolvers;
pub mod sql;

pub use cache::DispatcherCache;
pub use convention::{MutationKind, MutationOperation};
pub use resolvers::{MutationResolver, QueryResolver, Resolved};

use crate::error::Result;
use crate::registry::FreshnessMarker;
use crate::schema::{ParsedSchema, SchemaBuilder};
use crate::storage::StorageAdapter;

use async_graphql::dynamic::Schema;
use indexmap::IndexMap;
use std::sync::Arc;

pub struct CompiledDispatcher {
    identifier: String,
    marker: FreshnessMarker,
    query_resolvers: IndexMap<String, Arc<QueryResolver>>,
    mutation_resolvers: IndexMap<String, Arc<MutationResolver>>,
    schema: Schema,
}

impl CompiledDispatcher {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Version of the schema source this dispatcher was built from
    pub fn marker(&self) -> &FreshnessMarker {
        &self.marker
    }

    pub fn query_resolver(&self, field: &str) -> Option<&QueryResolver> {
        self.query_resolvers.get(field).map(Arc::as_ref)
    }

    /// `None` for mutation fields whose name follows no convention.
    pub fn mutation_resolver(&self, field: &str) -> Option<&MutationResolver> {
        self.mutation_resolvers.get(field).map(Arc::as_ref)
    }

    pub fn query_fields(&self) -> impl Iterator<Item = &str> {
        self.query_resolvers.keys().map(String::as_str)
    }

    pub fn mutation_fields(&self) -> impl Iterator<Item = &str> {
        self.mutation_resolvers.keys().map(String::as_str)
    }

    /// Execute one GraphQL request. Field failures are reported in the
    /// response's `errors`; they never abort sibling fields.
    pub async fn execute(&self, request: impl Into<async_graphql::Request>) -> async_graphql::Response {
        self.schema.execute(request).await
    }

    /// The executable schema in SDL form
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }
}

/// Compile a parsed schema into a dispatcher bound to `adapter`.
///
/// Every `Query` field gets a resolver reading the table named after its
/// return type. `Mutation` fields get one only when their name starts with
/// `add`, `update` or `delete`.
pub fn compile(
    identifier: &str,
    marker: FreshnessMarker,
    parsed: &ParsedSchema,
    adapter: Arc<dyn StorageAdapter>,
) -> Result<CompiledDispatcher> {
    let query_resolvers: IndexMap<String, Arc<QueryResolver>> = parsed
        .query_fields()
        .iter()
        .map(|field| (field.name.clone(), Arc::new(QueryResolver::from_field(field))))
        .collect();

    let mut mutation_resolvers = IndexMap::new();
    for field in parsed.mutation_fields() {
        match MutationResolver::from_field(field) {
            Some(resolver) => {
                mutation_resolvers.insert(field.name.clone(), Arc::new(resolver));
            }
            None => tracing::debug!(
                "Mutation '{}' in schema '{}' follows no naming convention; it will resolve to null",
                field.name,
                identifier
            ),
        }
    }

    let schema = SchemaBuilder::new(parsed, adapter).build_schema(&query_resolvers, &mutation_resolvers)?;

    tracing::info!(
        "Compiled schema '{}' ({} query, {} mutation resolvers)",
        identifier,
        query_resolvers.len(),
        mutation_resolvers.len()
    );

    Ok(CompiledDispatcher {
        identifier: identifier.to_string(),
        marker,
        query_resolvers,
        mutation_resolvers,
        schema,
    })
}
