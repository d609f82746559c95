/// Schema service
///
/// Ties the registry, the storage adapter and the dispatcher cache together:
/// uploads are parsed, stored and materialized, and execution requests are
/// answered by a dispatcher compiled from the current schema source.

use crate::config::Config;
use crate::dispatch::{self, CompiledDispatcher, DispatcherCache};
use crate::error::Result;
use crate::materialize::materialize;
use crate::registry::{validate_identifier, SchemaRegistry, SchemaSpec};
use crate::schema::parse;
use crate::storage::{self, StorageAdapter};

use async_graphql::{Request, Response, Variables};
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct SchemaService {
    registry: SchemaRegistry,
    adapter: Arc<dyn StorageAdapter>,
    cache: DispatcherCache,
}

impl SchemaService {
    pub fn new(registry: SchemaRegistry, adapter: Arc<dyn StorageAdapter>) -> Self {
        Self {
            registry,
            adapter,
            cache: DispatcherCache::new(),
        }
    }

    /// Open the configured storage backend and registry directory
    pub async fn from_config(config: &Config) -> Result<Self> {
        let adapter = storage::connect(&config.storage).await?;
        let registry = SchemaRegistry::new(&config.registry.upload_dir, &config.registry.extension);
        Ok(Self::new(registry, adapter))
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn adapter(&self) -> &Arc<dyn StorageAdapter> {
        &self.adapter
    }

    /// Register every schema already on disk and re-create its tables.
    ///
    /// A schema that fails to parse or materialize is logged and skipped.
    pub async fn bootstrap(&self) -> Result<Vec<String>> {
        let identifiers = self.registry.discover()?;

        for identifier in &identifiers {
            let source = match self.registry.read_source(identifier) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Skipping schema '{}': {}", identifier, e);
                    continue;
                }
            };
            if let Err(e) = self.materialize_source(&source).await {
                tracing::warn!("Schema '{}' could not be materialized: {}", identifier, e);
            }
        }

        Ok(identifiers)
    }

    /// Parse, store, register and materialize a schema.
    ///
    /// Nothing is written when the text does not parse. A materialization
    /// failure leaves the schema registered so the upload can be retried.
    pub async fn upload(&self, identifier: &str, schema_text: &str) -> Result<SchemaSpec> {
        validate_identifier(identifier)?;
        let parsed = parse(schema_text)?;

        let spec = self.registry.store(identifier, schema_text)?;
        tracing::info!("Stored schema '{}' at {}", identifier, spec.source.display());

        materialize(&parsed.record_types, self.adapter.as_ref()).await?;
        tracing::info!(
            "Materialized {} table(s) for schema '{}'",
            parsed.record_types.len(),
            identifier
        );

        Ok(spec)
    }

    pub fn list(&self) -> BTreeSet<String> {
        self.registry.list_all()
    }

    pub fn source(&self, identifier: &str) -> Result<String> {
        self.registry.read_source(identifier)
    }

    /// The dispatcher for the current version of `identifier`, compiling it
    /// when the cached one is missing or stale.
    pub fn dispatcher(&self, identifier: &str) -> Result<Arc<CompiledDispatcher>> {
        // Marker first: a source read afterwards is never older than the marker
        let marker = self.registry.current_marker(identifier)?;
        if let Some(dispatcher) = self.cache.get_fresh(identifier, &marker) {
            return Ok(dispatcher);
        }

        tracing::info!("Compiling schema '{}'", identifier);
        let source = self.registry.read_source(identifier)?;
        let parsed = parse(&source)?;
        let dispatcher = Arc::new(dispatch::compile(
            identifier,
            marker,
            &parsed,
            Arc::clone(&self.adapter),
        )?);
        self.cache.store(Arc::clone(&dispatcher));

        Ok(dispatcher)
    }

    /// Execute a query string against a registered schema.
    pub async fn execute(
        &self,
        identifier: &str,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<Response> {
        let mut request = Request::new(query);
        if let Some(variables) = variables {
            request = request.variables(Variables::from_json(variables));
        }
        self.execute_request(identifier, request).await
    }

    pub async fn execute_request(&self, identifier: &str, request: Request) -> Result<Response> {
        let dispatcher = self.dispatcher(identifier)?;
        Ok(dispatcher.execute(request).await)
    }

    async fn materialize_source(&self, source: &str) -> Result<()> {
        let parsed = parse(source)?;
        materialize(&parsed.record_types, self.adapter.as_ref()).await
    }
}

impl std::fmt::Debug for SchemaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaService")
            .field("upload_dir", &self.registry.dir())
            .field("backend", &self.adapter.dialect_name())
            .field("cached_dispatchers", &self.cache.len())
            .finish()
    }
}
