pub mod config;
pub mod dispatch;
pub mod error;
pub mod materialize;
pub mod registry;
pub mod schema;
pub mod server;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, RegistryConfig, ServerConfig, StorageConfig};
pub use dispatch::{CompiledDispatcher, DispatcherCache};
pub use error::{Result, SchemataError};
pub use registry::{FreshnessMarker, SchemaRegistry, SchemaSpec};
pub use schema::{parse, ParsedSchema, TypeDescriptor};
pub use service::SchemaService;
pub use storage::{PostgresAdapter, SqlValue, SqliteAdapter, StorageAdapter};
