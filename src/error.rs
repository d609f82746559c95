use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemataError {
    #[error("Schema parse error: {0}")]
    Parse(String),

    #[error("Failed to create table '{table}': {source}")]
    Materialization {
        table: String,
        #[source]
        source: Box<SchemataError>,
    },

    #[error("Schema compilation error: {0}")]
    Compilation(String),

    #[error("Error resolving field '{field}': {source}")]
    ResolverExecution {
        field: String,
        #[source]
        source: Box<SchemataError>,
    },

    #[error("Schema not found: {0}")]
    SchemaNotFound(String),

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Invalid upload: {0}")]
    Upload(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SchemataError {
    /// Wrap a storage failure raised while resolving a single field.
    pub fn resolver(field: impl Into<String>, source: SchemataError) -> Self {
        SchemataError::ResolverExecution {
            field: field.into(),
            source: Box::new(source),
        }
    }
}

impl From<toml::de::Error> for SchemataError {
    fn from(err: toml::de::Error) -> Self {
        SchemataError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for SchemataError {
    fn from(err: toml::ser::Error) -> Self {
        SchemataError::Serialization(format!("TOML serialization error: {}", err))
    }
}

impl From<config::ConfigError> for SchemataError {
    fn from(err: config::ConfigError) -> Self {
        SchemataError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SchemataError {
    fn from(err: serde_json::Error) -> Self {
        SchemataError::Serialization(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, SchemataError>;
