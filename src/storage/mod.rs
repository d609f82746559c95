/// Storage adapters
///
/// Every backend answers the same narrow contract: idempotent table creation,
/// parameterized queries and statements, and a mapping from GraphQL scalar
/// names to column types. Statements always use `?` placeholders; adapters
/// translate them to their own dialect.

mod postgres;
mod sqlite;

pub use postgres::{postgres_column_type, PostgresAdapter};
pub use sqlite::{sqlite_column_type, SqliteAdapter};

use crate::config::StorageConfig;
use crate::error::Result;

use async_graphql::{Name, Number, Value};
use async_trait::async_trait;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A single column value as it crosses the storage boundary
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// One result row, keyed by column name in column order
pub type Row = IndexMap<String, SqlValue>;

#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Create `name` with the given column definitions unless it already exists.
    async fn create_table(&self, name: &str, columns: &str) -> Result<()>;

    async fn query_many(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>>;

    /// First row of the result, or `None` when the query matched nothing.
    async fn query_one(&self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>> {
        Ok(self.query_many(sql, params).await?.into_iter().next())
    }

    /// Run an INSERT/UPDATE/DELETE and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Column type for a GraphQL base type name. Unknown names map to text.
    fn map_scalar_type(&self, base_type: &str) -> &'static str;

    fn dialect_name(&self) -> &'static str;
}

/// Open the backend selected by the configuration
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn StorageAdapter>> {
    match config {
        StorageConfig::Sqlite { path } => {
            tracing::info!("Opening SQLite database at {}", path);
            Ok(Arc::new(SqliteAdapter::open(path)?))
        }
        StorageConfig::Postgres { url } => {
            tracing::info!("Connecting to Postgres");
            Ok(Arc::new(PostgresAdapter::connect(url).await?))
        }
    }
}

impl SqlValue {
    /// Convert a GraphQL input value into a bindable parameter.
    ///
    /// Lists and objects have no column representation and are stored as JSON text.
    pub fn from_graphql(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Boolean(b) => SqlValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlValue::Int(i),
                None => n.as_f64().map(SqlValue::Float).unwrap_or(SqlValue::Null),
            },
            Value::String(s) => SqlValue::Text(s.clone()),
            Value::Enum(name) => SqlValue::Text(name.to_string()),
            Value::Binary(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            Value::List(_) | Value::Object(_) => {
                SqlValue::Text(serde_json::to_string(value).unwrap_or_default())
            }
        }
    }

    pub fn to_graphql(&self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Bool(b) => Value::Boolean(*b),
            SqlValue::Int(i) => Value::Number((*i).into()),
            SqlValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            SqlValue::Text(s) => Value::String(s.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{}", b),
            SqlValue::Int(i) => write!(f, "{}", i),
            SqlValue::Float(x) => write!(f, "{}", x),
            SqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Convert a storage row into a GraphQL object value
pub fn row_to_graphql_value(row: &Row) -> Value {
    let object = row
        .iter()
        .map(|(column, value)| (Name::new(column), value.to_graphql()))
        .collect();
    Value::Object(object)
}
