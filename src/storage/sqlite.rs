/// SQLite storage adapter (embedded file backend)

use crate::error::{Result, SchemataError};
use crate::storage::{Row, SqlValue, StorageAdapter};

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::types::{ToSqlOutput, Value as SqliteValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::sync::Arc;

/// Column type for a GraphQL base type name
pub fn sqlite_column_type(base_type: &str) -> &'static str {
    match base_type {
        "Int" => "INTEGER",
        "Float" => "REAL",
        "Boolean" => "BOOLEAN",
        "ID" => "TEXT PRIMARY KEY",
        _ => "TEXT",
    }
}

/// SQLite-backed adapter.
///
/// Holds a single connection; every call runs on the blocking pool so the
/// async runtime is never stalled by file I/O.
#[derive(Clone)]
pub struct SqliteAdapter {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAdapter {
    /// Open (or create) a database file. `:memory:` opens a private in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await
        .map_err(|e| SchemataError::Storage(format!("SQLite worker failed: {}", e)))?
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(SqliteValue::Null),
            SqlValue::Bool(b) => ToSqlOutput::Owned(SqliteValue::Integer(i64::from(*b))),
            SqlValue::Int(i) => ToSqlOutput::Owned(SqliteValue::Integer(*i)),
            SqlValue::Float(f) => ToSqlOutput::Owned(SqliteValue::Real(*f)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

fn read_value(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Int(i),
        ValueRef::Real(f) => SqlValue::Float(f),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            SqlValue::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

fn run_query(conn: &Connection, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut results = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Row::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            record.insert(column.clone(), read_value(row.get_ref(idx)?));
        }
        results.push(record);
    }
    Ok(results)
}

#[async_trait]
impl StorageAdapter for SqliteAdapter {
    async fn create_table(&self, name: &str, columns: &str) -> Result<()> {
        let sql = format!("CREATE TABLE IF NOT EXISTS {} ({})", name, columns);
        tracing::debug!("Executing DDL: {}", sql);
        self.with_connection(move |conn| {
            conn.execute_batch(&sql)?;
            Ok(())
        })
        .await
    }

    async fn query_many(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_connection(move |conn| run_query(conn, &sql, &params)).await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let sql = sql.to_string();
        let params = params.to_vec();
        self.with_connection(move |conn| {
            let affected = conn.execute(&sql, params_from_iter(params.iter()))?;
            Ok(affected as u64)
        })
        .await
    }

    fn map_scalar_type(&self, base_type: &str) -> &'static str {
        sqlite_column_type(base_type)
    }

    fn dialect_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mapping() {
        assert_eq!(sqlite_column_type("Int"), "INTEGER");
        assert_eq!(sqlite_column_type("Float"), "REAL");
        assert_eq!(sqlite_column_type("Boolean"), "BOOLEAN");
        assert_eq!(sqlite_column_type("ID"), "TEXT PRIMARY KEY");
        assert_eq!(sqlite_column_type("String"), "TEXT");
    }

    #[test]
    fn test_unknown_type_defaults_to_text() {
        assert_eq!(sqlite_column_type("Mood"), "TEXT");
        assert_eq!(sqlite_column_type("DateTime"), "TEXT");
    }

    #[tokio::test]
    async fn test_create_table_is_idempotent() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.create_table("Cat", "id TEXT PRIMARY KEY, name TEXT").await.unwrap();
        adapter.create_table("Cat", "id TEXT PRIMARY KEY, name TEXT").await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_query() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter
            .create_table("Cat", "id TEXT PRIMARY KEY, name TEXT, age INTEGER, indoor BOOLEAN")
            .await
            .unwrap();

        let inserted = adapter
            .execute(
                "INSERT INTO Cat (id, name, age, indoor) VALUES (?, ?, ?, ?)",
                &[
                    SqlValue::Text("1".to_string()),
                    SqlValue::Text("Tom".to_string()),
                    SqlValue::Int(3),
                    SqlValue::Bool(true),
                ],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let rows = adapter.query_many("SELECT * FROM Cat", &[]).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&SqlValue::Text("Tom".to_string())));
        assert_eq!(rows[0].get("age"), Some(&SqlValue::Int(3)));
        assert_eq!(rows[0].get("indoor"), Some(&SqlValue::Int(1)));
    }

    #[tokio::test]
    async fn test_query_one_absent() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.create_table("Cat", "id TEXT PRIMARY KEY").await.unwrap();

        let row = adapter
            .query_one("SELECT * FROM Cat WHERE id = ?", &[SqlValue::Text("x".to_string())])
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn test_primary_key_violation_is_an_error() {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.create_table("Bike", "id TEXT PRIMARY KEY").await.unwrap();

        let params = [SqlValue::Text("1".to_string())];
        adapter.execute("INSERT INTO Bike (id) VALUES (?)", &params).await.unwrap();
        let second = adapter.execute("INSERT INTO Bike (id) VALUES (?)", &params).await;

        assert!(matches!(second, Err(SchemataError::Sqlite(_))));
    }
}
