/// Postgres storage adapter (networked relational backend)

use crate::error::{Result, SchemataError};
use crate::storage::{Row, SqlValue, StorageAdapter};

use async_trait::async_trait;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Client, NoTls};

/// Column type for a GraphQL base type name
pub fn postgres_column_type(base_type: &str) -> &'static str {
    match base_type {
        "Int" => "INTEGER",
        "Float" => "DOUBLE PRECISION",
        "Boolean" => "BOOLEAN",
        "ID" => "TEXT PRIMARY KEY",
        _ => "TEXT",
    }
}

/// Rewrite `?` placeholders into Postgres' numbered `$n` form.
///
/// Question marks inside single-quoted literals or double-quoted identifiers
/// are left alone.
pub(crate) fn number_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len() + 8);
    let mut index = 0;
    let mut quote: Option<char> = None;

    for ch in sql.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => {
                quote = None;
                out.push(c);
            }
            (Some(_), c) => out.push(c),
            (None, '\'') | (None, '"') => {
                quote = Some(ch);
                out.push(ch);
            }
            (None, '?') => {
                index += 1;
                out.push('$');
                out.push_str(&index.to_string());
            }
            (None, c) => out.push(c),
        }
    }
    out
}

/// Postgres-backed adapter over a single `tokio-postgres` client
pub struct PostgresAdapter {
    client: Client,
}

impl PostgresAdapter {
    /// Connect using a libpq-style or URL connection string.
    ///
    /// The connection driver runs on its own task for the lifetime of the client.
    pub async fn connect(url: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(url, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("Postgres connection error: {}", e);
            }
        });
        Ok(Self { client })
    }

    async fn prepare_and_bind(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<(tokio_postgres::Statement, Vec<Box<dyn ToSql + Sync + Send>>)> {
        let sql = number_placeholders(sql);
        let statement = self.client.prepare(&sql).await?;
        let bound = statement
            .params()
            .iter()
            .zip(params)
            .map(|(ty, value)| bind_param(value, ty))
            .collect::<Result<Vec<_>>>()?;
        Ok((statement, bound))
    }
}

fn bind_error(value: &SqlValue, ty: &Type) -> SchemataError {
    SchemataError::Storage(format!("Cannot bind value '{}' as {}", value, ty))
}

fn as_i64(value: &SqlValue, ty: &Type) -> Result<Option<i64>> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Bool(b) => Ok(Some(i64::from(*b))),
        SqlValue::Int(i) => Ok(Some(*i)),
        SqlValue::Float(f) if f.fract() == 0.0 => Ok(Some(*f as i64)),
        SqlValue::Text(s) => s.trim().parse().map(Some).map_err(|_| bind_error(value, ty)),
        SqlValue::Float(_) => Err(bind_error(value, ty)),
    }
}

fn as_f64(value: &SqlValue, ty: &Type) -> Result<Option<f64>> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Int(i) => Ok(Some(*i as f64)),
        SqlValue::Float(f) => Ok(Some(*f)),
        SqlValue::Text(s) => s.trim().parse().map(Some).map_err(|_| bind_error(value, ty)),
        SqlValue::Bool(_) => Err(bind_error(value, ty)),
    }
}

fn as_bool(value: &SqlValue, ty: &Type) -> Result<Option<bool>> {
    match value {
        SqlValue::Null => Ok(None),
        SqlValue::Bool(b) => Ok(Some(*b)),
        SqlValue::Int(i) => Ok(Some(*i != 0)),
        SqlValue::Text(s) => s.trim().parse().map(Some).map_err(|_| bind_error(value, ty)),
        SqlValue::Float(_) => Err(bind_error(value, ty)),
    }
}

/// Convert a value into the Rust type matching the parameter type Postgres inferred.
fn bind_param(value: &SqlValue, ty: &Type) -> Result<Box<dyn ToSql + Sync + Send>> {
    let bound: Box<dyn ToSql + Sync + Send> = match *ty {
        Type::BOOL => Box::new(as_bool(value, ty)?),
        Type::INT2 => Box::new(
            as_i64(value, ty)?
                .map(i16::try_from)
                .transpose()
                .map_err(|_| bind_error(value, ty))?,
        ),
        Type::INT4 => Box::new(
            as_i64(value, ty)?
                .map(i32::try_from)
                .transpose()
                .map_err(|_| bind_error(value, ty))?,
        ),
        Type::INT8 => Box::new(as_i64(value, ty)?),
        Type::FLOAT4 => Box::new(as_f64(value, ty)?.map(|f| f as f32)),
        Type::FLOAT8 => Box::new(as_f64(value, ty)?),
        _ => Box::new(match value {
            SqlValue::Null => None,
            other => Some(other.to_string()),
        }),
    };
    Ok(bound)
}

fn decode_row(row: &tokio_postgres::Row) -> Result<Row> {
    let mut record = Row::with_capacity(row.columns().len());
    for (idx, column) in row.columns().iter().enumerate() {
        let value = match *column.type_() {
            Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(SqlValue::Bool),
            Type::INT2 => row
                .try_get::<_, Option<i16>>(idx)?
                .map(|v| SqlValue::Int(i64::from(v))),
            Type::INT4 => row
                .try_get::<_, Option<i32>>(idx)?
                .map(|v| SqlValue::Int(i64::from(v))),
            Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(SqlValue::Int),
            Type::FLOAT4 => row
                .try_get::<_, Option<f32>>(idx)?
                .map(|v| SqlValue::Float(f64::from(v))),
            Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(SqlValue::Float),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                row.try_get::<_, Option<String>>(idx)?.map(SqlValue::Text)
            }
            ref other => {
                tracing::warn!(
                    "Unsupported Postgres type {} for column '{}', returning null",
                    other,
                    column.name()
                );
                None
            }
        };
        record.insert(column.name().to_string(), value.unwrap_or(SqlValue::Null));
    }
    Ok(record)
}

#[async_trait]
impl StorageAdapter for PostgresAdapter {
    async fn create_table(&self, name: &str, columns: &str) -> Result<()> {
        let sql = format!("CREATE TABLE IF NOT EXISTS {} ({})", name, columns);
        tracing::debug!("Executing DDL: {}", sql);
        self.client.batch_execute(&sql).await?;
        Ok(())
    }

    async fn query_many(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let (statement, bound) = self.prepare_and_bind(sql, params).await?;
        let refs: Vec<&(dyn ToSql + Sync)> = bound
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();
        let rows = self.client.query(&statement, &refs).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let (statement, bound) = self.prepare_and_bind(sql, params).await?;
        let refs: Vec<&(dyn ToSql + Sync)> = bound
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();
        Ok(self.client.execute(&statement, &refs).await?)
    }

    fn map_scalar_type(&self, base_type: &str) -> &'static str {
        postgres_column_type(base_type)
    }

    fn dialect_name(&self) -> &'static str {
        "postgres"
    }
}
