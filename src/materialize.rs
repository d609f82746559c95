/// Table materialization
///
/// Every record type becomes one table whose columns are exactly its field
/// names. Creation is idempotent, so re-materializing a schema is safe.

use crate::dispatch::sql::identifier;
use crate::error::{Result, SchemataError};
use crate::schema::TypeDefinition;
use crate::storage::StorageAdapter;

/// Column definitions for a record type, e.g. `id TEXT PRIMARY KEY, age INTEGER`
pub fn column_definitions(record_type: &TypeDefinition, adapter: &dyn StorageAdapter) -> Result<String> {
    let columns = record_type
        .fields
        .iter()
        .map(|field| {
            let column = identifier(&field.name)?;
            Ok(format!("{} {}", column, adapter.map_scalar_type(field.ty.base_name())))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(columns.join(", "))
}

/// Create a table for every record type.
///
/// Stops at the first failure. Tables created before it are kept; a retry
/// of the whole schema resumes where it stopped.
pub async fn materialize(record_types: &[TypeDefinition], adapter: &dyn StorageAdapter) -> Result<()> {
    for record_type in record_types {
        create_record_table(record_type, adapter)
            .await
            .map_err(|e| SchemataError::Materialization {
                table: record_type.name.clone(),
                source: Box::new(e),
            })?;
    }
    Ok(())
}

async fn create_record_table(record_type: &TypeDefinition, adapter: &dyn StorageAdapter) -> Result<()> {
    let table = identifier(&record_type.name)?;
    let columns = column_definitions(record_type, adapter)?;
    tracing::info!("Creating table {} ({}) on {}", table, columns, adapter.dialect_name());
    adapter.create_table(table, &columns).await
}
