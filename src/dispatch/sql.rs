/// Parameterized SQL construction
///
/// Values are always bound as parameters. Table and column names are spliced
/// into the text, so they must be plain GraphQL names.

use crate::error::{Result, SchemataError};
use crate::storage::SqlValue;

/// A statement with `?` placeholders and its bound values in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Arguments of one call, in the field's declared argument order
pub type Arguments = Vec<(String, SqlValue)>;

/// Accept only `[_A-Za-z][_0-9A-Za-z]*`.
pub fn identifier(name: &str) -> Result<&str> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic());
    if valid_start && chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
        Ok(name)
    } else {
        Err(SchemataError::InvalidIdentifier(name.to_string()))
    }
}

pub fn select_all(table: &str) -> Result<Statement> {
    Ok(Statement {
        sql: format!("SELECT * FROM {}", identifier(table)?),
        params: Vec::new(),
    })
}

pub fn select_by_key(table: &str, key: &str, value: &SqlValue) -> Result<Statement> {
    Ok(Statement {
        sql: format!("SELECT * FROM {} WHERE {} = ?", identifier(table)?, identifier(key)?),
        params: vec![value.clone()],
    })
}

pub fn insert(table: &str, args: &[(String, SqlValue)]) -> Result<Statement> {
    let columns = args
        .iter()
        .map(|(name, _)| identifier(name))
        .collect::<Result<Vec<_>>>()?;
    let placeholders = vec!["?"; args.len()];
    Ok(Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            identifier(table)?,
            columns.join(", "),
            placeholders.join(", ")
        ),
        params: args.iter().map(|(_, value)| value.clone()).collect(),
    })
}

/// `UPDATE` every column in `rest`, addressing the row by `key`.
///
/// The key never appears in the SET clause; its value is bound last.
pub fn update(table: &str, key: &str, key_value: &SqlValue, rest: &[(String, SqlValue)]) -> Result<Statement> {
    let assignments = rest
        .iter()
        .map(|(name, _)| identifier(name).map(|n| format!("{} = ?", n)))
        .collect::<Result<Vec<_>>>()?;
    let mut params: Vec<SqlValue> = rest.iter().map(|(_, value)| value.clone()).collect();
    params.push(key_value.clone());
    Ok(Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {} = ?",
            identifier(table)?,
            assignments.join(", "),
            identifier(key)?
        ),
        params,
    })
}

pub fn delete(table: &str, key: &str, key_value: &SqlValue) -> Result<Statement> {
    Ok(Statement {
        sql: format!("DELETE FROM {} WHERE {} = ?", identifier(table)?, identifier(key)?),
        params: vec![key_value.clone()],
    })
}
