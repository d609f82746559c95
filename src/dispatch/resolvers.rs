/// Executable resolvers for the fields of the `Query` and `Mutation` roots

use crate::dispatch::convention::{mutation_target_table, MutationKind, MutationOperation};
use crate::dispatch::sql::{self, Arguments, Statement};
use crate::error::{Result, SchemataError};
use crate::schema::FieldDefinition;
use crate::storage::{Row, SqlValue, StorageAdapter};

/// Result of running a resolver, before it is shaped to the field's declared type
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Every row of a table
    Rows(Vec<Row>),
    /// A keyed lookup; `None` when nothing matched
    Row(Option<Row>),
}

/// Answers one `Query` field by reading the table named after its return type
#[derive(Debug, Clone)]
pub struct QueryResolver {
    pub field: String,
    pub table: String,
    /// Declared argument names, in declaration order
    pub arguments: Vec<String>,
}

impl QueryResolver {
    pub fn from_field(field: &FieldDefinition) -> Self {
        Self {
            field: field.name.clone(),
            table: field.ty.base_name().to_string(),
            arguments: field.argument_names(),
        }
    }

    /// Without arguments every row is returned. Otherwise the first supplied
    /// argument (in declared order) selects a single row; the rest are ignored.
    pub fn plan(&self, args: &Arguments) -> Result<Statement> {
        match args.first() {
            None => sql::select_all(&self.table),
            Some((key, value)) => sql::select_by_key(&self.table, key, value),
        }
    }

    pub async fn resolve(&self, adapter: &dyn StorageAdapter, args: &Arguments) -> Result<Resolved> {
        self.run(adapter, args)
            .await
            .map_err(|e| SchemataError::resolver(&self.field, e))
    }

    async fn run(&self, adapter: &dyn StorageAdapter, args: &Arguments) -> Result<Resolved> {
        let stmt = self.plan(args)?;
        tracing::debug!("Executing query: {} {:?}", stmt.sql, stmt.params);

        if args.is_empty() {
            Ok(Resolved::Rows(adapter.query_many(&stmt.sql, &stmt.params).await?))
        } else {
            Ok(Resolved::Row(adapter.query_one(&stmt.sql, &stmt.params).await?))
        }
    }
}

/// Answers one `Mutation` field whose name follows the add/update/delete convention
#[derive(Debug, Clone)]
pub struct MutationResolver {
    pub field: String,
    pub kind: MutationKind,
    pub table: String,
    pub arguments: Vec<String>,
}

impl MutationResolver {
    /// `None` when the field name matches no convention.
    pub fn from_field(field: &FieldDefinition) -> Option<Self> {
        let kind = MutationKind::classify(&field.name);
        let table = mutation_target_table(&field.name, kind, field.ty.base_name())?;
        Some(Self {
            field: field.name.clone(),
            kind,
            table,
            arguments: field.argument_names(),
        })
    }

    /// Bind the convention to one call's arguments.
    pub fn operation(&self, args: &Arguments) -> MutationOperation {
        let key_argument = match self.kind {
            MutationKind::Update | MutationKind::Delete => args.first().map(|(name, _)| name.clone()),
            MutationKind::Create | MutationKind::Unsupported => None,
        };
        MutationOperation {
            kind: self.kind,
            target_table: self.table.clone(),
            key_argument,
        }
    }

    pub fn plan(&self, args: &Arguments) -> Result<Statement> {
        match self.kind {
            MutationKind::Create => {
                if args.is_empty() {
                    return Err(SchemataError::Storage(format!(
                        "Mutation '{}' needs at least one argument to insert",
                        self.field
                    )));
                }
                sql::insert(&self.table, args)
            }
            MutationKind::Update => {
                let ((key, key_value), rest) = self.split_key(args)?;
                sql::update(&self.table, key, key_value, rest)
            }
            MutationKind::Delete => {
                let ((key, key_value), _) = self.split_key(args)?;
                sql::delete(&self.table, key, key_value)
            }
            MutationKind::Unsupported => Err(SchemataError::Compilation(format!(
                "Mutation '{}' has no storage operation",
                self.field
            ))),
        }
    }

    fn split_key<'a>(
        &self,
        args: &'a Arguments,
    ) -> Result<(&'a (String, SqlValue), &'a [(String, SqlValue)])> {
        args.split_first().ok_or_else(|| {
            SchemataError::Storage(format!(
                "Mutation '{}' needs a key argument",
                self.field
            ))
        })
    }

    /// Run the mutation. Create and update return the arguments as the
    /// record; delete returns just the key.
    pub async fn resolve(&self, adapter: &dyn StorageAdapter, args: &Arguments) -> Result<Row> {
        self.run(adapter, args)
            .await
            .map_err(|e| SchemataError::resolver(&self.field, e))
    }

    async fn run(&self, adapter: &dyn StorageAdapter, args: &Arguments) -> Result<Row> {
        let stmt = self.plan(args)?;
        tracing::debug!("Executing {} mutation: {} {:?}", self.kind, stmt.sql, stmt.params);

        let affected = adapter.execute(&stmt.sql, &stmt.params).await?;
        tracing::debug!("{} row(s) affected in {}", affected, self.table);

        let returned = match self.kind {
            MutationKind::Delete => args.iter().take(1).cloned().collect(),
            _ => args.iter().cloned().collect(),
        };
        Ok(returned)
    }
}
