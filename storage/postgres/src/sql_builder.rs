use crudbench_core::{Record, RecordId, StoreError};
use thiserror::Error;
use tokio_postgres::types::ToSql;

/// Postgres' wire protocol carries the parameter count as an `i16`/`u16`.
pub const MAX_BIND_PARAMETERS: usize = u16::MAX as usize;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqlGenerationError {
    #[error("statement needs {0} bind parameters, Postgres accepts at most {max}", max = MAX_BIND_PARAMETERS)]
    TooManyParameters(usize),
    #[error("refusing to build a statement with an empty {0} list")]
    EmptyList(&'static str),
}

impl From<SqlGenerationError> for StoreError {
    fn from(err: SqlGenerationError) -> Self {
        match err {
            SqlGenerationError::TooManyParameters(required) => StoreError::TooManyParameters { required, max: MAX_BIND_PARAMETERS },
            other => StoreError::storage(other),
        }
    }
}

pub enum SqlExpr {
    Sql(String),
    Argument(Box<dyn ToSql + Send + Sync>),
}

/// Accumulates SQL text and arguments, numbering `$n` placeholders in order.
#[derive(Default)]
pub struct SqlBuilder {
    expressions: Vec<SqlExpr>,
    arguments: usize,
}

impl SqlBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn push(&mut self, expr: SqlExpr) {
        if let SqlExpr::Argument(_) = expr {
            self.arguments += 1;
        }
        self.expressions.push(expr);
    }

    pub fn arg(&mut self, arg: impl ToSql + Send + Sync + 'static) { self.push(SqlExpr::Argument(Box::new(arg) as Box<dyn ToSql + Send + Sync>)); }

    pub fn sql(&mut self, s: impl AsRef<str>) { self.push(SqlExpr::Sql(s.as_ref().to_owned())); }

    /// Number of bind parameters pushed so far.
    pub fn argument_count(&self) -> usize { self.arguments }

    /// `$a, $b, ...` for each item.
    pub fn arg_list<T: ToSql + Send + Sync + 'static>(&mut self, items: impl IntoIterator<Item = T>) {
        for (index, item) in items.into_iter().enumerate() {
            if index > 0 {
                self.sql(", ");
            }
            self.arg(item);
        }
    }

    pub fn build(self) -> Result<(String, Vec<Box<dyn ToSql + Send + Sync>>), SqlGenerationError> {
        if self.arguments > MAX_BIND_PARAMETERS {
            return Err(SqlGenerationError::TooManyParameters(self.arguments));
        }

        let mut counter = 1;
        let mut sql = String::new();
        let mut args = Vec::with_capacity(self.arguments);

        for expr in self.expressions {
            match expr {
                SqlExpr::Argument(arg) => {
                    sql += &format!("${}", counter);
                    args.push(arg);
                    counter += 1;
                }
                SqlExpr::Sql(s) => {
                    sql += &s;
                }
            }
        }

        Ok((sql, args))
    }
}

pub fn quote_identifier(name: &str) -> String { format!(r#""{}""#, name.replace('"', "\"\"")) }

/// One multi-row `INSERT` for the whole chunk.
pub fn insert_records(table: &str, records: &[Record]) -> Result<SqlBuilder, SqlGenerationError> {
    if records.is_empty() {
        return Err(SqlGenerationError::EmptyList("record"));
    }
    let required = records.len() * 3;
    if required > MAX_BIND_PARAMETERS {
        return Err(SqlGenerationError::TooManyParameters(required));
    }

    let mut builder = SqlBuilder::new();
    builder.sql(format!(r#"INSERT INTO {}("name", "email", "created_at") VALUES "#, quote_identifier(table)));
    for (index, record) in records.iter().enumerate() {
        builder.sql(if index == 0 { "(" } else { ", (" });
        builder.arg(record.name.clone());
        builder.sql(", ");
        builder.arg(record.email.clone());
        builder.sql(", ");
        builder.arg(record.created_at);
        builder.sql(")");
    }
    Ok(builder)
}

/// `UPDATE .. SET "name" = $1 WHERE "id" IN ($2, ..)`.
pub fn update_names(table: &str, ids: &[RecordId], new_name: &str) -> Result<SqlBuilder, SqlGenerationError> {
    if ids.is_empty() {
        return Err(SqlGenerationError::EmptyList("id"));
    }

    let mut builder = SqlBuilder::new();
    builder.sql(format!(r#"UPDATE {} SET "name" = "#, quote_identifier(table)));
    builder.arg(new_name.to_owned());
    builder.sql(r#" WHERE "id" IN ("#);
    builder.arg_list(ids.iter().map(RecordId::get));
    builder.sql(")");
    Ok(builder)
}

/// `DELETE .. WHERE "id" IN ($1, ..)`.
pub fn delete_ids(table: &str, ids: &[RecordId]) -> Result<SqlBuilder, SqlGenerationError> {
    if ids.is_empty() {
        return Err(SqlGenerationError::EmptyList("id"));
    }

    let mut builder = SqlBuilder::new();
    builder.sql(format!(r#"DELETE FROM {} WHERE "id" IN ("#, quote_identifier(table)));
    builder.arg_list(ids.iter().map(RecordId::get));
    builder.sql(")");
    Ok(builder)
}
