//! Postgres execution strategies for crudbench.
//!
//! - [`PostgresRaw`]: one multi-row or `IN (...)` statement per round trip over a `bb8` pool.
//! - [`PostgresPipeline`]: one statement per row, pipelined on a single connection
//!   inside a transaction.

use std::str::FromStr;

use crudbench_core::{ConnectionError, StoreError};
use tokio_postgres::config::Host;
use tokio_postgres::error::SqlState;

pub mod pipeline;
pub mod raw;
pub mod sql_builder;

pub use pipeline::PostgresPipeline;
pub use raw::PostgresRaw;

pub(crate) const TRUNCATE_USERS: &str = r#"TRUNCATE TABLE "users" RESTART IDENTITY"#;
pub(crate) const COUNT_USERS: &str = r#"SELECT COUNT(*) FROM "users""#;
pub(crate) const SELECT_IDS: &str = r#"SELECT "id" FROM "users" ORDER BY "id" LIMIT $1 OFFSET $2"#;

// rust-postgres doesn't hand out a structured error kind, so derive one from
// the SQLSTATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UniqueViolation,
    NotNullViolation,
    Other,
}

pub fn error_kind(err: &tokio_postgres::Error) -> ErrorKind { classify(err.code()) }

fn classify(code: Option<&SqlState>) -> ErrorKind {
    match code {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION => ErrorKind::UniqueViolation,
        Some(code) if *code == SqlState::NOT_NULL_VIOLATION => ErrorKind::NotNullViolation,
        _ => ErrorKind::Other,
    }
}

/// Maps a driver error onto the harness' store taxonomy.
pub fn store_error(err: tokio_postgres::Error) -> StoreError {
    match error_kind(&err) {
        ErrorKind::UniqueViolation | ErrorKind::NotNullViolation => StoreError::constraint(err),
        ErrorKind::Other => StoreError::storage(err),
    }
}

/// A printable target for connection errors that leaves the password out.
pub fn describe_target(connection_string: &str) -> String {
    match tokio_postgres::Config::from_str(connection_string) {
        Ok(config) => {
            let host = match config.get_hosts().first() {
                Some(Host::Tcp(host)) => host.clone(),
                _ => "localhost".to_owned(),
            };
            let port = config.get_ports().first().copied().unwrap_or(5432);
            let database = config.get_dbname().unwrap_or("postgres");
            let user = config.get_user().unwrap_or("postgres");
            format!("postgres://{user}@{host}:{port}/{database}")
        }
        Err(_) => "postgres (unparseable connection string)".to_owned(),
    }
}

pub(crate) fn connection_error(connection_string: &str, err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> ConnectionError {
    ConnectionError::new(describe_target(connection_string), err)
}

pub(crate) fn to_i64(value: u64) -> i64 { i64::try_from(value).unwrap_or(i64::MAX) }

pub(crate) fn to_u64(value: i64) -> u64 { u64::try_from(value).unwrap_or(0) }
