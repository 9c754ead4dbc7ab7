//! Persistence module split across logical submodules.
//!
//! `connection` owns the database file and hands out short-lived connections;
//! `books` maps catalog operations onto parameterized statements against the
//! single `books` table.

use std::path::PathBuf;

use rusqlite::ErrorCode;
use thiserror::Error;

mod books;
mod connection;

pub use books::{BookStore, SqliteBookStore};
pub use connection::Database;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures raised by the store. The catalog service catches every variant and
/// surfaces its text to the user, so messages are written to be readable.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot open database at {}: {source}", path.display())]
    Connect {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("cannot prepare data directory {}: {source}", path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("constraint violation while trying to {action}: {source}")]
    Constraint {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to {action}: {source}")]
    Query {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    /// Whether the underlying SQLite error was a constraint violation
    /// (duplicate primary key, failed `CHECK`, `NOT NULL`).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::Constraint { .. })
    }
}

/// Build a mapper that tags a `rusqlite` error with the action that failed.
/// Constraint violations get their own variant so callers can tell a duplicate
/// id apart from a broken connection.
pub(crate) fn query_error(action: &'static str) -> impl FnOnce(rusqlite::Error) -> StoreError {
    move |source| {
        if matches!(
            source.sqlite_error_code(),
            Some(ErrorCode::ConstraintViolation)
        ) {
            StoreError::Constraint { action, source }
        } else {
            StoreError::Query { action, source }
        }
    }
}
