use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use rusqlite::Connection;

use super::{query_error, StoreError, StoreResult};

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_BOOKS_TABLE: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL CHECK (length(title) <= 255),
    author TEXT NOT NULL CHECK (length(author) <= 255),
    year INTEGER NOT NULL,
    pages INTEGER NOT NULL
)";

/// Handle on the SQLite file backing the catalog. It holds no open connection:
/// every call to [`Database::connect`] opens a fresh one that closes when the
/// caller drops it.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a new connection to the database file.
    pub fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.path).map_err(|source| StoreError::Connect {
            path: self.path.clone(),
            source,
        })?;
        conn.busy_timeout(BUSY_TIMEOUT)
            .map_err(|source| StoreError::Connect {
                path: self.path.clone(),
                source,
            })?;
        debug!(
            "event=db_connect module=db status=ok path={}",
            self.path.display()
        );
        Ok(conn)
    }

    /// Ensure the data directory and the `books` table exist. Safe to call on
    /// every startup.
    pub fn ensure_schema(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = self.connect()?;
        conn.execute(CREATE_BOOKS_TABLE, [])
            .map_err(query_error("create books table"))?;

        info!(
            "event=schema_ready module=db status=ok path={}",
            self.path.display()
        );
        Ok(())
    }

    /// Try to open (and immediately close) a connection. Failures are logged
    /// and reported as `false` so startup can warn without aborting.
    pub fn test_connection(&self) -> bool {
        match self.connect() {
            Ok(_conn) => true,
            Err(err) => {
                warn!("event=db_probe module=db status=error error={err}");
                false
            }
        }
    }
}
