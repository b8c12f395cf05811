//! DuckDB database handle
//!
//! Owns one DuckDB connection and hands out per-request clones of it. The
//! database may live in a file or in memory; clones always see the same data.

use super::table::Table;
use crate::error::{Error, Result};
use duckdb::Connection;
use std::path::Path;
use std::sync::Mutex;

/// In-memory location marker
pub const MEMORY: &str = ":memory:";

/// Database opened from a file path or `:memory:`
pub struct Database {
    /// Root connection, only used to clone per-request connections
    conn: Mutex<Connection>,
    /// Where the database lives (for logging)
    location: String,
}

impl Database {
    /// Open a database file, or an in-memory database for `:memory:` / empty
    pub fn open(location: &str) -> Result<Self> {
        if location.is_empty() || location == MEMORY {
            return Self::open_in_memory();
        }

        let conn = Connection::open(Path::new(location)).map_err(|e| {
            Error::config(format!("Failed to open DuckDB database '{location}': {e}"))
        })?;

        tracing::debug!("Opened DuckDB database at {}", location);

        Ok(Self {
            conn: Mutex::new(conn),
            location: location.to_string(),
        })
    }

    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;

        Ok(Self {
            conn: Mutex::new(conn),
            location: MEMORY.to_string(),
        })
    }

    /// Run one or more statements (used for bootstrap SQL)
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.connect()?
            .execute_batch(sql)
            .map_err(|e| Error::query(format!("Failed to execute batch: {e}")))
    }

    /// A new connection to the same database
    pub fn connect(&self) -> Result<Connection> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| Error::query("Database connection lock poisoned"))?;
        conn.try_clone()
            .map_err(|e| Error::query(format!("Failed to clone DuckDB connection: {e}")))
    }

    /// Bind a table with its key column on a new connection
    pub fn table(&self, name: &str, key_column: &str) -> Result<Table> {
        Table::new(self.connect()?, name, key_column)
    }

    /// Test the database connection
    pub fn check_connection(&self) -> Result<()> {
        self.connect()?
            .execute_batch("SELECT 1")
            .map_err(|e| Error::query(format!("Connection check failed: {e}")))
    }

    /// Get list of tables in the main schema
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(
                "SELECT table_name FROM information_schema.tables
                 WHERE table_schema = 'main'
                 ORDER BY table_name",
            )
            .map_err(|e| Error::query(format!("Failed to prepare query: {e}")))?;

        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .map_err(|e| Error::query(format!("Failed to query tables: {e}")))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(tables)
    }

    /// Where the database lives
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Check if the database is in memory
    pub fn is_in_memory(&self) -> bool {
        self.location == MEMORY
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}
