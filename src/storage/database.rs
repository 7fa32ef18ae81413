//! `SQLite` database connection.
//!
//! The database is stored at `~/.studyflow/studyflow.db` and contains one
//! table per record type, each scoped by `user_id`.

use rusqlite::Connection;
use std::time::Duration;

use crate::config::Paths;
use crate::error::StudyFlowError;

use super::migrations;

/// How long a write waits for another `studyflow` process to release the lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open() -> Result<Self, StudyFlowError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, StudyFlowError> {
        tracing::debug!(path = %path.display(), "opening database");
        let conn = Connection::open(path).map_err(|e| {
            StudyFlowError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        Self::init(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, StudyFlowError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            StudyFlowError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StudyFlowError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StudyFlowError::Database(format!("Failed to enable foreign keys: {e}")))?;

        migrations::run(&conn)?;
        let db = Self { conn };
        tracing::debug!(version = db.schema_version()?, "database ready");
        Ok(db)
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, StudyFlowError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(db: &Database) -> Vec<String> {
        let mut stmt = db
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .unwrap();
        stmt.query_map([], |row| row.get(0)).unwrap().map(Result::unwrap).collect()
    }

    #[test]
    fn test_open_in_memory_creates_study_tables() {
        let db = Database::open_in_memory().unwrap();
        let tables = table_names(&db);
        for table in ["deadlines", "revisions", "study_plans", "study_sessions", "subjects", "topics"] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let db = Database::open_in_memory().unwrap();
        let orphan = db.connection().execute(
            "INSERT INTO topics (user_id, subject_id, title, status) VALUES ('alice', 99, 'Limits', 'not_started')",
            [],
        );
        assert!(orphan.is_err());
    }

    #[test]
    fn test_reopen_file_keeps_version() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("studyflow.db");

        let first = Database::open_at(&db_path).unwrap().schema_version().unwrap();
        assert!(db_path.exists());

        let second = Database::open_at(&db_path).unwrap().schema_version().unwrap();
        assert_eq!(first, second);
    }
}
