//! Database migrations for studyflow.
//!
//! Each migration is a function that upgrades the schema by one version.
//! Migrations are run automatically when the database is opened.

use rusqlite::Connection;

use crate::error::StudyFlowError;

/// Current schema version.
const CURRENT_VERSION: i32 = 2;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, StudyFlowError> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| StudyFlowError::Database(format!("Failed to get schema version: {e}")))?;

    Ok(version)
}

/// Set the schema version in the database.
fn set_version(conn: &Connection, version: i32) -> Result<(), StudyFlowError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| StudyFlowError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), StudyFlowError> {
    let current = get_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(());
    }

    for version in (current + 1)..=CURRENT_VERSION {
        tracing::info!(version, "applying schema migration");
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

/// Run a specific migration.
fn run_migration(conn: &Connection, version: i32) -> Result<(), StudyFlowError> {
    match version {
        1 => migrate_v1(conn),
        2 => migrate_v2(conn),
        _ => Err(StudyFlowError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// Creates tables for subjects, topics, study sessions, deadlines and
/// revisions. Every table carries the owning `user_id`.
fn migrate_v1(conn: &Connection) -> Result<(), StudyFlowError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS subjects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            color TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_subjects_user ON subjects(user_id);

        CREATE TABLE IF NOT EXISTS topics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            subject_id INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'not_started'
        );

        CREATE INDEX IF NOT EXISTS idx_topics_user_subject ON topics(user_id, subject_id);

        CREATE TABLE IF NOT EXISTS study_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            subject_id INTEGER REFERENCES subjects(id) ON DELETE SET NULL,
            start_time TEXT NOT NULL,
            duration_minutes INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_sessions_user_start ON study_sessions(user_id, start_time);

        CREATE TABLE IF NOT EXISTS deadlines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            subject_id INTEGER REFERENCES subjects(id) ON DELETE SET NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            due_date TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_deadlines_user ON deadlines(user_id);

        CREATE TABLE IF NOT EXISTS revisions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            topic_id INTEGER NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            revision_number INTEGER NOT NULL,
            revision_date TEXT NOT NULL,
            confidence_level INTEGER,
            next_revision_date TEXT NOT NULL,
            UNIQUE (topic_id, revision_number)
        );

        CREATE INDEX IF NOT EXISTS idx_revisions_user_next ON revisions(user_id, next_revision_date);
        ",
    )
    .map_err(|e| StudyFlowError::Database(format!("Migration v1 failed: {e}")))
}

/// Migration v2: study plans (calendar blocks).
fn migrate_v2(conn: &Connection) -> Result<(), StudyFlowError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS study_plans (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            title TEXT NOT NULL,
            planned_date TEXT NOT NULL,
            completed INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_plans_user_date ON study_plans(user_id, planned_date);
        ",
    )
    .map_err(|e| StudyFlowError::Database(format!("Migration v2 failed: {e}")))
}
