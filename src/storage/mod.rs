//! Storage layer for studyflow.
//!
//! SQLite-based persistence for subjects, topics, study sessions,
//! deadlines, plans and revision history.

mod database;
mod migrations;
mod store;

pub use database::Database;
pub use store::StudyStore;
