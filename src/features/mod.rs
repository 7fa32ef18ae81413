//! Feature implementations for studyflow.
//!
//! - Spaced-repetition revision scheduling
//! - Study analytics, dashboard and insights
//! - JSON export and import

pub mod analytics;
pub mod revision;
pub mod transfer;
