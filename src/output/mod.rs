//! Output formatting for studyflow.
//!
//! This module provides formatters for displaying study records in various formats.

mod json;
mod pretty;

use chrono::{DateTime, NaiveDate, Utc};

use crate::cli::args::OutputFormat;
use crate::core::{Deadline, RevisionRecord, StudyPlan, StudySession, Subject, Topic};
use crate::error::StudyFlowError;

pub use json::*;
pub use pretty::*;

/// Format subjects based on output format
///
/// # Errors
///
/// Returns `StudyFlowError::Json` if JSON serialization fails.
pub fn format_subjects(subjects: &[Subject], format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Pretty => Ok(format_subjects_pretty(subjects)),
        OutputFormat::Json => format_list_json("subjects", subjects),
    }
}

/// Format topics based on output format
///
/// # Errors
///
/// Returns `StudyFlowError::Json` if JSON serialization fails.
pub fn format_topics(
    topics: &[Topic],
    subjects: &[Subject],
    format: OutputFormat,
) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Pretty => Ok(format_topics_pretty(topics, subjects)),
        OutputFormat::Json => format_list_json("topics", topics),
    }
}

/// Format sessions based on output format
///
/// # Errors
///
/// Returns `StudyFlowError::Json` if JSON serialization fails.
pub fn format_sessions(
    sessions: &[StudySession],
    subjects: &[Subject],
    format: OutputFormat,
) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Pretty => Ok(format_sessions_pretty(sessions, subjects)),
        OutputFormat::Json => format_list_json("sessions", sessions),
    }
}

/// Format deadlines based on output format
///
/// # Errors
///
/// Returns `StudyFlowError::Json` if JSON serialization fails.
pub fn format_deadlines(
    deadlines: &[Deadline],
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Pretty => Ok(format_deadlines_pretty(deadlines, now)),
        OutputFormat::Json => format_list_json("deadlines", deadlines),
    }
}

/// Format plans based on output format
///
/// # Errors
///
/// Returns `StudyFlowError::Json` if JSON serialization fails.
pub fn format_plans(plans: &[StudyPlan], format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Pretty => Ok(format_plans_pretty(plans)),
        OutputFormat::Json => format_list_json("plans", plans),
    }
}

/// Format due revisions based on output format
///
/// # Errors
///
/// Returns `StudyFlowError::Json` if JSON serialization fails.
pub fn format_due(
    due: &[RevisionRecord],
    topics: &[Topic],
    as_of: NaiveDate,
    format: OutputFormat,
) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Pretty => Ok(format_due_pretty(due, topics, as_of)),
        OutputFormat::Json => format_list_json("due_revisions", due),
    }
}
