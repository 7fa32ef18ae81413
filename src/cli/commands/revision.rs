//! Revision commands.

use super::Context;
use crate::cli::args::OutputFormat;
use crate::core::{parse_date, parse_datetime, Confidence, StudyDataSource};
use crate::error::StudyFlowError;
use crate::features::revision::{due_revisions, log_revision};
use crate::output::{format_due, format_revision_pretty, to_json};

/// Record a revision of `topic_id`.
///
/// # Errors
///
/// Returns an error if the topic is unknown, the time cannot be parsed or
/// storage fails.
pub fn revise(
    ctx: &Context,
    topic_id: i64,
    confidence: Option<u8>,
    at: Option<&str>,
) -> Result<String, StudyFlowError> {
    let revised_at = match at {
        Some(at) => parse_datetime(at, ctx.today(), ctx.now.time())?,
        None => ctx.now,
    };
    let confidence = confidence.map(Confidence::new).transpose()?;

    let record = log_revision(&ctx.store, &ctx.user, topic_id, revised_at, confidence)?;

    match ctx.format {
        OutputFormat::Json => to_json(&record),
        OutputFormat::Pretty => {
            let title = ctx
                .store
                .topic(&ctx.user, topic_id)?
                .map_or_else(|| format!("topic {topic_id}"), |t| t.title);
            Ok(format_revision_pretty(&record, &title))
        }
    }
}

/// List topics due for revision on or before `as_of` (default today).
///
/// # Errors
///
/// Returns an error if the date cannot be parsed or storage fails.
pub fn due(ctx: &Context, as_of: Option<&str>) -> Result<String, StudyFlowError> {
    let as_of = match as_of {
        Some(s) => parse_date(s, ctx.today())?,
        None => ctx.today(),
    };

    let due = due_revisions(&ctx.store, &ctx.user, as_of)?;
    let topics = ctx.store.topics(&ctx.user, None)?;
    format_due(&due, &topics, as_of, ctx.format)
}
