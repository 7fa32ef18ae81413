//! Logging revisions and listing what is due, against stored records.

use chrono::{DateTime, NaiveDate, Utc};

use super::scheduler::{find_due_revisions, record_revision};
use crate::core::{Confidence, RevisionRecord, StudyDataSource, TopicId};
use crate::error::StudyFlowError;
use crate::storage::StudyStore;

/// Record that `topic_id` was revised at `revised_at`.
///
/// The new record takes the number after the topic's current maximum and is
/// stored before it is returned.
///
/// # Errors
///
/// Returns `StudyFlowError::NotFound` if the topic does not belong to the
/// user, or a database error if the insert fails.
pub fn log_revision(
    store: &StudyStore,
    user_id: &str,
    topic_id: TopicId,
    revised_at: DateTime<Utc>,
    confidence: Option<Confidence>,
) -> Result<RevisionRecord, StudyFlowError> {
    if store.topic(user_id, topic_id)?.is_none() {
        return Err(StudyFlowError::NotFound(format!("topic {topic_id}")));
    }

    let prior_max = store.max_revision_number(user_id, topic_id)?;
    let mut record = record_revision(user_id, topic_id, prior_max, revised_at, confidence);
    store.insert_revision(&mut record)?;

    tracing::info!(
        topic_id,
        revision = record.revision_number,
        next = %record.next_revision_date,
        "revision logged"
    );
    Ok(record)
}

/// Fetch the user's revisions and return those due on or before `as_of`.
///
/// # Errors
///
/// Returns any error raised by the data source.
pub fn due_revisions<S: StudyDataSource + ?Sized>(
    source: &S,
    user_id: &str,
    as_of: NaiveDate,
) -> Result<Vec<RevisionRecord>, StudyFlowError> {
    let revisions = source.revisions(user_id)?;
    Ok(find_due_revisions(as_of, &revisions).into_iter().cloned().collect())
}
