//! Fixed-interval spaced-repetition scheduling.
//!
//! A topic's first revision is due again after 1 day, then 3, 7, 14, and
//! every revision from the fifth on plateaus at 30 days.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::{Confidence, RevisionRecord, TopicId};
use crate::error::StudyFlowError;

/// Days until the next review, indexed by `revision_number - 1` and capped
/// at the last entry.
pub const REVISION_INTERVALS: [i64; 5] = [1, 3, 7, 14, 30];

/// The slot a new revision takes in a topic's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledRevision {
    /// Number of the revision being logged
    pub revision_number: u32,
    /// Day the following review falls due
    pub next_revision_date: NaiveDate,
}

/// Interval in days after revision `revision_number` (1-based).
#[must_use]
pub fn interval_days(revision_number: u32) -> i64 {
    let idx = (revision_number.max(1) - 1) as usize;
    REVISION_INTERVALS[idx.min(REVISION_INTERVALS.len() - 1)]
}

/// Schedule the revision that follows `prior_max` (0 when the topic has
/// never been revised).
#[must_use]
pub fn schedule_next_revision(prior_max: u32, today: NaiveDate) -> ScheduledRevision {
    let revision_number = prior_max.saturating_add(1);
    ScheduledRevision {
        revision_number,
        next_revision_date: today + Duration::days(interval_days(revision_number)),
    }
}

/// Schedule from a topic's full list of existing revision numbers.
///
/// # Errors
///
/// Returns `StudyFlowError::InvalidInput` if the history contains a 0 or a
/// repeated number.
pub fn schedule_from_history(
    prior_numbers: &[u32],
    today: NaiveDate,
) -> Result<ScheduledRevision, StudyFlowError> {
    let mut seen = HashSet::with_capacity(prior_numbers.len());
    for &n in prior_numbers {
        if n == 0 {
            return Err(StudyFlowError::invalid("revision numbers start at 1"));
        }
        if !seen.insert(n) {
            return Err(StudyFlowError::invalid(format!("revision number {n} appears twice")));
        }
    }

    let prior_max = prior_numbers.iter().copied().max().unwrap_or(0);
    Ok(schedule_next_revision(prior_max, today))
}

/// Build the immutable record for a revision done at `revised_at`.
#[must_use]
pub fn record_revision(
    user_id: &str,
    topic_id: TopicId,
    prior_max: u32,
    revised_at: DateTime<Utc>,
    confidence_level: Option<Confidence>,
) -> RevisionRecord {
    let scheduled = schedule_next_revision(prior_max, revised_at.date_naive());
    RevisionRecord {
        id: None,
        user_id: user_id.to_string(),
        topic_id,
        revision_number: scheduled.revision_number,
        revision_date: revised_at,
        confidence_level,
        next_revision_date: scheduled.next_revision_date,
    }
}

/// Latest revision of every topic whose next review is due on or before
/// `as_of`, earliest first.
#[must_use]
pub fn find_due_revisions(as_of: NaiveDate, revisions: &[RevisionRecord]) -> Vec<&RevisionRecord> {
    let mut latest: HashMap<TopicId, &RevisionRecord> = HashMap::new();
    for rev in revisions {
        latest
            .entry(rev.topic_id)
            .and_modify(|cur| {
                if rev.revision_number > cur.revision_number {
                    *cur = rev;
                }
            })
            .or_insert(rev);
    }

    let mut due: Vec<&RevisionRecord> = latest
        .into_values()
        .filter(|r| r.next_revision_date <= as_of)
        .collect();
    due.sort_by(|a, b| {
        a.next_revision_date
            .cmp(&b.next_revision_date)
            .then(a.topic_id.cmp(&b.topic_id))
    });
    due
}
