//! The data-access seam between the core and storage.
//!
//! The scheduler and analytics never fetch anything themselves. Callers pull
//! every input through a [`StudyDataSource`] first, always scoped by an
//! explicit user id, and hand the materialized collections to the pure
//! functions.

use chrono::{DateTime, NaiveDate, Utc};

use super::types::{Deadline, RevisionRecord, StudyPlan, StudySession, Subject, SubjectId, Topic, TopicId};
use crate::error::StudyFlowError;

/// Read access to one user's study records.
#[cfg_attr(test, mockall::automock)]
pub trait StudyDataSource {
    /// All subjects owned by the user.
    fn subjects(&self, user_id: &str) -> Result<Vec<Subject>, StudyFlowError>;

    /// Topics owned by the user, optionally restricted to one subject.
    fn topics(
        &self,
        user_id: &str,
        subject_id: Option<SubjectId>,
    ) -> Result<Vec<Topic>, StudyFlowError>;

    /// Sessions whose start time falls in `[start, end)`.
    fn sessions_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StudySession>, StudyFlowError>;

    /// Every session owned by the user, oldest first.
    fn sessions(&self, user_id: &str) -> Result<Vec<StudySession>, StudyFlowError>;

    /// All deadlines owned by the user.
    fn deadlines(&self, user_id: &str) -> Result<Vec<Deadline>, StudyFlowError>;

    /// Plans scheduled between `start` and `end`, both inclusive.
    fn plans_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<StudyPlan>, StudyFlowError>;

    /// Every plan owned by the user, earliest first.
    fn plans(&self, user_id: &str) -> Result<Vec<StudyPlan>, StudyFlowError>;

    /// Every revision record owned by the user.
    fn revisions(&self, user_id: &str) -> Result<Vec<RevisionRecord>, StudyFlowError>;

    /// Highest revision number logged for a topic, 0 if none.
    fn max_revision_number(&self, user_id: &str, topic_id: TopicId) -> Result<u32, StudyFlowError>;
}
