//! Core abstractions for studyflow.
//!
//! Validated record types, the data-access trait, and date parsing shared
//! across features.

mod datetime;
mod traits;
pub mod types;

pub use datetime::{parse_date, parse_datetime, parse_duration_minutes, start_of_day, week_start};
#[cfg(test)]
pub use traits::MockStudyDataSource;
pub use traits::StudyDataSource;
pub use types::{
    Confidence, Deadline, DeadlineStatus, RevisionRecord, StudyPlan, StudySession, Subject,
    SubjectId, Topic, TopicId, TopicStatus,
};
