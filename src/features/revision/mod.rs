//! Spaced-repetition revision scheduling.

mod scheduler;
mod service;

pub use scheduler::{
    find_due_revisions, interval_days, record_revision, schedule_from_history,
    schedule_next_revision, ScheduledRevision, REVISION_INTERVALS,
};
pub use service::{due_revisions, log_revision};
