//! Study analytics.
//!
//! Pure aggregations over fetched study records:
//! - Weekly and daily time totals
//! - Study streaks
//! - Per-subject time and topic completion
//! - Deadline adherence
//! - Focus score and productivity trend
//! - Dashboard composition and insights

mod completion;
mod dashboard;
mod insights;
mod score;
mod streaks;
mod totals;
pub mod visualization;

pub use completion::{
    deadline_adherence, percentage, topic_completion_by_subject, DeadlineAdherence,
    SubjectCompletion,
};
pub use dashboard::{Dashboard, MAX_DAYS, MAX_WEEKS, PERIOD_DAYS};
pub use insights::{generate_insights, Insight, InsightLevel};
pub use score::{
    focus_score, productivity_trend, FocusInputs, FocusLabel, FocusScore, FocusTargets,
    ProductivityTrend, Trend,
};
pub use streaks::{compute_streaks, StreakInfo};
pub use totals::{
    daily_consistency, subject_time_breakdown, weekly_totals, DailyStudy, SubjectTime,
    WeeklyTotal, NO_SUBJECT_LABEL, TOP_SUBJECTS,
};
