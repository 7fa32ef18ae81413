//! Time totals over study sessions.
//!
//! Weekly and daily buckets always cover the full requested window: empty
//! weeks and days are reported with zero minutes, never dropped.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::{week_start, StudySession, Subject, SubjectId};

/// Bucket label for sessions logged without a subject.
pub const NO_SUBJECT_LABEL: &str = "No subject";

/// How many subjects the breakdown keeps.
pub const TOP_SUBJECTS: usize = 6;

/// Minutes studied in one Monday-start week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTotal {
    /// Monday of the week
    pub week_start: NaiveDate,
    /// Display label, e.g. `Mar 04`
    pub week_label: String,
    /// Total minutes
    pub total_minutes: u64,
}

/// Minutes studied on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStudy {
    /// Date
    pub date: NaiveDate,
    /// Total minutes
    pub total_minutes: u64,
    /// Whether any time was logged
    pub studied: bool,
}

/// Minutes studied per subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectTime {
    /// Subject, or `None` for the no-subject bucket
    pub subject_id: Option<SubjectId>,
    /// Total minutes
    pub minutes: u64,
}

impl SubjectTime {
    /// Display name, resolved against the user's subjects.
    #[must_use]
    pub fn label(&self, subjects: &[Subject]) -> String {
        match self.subject_id {
            None => NO_SUBJECT_LABEL.to_string(),
            Some(id) => subjects
                .iter()
                .find(|s| s.id == Some(id))
                .map_or_else(|| format!("Subject #{id}"), |s| s.name.clone()),
        }
    }
}

/// The last `count` dates `step_days` apart ending at `end`, oldest first,
/// stopping at the start of the calendar.
fn trailing_dates(end: NaiveDate, count: usize, step_days: i64) -> impl Iterator<Item = NaiveDate> {
    let reachable = usize::try_from((end - NaiveDate::MIN).num_days() / step_days + 1).unwrap_or(usize::MAX);
    (0..count.min(reachable)).rev().filter_map(move |steps| {
        i64::try_from(steps)
            .ok()
            .and_then(|steps| steps.checked_mul(step_days))
            .and_then(Duration::try_days)
            .and_then(|delta| end.checked_sub_signed(delta))
    })
}

/// Group session minutes into the `week_count` weeks ending with the week
/// that contains `today`, oldest first.
///
/// Always `week_count` entries unless the window would reach back past the
/// start of the calendar, in which case those weeks are left out.
#[must_use]
pub fn weekly_totals(sessions: &[StudySession], week_count: usize, today: NaiveDate) -> Vec<WeeklyTotal> {
    let current_week = week_start(today);
    let mut by_week: HashMap<NaiveDate, u64> = HashMap::new();
    for session in sessions {
        *by_week.entry(week_start(session.date())).or_default() += session.minutes();
    }

    trailing_dates(current_week, week_count, 7)
        .map(|start| WeeklyTotal {
            week_start: start,
            week_label: start.format("%b %d").to_string(),
            total_minutes: by_week.get(&start).copied().unwrap_or(0),
        })
        .collect()
}

/// Minutes per day for the `day_count` days ending at `today`, oldest first.
///
/// Like [`weekly_totals`], days before the start of the calendar are left out.
#[must_use]
pub fn daily_consistency(sessions: &[StudySession], day_count: usize, today: NaiveDate) -> Vec<DailyStudy> {
    let mut by_date: HashMap<NaiveDate, u64> = HashMap::new();
    for session in sessions {
        *by_date.entry(session.date()).or_default() += session.minutes();
    }

    trailing_dates(today, day_count, 1)
        .map(|date| {
            let total_minutes = by_date.get(&date).copied().unwrap_or(0);
            DailyStudy {
                date,
                total_minutes,
                studied: total_minutes > 0,
            }
        })
        .collect()
}

/// Minutes per subject, largest first, top [`TOP_SUBJECTS`] only.
///
/// Ties keep the order in which each subject first appears in `sessions`.
#[must_use]
pub fn subject_time_breakdown(sessions: &[StudySession]) -> Vec<SubjectTime> {
    let mut buckets: Vec<SubjectTime> = Vec::new();
    for session in sessions {
        match buckets.iter_mut().find(|b| b.subject_id == session.subject_id) {
            Some(bucket) => bucket.minutes += session.minutes(),
            None => buckets.push(SubjectTime {
                subject_id: session.subject_id,
                minutes: session.minutes(),
            }),
        }
    }

    // Stable sort keeps first-appearance order for equal minutes
    buckets.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    buckets.truncate(TOP_SUBJECTS);
    buckets
}
