//! Dashboard composition.
//!
//! Fetches everything a dashboard needs from a [`StudyDataSource`] up front,
//! then runs the pure aggregations over the fetched snapshot.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::completion::{deadline_adherence, topic_completion_by_subject, DeadlineAdherence, SubjectCompletion};
use super::score::{focus_score, productivity_trend, FocusInputs, FocusScore, ProductivityTrend};
use super::streaks::{compute_streaks, StreakInfo};
use super::totals::{daily_consistency, subject_time_breakdown, weekly_totals, DailyStudy, SubjectTime, WeeklyTotal};
use crate::config::AnalyticsConfig;
use crate::core::{start_of_day, week_start, RevisionRecord, StudyDataSource, StudySession, Subject};
use crate::error::StudyFlowError;
use crate::features::revision::find_due_revisions;

/// Length of the period the focus score and trend compare, in days.
pub const PERIOD_DAYS: i64 = 7;

/// Longest weekly window a dashboard covers (ten years).
pub const MAX_WEEKS: u16 = 520;

/// Longest daily window a dashboard covers (ten years).
pub const MAX_DAYS: u16 = 3660;

/// Every derived metric for one user, computed for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    /// User the metrics belong to
    pub user_id: String,
    /// Day the dashboard was computed for
    pub today: NaiveDate,
    /// Trailing weekly totals, oldest first
    pub weekly: Vec<WeeklyTotal>,
    /// Trailing daily totals, oldest first
    pub daily: Vec<DailyStudy>,
    /// Streaks over `daily`
    pub streaks: StreakInfo,
    /// Top subjects by minutes over the daily window
    pub subject_time: Vec<SubjectTime>,
    /// Topic progress per subject
    pub completion: Vec<SubjectCompletion>,
    /// Deadline adherence
    pub deadlines: DeadlineAdherence,
    /// Focus score over the last [`PERIOD_DAYS`] days
    pub focus: FocusScore,
    /// Last [`PERIOD_DAYS`] days against the [`PERIOD_DAYS`] before
    pub trend: ProductivityTrend,
    /// Revisions due today or earlier, earliest first
    pub due_revisions: Vec<RevisionRecord>,
    /// The user's subjects, for labelling
    pub subjects: Vec<Subject>,
}

impl Dashboard {
    /// Fetch inputs for `user_id` and compute all metrics.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::InvalidInput` if `config.weeks` is not in
    /// `1..=MAX_WEEKS`, `config.days` is not in `1..=MAX_DAYS`, or a window
    /// falls outside the calendar. Otherwise returns any error raised by the
    /// data source.
    pub fn build<S: StudyDataSource + ?Sized>(
        source: &S,
        user_id: &str,
        today: NaiveDate,
        now: DateTime<Utc>,
        config: &AnalyticsConfig,
    ) -> Result<Self, StudyFlowError> {
        let weeks = config.weeks;
        let days = config.days;
        let week_span = window_len(weeks, MAX_WEEKS, "weeks")?;
        let day_span = window_len(days, MAX_DAYS, "days")?;

        let weekly_start = days_before(week_start(today), 7 * (week_span - 1))?;
        let daily_start = days_before(today, day_span - 1)?;
        let previous_start = days_before(today, 2 * PERIOD_DAYS - 1)?;
        let current_start = days_before(today, PERIOD_DAYS - 1)?;
        let previous_end = days_before(current_start, 1)?;
        let fetch_end = days_before(today, -1)?;
        let fetch_start = weekly_start.min(daily_start).min(previous_start);

        let sessions = source.sessions_between(user_id, start_of_day(fetch_start), start_of_day(fetch_end))?;
        let subjects = source.subjects(user_id)?;
        let topics = source.topics(user_id, None)?;
        let deadlines = source.deadlines(user_id)?;
        let plans = source.plans_between(user_id, current_start, today)?;
        let revisions = source.revisions(user_id)?;

        tracing::debug!(
            user_id,
            sessions = sessions.len(),
            topics = topics.len(),
            deadlines = deadlines.len(),
            revisions = revisions.len(),
            "building dashboard"
        );

        let in_range = |from: NaiveDate, to: NaiveDate| -> Vec<StudySession> {
            sessions
                .iter()
                .filter(|s| s.date() >= from && s.date() <= to)
                .cloned()
                .collect()
        };

        let daily = daily_consistency(&sessions, days, today);
        let streaks = compute_streaks(&daily);

        let current = in_range(current_start, today);
        let previous = in_range(previous_start, previous_end);
        let minutes = |list: &[StudySession]| list.iter().map(StudySession::minutes).sum::<u64>();

        let focus_inputs = FocusInputs::from_records(&current, &plans);

        Ok(Self {
            user_id: user_id.to_string(),
            today,
            weekly: weekly_totals(&sessions, weeks, today),
            streaks,
            subject_time: subject_time_breakdown(&in_range(daily_start, today)),
            daily,
            completion: topic_completion_by_subject(&subjects, &topics),
            deadlines: deadline_adherence(&deadlines, now),
            focus: focus_score(&focus_inputs, &config.focus),
            trend: productivity_trend(minutes(&current), minutes(&previous), config.trend_band_percent),
            due_revisions: find_due_revisions(today, &revisions).into_iter().cloned().collect(),
            subjects,
        })
    }

    /// Minutes studied over the daily window.
    #[must_use]
    pub fn total_minutes(&self) -> u64 {
        self.daily.iter().map(|d| d.total_minutes).sum()
    }
}

/// Validate a window length against `1..=max`.
fn window_len(value: usize, max: u16, name: &str) -> Result<i64, StudyFlowError> {
    match u16::try_from(value) {
        Ok(len) if (1..=max).contains(&len) => Ok(i64::from(len)),
        _ => Err(StudyFlowError::invalid(format!(
            "{name} must be between 1 and {max}, got {value}"
        ))),
    }
}

fn days_before(date: NaiveDate, days: i64) -> Result<NaiveDate, StudyFlowError> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_sub_signed(delta))
        .ok_or_else(|| StudyFlowError::invalid(format!("{days} days before {date} is outside the calendar")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Deadline, DeadlineStatus, MockStudyDataSource, StudyPlan, Topic, TopicStatus,
    };
    use crate::features::analytics::Trend;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn session(date: NaiveDate, subject: Option<i64>, minutes: u32) -> StudySession {
        StudySession {
            id: None,
            user_id: "alice".to_string(),
            subject_id: subject,
            start_time: Utc.from_utc_datetime(&date.and_hms_opt(9, 0, 0).unwrap()),
            duration_minutes: Some(minutes),
        }
    }

    fn mock_source(today: NaiveDate) -> MockStudyDataSource {
        let mut source = MockStudyDataSource::new();
        source
            .expect_sessions_between()
            .withf(|user, _, _| user.to_string() == "alice")
            .times(1)
            .returning(move |_, _, _| {
                Ok(vec![
                    session(today, Some(1), 60),
                    session(today - Duration::days(1), Some(1), 30),
                    session(today - Duration::days(2), Some(2), 45),
                    // previous period
                    session(today - Duration::days(9), Some(2), 40),
                ])
            });
        source.expect_subjects().returning(|_| {
            Ok(vec![
                Subject { id: Some(1), user_id: "alice".into(), name: "Maths".into(), color: None },
                Subject { id: Some(2), user_id: "alice".into(), name: "History".into(), color: None },
            ])
        });
        source.expect_topics().returning(|_, _| {
            Ok(vec![
                Topic { id: Some(10), user_id: "alice".into(), subject_id: 1, title: "Limits".into(), status: TopicStatus::Completed },
                Topic { id: Some(11), user_id: "alice".into(), subject_id: 1, title: "Series".into(), status: TopicStatus::InProgress },
            ])
        });
        source.expect_deadlines().returning(move |_| {
            Ok(vec![Deadline {
                id: Some(1),
                user_id: "alice".into(),
                title: "Essay".into(),
                subject_id: Some(2),
                status: DeadlineStatus::Pending,
                due_date: Utc.from_utc_datetime(&(today - Duration::days(1)).and_hms_opt(12, 0, 0).unwrap()),
            }])
        });
        source.expect_plans_between().returning(move |_, _, _| {
            Ok(vec![StudyPlan { id: Some(1), user_id: "alice".into(), title: "Read".into(), planned_date: today, completed: true }])
        });
        source.expect_revisions().returning(move |_| {
            Ok(vec![RevisionRecord {
                id: Some(1),
                user_id: "alice".into(),
                topic_id: 10,
                revision_number: 1,
                revision_date: Utc.from_utc_datetime(&(today - Duration::days(1)).and_hms_opt(8, 0, 0).unwrap()),
                confidence_level: None,
                next_revision_date: today,
            }])
        });
        source
    }

    #[test]
    fn test_build_dashboard_from_source() {
        let today = d(2024, 3, 6);
        let now = Utc.from_utc_datetime(&today.and_hms_opt(18, 0, 0).unwrap());
        let source = mock_source(today);

        let dashboard = Dashboard::build(&source, "alice", today, now, &AnalyticsConfig::default()).unwrap();

        assert_eq!(dashboard.weekly.len(), 8);
        assert_eq!(dashboard.daily.len(), 30);
        assert_eq!(dashboard.streaks.current_streak, 3);
        assert_eq!(dashboard.streaks.total_days, 4);
        assert_eq!(dashboard.total_minutes(), 175);

        assert_eq!(dashboard.subject_time[0].subject_id, Some(1));
        assert_eq!(dashboard.subject_time[0].minutes, 90);
        assert_eq!(dashboard.subject_time[1].minutes, 85);

        assert_eq!(dashboard.completion[0].completion_rate, 50);
        assert_eq!(dashboard.completion[1].completion_rate, 0);

        assert_eq!(dashboard.deadlines.overdue, 1);
        assert_eq!(dashboard.deadlines.adherence_rate, 0);

        assert_eq!(dashboard.trend.current_minutes, 135);
        assert_eq!(dashboard.trend.previous_minutes, 40);
        assert_eq!(dashboard.trend.trend, Trend::Up);

        assert_eq!(dashboard.due_revisions.len(), 1);
        assert_eq!(dashboard.due_revisions[0].topic_id, 10);
    }

    #[test]
    fn test_build_propagates_source_errors() {
        let mut source = MockStudyDataSource::new();
        source
            .expect_sessions_between()
            .returning(|_, _, _| Err(StudyFlowError::Database("locked".to_string())));

        let today = d(2024, 3, 6);
        let now = Utc.from_utc_datetime(&today.and_hms_opt(18, 0, 0).unwrap());
        let result = Dashboard::build(&source, "alice", today, now, &AnalyticsConfig::default());
        assert!(matches!(result, Err(StudyFlowError::Database(_))));
    }

    #[test]
    fn test_build_rejects_out_of_range_windows() {
        let today = d(2024, 3, 6);
        let now = Utc.from_utc_datetime(&today.and_hms_opt(18, 0, 0).unwrap());

        let invalid = [
            AnalyticsConfig { weeks: 100_000_000, ..AnalyticsConfig::default() },
            AnalyticsConfig { days: usize::MAX, ..AnalyticsConfig::default() },
            AnalyticsConfig { weeks: 0, ..AnalyticsConfig::default() },
            AnalyticsConfig { days: 0, ..AnalyticsConfig::default() },
        ];
        for config in &invalid {
            // Rejected before the source is touched
            let source = MockStudyDataSource::new();
            let result = Dashboard::build(&source, "alice", today, now, config);
            assert!(matches!(result, Err(StudyFlowError::InvalidInput(_))), "{config:?}");
        }
    }

    #[test]
    fn test_build_accepts_largest_windows() {
        let today = d(2024, 3, 6);
        let now = Utc.from_utc_datetime(&today.and_hms_opt(18, 0, 0).unwrap());
        let config = AnalyticsConfig {
            weeks: usize::from(MAX_WEEKS),
            days: usize::from(MAX_DAYS),
            ..AnalyticsConfig::default()
        };

        let dashboard = Dashboard::build(&mock_source(today), "alice", today, now, &config).unwrap();
        assert_eq!(dashboard.weekly.len(), usize::from(MAX_WEEKS));
        assert_eq!(dashboard.daily.len(), usize::from(MAX_DAYS));
    }
}
