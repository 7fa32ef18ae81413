//! Focus score and period-over-period trend.
//!
//! The focus score is a 0-100 composite of three parts:
//!
//! | part        | weight | measure                                              |
//! |-------------|--------|------------------------------------------------------|
//! | time        | 40     | `min(total_minutes / target_minutes, 1)`             |
//! | completion  | 30     | 25 × `min(completed_plans / target_plans, 1)` + 5 × `min(total_plans / target_plans, 1)` |
//! | regularity  | 30     | 15 × `min(sessions / target_sessions, 1)` + 15 × `min(avg_length / target_session_minutes, 1)` |
//!
//! Every term is a non-negative weight times a capped ratio of one input, so
//! raising any single input never lowers the score.

use serde::{Deserialize, Serialize};

use crate::core::{StudyPlan, StudySession};
use crate::error::StudyFlowError;

const TIME_WEIGHT: f64 = 40.0;
const COMPLETED_PLANS_WEIGHT: f64 = 25.0;
const PLANNED_WEIGHT: f64 = 5.0;
const SESSION_COUNT_WEIGHT: f64 = 15.0;
const SESSION_LENGTH_WEIGHT: f64 = 15.0;

/// Targets the focus score is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusTargets {
    /// Minutes of study that earn the full time component
    pub target_minutes: u64,
    /// Sessions that earn the full session-count component
    pub target_sessions: u32,
    /// Average session length that earns the full length component
    pub target_session_minutes: u32,
    /// Plans per period that earn the full completion component
    pub target_plans: u32,
}

impl Default for FocusTargets {
    fn default() -> Self {
        Self {
            target_minutes: 600,
            target_sessions: 7,
            target_session_minutes: 45,
            target_plans: 5,
        }
    }
}

impl FocusTargets {
    /// Reject zero targets.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::Config` if any target is 0.
    pub fn validate(&self) -> Result<(), StudyFlowError> {
        if self.target_minutes == 0
            || self.target_sessions == 0
            || self.target_session_minutes == 0
            || self.target_plans == 0
        {
            return Err(StudyFlowError::Config(
                "focus targets must all be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Validated inputs to [`focus_score`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusInputs {
    total_study_minutes: u64,
    completed_plans: usize,
    total_plans: usize,
    avg_session_length: f64,
    sessions_count: usize,
}

impl FocusInputs {
    /// Validate raw inputs.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::InvalidInput` if more plans are completed than
    /// exist, or the average session length is negative or not finite.
    pub fn new(
        total_study_minutes: u64,
        completed_plans: usize,
        total_plans: usize,
        avg_session_length: f64,
        sessions_count: usize,
    ) -> Result<Self, StudyFlowError> {
        if completed_plans > total_plans {
            return Err(StudyFlowError::invalid(format!(
                "{completed_plans} completed plans exceeds {total_plans} total plans"
            )));
        }
        if !avg_session_length.is_finite() || avg_session_length < 0.0 {
            return Err(StudyFlowError::invalid(format!(
                "average session length must be a non-negative number, got {avg_session_length}"
            )));
        }

        Ok(Self {
            total_study_minutes,
            completed_plans,
            total_plans,
            avg_session_length,
            sessions_count,
        })
    }

    /// Derive inputs from a period's sessions and plans.
    ///
    /// Incomplete sessions (no duration) are not counted as sessions.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records(sessions: &[StudySession], plans: &[StudyPlan]) -> Self {
        let finished: Vec<&StudySession> = sessions
            .iter()
            .filter(|s| s.duration_minutes.is_some())
            .collect();
        let total_study_minutes: u64 = finished.iter().map(|s| s.minutes()).sum();
        let avg_session_length = if finished.is_empty() {
            0.0
        } else {
            total_study_minutes as f64 / finished.len() as f64
        };

        Self {
            total_study_minutes,
            completed_plans: plans.iter().filter(|p| p.completed).count(),
            total_plans: plans.len(),
            avg_session_length,
            sessions_count: finished.len(),
        }
    }

    /// Total minutes studied.
    #[must_use]
    pub const fn total_study_minutes(&self) -> u64 {
        self.total_study_minutes
    }

    /// Number of finished sessions.
    #[must_use]
    pub const fn sessions_count(&self) -> usize {
        self.sessions_count
    }
}

/// Qualitative band for a focus score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusLabel {
    /// 80 and above
    Excellent,
    /// 60 to 79
    Good,
    /// 40 to 59
    Fair,
    /// Below 40
    NeedsImprovement,
}

impl FocusLabel {
    /// Band for a score.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            80.. => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Fair,
            _ => Self::NeedsImprovement,
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl std::fmt::Display for FocusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A computed focus score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusScore {
    /// Score, 0-100
    pub score: u8,
    /// Band
    pub label: FocusLabel,
}

/// Compute the focus score described in the module docs.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn focus_score(inputs: &FocusInputs, targets: &FocusTargets) -> FocusScore {
    let ratio = |value: f64, target: f64| if target > 0.0 { (value / target).min(1.0) } else { 0.0 };

    let time = TIME_WEIGHT * ratio(inputs.total_study_minutes as f64, targets.target_minutes as f64);
    let target_plans = f64::from(targets.target_plans);
    let completion = COMPLETED_PLANS_WEIGHT * ratio(inputs.completed_plans as f64, target_plans)
        + PLANNED_WEIGHT * ratio(inputs.total_plans as f64, target_plans);
    let regularity = SESSION_COUNT_WEIGHT
        * ratio(inputs.sessions_count as f64, f64::from(targets.target_sessions))
        + SESSION_LENGTH_WEIGHT
            * ratio(inputs.avg_session_length, f64::from(targets.target_session_minutes));

    let score = (time + completion + regularity).round().clamp(0.0, 100.0) as u8;
    FocusScore {
        score,
        label: FocusLabel::from_score(score),
    }
}

/// Direction of a period-over-period change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Above the band
    Up,
    /// Below the band
    Down,
    /// Inside the band
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Stable => write!(f, "stable"),
        }
    }
}

/// Study time compared with the previous period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductivityTrend {
    /// Minutes this period
    pub current_minutes: u64,
    /// Minutes last period
    pub previous_minutes: u64,
    /// Rounded percentage change
    pub change_percentage: i64,
    /// Direction
    pub trend: Trend,
}

/// Compare two periods. Changes within `±band` percent are [`Trend::Stable`].
///
/// With no previous minutes the change is 100 if anything was studied this
/// period, else 0.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn productivity_trend(current_minutes: u64, previous_minutes: u64, band: i64) -> ProductivityTrend {
    let change_percentage = if previous_minutes == 0 {
        if current_minutes > 0 { 100 } else { 0 }
    } else {
        let diff = current_minutes as f64 - previous_minutes as f64;
        (100.0 * diff / previous_minutes as f64).round() as i64
    };

    let band = band.abs();
    let trend = if change_percentage > band {
        Trend::Up
    } else if change_percentage < -band {
        Trend::Down
    } else {
        Trend::Stable
    };

    ProductivityTrend {
        current_minutes,
        previous_minutes,
        change_percentage,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn inputs(minutes: u64, done: usize, plans: usize, avg: f64, sessions: usize) -> FocusInputs {
        FocusInputs::new(minutes, done, plans, avg, sessions).unwrap()
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        let score = focus_score(&inputs(0, 0, 0, 0.0, 0), &FocusTargets::default());
        assert_eq!(score.score, 0);
        assert_eq!(score.label, FocusLabel::NeedsImprovement);
    }

    #[test]
    fn test_all_targets_met_scores_hundred() {
        let score = focus_score(&inputs(600, 5, 5, 45.0, 7), &FocusTargets::default());
        assert_eq!(score.score, 100);
        assert_eq!(score.label, FocusLabel::Excellent);
    }

    #[test]
    fn test_score_caps_above_targets() {
        let score = focus_score(&inputs(10_000, 9, 9, 300.0, 90), &FocusTargets::default());
        assert_eq!(score.score, 100);
    }

    #[test]
    fn test_plans_below_target_cap_completion() {
        let score = focus_score(&inputs(600, 3, 3, 45.0, 7), &FocusTargets::default());
        // completion 25 * 3/5 + 5 * 3/5
        assert_eq!(score.score, 88);
    }

    #[test]
    fn test_partial_score() {
        // time 20, completed 10, planned 4, sessions 7.5, length 7.5
        let score = focus_score(&inputs(300, 2, 4, 22.5, 3), &FocusTargets {
            target_minutes: 600,
            target_sessions: 6,
            target_session_minutes: 45,
            target_plans: 5,
        });
        assert_eq!(score.score, 49);
        assert_eq!(score.label, FocusLabel::Fair);
    }

    #[test]
    fn test_score_monotonic_in_each_input() {
        let targets = FocusTargets::default();
        let base = focus_score(&inputs(200, 1, 4, 20.0, 3), &targets).score;

        assert!(focus_score(&inputs(260, 1, 4, 20.0, 3), &targets).score >= base);
        assert!(focus_score(&inputs(200, 2, 4, 20.0, 3), &targets).score >= base);
        assert!(focus_score(&inputs(200, 1, 4, 35.0, 3), &targets).score >= base);
        assert!(focus_score(&inputs(200, 1, 4, 20.0, 5), &targets).score >= base);
        assert!(focus_score(&inputs(200, 1, 6, 20.0, 3), &targets).score >= base);
    }

    #[test]
    fn test_more_plans_never_lower_score() {
        let targets = FocusTargets::default();
        let two_of_two = focus_score(&inputs(300, 2, 2, 30.0, 5), &targets).score;
        let two_of_four = focus_score(&inputs(300, 2, 4, 30.0, 5), &targets).score;
        assert!(two_of_four >= two_of_two);

        let mut previous = 0;
        for total in 2..=12 {
            let score = focus_score(&inputs(300, 2, total, 30.0, 5), &targets).score;
            assert!(score >= previous, "score dropped at {total} plans");
            previous = score;
        }
    }

    #[test]
    fn test_label_bands() {
        assert_eq!(FocusLabel::from_score(100), FocusLabel::Excellent);
        assert_eq!(FocusLabel::from_score(80), FocusLabel::Excellent);
        assert_eq!(FocusLabel::from_score(79), FocusLabel::Good);
        assert_eq!(FocusLabel::from_score(60), FocusLabel::Good);
        assert_eq!(FocusLabel::from_score(59), FocusLabel::Fair);
        assert_eq!(FocusLabel::from_score(40), FocusLabel::Fair);
        assert_eq!(FocusLabel::from_score(39), FocusLabel::NeedsImprovement);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(FocusInputs::new(10, 3, 2, 10.0, 1).is_err());
        assert!(FocusInputs::new(10, 0, 0, -1.0, 1).is_err());
        assert!(FocusInputs::new(10, 0, 0, f64::NAN, 1).is_err());
    }

    #[test]
    fn test_inputs_from_records() {
        let start = Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap();
        let sessions = vec![
            StudySession::new("u1", None, start, Some(30)).unwrap(),
            StudySession::new("u1", None, start, Some(60)).unwrap(),
            StudySession::new("u1", None, start, None).unwrap(),
        ];
        let day = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let plans = vec![
            StudyPlan { id: None, user_id: "u1".into(), title: "a".into(), planned_date: day, completed: true },
            StudyPlan { id: None, user_id: "u1".into(), title: "b".into(), planned_date: day, completed: false },
        ];

        let derived = FocusInputs::from_records(&sessions, &plans);
        assert_eq!(derived, inputs(90, 1, 2, 45.0, 2));
    }

    #[test]
    fn test_trend_from_zero() {
        let t = productivity_trend(120, 0, 5);
        assert_eq!(t.change_percentage, 100);
        assert_eq!(t.trend, Trend::Up);

        let t = productivity_trend(0, 0, 5);
        assert_eq!(t.change_percentage, 0);
        assert_eq!(t.trend, Trend::Stable);
    }

    #[test]
    fn test_trend_band() {
        assert_eq!(productivity_trend(105, 100, 5).trend, Trend::Stable);
        assert_eq!(productivity_trend(95, 100, 5).trend, Trend::Stable);
        assert_eq!(productivity_trend(106, 100, 5).trend, Trend::Up);
        assert_eq!(productivity_trend(94, 100, 5).trend, Trend::Down);
        assert_eq!(productivity_trend(50, 200, 5).change_percentage, -75);
    }
}
