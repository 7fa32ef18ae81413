//! Insights generation from a dashboard.
//!
//! Turns the computed metrics into short, prioritized observations.

use serde::{Deserialize, Serialize};

use super::dashboard::Dashboard;
use super::score::{FocusLabel, Trend};

/// Insight importance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightLevel {
    /// High priority - needs attention
    High,
    /// Medium priority - worth noting
    Medium,
    /// Low priority - informational
    Low,
}

impl InsightLevel {
    /// Get icon for this level.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::High => "!",
            Self::Medium => "*",
            Self::Low => "-",
        }
    }
}

/// An actionable insight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// The insight message
    pub message: String,
    /// Importance level
    pub level: InsightLevel,
    /// Category of insight
    pub category: String,
    /// Optional suggestion
    pub suggestion: Option<String>,
}

impl Insight {
    fn new(message: &str, level: InsightLevel, category: &str) -> Self {
        Self {
            message: message.to_string(),
            level,
            category: category.to_string(),
            suggestion: None,
        }
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }
}

/// Generate insights from a dashboard, most important first.
#[must_use]
pub fn generate_insights(dashboard: &Dashboard) -> Vec<Insight> {
    let mut insights = Vec::new();

    insights.extend(revision_insights(dashboard));
    insights.extend(deadline_insights(dashboard));
    insights.extend(streak_insights(dashboard));
    insights.extend(focus_insights(dashboard));
    insights.extend(subject_insights(dashboard));

    // Stable, so categories keep their order within a level
    insights.sort_by_key(|i| i.level);
    insights
}

fn revision_insights(dashboard: &Dashboard) -> Vec<Insight> {
    let due = dashboard.due_revisions.len();
    if due == 0 {
        return Vec::new();
    }

    let level = if due > 5 { InsightLevel::High } else { InsightLevel::Medium };
    vec![Insight::new(
        &format!("{due} topic(s) due for revision"),
        level,
        "Revision",
    )
    .with_suggestion("Run 'studyflow due' to see them, then 'studyflow revise <topic>'")]
}

fn deadline_insights(dashboard: &Dashboard) -> Vec<Insight> {
    let mut insights = Vec::new();
    let deadlines = &dashboard.deadlines;

    if deadlines.overdue > 3 {
        insights.push(
            Insight::new(
                &format!("You have {} overdue deadlines - this needs attention", deadlines.overdue),
                InsightLevel::High,
                "Deadlines",
            )
            .with_suggestion("Finish or renegotiate the oldest ones first"),
        );
    } else if deadlines.overdue > 0 {
        insights.push(
            Insight::new(
                &format!("You have {} overdue deadline(s)", deadlines.overdue),
                InsightLevel::Medium,
                "Deadlines",
            )
            .with_suggestion("Use 'studyflow deadline list' to review them"),
        );
    }

    if deadlines.total >= 5 && deadlines.adherence_rate >= 80 {
        insights.push(Insight::new(
            &format!("{}% of deadlines met on time", deadlines.adherence_rate),
            InsightLevel::Low,
            "Deadlines",
        ));
    }

    insights
}

fn streak_insights(dashboard: &Dashboard) -> Vec<Insight> {
    let mut insights = Vec::new();
    let streak = dashboard.streaks;

    if streak.current_streak >= 7 {
        insights.push(Insight::new(
            &format!("Amazing! {} day study streak - keep it going!", streak.current_streak),
            InsightLevel::Low,
            "Streak",
        ));
    } else if streak.current_streak >= 3 {
        insights.push(Insight::new(
            &format!("{} day streak - you're building momentum!", streak.current_streak),
            InsightLevel::Low,
            "Streak",
        ));
    } else if streak.current_streak == 0 && streak.total_days > 0 {
        insights.push(
            Insight::new("Nothing logged today yet", InsightLevel::Medium, "Streak")
                .with_suggestion("Even a short session keeps the habit going"),
        );
    }

    if streak.current_streak > 0 && streak.current_streak < streak.longest_streak {
        let to_beat = streak.longest_streak - streak.current_streak;
        if to_beat <= 3 {
            insights.push(Insight::new(
                &format!(
                    "You're {} days away from matching your best streak of {} days!",
                    to_beat, streak.longest_streak
                ),
                InsightLevel::Low,
                "Streak",
            ));
        }
    }

    insights
}

fn focus_insights(dashboard: &Dashboard) -> Vec<Insight> {
    let mut insights = Vec::new();

    match dashboard.focus.label {
        FocusLabel::NeedsImprovement => insights.push(
            Insight::new(
                &format!("Focus score is {} this week", dashboard.focus.score),
                InsightLevel::Medium,
                "Focus",
            )
            .with_suggestion("Plan a few sessions ahead and tick them off as you go"),
        ),
        FocusLabel::Excellent => insights.push(Insight::new(
            &format!("Excellent focus score of {}", dashboard.focus.score),
            InsightLevel::Low,
            "Focus",
        )),
        FocusLabel::Good | FocusLabel::Fair => {}
    }

    let trend = &dashboard.trend;
    match trend.trend {
        Trend::Down => insights.push(
            Insight::new(
                &format!("Study time is down {}% on last week", trend.change_percentage.unsigned_abs()),
                InsightLevel::Medium,
                "Focus",
            )
            .with_suggestion("Block out time for your weakest subject"),
        ),
        Trend::Up => insights.push(Insight::new(
            &format!("Study time is up {}% on last week", trend.change_percentage),
            InsightLevel::Low,
            "Focus",
        )),
        Trend::Stable => {}
    }

    insights
}

fn subject_insights(dashboard: &Dashboard) -> Vec<Insight> {
    let mut insights = Vec::new();

    let total: u64 = dashboard.subject_time.iter().map(|s| s.minutes).sum();
    if let Some(top) = dashboard.subject_time.first() {
        if dashboard.subject_time.len() > 1 && total > 0 && top.minutes * 100 / total >= 60 {
            insights.push(
                Insight::new(
                    &format!(
                        "{} takes {}% of your study time",
                        top.label(&dashboard.subjects),
                        top.minutes * 100 / total
                    ),
                    InsightLevel::Low,
                    "Subjects",
                )
                .with_suggestion("Check the other subjects are not falling behind"),
            );
        }
    }

    let finished: Vec<String> = dashboard
        .completion
        .iter()
        .filter(|c| c.total() > 0 && c.completion_rate == 100)
        .filter_map(|c| {
            dashboard
                .subjects
                .iter()
                .find(|s| s.id == Some(c.subject_id))
                .map(|s| s.name.clone())
        })
        .collect();

    if !finished.is_empty() {
        insights.push(Insight::new(
            &format!("All topics completed in: {}", finished.join(", ")),
            InsightLevel::Low,
            "Subjects",
        ));
    }

    insights
}
