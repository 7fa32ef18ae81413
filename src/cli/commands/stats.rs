//! Statistics command implementation.
//!
//! Handles the stats subcommands for study analytics.

use colored::Colorize;
use serde_json::json;

use super::Context;
use crate::cli::args::{OutputFormat, StatsCommands};
use crate::error::StudyFlowError;
use crate::features::analytics::visualization::{
    format_minutes, render_bar_chart, render_heatmap, render_progress_bar, render_sparkline,
    render_summary_box,
};
use crate::features::analytics::{generate_insights, Dashboard, FocusLabel, InsightLevel, Trend, PERIOD_DAYS};
use crate::output::to_json;

/// Execute stats subcommands.
///
/// # Errors
///
/// Returns an error if fetching records or output formatting fails.
pub fn stats(ctx: &Context, cmd: Option<StatsCommands>) -> Result<String, StudyFlowError> {
    let mut analytics = ctx.config.analytics.clone();
    match &cmd {
        Some(StatsCommands::Weekly { weeks: Some(weeks) }) => analytics.weeks = *weeks,
        Some(
            StatsCommands::Consistency { days: Some(days) }
            | StatsCommands::Streaks { days: Some(days) }
            | StatsCommands::Subjects { days: Some(days) },
        ) => analytics.days = *days,
        _ => {}
    }

    let dashboard = Dashboard::build(&ctx.store, &ctx.user, ctx.today(), ctx.now, &analytics)?;
    let format = ctx.format;

    match cmd {
        None | Some(StatsCommands::Dashboard) => render_dashboard(&dashboard, format),
        Some(StatsCommands::Weekly { .. }) => render_weekly(&dashboard, format),
        Some(StatsCommands::Consistency { .. }) => render_consistency(&dashboard, format),
        Some(StatsCommands::Streaks { .. }) => render_streaks(&dashboard, format),
        Some(StatsCommands::Subjects { .. }) => render_subjects(&dashboard, format),
        Some(StatsCommands::Topics) => render_topics(&dashboard, format),
        Some(StatsCommands::Deadlines) => render_deadlines(&dashboard, format),
        Some(StatsCommands::Focus) => render_focus(&dashboard, format),
        Some(StatsCommands::Trend) => render_trend(&dashboard, format),
        Some(StatsCommands::Insights) => render_insights(&dashboard, format),
    }
}

fn section(title: &str) -> [String; 2] {
    [title.bold().to_string(), "─".repeat(50)]
}

fn trend_arrow(trend: Trend) -> String {
    match trend {
        Trend::Up => "▲ up".green().to_string(),
        Trend::Down => "▼ down".red().to_string(),
        Trend::Stable => "■ stable".yellow().to_string(),
    }
}

fn focus_label(label: FocusLabel) -> String {
    match label {
        FocusLabel::Excellent => label.display_name().green().to_string(),
        FocusLabel::Good => label.display_name().cyan().to_string(),
        FocusLabel::Fair => label.display_name().yellow().to_string(),
        FocusLabel::NeedsImprovement => label.display_name().red().to_string(),
    }
}

/// Render the full dashboard.
fn render_dashboard(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Json => to_json(dashboard),
        OutputFormat::Pretty => {
            let mut output = Vec::new();

            output.push(render_summary_box(
                &format!("STUDY DASHBOARD  {}", dashboard.today),
                &[
                    ("Studied", format_minutes(dashboard.total_minutes())),
                    ("Streak", format!("{} days", dashboard.streaks.current_streak)),
                    ("Focus", format!("{}/100", dashboard.focus.score)),
                    ("Due revisions", dashboard.due_revisions.len().to_string()),
                ],
            ));
            output.push(String::new());

            output.extend(section("TIME"));
            let weekly: Vec<u64> = dashboard.weekly.iter().map(|w| w.total_minutes).collect();
            output.push(format!(
                "  Last {} weeks: {}",
                weekly.len(),
                render_sparkline(&weekly)
            ));
            output.push(format!(
                "  Last 7 days vs previous 7: {} vs {}  {}",
                format_minutes(dashboard.trend.current_minutes).green(),
                format_minutes(dashboard.trend.previous_minutes),
                trend_arrow(dashboard.trend.trend)
            ));
            output.push(String::new());

            output.extend(section("STREAK"));
            let streak_display = if dashboard.streaks.current_streak > 0 {
                format!("{} days", dashboard.streaks.current_streak).green().to_string()
            } else {
                "0 days".dimmed().to_string()
            };
            output.push(format!(
                "  Current: {}  Longest: {} days  Studied {} of {} days",
                streak_display,
                dashboard.streaks.longest_streak,
                dashboard.streaks.total_days,
                dashboard.daily.len()
            ));
            output.push(String::new());

            output.extend(section("FOCUS"));
            output.push(format!(
                "  {}  {}",
                render_progress_bar(dashboard.focus.score, 30),
                focus_label(dashboard.focus.label)
            ));
            output.push(String::new());

            if !dashboard.subject_time.is_empty() {
                output.extend(section("SUBJECTS"));
                output.push(render_bar_chart(&subject_rows(dashboard), 18, 25));
                output.push(String::new());
            }

            output.extend(section("DEADLINES"));
            let overdue = if dashboard.deadlines.overdue > 0 {
                dashboard.deadlines.overdue.to_string().red().to_string()
            } else {
                "0".green().to_string()
            };
            output.push(format!(
                "  On time: {}/{} ({}%)  Overdue: {}",
                dashboard.deadlines.completed_on_time,
                dashboard.deadlines.total,
                dashboard.deadlines.adherence_rate,
                overdue
            ));
            output.push(String::new());

            let top_insights: Vec<_> = generate_insights(dashboard).into_iter().take(3).collect();
            if !top_insights.is_empty() {
                output.extend(section("TOP INSIGHTS"));
                for insight in top_insights {
                    output.push(format!("  {} {}", level_icon(insight.level), insight.message));
                }
            }

            Ok(output.join("\n"))
        }
    }
}

fn subject_rows(dashboard: &Dashboard) -> Vec<(String, u64)> {
    dashboard
        .subject_time
        .iter()
        .map(|s| (s.label(&dashboard.subjects), s.minutes))
        .collect()
}

fn level_icon(level: InsightLevel) -> String {
    match level {
        InsightLevel::High => level.icon().red().to_string(),
        InsightLevel::Medium => level.icon().yellow().to_string(),
        InsightLevel::Low => level.icon().blue().to_string(),
    }
}

fn render_weekly(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Json => to_json(&dashboard.weekly),
        OutputFormat::Pretty => {
            let mut output = Vec::new();
            output.push(format!("Weekly Study Time (Last {} weeks)", dashboard.weekly.len()).bold().to_string());
            output.push("═".repeat(50));

            let rows: Vec<(String, u64)> = dashboard
                .weekly
                .iter()
                .map(|w| (w.week_label.clone(), w.total_minutes))
                .collect();
            output.push(render_bar_chart(&rows, 6, 30));

            let total: u64 = rows.iter().map(|(_, m)| m).sum();
            output.push(String::new());
            output.push(format!("Total: {}  (minutes per week)", format_minutes(total)));
            Ok(output.join("\n"))
        }
    }
}

fn render_consistency(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Json => to_json(&dashboard.daily),
        OutputFormat::Pretty => {
            let mut output = Vec::new();
            output.push(format!("Study Consistency (Last {} days)", dashboard.daily.len()).bold().to_string());
            output.push("═".repeat(50));
            output.push(String::new());
            output.push(render_heatmap(&dashboard.daily));
            output.push(String::new());
            output.push(format!(
                "Studied on {} of {} days",
                dashboard.streaks.total_days,
                dashboard.daily.len()
            ));
            Ok(output.join("\n"))
        }
    }
}

fn render_streaks(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Json => to_json(&dashboard.streaks),
        OutputFormat::Pretty => {
            let streaks = dashboard.streaks;
            let mut output = Vec::new();
            output.push("Study Streaks".bold().to_string());
            output.push("─".repeat(40));
            output.push(format!("Current streak:  {} days", streaks.current_streak));
            output.push(format!("Longest streak:  {} days", streaks.longest_streak));
            output.push(format!(
                "Days studied:    {} of {}",
                streaks.total_days,
                dashboard.daily.len()
            ));
            Ok(output.join("\n"))
        }
    }
}

fn render_subjects(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = dashboard
                .subject_time
                .iter()
                .map(|s| {
                    json!({
                        "subject_id": s.subject_id,
                        "label": s.label(&dashboard.subjects),
                        "minutes": s.minutes,
                    })
                })
                .collect();
            to_json(&rows)
        }
        OutputFormat::Pretty => {
            let mut output = Vec::new();
            output.push(format!("Time by Subject (Last {} days)", dashboard.daily.len()).bold().to_string());
            output.push("═".repeat(50));
            if dashboard.subject_time.is_empty() {
                output.push("No study time logged.".dimmed().to_string());
            } else {
                output.push(render_bar_chart(&subject_rows(dashboard), 18, 25));
            }
            Ok(output.join("\n"))
        }
    }
}

fn render_topics(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Json => to_json(&dashboard.completion),
        OutputFormat::Pretty => {
            let mut output = Vec::new();
            output.push("Topic Completion".bold().to_string());
            output.push("═".repeat(60));

            if dashboard.completion.is_empty() {
                output.push("No subjects yet.".dimmed().to_string());
                return Ok(output.join("\n"));
            }

            output.push(format!(
                "{:<20} {:>5} {:>5} {:>5}  {}",
                "Subject", "Done", "Doing", "Todo", "Progress"
            ));
            output.push("─".repeat(60));
            for row in &dashboard.completion {
                let name = dashboard
                    .subjects
                    .iter()
                    .find(|s| s.id == Some(row.subject_id))
                    .map_or_else(|| format!("Subject #{}", row.subject_id), |s| s.name.clone());
                let name: String = name.chars().take(20).collect();
                output.push(format!(
                    "{:<20} {:>5} {:>5} {:>5}  {}",
                    name,
                    row.completed,
                    row.in_progress,
                    row.not_started,
                    render_progress_bar(row.completion_rate, 15)
                ));
            }
            Ok(output.join("\n"))
        }
    }
}

fn render_deadlines(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Json => to_json(&dashboard.deadlines),
        OutputFormat::Pretty => {
            let d = dashboard.deadlines;
            let mut output = Vec::new();
            output.push("Deadline Adherence".bold().to_string());
            output.push("─".repeat(40));
            output.push(format!("Deadlines:       {}", d.total));
            output.push(format!("Met on time:     {}", d.completed_on_time.to_string().green()));
            output.push(format!(
                "Overdue:         {}",
                if d.overdue > 0 { d.overdue.to_string().red() } else { "0".green() }
            ));
            output.push(format!("Adherence:       {}", render_progress_bar(d.adherence_rate, 20)));
            Ok(output.join("\n"))
        }
    }
}

fn render_focus(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Json => to_json(&dashboard.focus),
        OutputFormat::Pretty => Ok(format!(
            "{}\n{}\n{}  {}",
            format!("Focus Score (Last {PERIOD_DAYS} days)").bold(),
            "─".repeat(40),
            render_progress_bar(dashboard.focus.score, 30),
            focus_label(dashboard.focus.label)
        )),
    }
}

fn render_trend(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    match format {
        OutputFormat::Json => to_json(&dashboard.trend),
        OutputFormat::Pretty => {
            let t = dashboard.trend;
            Ok(format!(
                "{}\n{}\nThis period:  {}\nLast period:  {}\nChange:       {:+}%  {}",
                format!("Productivity Trend ({PERIOD_DAYS} days vs previous {PERIOD_DAYS})").bold(),
                "─".repeat(40),
                format_minutes(t.current_minutes),
                format_minutes(t.previous_minutes),
                t.change_percentage,
                trend_arrow(t.trend)
            ))
        }
    }
}

/// Render insights.
fn render_insights(dashboard: &Dashboard, format: OutputFormat) -> Result<String, StudyFlowError> {
    let insights = generate_insights(dashboard);

    match format {
        OutputFormat::Json => to_json(&insights),
        OutputFormat::Pretty => {
            if insights.is_empty() {
                return Ok("No insights available. Log some study sessions to generate insights.".to_string());
            }

            let mut output = Vec::new();
            output.push("Study Insights".bold().to_string());
            output.push("═".repeat(50));

            for insight in insights {
                output.push(format!(
                    "{} {} {}",
                    level_icon(insight.level),
                    format!("[{}]", insight.category).dimmed(),
                    insight.message
                ));
                if let Some(suggestion) = insight.suggestion {
                    output.push(format!("   → {}", suggestion.dimmed()));
                }
            }

            Ok(output.join("\n"))
        }
    }
}
