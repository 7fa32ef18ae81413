//! Terminal visualization for study analytics.
//!
//! Provides ASCII charts, graphs, and visual representations.

use chrono::Duration;
use std::collections::HashMap;

use super::totals::DailyStudy;

/// Characters for bar chart rendering.
const BAR_CHARS: [char; 8] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇'];
const FULL_BLOCK: char = '█';

/// Render a horizontal bar chart.
///
/// # Arguments
///
/// * `data` - Vec of (label, value) pairs
/// * `max_label_width` - Maximum width for labels
/// * `bar_width` - Width of the bar portion
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_bar_chart(data: &[(String, u64)], max_label_width: usize, bar_width: usize) -> String {
    if data.is_empty() {
        return String::new();
    }

    let max_value = data.iter().map(|(_, v)| *v).max().unwrap_or(1).max(1);
    let mut lines = Vec::new();

    for (label, value) in data {
        let truncated_label = if label.chars().count() > max_label_width && max_label_width > 3 {
            let head: String = label.chars().take(max_label_width - 3).collect();
            format!("{head}...")
        } else {
            format!("{label:max_label_width$}")
        };

        let bar_length = ((*value as f64 / max_value as f64) * bar_width as f64) as usize;
        let bar = FULL_BLOCK.to_string().repeat(bar_length);
        let padding = " ".repeat(bar_width.saturating_sub(bar_length));

        lines.push(format!("{truncated_label} |{bar}{padding} {value}"));
    }

    lines.join("\n")
}

/// Render a sparkline (compact inline chart).
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_sparkline(values: &[u64]) -> String {
    if values.is_empty() {
        return String::new();
    }

    let max_value = values.iter().copied().max().unwrap_or(1).max(1);

    values
        .iter()
        .map(|&v| {
            if v == 0 {
                BAR_CHARS[0]
            } else {
                let normalized = (v as f64 / max_value as f64 * 7.0) as usize;
                BAR_CHARS[normalized.clamp(1, 7)]
            }
        })
        .collect()
}

/// Render a weekday-by-week heatmap of daily study minutes.
///
/// Rows are Monday to Sunday, columns are weeks, oldest on the left.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn render_heatmap(days: &[DailyStudy]) -> String {
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return String::new();
    };

    let by_date: HashMap<_, _> = days.iter().map(|d| (d.date, d.total_minutes)).collect();
    let max_minutes = by_date.values().copied().max().unwrap_or(1).max(1);

    let grid_start = crate::core::week_start(first.date);
    let weeks = ((last.date - grid_start).num_days() / 7 + 1) as usize;

    let mut lines = Vec::new();
    let day_labels = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

    let mut header = "    ".to_string();
    for w in 0..weeks {
        header.push_str(&format!("W{:<2}", weeks - w));
    }
    lines.push(header);

    for (day_idx, label) in day_labels.iter().enumerate() {
        let mut row = format!("{label} ");
        for week in 0..weeks {
            let date = grid_start + Duration::days((week * 7 + day_idx) as i64);
            let cell = match by_date.get(&date) {
                None => ' ',
                Some(0) => '·',
                Some(&minutes) => match (minutes as f64 / max_minutes as f64 * 4.0) as usize {
                    0 => '░',
                    1 => '▒',
                    2 => '▓',
                    _ => '█',
                },
            };
            row.push_str(&format!(" {cell} "));
        }
        lines.push(row);
    }

    lines.push(String::new());
    lines.push("Legend: · = 0  ░ = low  ▒ = medium  ▓ = high  █ = peak".to_string());

    lines.join("\n")
}

/// Render a simple progress bar for a 0-100 percentage.
#[must_use]
pub fn render_progress_bar(percent: u8, width: usize) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * width / 100;
    let empty = width - filled;

    format!(
        "[{}{}] {percent}%",
        FULL_BLOCK.to_string().repeat(filled),
        "░".repeat(empty)
    )
}

/// Render a summary box with key metrics.
#[must_use]
pub fn render_summary_box(title: &str, items: &[(&str, String)]) -> String {
    let max_label_len = items.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max_value_len = items.iter().map(|(_, v)| v.chars().count()).max().unwrap_or(0);
    let content_width = max_label_len + max_value_len + 3; // " : "
    let title_len = title.chars().count();
    let box_width = content_width.max(title_len) + 4;

    let mut lines = Vec::new();

    lines.push(format!("┌{}┐", "─".repeat(box_width)));

    let title_padding = (box_width - title_len) / 2;
    lines.push(format!(
        "│{}{}{}│",
        " ".repeat(title_padding),
        title,
        " ".repeat(box_width - title_padding - title_len)
    ));

    lines.push(format!("├{}┤", "─".repeat(box_width)));

    for (label, value) in items {
        let item_str = format!("{label:>max_label_len$} : {value}");
        let padding = box_width.saturating_sub(item_str.chars().count() + 2);
        lines.push(format!("│ {item_str}{} │", " ".repeat(padding)));
    }

    lines.push(format!("└{}┘", "─".repeat(box_width)));

    lines.join("\n")
}

/// Format minutes as `1h 30m`.
#[must_use]
pub fn format_minutes(minutes: u64) -> String {
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}
