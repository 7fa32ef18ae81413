use chrono::{DateTime, NaiveDate, Utc};
use colored::Colorize;

use crate::core::{
    Deadline, DeadlineStatus, RevisionRecord, StudyPlan, StudySession, Subject, SubjectId, Topic,
    TopicStatus,
};
use crate::features::analytics::visualization::format_minutes;

fn header(title: &str, count: usize) -> String {
    let mut output = format!("{} ({} items)\n", title.bold(), count);
    output.push_str(&"─".repeat(60));
    output.push('\n');
    output
}

fn subject_name(subjects: &[Subject], id: SubjectId) -> String {
    subjects
        .iter()
        .find(|s| s.id == Some(id))
        .map_or_else(|| format!("Subject #{id}"), |s| s.name.clone())
}

fn id_tag(id: Option<i64>) -> String {
    id.map_or_else(String::new, |id| format!("#{id}")).dimmed().to_string()
}

/// Format a list of subjects
pub fn format_subjects_pretty(subjects: &[Subject]) -> String {
    if subjects.is_empty() {
        return "Subjects (0 items)\n  No subjects".to_string();
    }

    let mut output = header("Subjects", subjects.len());
    for subject in subjects {
        let mut line = format!("{} {}", id_tag(subject.id), subject.name.bold());
        if let Some(color) = &subject.color {
            line.push_str(&format!("  {}", color.dimmed()));
        }
        output.push_str(&line);
        output.push('\n');
    }
    output
}

/// Format a list of topics with their subject names
pub fn format_topics_pretty(topics: &[Topic], subjects: &[Subject]) -> String {
    if topics.is_empty() {
        return "Topics (0 items)\n  No topics".to_string();
    }

    let mut output = header("Topics", topics.len());
    for topic in topics {
        let status_icon = match topic.status {
            TopicStatus::NotStarted => "[ ]".white(),
            TopicStatus::InProgress => "[~]".yellow(),
            TopicStatus::Completed => "[x]".green(),
        };
        output.push_str(&format!(
            "{} {} {}  {}\n",
            status_icon,
            id_tag(topic.id),
            topic.title.bold(),
            subject_name(subjects, topic.subject_id).cyan()
        ));
    }
    output
}

/// Format a list of study sessions
pub fn format_sessions_pretty(sessions: &[StudySession], subjects: &[Subject]) -> String {
    if sessions.is_empty() {
        return "Sessions (0 items)\n  No sessions".to_string();
    }

    let mut output = header("Sessions", sessions.len());
    for session in sessions {
        let duration = session
            .duration_minutes
            .map_or_else(|| "in progress".yellow().to_string(), |m| format_minutes(u64::from(m)).green().to_string());
        let subject = session
            .subject_id
            .map_or_else(|| "No subject".to_string(), |id| subject_name(subjects, id));
        output.push_str(&format!(
            "{} {}  {}  {}\n",
            id_tag(session.id),
            session.start_time.format("%Y-%m-%d %H:%M"),
            duration,
            subject.cyan()
        ));
    }
    output
}

/// Format deadlines, highlighting overdue ones relative to `now`
pub fn format_deadlines_pretty(deadlines: &[Deadline], now: DateTime<Utc>) -> String {
    if deadlines.is_empty() {
        return "Deadlines (0 items)\n  No deadlines".to_string();
    }

    let mut output = header("Deadlines", deadlines.len());
    for deadline in deadlines {
        let overdue = deadline.status == DeadlineStatus::Pending && deadline.due_date < now;
        let status_icon = match deadline.status {
            DeadlineStatus::Completed => "[x]".green(),
            DeadlineStatus::Pending if overdue => "[!]".red(),
            DeadlineStatus::Pending => "[ ]".white(),
        };
        let due = deadline.due_date.format("%Y-%m-%d %H:%M").to_string();
        let due = if overdue { due.red() } else { due.yellow() };
        output.push_str(&format!(
            "{} {} {}  {}\n",
            status_icon,
            id_tag(deadline.id),
            deadline.title.bold(),
            due
        ));
    }
    output
}

/// Format study plans
pub fn format_plans_pretty(plans: &[StudyPlan]) -> String {
    if plans.is_empty() {
        return "Plans (0 items)\n  No plans".to_string();
    }

    let mut output = header("Plans", plans.len());
    for plan in plans {
        let status_icon = if plan.completed { "[x]".green() } else { "[ ]".white() };
        output.push_str(&format!(
            "{} {} {}  {}\n",
            status_icon,
            id_tag(plan.id),
            plan.title.bold(),
            plan.planned_date.to_string().yellow()
        ));
    }
    output
}

/// Format revisions that are due, with how late each one is
pub fn format_due_pretty(due: &[RevisionRecord], topics: &[Topic], as_of: NaiveDate) -> String {
    if due.is_empty() {
        return format!("Due revisions as of {as_of} (0 items)\n  Nothing to revise");
    }

    let mut output = header(&format!("Due revisions as of {as_of}"), due.len());
    for record in due {
        let title = topics
            .iter()
            .find(|t| t.id == Some(record.topic_id))
            .map_or_else(|| format!("Topic #{}", record.topic_id), |t| t.title.clone());
        let late = (as_of - record.next_revision_date).num_days();
        let when = match late {
            0 => "due today".yellow(),
            1 => "1 day late".red(),
            n => format!("{n} days late").red(),
        };
        output.push_str(&format!(
            "{} {}  after revision {}  {}\n",
            format!("#{}", record.topic_id).dimmed(),
            title.bold(),
            record.revision_number,
            when
        ));
    }
    output
}

/// Confirmation line for a newly logged revision
pub fn format_revision_pretty(record: &RevisionRecord, topic_title: &str) -> String {
    format!(
        "Revision {} of {} logged, next review on {}",
        record.revision_number,
        topic_title.bold(),
        record.next_revision_date.to_string().green()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn no_color() {
        colored::control::set_override(false);
    }

    fn topic(id: i64, title: &str, status: TopicStatus) -> Topic {
        Topic {
            id: Some(id),
            user_id: "alice".to_string(),
            subject_id: 1,
            title: title.to_string(),
            status,
        }
    }

    #[test]
    fn test_empty_lists() {
        no_color();
        assert!(format_subjects_pretty(&[]).contains("No subjects"));
        assert!(format_topics_pretty(&[], &[]).contains("No topics"));
        assert!(format_plans_pretty(&[]).contains("No plans"));
    }

    #[test]
    fn test_topics_show_status_and_subject() {
        no_color();
        let subjects = vec![Subject {
            id: Some(1),
            user_id: "alice".to_string(),
            name: "Maths".to_string(),
            color: None,
        }];
        let output = format_topics_pretty(
            &[topic(4, "Limits", TopicStatus::Completed), topic(5, "Series", TopicStatus::NotStarted)],
            &subjects,
        );

        assert!(output.contains("Topics (2 items)"));
        assert!(output.contains("[x] #4 Limits  Maths"));
        assert!(output.contains("[ ] #5 Series  Maths"));
    }

    #[test]
    fn test_sessions_in_progress() {
        no_color();
        let start = Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap();
        let sessions = vec![
            StudySession::new("alice", None, start, Some(95)).unwrap(),
            StudySession::new("alice", Some(9), start, None).unwrap(),
        ];
        let output = format_sessions_pretty(&sessions, &[]);

        assert!(output.contains("2024-03-06 09:00  1h 35m  No subject"));
        assert!(output.contains("in progress  Subject #9"));
    }

    #[test]
    fn test_overdue_deadline_marked() {
        no_color();
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let deadline = Deadline {
            id: Some(2),
            user_id: "alice".to_string(),
            title: "Essay".to_string(),
            subject_id: None,
            status: DeadlineStatus::Pending,
            due_date: now - chrono::Duration::hours(2),
        };
        assert!(format_deadlines_pretty(&[deadline], now).contains("[!] #2 Essay"));
    }

    #[test]
    fn test_due_lateness() {
        no_color();
        let as_of = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let record = RevisionRecord {
            id: Some(1),
            user_id: "alice".to_string(),
            topic_id: 4,
            revision_number: 2,
            revision_date: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            confidence_level: None,
            next_revision_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        };
        let output = format_due_pretty(&[record], &[topic(4, "Limits", TopicStatus::InProgress)], as_of);

        assert!(output.contains("Limits  after revision 2  2 days late"));
    }
}
