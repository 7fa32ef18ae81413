//! Topic completion and deadline adherence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{Deadline, DeadlineStatus, Subject, SubjectId, Topic, TopicStatus};

/// Topic progress within one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectCompletion {
    /// Subject
    pub subject_id: SubjectId,
    /// Completed topics
    pub completed: usize,
    /// Topics in progress
    pub in_progress: usize,
    /// Topics not started
    pub not_started: usize,
    /// `round(100 * completed / total)`, 0 with no topics
    pub completion_rate: u8,
}

impl SubjectCompletion {
    fn empty(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            completed: 0,
            in_progress: 0,
            not_started: 0,
            completion_rate: 0,
        }
    }

    /// Total topics counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.completed + self.in_progress + self.not_started
    }
}

/// Deadline adherence summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineAdherence {
    /// All deadlines considered
    pub total: usize,
    /// Completed and not yet past due
    pub completed_on_time: usize,
    /// Pending and past due
    pub overdue: usize,
    /// `round(100 * completed_on_time / total)`, 0 with no deadlines
    pub adherence_rate: u8,
}

/// Integer percentage `round(100 * part / whole)`, 0 when `whole` is 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round().clamp(0.0, 100.0) as u8
}

/// Per-subject topic counts and completion rates.
///
/// Every subject in `subjects` appears, including ones with no topics.
/// Subject ids that only occur on topics follow, in first-appearance order.
#[must_use]
pub fn topic_completion_by_subject(subjects: &[Subject], topics: &[Topic]) -> Vec<SubjectCompletion> {
    let mut rows: Vec<SubjectCompletion> = subjects
        .iter()
        .filter_map(|s| s.id)
        .map(SubjectCompletion::empty)
        .collect();

    for topic in topics {
        let idx = match rows.iter().position(|r| r.subject_id == topic.subject_id) {
            Some(idx) => idx,
            None => {
                rows.push(SubjectCompletion::empty(topic.subject_id));
                rows.len() - 1
            }
        };
        let row = &mut rows[idx];
        match topic.status {
            TopicStatus::Completed => row.completed += 1,
            TopicStatus::InProgress => row.in_progress += 1,
            TopicStatus::NotStarted => row.not_started += 1,
        }
    }

    for row in &mut rows {
        row.completion_rate = percentage(row.completed, row.total());
    }
    rows
}

/// Summarize deadlines relative to `now`.
///
/// A completed deadline counts as on time when its due date has not yet
/// passed at `now`. This compares against the current moment rather than
/// the moment of completion, so a deadline finished early stops counting
/// as on time once its due date passes.
#[must_use]
pub fn deadline_adherence(deadlines: &[Deadline], now: DateTime<Utc>) -> DeadlineAdherence {
    let completed_on_time = deadlines
        .iter()
        .filter(|d| d.status == DeadlineStatus::Completed && d.due_date >= now)
        .count();
    let overdue = deadlines
        .iter()
        .filter(|d| d.status == DeadlineStatus::Pending && d.due_date < now)
        .count();

    DeadlineAdherence {
        total: deadlines.len(),
        completed_on_time,
        overdue,
        adherence_rate: percentage(completed_on_time, deadlines.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn subject(id: SubjectId) -> Subject {
        Subject {
            id: Some(id),
            user_id: "u1".to_string(),
            name: format!("Subject {id}"),
            color: None,
        }
    }

    fn topic(subject_id: SubjectId, status: TopicStatus) -> Topic {
        Topic {
            id: None,
            user_id: "u1".to_string(),
            subject_id,
            title: "t".to_string(),
            status,
        }
    }

    fn deadline(status: DeadlineStatus, due: DateTime<Utc>) -> Deadline {
        Deadline {
            id: None,
            user_id: "u1".to_string(),
            title: "essay".to_string(),
            subject_id: None,
            status,
            due_date: due,
        }
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn test_subject_without_topics_has_zero_rate() {
        let rows = topic_completion_by_subject(&[subject(1)], &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total(), 0);
        assert_eq!(rows[0].completion_rate, 0);
    }

    #[test]
    fn test_completion_counts() {
        let topics = vec![
            topic(1, TopicStatus::Completed),
            topic(1, TopicStatus::Completed),
            topic(1, TopicStatus::InProgress),
            topic(2, TopicStatus::NotStarted),
            topic(7, TopicStatus::Completed),
        ];

        let rows = topic_completion_by_subject(&[subject(1), subject(2)], &topics);
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].subject_id, 1);
        assert_eq!(rows[0].completed, 2);
        assert_eq!(rows[0].in_progress, 1);
        assert_eq!(rows[0].completion_rate, 67);

        assert_eq!(rows[1].subject_id, 2);
        assert_eq!(rows[1].not_started, 1);
        assert_eq!(rows[1].completion_rate, 0);

        assert_eq!(rows[2].subject_id, 7);
        assert_eq!(rows[2].completion_rate, 100);
    }

    #[test]
    fn test_adherence_empty() {
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let summary = deadline_adherence(&[], now);
        assert_eq!(summary.adherence_rate, 0);
        assert_eq!(summary.total, 0);
    }

    #[test]
    fn test_adherence_counts() {
        let now = Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap();
        let deadlines = vec![
            deadline(DeadlineStatus::Completed, now + Duration::days(2)),
            deadline(DeadlineStatus::Completed, now),
            deadline(DeadlineStatus::Completed, now - Duration::days(1)),
            deadline(DeadlineStatus::Pending, now - Duration::hours(1)),
            deadline(DeadlineStatus::Pending, now + Duration::days(5)),
        ];

        let summary = deadline_adherence(&deadlines, now);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.completed_on_time, 2);
        assert_eq!(summary.overdue, 1);
        assert_eq!(summary.adherence_rate, 40);
    }
}
