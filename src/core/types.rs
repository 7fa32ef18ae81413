//! Strongly-typed study records.
//!
//! Every record that reaches the scheduler or the analytics code passes
//! through one of these types. Status strings, durations and ratings coming
//! from storage or from an import bundle are validated here, so the pure
//! functions downstream never see a negative duration or an unknown status.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StudyFlowError;

/// Row id of a subject.
pub type SubjectId = i64;
/// Row id of a topic.
pub type TopicId = i64;

/// Completion status of a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    /// Not yet touched
    NotStarted,
    /// Being studied
    InProgress,
    /// Finished
    Completed,
}

impl TopicStatus {
    /// Parse a status from its stored or user-facing form.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::InvalidInput` for unknown statuses.
    pub fn parse(s: &str) -> Result<Self, StudyFlowError> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "not_started" | "todo" | "new" => Ok(Self::NotStarted),
            "in_progress" | "started" | "doing" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(StudyFlowError::invalid(format!("unknown topic status '{other}'"))),
        }
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "Not started"),
            Self::InProgress => write!(f, "In progress"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// Status of a deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineStatus {
    /// Still open
    Pending,
    /// Done
    Completed,
}

impl DeadlineStatus {
    /// Parse a status from its stored form.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::InvalidInput` for unknown statuses.
    pub fn parse(s: &str) -> Result<Self, StudyFlowError> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(StudyFlowError::invalid(format!(
                "unknown deadline status '{other}'"
            ))),
        }
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Self-rated confidence after a revision, 1 (shaky) to 5 (solid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    /// Lowest accepted rating.
    pub const MIN: u8 = 1;
    /// Highest accepted rating.
    pub const MAX: u8 = 5;

    /// Validate a rating.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::InvalidInput` if the rating is outside 1-5.
    pub fn new(value: u8) -> Result<Self, StudyFlowError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(StudyFlowError::invalid(format!(
                "confidence must be between {} and {}, got {value}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// The raw rating.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Confidence {
    type Error = StudyFlowError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

/// A subject (course, module) that groups topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Database ID (None if not persisted)
    pub id: Option<SubjectId>,
    /// Owning user
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Optional display color, e.g. `#3b82f6`
    #[serde(default)]
    pub color: Option<String>,
}

/// A unit of study content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Database ID (None if not persisted)
    pub id: Option<TopicId>,
    /// Owning user
    pub user_id: String,
    /// Subject this topic belongs to
    pub subject_id: SubjectId,
    /// Title
    pub title: String,
    /// Completion status
    pub status: TopicStatus,
}

/// A logged block of study time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    /// Database ID (None if not persisted)
    pub id: Option<i64>,
    /// Owning user
    pub user_id: String,
    /// Subject studied, if any
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    /// When the session started
    pub start_time: DateTime<Utc>,
    /// Minutes studied; `None` while the session is incomplete
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

impl StudySession {
    /// Build a session from a possibly-signed duration.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::InvalidInput` for a negative duration.
    pub fn new(
        user_id: &str,
        subject_id: Option<SubjectId>,
        start_time: DateTime<Utc>,
        duration_minutes: Option<i64>,
    ) -> Result<Self, StudyFlowError> {
        let duration_minutes = duration_minutes
            .map(|m| {
                u32::try_from(m).map_err(|_| {
                    StudyFlowError::invalid(format!("session duration must be non-negative, got {m}"))
                })
            })
            .transpose()?;

        Ok(Self {
            id: None,
            user_id: user_id.to_string(),
            subject_id,
            start_time,
            duration_minutes,
        })
    }

    /// Minutes this session contributes to totals (0 while incomplete).
    #[must_use]
    pub fn minutes(&self) -> u64 {
        u64::from(self.duration_minutes.unwrap_or(0))
    }

    /// Calendar date the session started on.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }
}

/// A dated deliverable (exam, assignment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadline {
    /// Database ID (None if not persisted)
    pub id: Option<i64>,
    /// Owning user
    pub user_id: String,
    /// Title
    pub title: String,
    /// Related subject, if any
    #[serde(default)]
    pub subject_id: Option<SubjectId>,
    /// Status
    pub status: DeadlineStatus,
    /// Due instant
    pub due_date: DateTime<Utc>,
}

/// A planned study block on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyPlan {
    /// Database ID (None if not persisted)
    pub id: Option<i64>,
    /// Owning user
    pub user_id: String,
    /// Title
    pub title: String,
    /// Day the block is planned for
    pub planned_date: NaiveDate,
    /// Whether the block was done
    pub completed: bool,
}

/// A logged spaced-repetition review of a topic. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionRecord {
    /// Database ID (None if not persisted)
    pub id: Option<i64>,
    /// Owning user
    pub user_id: String,
    /// Reviewed topic
    pub topic_id: TopicId,
    /// 1-based position in the topic's revision sequence
    pub revision_number: u32,
    /// When the review happened
    pub revision_date: DateTime<Utc>,
    /// Optional self-rating
    #[serde(default)]
    pub confidence_level: Option<Confidence>,
    /// Day the next review falls due
    pub next_revision_date: NaiveDate,
}
