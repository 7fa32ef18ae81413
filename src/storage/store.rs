//! Study record storage.
//!
//! Reads and writes every record type in the local database. Every query is
//! scoped by an explicit `user_id`; rows are converted back through the
//! validated record types, so a corrupt status or negative duration surfaces
//! as an error instead of reaching the analytics.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Row};

use super::Database;
use crate::core::{
    Confidence, Deadline, DeadlineStatus, RevisionRecord, StudyDataSource, StudyPlan,
    StudySession, Subject, SubjectId, Topic, TopicId, TopicStatus,
};
use crate::error::StudyFlowError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage for all study records.
pub struct StudyStore {
    db: Database,
}

impl StudyStore {
    /// Open storage at the default database location.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new() -> Result<Self, StudyFlowError> {
        let db = Database::open()?;
        Ok(Self { db })
    }

    /// Create storage with an existing database connection.
    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self { db }
    }

    /// Run `f` inside a transaction, committing only if it succeeds.
    ///
    /// # Errors
    ///
    /// Returns the error from `f`, or a database error if the transaction
    /// cannot be started or committed.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Self) -> Result<T, StudyFlowError>,
    ) -> Result<T, StudyFlowError> {
        let tx = self
            .db
            .connection()
            .unchecked_transaction()
            .map_err(|e| StudyFlowError::Database(format!("Failed to begin transaction: {e}")))?;
        let value = f(self)?;
        tx.commit()
            .map_err(|e| StudyFlowError::Database(format!("Failed to commit transaction: {e}")))?;
        Ok(value)
    }

    // ==================== Subjects ====================

    /// Insert a subject and assign its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the insert fails.
    pub fn add_subject(&self, subject: &mut Subject) -> Result<(), StudyFlowError> {
        if subject.name.trim().is_empty() {
            return Err(StudyFlowError::invalid("subject name must not be empty"));
        }

        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO subjects (user_id, name, color) VALUES (?1, ?2, ?3)",
            params![subject.user_id, subject.name, subject.color],
        )
        .map_err(|e| StudyFlowError::Database(format!("Failed to insert subject: {e}")))?;

        subject.id = Some(conn.last_insert_rowid());
        tracing::debug!(id = subject.id, name = %subject.name, "subject added");
        Ok(())
    }

    /// Find a subject by numeric id or case-insensitive name.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::NotFound` if no subject matches.
    pub fn resolve_subject(&self, user_id: &str, key: &str) -> Result<Subject, StudyFlowError> {
        let subjects = self.subjects(user_id)?;
        let found = match key.trim().parse::<SubjectId>() {
            Ok(id) => subjects.into_iter().find(|s| s.id == Some(id)),
            Err(_) => subjects
                .into_iter()
                .find(|s| s.name.eq_ignore_ascii_case(key.trim())),
        };
        found.ok_or_else(|| StudyFlowError::NotFound(format!("subject '{key}'")))
    }

    // ==================== Topics ====================

    /// Insert a topic and assign its id.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::NotFound` if the subject does not belong to
    /// the topic's user.
    pub fn add_topic(&self, topic: &mut Topic) -> Result<(), StudyFlowError> {
        if topic.title.trim().is_empty() {
            return Err(StudyFlowError::invalid("topic title must not be empty"));
        }
        self.resolve_subject(&topic.user_id, &topic.subject_id.to_string())?;

        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO topics (user_id, subject_id, title, status) VALUES (?1, ?2, ?3, ?4)",
            params![topic.user_id, topic.subject_id, topic.title, topic.status.as_str()],
        )
        .map_err(|e| StudyFlowError::Database(format!("Failed to insert topic: {e}")))?;

        topic.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Get one topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn topic(&self, user_id: &str, topic_id: TopicId) -> Result<Option<Topic>, StudyFlowError> {
        let mut found = self.query_all(
            "SELECT id, user_id, subject_id, title, status FROM topics
             WHERE user_id = ?1 AND id = ?2",
            params![user_id, topic_id],
            row_to_topic,
        )?;
        Ok(found.pop())
    }

    /// Change a topic's status.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::NotFound` if the topic does not exist for the user.
    pub fn set_topic_status(
        &self,
        user_id: &str,
        topic_id: TopicId,
        status: TopicStatus,
    ) -> Result<(), StudyFlowError> {
        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE topics SET status = ?1 WHERE user_id = ?2 AND id = ?3",
                params![status.as_str(), user_id, topic_id],
            )
            .map_err(|e| StudyFlowError::Database(format!("Failed to update topic: {e}")))?;

        if rows == 0 {
            return Err(StudyFlowError::NotFound(format!("topic {topic_id}")));
        }
        Ok(())
    }

    // ==================== Sessions ====================

    /// Insert a study session and assign its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject is unknown or the insert fails.
    pub fn log_session(&self, session: &mut StudySession) -> Result<(), StudyFlowError> {
        if let Some(subject_id) = session.subject_id {
            self.resolve_subject(&session.user_id, &subject_id.to_string())?;
        }

        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO study_sessions (user_id, subject_id, start_time, duration_minutes)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                session.user_id,
                session.subject_id,
                fmt_instant(session.start_time),
                session.duration_minutes,
            ],
        )
        .map_err(|e| StudyFlowError::Database(format!("Failed to insert session: {e}")))?;

        session.id = Some(conn.last_insert_rowid());
        tracing::debug!(id = session.id, minutes = ?session.duration_minutes, "session logged");
        Ok(())
    }

    /// Most recent sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn recent_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<StudySession>, StudyFlowError> {
        self.query_all(
            "SELECT id, user_id, subject_id, start_time, duration_minutes FROM study_sessions
             WHERE user_id = ?1 ORDER BY start_time DESC, id DESC LIMIT ?2",
            params![user_id, i64::try_from(limit).unwrap_or(i64::MAX)],
            row_to_session,
        )
    }

    // ==================== Deadlines ====================

    /// Insert a deadline and assign its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_deadline(&self, deadline: &mut Deadline) -> Result<(), StudyFlowError> {
        if deadline.title.trim().is_empty() {
            return Err(StudyFlowError::invalid("deadline title must not be empty"));
        }

        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO deadlines (user_id, title, subject_id, status, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                deadline.user_id,
                deadline.title,
                deadline.subject_id,
                deadline.status.as_str(),
                fmt_instant(deadline.due_date),
            ],
        )
        .map_err(|e| StudyFlowError::Database(format!("Failed to insert deadline: {e}")))?;

        deadline.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Mark a deadline completed.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::NotFound` if the deadline does not exist for the user.
    pub fn complete_deadline(&self, user_id: &str, id: i64) -> Result<(), StudyFlowError> {
        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE deadlines SET status = ?1 WHERE user_id = ?2 AND id = ?3",
                params![DeadlineStatus::Completed.as_str(), user_id, id],
            )
            .map_err(|e| StudyFlowError::Database(format!("Failed to update deadline: {e}")))?;

        if rows == 0 {
            return Err(StudyFlowError::NotFound(format!("deadline {id}")));
        }
        Ok(())
    }

    // ==================== Plans ====================

    /// Insert a study plan and assign its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_plan(&self, plan: &mut StudyPlan) -> Result<(), StudyFlowError> {
        if plan.title.trim().is_empty() {
            return Err(StudyFlowError::invalid("plan title must not be empty"));
        }

        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO study_plans (user_id, title, planned_date, completed) VALUES (?1, ?2, ?3, ?4)",
            params![
                plan.user_id,
                plan.title,
                plan.planned_date.format(DATE_FORMAT).to_string(),
                plan.completed,
            ],
        )
        .map_err(|e| StudyFlowError::Database(format!("Failed to insert plan: {e}")))?;

        plan.id = Some(conn.last_insert_rowid());
        Ok(())
    }

    /// Mark a plan completed.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::NotFound` if the plan does not exist for the user.
    pub fn complete_plan(&self, user_id: &str, id: i64) -> Result<(), StudyFlowError> {
        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE study_plans SET completed = 1 WHERE user_id = ?1 AND id = ?2",
                params![user_id, id],
            )
            .map_err(|e| StudyFlowError::Database(format!("Failed to update plan: {e}")))?;

        if rows == 0 {
            return Err(StudyFlowError::NotFound(format!("plan {id}")));
        }
        Ok(())
    }

    // ==================== Revisions ====================

    /// Insert a revision record and assign its id.
    ///
    /// The record must take the next number in its topic's sequence.
    ///
    /// # Errors
    ///
    /// Returns `StudyFlowError::NotFound` for an unknown topic and
    /// `StudyFlowError::InvalidInput` if the number is out of sequence.
    pub fn insert_revision(&self, revision: &mut RevisionRecord) -> Result<(), StudyFlowError> {
        if self.topic(&revision.user_id, revision.topic_id)?.is_none() {
            return Err(StudyFlowError::NotFound(format!("topic {}", revision.topic_id)));
        }

        let prior_max = self.max_revision_number(&revision.user_id, revision.topic_id)?;
        if revision.revision_number != prior_max + 1 {
            return Err(StudyFlowError::invalid(format!(
                "revision {} of topic {} is out of sequence (next is {})",
                revision.revision_number,
                revision.topic_id,
                prior_max + 1
            )));
        }

        let conn = self.db.connection();
        conn.execute(
            "INSERT INTO revisions
             (user_id, topic_id, revision_number, revision_date, confidence_level, next_revision_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                revision.user_id,
                revision.topic_id,
                revision.revision_number,
                fmt_instant(revision.revision_date),
                revision.confidence_level.map(Confidence::value),
                revision.next_revision_date.format(DATE_FORMAT).to_string(),
            ],
        )
        .map_err(|e| StudyFlowError::Database(format!("Failed to insert revision: {e}")))?;

        revision.id = Some(conn.last_insert_rowid());
        tracing::debug!(
            topic_id = revision.topic_id,
            number = revision.revision_number,
            next = %revision.next_revision_date,
            "revision recorded"
        );
        Ok(())
    }

    fn query_all<T, P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
        map: fn(&Row<'_>) -> Result<T, rusqlite::Error>,
    ) -> Result<Vec<T>, StudyFlowError> {
        let mut stmt = self
            .db
            .connection()
            .prepare(sql)
            .map_err(|e| StudyFlowError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map(params, map)
            .map_err(|e| StudyFlowError::Database(format!("Failed to run query: {e}")))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StudyFlowError::Database(format!("Failed to read row: {e}")))
    }
}

impl StudyDataSource for StudyStore {
    fn subjects(&self, user_id: &str) -> Result<Vec<Subject>, StudyFlowError> {
        self.query_all(
            "SELECT id, user_id, name, color FROM subjects WHERE user_id = ?1 ORDER BY id",
            params![user_id],
            row_to_subject,
        )
    }

    fn topics(
        &self,
        user_id: &str,
        subject_id: Option<SubjectId>,
    ) -> Result<Vec<Topic>, StudyFlowError> {
        self.query_all(
            "SELECT id, user_id, subject_id, title, status FROM topics
             WHERE user_id = ?1 AND (?2 IS NULL OR subject_id = ?2)
             ORDER BY id",
            params![user_id, subject_id],
            row_to_topic,
        )
    }

    fn sessions_between(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StudySession>, StudyFlowError> {
        self.query_all(
            "SELECT id, user_id, subject_id, start_time, duration_minutes FROM study_sessions
             WHERE user_id = ?1 AND start_time >= ?2 AND start_time < ?3
             ORDER BY start_time, id",
            params![user_id, fmt_instant(start), fmt_instant(end)],
            row_to_session,
        )
    }

    fn sessions(&self, user_id: &str) -> Result<Vec<StudySession>, StudyFlowError> {
        self.query_all(
            "SELECT id, user_id, subject_id, start_time, duration_minutes FROM study_sessions
             WHERE user_id = ?1 ORDER BY start_time, id",
            params![user_id],
            row_to_session,
        )
    }

    fn deadlines(&self, user_id: &str) -> Result<Vec<Deadline>, StudyFlowError> {
        self.query_all(
            "SELECT id, user_id, title, subject_id, status, due_date FROM deadlines
             WHERE user_id = ?1 ORDER BY due_date, id",
            params![user_id],
            row_to_deadline,
        )
    }

    fn plans_between(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<StudyPlan>, StudyFlowError> {
        self.query_all(
            "SELECT id, user_id, title, planned_date, completed FROM study_plans
             WHERE user_id = ?1 AND planned_date >= ?2 AND planned_date <= ?3
             ORDER BY planned_date, id",
            params![
                user_id,
                start.format(DATE_FORMAT).to_string(),
                end.format(DATE_FORMAT).to_string()
            ],
            row_to_plan,
        )
    }

    fn plans(&self, user_id: &str) -> Result<Vec<StudyPlan>, StudyFlowError> {
        self.query_all(
            "SELECT id, user_id, title, planned_date, completed FROM study_plans
             WHERE user_id = ?1 ORDER BY planned_date, id",
            params![user_id],
            row_to_plan,
        )
    }

    fn revisions(&self, user_id: &str) -> Result<Vec<RevisionRecord>, StudyFlowError> {
        self.query_all(
            "SELECT id, user_id, topic_id, revision_number, revision_date, confidence_level,
                    next_revision_date
             FROM revisions WHERE user_id = ?1 ORDER BY topic_id, revision_number",
            params![user_id],
            row_to_revision,
        )
    }

    fn max_revision_number(&self, user_id: &str, topic_id: TopicId) -> Result<u32, StudyFlowError> {
        let max: i64 = self
            .db
            .connection()
            .query_row(
                "SELECT COALESCE(MAX(revision_number), 0) FROM revisions
                 WHERE user_id = ?1 AND topic_id = ?2",
                params![user_id, topic_id],
                |row| row.get(0),
            )
            .map_err(|e| StudyFlowError::Database(format!("Failed to query revisions: {e}")))?;

        u32::try_from(max).map_err(|_| StudyFlowError::invalid(format!("stored revision number {max} is invalid")))
    }
}

/// Canonical stored form of an instant: RFC 3339, whole seconds, `Z` suffix.
fn fmt_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn conversion_error(idx: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn parse_instant(row: &Row<'_>, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_day(row: &Row<'_>, idx: usize) -> Result<NaiveDate, rusqlite::Error> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

fn row_to_subject(row: &Row<'_>) -> Result<Subject, rusqlite::Error> {
    Ok(Subject {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
    })
}

fn row_to_topic(row: &Row<'_>) -> Result<Topic, rusqlite::Error> {
    let status: String = row.get(4)?;
    Ok(Topic {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        subject_id: row.get(2)?,
        title: row.get(3)?,
        status: TopicStatus::parse(&status).map_err(|e| conversion_error(4, e))?,
    })
}

fn row_to_session(row: &Row<'_>) -> Result<StudySession, rusqlite::Error> {
    let user_id: String = row.get(1)?;
    let duration: Option<i64> = row.get(4)?;
    let mut session = StudySession::new(&user_id, row.get(2)?, parse_instant(row, 3)?, duration)
        .map_err(|e| conversion_error(4, e))?;
    session.id = Some(row.get(0)?);
    Ok(session)
}

fn row_to_deadline(row: &Row<'_>) -> Result<Deadline, rusqlite::Error> {
    let status: String = row.get(4)?;
    Ok(Deadline {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        title: row.get(2)?,
        subject_id: row.get(3)?,
        status: DeadlineStatus::parse(&status).map_err(|e| conversion_error(4, e))?,
        due_date: parse_instant(row, 5)?,
    })
}

fn row_to_plan(row: &Row<'_>) -> Result<StudyPlan, rusqlite::Error> {
    Ok(StudyPlan {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        title: row.get(2)?,
        planned_date: parse_day(row, 3)?,
        completed: row.get(4)?,
    })
}

fn row_to_revision(row: &Row<'_>) -> Result<RevisionRecord, rusqlite::Error> {
    let confidence: Option<u8> = row.get(5)?;
    Ok(RevisionRecord {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        topic_id: row.get(2)?,
        revision_number: row.get(3)?,
        revision_date: parse_instant(row, 4)?,
        confidence_level: confidence
            .map(Confidence::new)
            .transpose()
            .map_err(|e| conversion_error(5, e))?,
        next_revision_date: parse_day(row, 6)?,
    })
}
