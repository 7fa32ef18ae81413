use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::core::{
    Deadline, RevisionRecord, StudyDataSource, StudyPlan, StudySession, Subject, SubjectId, Topic,
    TopicId,
};
use crate::error::StudyFlowError;
use crate::features::revision::schedule_from_history;
use crate::storage::StudyStore;

/// Bundle format version written by [`export_bundle`].
pub const EXPORT_VERSION: u32 = 1;

/// Every record one user owns, as written to an export file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundle {
    /// Format version
    pub version: u32,
    /// When the export was taken
    pub exported_at: DateTime<Utc>,
    /// User the records were exported from
    pub user_id: String,
    /// Subjects, with their original ids
    #[serde(default)]
    pub subjects: Vec<Subject>,
    /// Topics, referencing subjects by original id
    #[serde(default)]
    pub topics: Vec<Topic>,
    /// Every study session, whatever its date
    #[serde(default)]
    pub sessions: Vec<StudySession>,
    /// Deadlines
    #[serde(default)]
    pub deadlines: Vec<Deadline>,
    /// Every study plan, whatever its date
    #[serde(default)]
    pub plans: Vec<StudyPlan>,
    /// Revision records, referencing topics by original id
    #[serde(default)]
    pub revisions: Vec<RevisionRecord>,
}

/// Counts of records inserted by [`import_bundle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Subjects inserted
    pub subjects: usize,
    /// Topics inserted
    pub topics: usize,
    /// Sessions inserted
    pub sessions: usize,
    /// Deadlines inserted
    pub deadlines: usize,
    /// Plans inserted
    pub plans: usize,
    /// Revisions inserted
    pub revisions: usize,
}

/// Collect every record `user_id` owns.
///
/// # Errors
///
/// Returns any error raised by the data source.
pub fn export_bundle<S: StudyDataSource + ?Sized>(
    source: &S,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<ExportBundle, StudyFlowError> {
    Ok(ExportBundle {
        version: EXPORT_VERSION,
        exported_at: now,
        user_id: user_id.to_string(),
        subjects: source.subjects(user_id)?,
        topics: source.topics(user_id, None)?,
        sessions: source.sessions(user_id)?,
        deadlines: source.deadlines(user_id)?,
        plans: source.plans(user_id)?,
        revisions: source.revisions(user_id)?,
    })
}

/// Insert every record in `bundle` as owned by `user_id`.
///
/// Ids are remapped to fresh rows. Everything is inserted in one
/// transaction, so a bundle that fails validation leaves storage untouched.
///
/// # Errors
///
/// Returns `StudyFlowError::InvalidInput` for an unsupported version, a
/// dangling subject or topic reference, or a revision sequence that does
/// not run 1, 2, 3... per topic.
pub fn import_bundle(
    store: &StudyStore,
    user_id: &str,
    bundle: &ExportBundle,
) -> Result<ImportSummary, StudyFlowError> {
    if bundle.version != EXPORT_VERSION {
        return Err(StudyFlowError::invalid(format!(
            "unsupported export version {} (expected {EXPORT_VERSION})",
            bundle.version
        )));
    }
    validate_revision_histories(&bundle.revisions)?;

    let summary = store.transaction(|store| {
        let mut summary = ImportSummary::default();
        let mut subject_ids: HashMap<SubjectId, SubjectId> = HashMap::new();
        let mut topic_ids: HashMap<TopicId, TopicId> = HashMap::new();

        for subject in &bundle.subjects {
            let mut copy = Subject { id: None, user_id: user_id.to_string(), ..subject.clone() };
            store.add_subject(&mut copy)?;
            if let (Some(old), Some(new)) = (subject.id, copy.id) {
                subject_ids.insert(old, new);
            }
            summary.subjects += 1;
        }

        let remap_subject = |id: SubjectId| {
            subject_ids
                .get(&id)
                .copied()
                .ok_or_else(|| StudyFlowError::invalid(format!("record refers to unknown subject {id}")))
        };

        for topic in &bundle.topics {
            let mut copy = Topic {
                id: None,
                user_id: user_id.to_string(),
                subject_id: remap_subject(topic.subject_id)?,
                ..topic.clone()
            };
            store.add_topic(&mut copy)?;
            if let (Some(old), Some(new)) = (topic.id, copy.id) {
                topic_ids.insert(old, new);
            }
            summary.topics += 1;
        }

        for session in &bundle.sessions {
            let mut copy = StudySession {
                id: None,
                user_id: user_id.to_string(),
                subject_id: session.subject_id.map(&remap_subject).transpose()?,
                ..session.clone()
            };
            store.log_session(&mut copy)?;
            summary.sessions += 1;
        }

        for deadline in &bundle.deadlines {
            let mut copy = Deadline {
                id: None,
                user_id: user_id.to_string(),
                subject_id: deadline.subject_id.map(&remap_subject).transpose()?,
                ..deadline.clone()
            };
            store.add_deadline(&mut copy)?;
            summary.deadlines += 1;
        }

        for plan in &bundle.plans {
            let mut copy = StudyPlan { id: None, user_id: user_id.to_string(), ..plan.clone() };
            store.add_plan(&mut copy)?;
            summary.plans += 1;
        }

        let mut revisions: Vec<&RevisionRecord> = bundle.revisions.iter().collect();
        revisions.sort_by_key(|r| (r.topic_id, r.revision_number));
        for revision in revisions {
            let topic_id = topic_ids.get(&revision.topic_id).copied().ok_or_else(|| {
                StudyFlowError::invalid(format!("revision refers to unknown topic {}", revision.topic_id))
            })?;
            let mut copy = RevisionRecord {
                id: None,
                user_id: user_id.to_string(),
                topic_id,
                ..revision.clone()
            };
            store.insert_revision(&mut copy)?;
            summary.revisions += 1;
        }

        Ok(summary)
    })?;

    tracing::info!(user_id, ?summary, "import complete");
    Ok(summary)
}

/// Write a bundle as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_bundle(path: &Path, bundle: &ExportBundle) -> Result<(), StudyFlowError> {
    let json = serde_json::to_string_pretty(bundle)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read and parse a bundle.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any record fails to parse.
pub fn read_bundle(path: &Path) -> Result<ExportBundle, StudyFlowError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn validate_revision_histories(revisions: &[RevisionRecord]) -> Result<(), StudyFlowError> {
    let mut by_topic: HashMap<TopicId, Vec<u32>> = HashMap::new();
    for revision in revisions {
        by_topic.entry(revision.topic_id).or_default().push(revision.revision_number);
    }
    for numbers in by_topic.values() {
        schedule_from_history(numbers, NaiveDate::MIN)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Confidence, DeadlineStatus, TopicStatus};
    use crate::features::revision::log_revision;
    use crate::storage::Database;
    use chrono::{Duration, TimeZone};

    fn store() -> StudyStore {
        StudyStore::with_database(Database::open_in_memory().unwrap())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 6, 12, 0, 0).unwrap()
    }

    fn seeded_store() -> StudyStore {
        let store = store();
        let mut subject = Subject { id: None, user_id: "alice".into(), name: "Maths".into(), color: Some("blue".into()) };
        store.add_subject(&mut subject).unwrap();
        let subject_id = subject.id.unwrap();

        let mut topic = Topic {
            id: None,
            user_id: "alice".into(),
            subject_id,
            title: "Limits".into(),
            status: TopicStatus::InProgress,
        };
        store.add_topic(&mut topic).unwrap();

        let mut session = StudySession::new("alice", Some(subject_id), now() - Duration::days(1), Some(50)).unwrap();
        store.log_session(&mut session).unwrap();

        let mut deadline = Deadline {
            id: None,
            user_id: "alice".into(),
            title: "Problem set".into(),
            subject_id: Some(subject_id),
            status: DeadlineStatus::Pending,
            due_date: now() + Duration::days(3),
        };
        store.add_deadline(&mut deadline).unwrap();

        let mut plan = StudyPlan {
            id: None,
            user_id: "alice".into(),
            title: "Review notes".into(),
            planned_date: now().date_naive(),
            completed: false,
        };
        store.add_plan(&mut plan).unwrap();

        let topic_id = topic.id.unwrap();
        log_revision(&store, "alice", topic_id, now() - Duration::days(4), None).unwrap();
        log_revision(&store, "alice", topic_id, now() - Duration::days(2), Confidence::new(4).ok()).unwrap();
        store
    }

    #[test]
    fn test_export_then_import_into_other_store() {
        let source = seeded_store();
        let bundle = export_bundle(&source, "alice", now()).unwrap();
        assert_eq!(bundle.version, EXPORT_VERSION);
        assert_eq!(bundle.subjects.len(), 1);
        assert_eq!(bundle.revisions.len(), 2);

        let target = store();
        // An unrelated subject shifts row ids so remapping is exercised
        let mut other = Subject { id: None, user_id: "bob".into(), name: "Art".into(), color: None };
        target.add_subject(&mut other).unwrap();

        let summary = import_bundle(&target, "carol", &bundle).unwrap();
        assert_eq!(
            summary,
            ImportSummary { subjects: 1, topics: 1, sessions: 1, deadlines: 1, plans: 1, revisions: 2 }
        );

        let topics = target.topics("carol", None).unwrap();
        let subjects = target.subjects("carol").unwrap();
        assert_eq!(topics[0].subject_id, subjects[0].id.unwrap());
        assert_eq!(target.max_revision_number("carol", topics[0].id.unwrap()).unwrap(), 2);
    }

    /// Records with ids replaced by the names they point at, so bundles from
    /// different stores can be compared.
    #[allow(clippy::type_complexity)]
    fn comparable(
        bundle: &ExportBundle,
    ) -> (
        Vec<(String, Option<String>)>,
        Vec<(String, String, TopicStatus)>,
        Vec<(Option<String>, DateTime<Utc>, Option<u32>)>,
        Vec<(String, Option<String>, DeadlineStatus, DateTime<Utc>)>,
        Vec<(String, NaiveDate, bool)>,
        Vec<(String, u32, DateTime<Utc>, Option<Confidence>, NaiveDate)>,
    ) {
        let subject_name = |id: SubjectId| {
            bundle.subjects.iter().find(|s| s.id == Some(id)).map(|s| s.name.clone()).unwrap()
        };
        let topic_title = |id: TopicId| {
            bundle.topics.iter().find(|t| t.id == Some(id)).map(|t| t.title.clone()).unwrap()
        };

        (
            bundle.subjects.iter().map(|s| (s.name.clone(), s.color.clone())).collect(),
            bundle
                .topics
                .iter()
                .map(|t| (subject_name(t.subject_id), t.title.clone(), t.status))
                .collect(),
            bundle
                .sessions
                .iter()
                .map(|s| (s.subject_id.map(&subject_name), s.start_time, s.duration_minutes))
                .collect(),
            bundle
                .deadlines
                .iter()
                .map(|d| (d.title.clone(), d.subject_id.map(&subject_name), d.status, d.due_date))
                .collect(),
            bundle.plans.iter().map(|p| (p.title.clone(), p.planned_date, p.completed)).collect(),
            bundle
                .revisions
                .iter()
                .map(|r| {
                    (
                        topic_title(r.topic_id),
                        r.revision_number,
                        r.revision_date,
                        r.confidence_level,
                        r.next_revision_date,
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_round_trip_keeps_every_record() {
        let source = seeded_store();
        let subject_id = source.subjects("alice").unwrap()[0].id.unwrap();

        // Dates far outside any dashboard window still belong in an export
        let early = Utc.with_ymd_and_hms(1965, 1, 1, 8, 0, 0).unwrap();
        let mut old = StudySession::new("alice", Some(subject_id), early, Some(25)).unwrap();
        source.log_session(&mut old).unwrap();
        let late = Utc.with_ymd_and_hms(9999, 12, 31, 12, 0, 0).unwrap();
        let mut open = StudySession::new("alice", None, late, None).unwrap();
        source.log_session(&mut open).unwrap();
        let mut distant = StudyPlan {
            id: None,
            user_id: "alice".into(),
            title: "Retirement reading".into(),
            planned_date: NaiveDate::from_ymd_opt(9999, 12, 31).unwrap(),
            completed: true,
        };
        source.add_plan(&mut distant).unwrap();
        let mut ancient = StudyPlan { planned_date: NaiveDate::from_ymd_opt(1900, 1, 1).unwrap(), ..distant.clone() };
        ancient.id = None;
        source.add_plan(&mut ancient).unwrap();

        let exported = export_bundle(&source, "alice", now()).unwrap();
        assert_eq!(exported.sessions.len(), 3);
        assert_eq!(exported.plans.len(), 3);

        let target = store();
        let mut other = Subject { id: None, user_id: "bob".into(), name: "Art".into(), color: None };
        target.add_subject(&mut other).unwrap();
        import_bundle(&target, "carol", &exported).unwrap();

        let reexported = export_bundle(&target, "carol", now()).unwrap();
        assert_eq!(comparable(&reexported), comparable(&exported));
        assert!(reexported.sessions.iter().all(|s| s.user_id == "carol"));
        assert_ne!(reexported.subjects[0].id, exported.subjects[0].id);
    }

    #[test]
    fn test_import_rejects_gap_and_rolls_back() {
        let source = seeded_store();
        let mut bundle = export_bundle(&source, "alice", now()).unwrap();
        bundle.revisions[1].revision_number = 3;

        let target = store();
        let result = import_bundle(&target, "alice", &bundle);
        assert!(matches!(result, Err(StudyFlowError::InvalidInput(_))));
        assert!(target.subjects("alice").unwrap().is_empty());
    }

    #[test]
    fn test_import_rejects_duplicate_revision_numbers() {
        let source = seeded_store();
        let mut bundle = export_bundle(&source, "alice", now()).unwrap();
        bundle.revisions[1].revision_number = 1;

        let result = import_bundle(&store(), "alice", &bundle);
        assert!(matches!(result, Err(StudyFlowError::InvalidInput(_))));
    }

    #[test]
    fn test_import_rejects_unknown_version() {
        let source = seeded_store();
        let mut bundle = export_bundle(&source, "alice", now()).unwrap();
        bundle.version = 99;

        assert!(import_bundle(&store(), "alice", &bundle).is_err());
    }

    #[test]
    fn test_bundle_file_round_trip_validates_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let bundle = export_bundle(&seeded_store(), "alice", now()).unwrap();
        write_bundle(&path, &bundle).unwrap();
        assert_eq!(read_bundle(&path).unwrap().sessions.len(), 1);

        let corrupted = std::fs::read_to_string(&path).unwrap().replace("\"in_progress\"", "\"paused\"");
        std::fs::write(&path, corrupted).unwrap();
        assert!(matches!(read_bundle(&path), Err(StudyFlowError::Json(_))));
    }
}
