//! Subject, topic, session, deadline and plan commands.

use chrono::{Datelike, Days, Duration, NaiveTime};

use super::Context;
use crate::cli::args::{DeadlineCommands, OutputFormat, PlanCommands, SessionCommands, SubjectCommands, TopicCommands};
use crate::core::{
    parse_date, parse_datetime, Deadline, DeadlineStatus, StudyDataSource, StudyPlan, StudySession,
    Subject, Topic,
};
use crate::error::StudyFlowError;
use crate::output::{
    format_deadlines, format_plans, format_sessions, format_subjects, format_topics, to_json,
};

/// Deadlines given as a bare day fall due at the end of it.
const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

fn created<T: serde::Serialize>(
    ctx: &Context,
    record: &T,
    pretty: impl FnOnce() -> String,
) -> Result<String, StudyFlowError> {
    match ctx.format {
        OutputFormat::Json => to_json(record),
        OutputFormat::Pretty => Ok(pretty()),
    }
}

/// Execute subject subcommands
///
/// # Errors
///
/// Returns an error if storage or output formatting fails.
pub fn subject(ctx: &Context, cmd: SubjectCommands) -> Result<String, StudyFlowError> {
    match cmd {
        SubjectCommands::Add { name, color } => {
            let mut subject = Subject {
                id: None,
                user_id: ctx.user.clone(),
                name: name.trim().to_string(),
                color,
            };
            ctx.store.add_subject(&mut subject)?;
            created(ctx, &subject, || {
                format!("Added subject: {} (ID: {})", subject.name, subject.id.unwrap_or_default())
            })
        }
        SubjectCommands::List => {
            let subjects = ctx.store.subjects(&ctx.user)?;
            format_subjects(&subjects, ctx.format)
        }
    }
}

/// Execute topic subcommands
///
/// # Errors
///
/// Returns an error if the subject or topic is unknown, or storage fails.
pub fn topic(ctx: &Context, cmd: TopicCommands) -> Result<String, StudyFlowError> {
    match cmd {
        TopicCommands::Add { subject, title, status } => {
            let subject = ctx.store.resolve_subject(&ctx.user, &subject)?;
            let mut topic = Topic {
                id: None,
                user_id: ctx.user.clone(),
                subject_id: subject.id.unwrap_or_default(),
                title: title.trim().to_string(),
                status,
            };
            ctx.store.add_topic(&mut topic)?;
            created(ctx, &topic, || {
                format!(
                    "Added topic: {} to {} (ID: {})",
                    topic.title,
                    subject.name,
                    topic.id.unwrap_or_default()
                )
            })
        }
        TopicCommands::List { subject } => {
            let subject_id = match subject {
                Some(key) => ctx.store.resolve_subject(&ctx.user, &key)?.id,
                None => None,
            };
            let topics = ctx.store.topics(&ctx.user, subject_id)?;
            let subjects = ctx.store.subjects(&ctx.user)?;
            format_topics(&topics, &subjects, ctx.format)
        }
        TopicCommands::Status { id, status } => {
            ctx.store.set_topic_status(&ctx.user, id, status)?;
            let topic = ctx
                .store
                .topic(&ctx.user, id)?
                .ok_or_else(|| StudyFlowError::NotFound(format!("topic {id}")))?;
            created(ctx, &topic, || format!("Topic {}: {}", topic.title, topic.status))
        }
    }
}

/// Execute session subcommands
///
/// # Errors
///
/// Returns an error if the subject or start time is invalid, or storage fails.
pub fn session(ctx: &Context, cmd: SessionCommands) -> Result<String, StudyFlowError> {
    match cmd {
        SessionCommands::Log { duration, subject, at } => {
            let subject_id = match subject {
                Some(key) => ctx.store.resolve_subject(&ctx.user, &key)?.id,
                None => None,
            };
            let start_time = match at {
                Some(at) => parse_datetime(&at, ctx.today(), ctx.now.time())?,
                None => duration.map_or(ctx.now, |m| ctx.now - Duration::minutes(i64::from(m))),
            };

            let mut session =
                StudySession::new(&ctx.user, subject_id, start_time, duration.map(i64::from))?;
            ctx.store.log_session(&mut session)?;
            created(ctx, &session, || match session.duration_minutes {
                Some(m) => format!("Logged {m} minute session (ID: {})", session.id.unwrap_or_default()),
                None => format!("Started session (ID: {})", session.id.unwrap_or_default()),
            })
        }
        SessionCommands::List { limit } => {
            let sessions = ctx.store.recent_sessions(&ctx.user, limit)?;
            let subjects = ctx.store.subjects(&ctx.user)?;
            format_sessions(&sessions, &subjects, ctx.format)
        }
    }
}

/// Execute deadline subcommands
///
/// # Errors
///
/// Returns an error if the due date or subject is invalid, or storage fails.
pub fn deadline(ctx: &Context, cmd: DeadlineCommands) -> Result<String, StudyFlowError> {
    match cmd {
        DeadlineCommands::Add { title, due, subject } => {
            let subject_id = match subject {
                Some(key) => ctx.store.resolve_subject(&ctx.user, &key)?.id,
                None => None,
            };
            let mut deadline = Deadline {
                id: None,
                user_id: ctx.user.clone(),
                title: title.trim().to_string(),
                subject_id,
                status: DeadlineStatus::Pending,
                due_date: parse_datetime(&due, ctx.today(), END_OF_DAY)?,
            };
            ctx.store.add_deadline(&mut deadline)?;
            created(ctx, &deadline, || {
                format!(
                    "Added deadline: {} due {} (ID: {})",
                    deadline.title,
                    deadline.due_date.format("%Y-%m-%d %H:%M"),
                    deadline.id.unwrap_or_default()
                )
            })
        }
        DeadlineCommands::Done { id } => {
            ctx.store.complete_deadline(&ctx.user, id)?;
            Ok(format!("Completed deadline: {id}"))
        }
        DeadlineCommands::List { pending } => {
            let mut deadlines = ctx.store.deadlines(&ctx.user)?;
            if pending {
                deadlines.retain(|d| d.status == DeadlineStatus::Pending);
            }
            format_deadlines(&deadlines, ctx.now, ctx.format)
        }
    }
}

/// Execute plan subcommands
///
/// # Errors
///
/// Returns an error if a date is invalid or storage fails.
pub fn plan(ctx: &Context, cmd: PlanCommands) -> Result<String, StudyFlowError> {
    match cmd {
        PlanCommands::Add { title, date } => {
            let planned_date = match date {
                Some(date) => parse_date(&date, ctx.today())?,
                None => ctx.today(),
            };
            let mut plan = StudyPlan {
                id: None,
                user_id: ctx.user.clone(),
                title: title.trim().to_string(),
                planned_date,
                completed: false,
            };
            ctx.store.add_plan(&mut plan)?;
            created(ctx, &plan, || {
                format!(
                    "Planned: {} on {} (ID: {})",
                    plan.title,
                    plan.planned_date,
                    plan.id.unwrap_or_default()
                )
            })
        }
        PlanCommands::Done { id } => {
            ctx.store.complete_plan(&ctx.user, id)?;
            Ok(format!("Completed plan: {id}"))
        }
        PlanCommands::List { from, days } => {
            let start = match from {
                Some(from) => parse_date(&from, ctx.today())?,
                None => ctx.today(),
            };
            let end = start
                .checked_add_days(Days::new(u64::from(days.saturating_sub(1))))
                .filter(|end| end.year() <= 9999)
                .ok_or_else(|| StudyFlowError::invalid(format!("{days} days from {start} is out of range")))?;
            let plans = ctx.store.plans_between(&ctx.user, start, end)?;
            format_plans(&plans, ctx.format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::test_support::context;
    use crate::core::TopicStatus;

    fn add_maths(ctx: &Context) {
        subject(ctx, SubjectCommands::Add { name: "Maths".into(), color: None }).unwrap();
    }

    #[test]
    fn test_subject_add_and_list() {
        let ctx = context("alice");
        let out = subject(&ctx, SubjectCommands::Add { name: " Maths ".into(), color: Some("blue".into()) }).unwrap();
        assert!(out.contains("\"name\": \"Maths\""));

        let list = subject(&ctx, SubjectCommands::List).unwrap();
        assert!(list.contains("\"count\": 1"));
    }

    #[test]
    fn test_topic_add_by_subject_name() {
        let ctx = context("alice");
        add_maths(&ctx);

        topic(
            &ctx,
            TopicCommands::Add { subject: "maths".into(), title: "Limits".into(), status: TopicStatus::NotStarted },
        )
        .unwrap();
        let out = topic(&ctx, TopicCommands::Status { id: 1, status: TopicStatus::Completed }).unwrap();
        assert!(out.contains("\"status\": \"completed\""));

        let unknown = topic(
            &ctx,
            TopicCommands::Add { subject: "Physics".into(), title: "Optics".into(), status: TopicStatus::NotStarted },
        );
        assert!(matches!(unknown, Err(StudyFlowError::NotFound(_))));
    }

    #[test]
    fn test_session_log_backdates_start() {
        let ctx = context("alice");
        add_maths(&ctx);

        let out = session(&ctx, SessionCommands::Log { duration: Some(90), subject: Some("Maths".into()), at: None }).unwrap();
        assert!(out.contains("\"start_time\": \"2024-03-06T16:30:00Z\""));
        assert!(out.contains("\"duration_minutes\": 90"));
    }

    #[test]
    fn test_session_log_at_explicit_time() {
        let ctx = context("alice");
        let out = session(
            &ctx,
            SessionCommands::Log { duration: Some(30), subject: None, at: Some("2024-03-05 08:15".into()) },
        )
        .unwrap();
        assert!(out.contains("\"start_time\": \"2024-03-05T08:15:00Z\""));

        let list = session(&ctx, SessionCommands::List { limit: 5 }).unwrap();
        assert!(list.contains("\"count\": 1"));
    }

    #[test]
    fn test_deadline_bare_day_is_end_of_day() {
        let ctx = context("alice");
        let out = deadline(
            &ctx,
            DeadlineCommands::Add { title: "Essay".into(), due: "tomorrow".into(), subject: None },
        )
        .unwrap();
        assert!(out.contains("\"due_date\": \"2024-03-07T23:59:00Z\""));

        deadline(&ctx, DeadlineCommands::Done { id: 1 }).unwrap();
        let pending = deadline(&ctx, DeadlineCommands::List { pending: true }).unwrap();
        assert!(pending.contains("\"count\": 0"));
    }

    #[test]
    fn test_plan_list_window_past_calendar_end() {
        let ctx = context("alice");
        let result = plan(&ctx, PlanCommands::List { from: Some("9999-12-30".into()), days: 7 });
        assert!(matches!(result, Err(StudyFlowError::InvalidInput(_))));
    }

    #[test]
    fn test_plan_list_window() {
        let ctx = context("alice");
        plan(&ctx, PlanCommands::Add { title: "Past paper".into(), date: None }).unwrap();
        plan(&ctx, PlanCommands::Add { title: "Flashcards".into(), date: Some("in 10 days".into()) }).unwrap();

        let list = plan(&ctx, PlanCommands::List { from: None, days: 7 }).unwrap();
        assert!(list.contains("\"count\": 1"));
        assert!(list.contains("Past paper"));
    }
}
