//! JSON output formatting for studyflow.

use serde::Serialize;
use serde_json::json;

use crate::error::StudyFlowError;

/// Format a named list as `{"list", "count", "items"}`.
///
/// # Errors
///
/// Returns `StudyFlowError::Json` if serialization fails.
pub fn format_list_json<T: Serialize>(list_name: &str, items: &[T]) -> Result<String, StudyFlowError> {
    let output = json!({
        "list": list_name,
        "count": items.len(),
        "items": items
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `StudyFlowError::Json` if serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, StudyFlowError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{StudySession, Subject, Topic, TopicStatus};
    use chrono::{TimeZone, Utc};

    fn subject(name: &str) -> Subject {
        Subject {
            id: Some(3),
            user_id: "alice".to_string(),
            name: name.to_string(),
            color: None,
        }
    }

    #[test]
    fn test_format_list_json_empty() {
        let subjects: Vec<Subject> = vec![];
        let result = format_list_json("Subjects", &subjects).unwrap();

        assert!(result.contains("\"list\": \"Subjects\""));
        assert!(result.contains("\"count\": 0"));
        assert!(result.contains("\"items\": []"));
    }

    #[test]
    fn test_format_list_json_items() {
        let result = format_list_json("Subjects", &[subject("Maths"), subject("Art")]).unwrap();

        assert!(result.contains("\"count\": 2"));
        assert!(result.contains("\"name\": \"Maths\""));
        assert!(result.contains("\"id\": 3"));
    }

    #[test]
    fn test_topic_status_is_snake_case() {
        let topic = Topic {
            id: Some(1),
            user_id: "alice".to_string(),
            subject_id: 3,
            title: "Limits".to_string(),
            status: TopicStatus::InProgress,
        };
        let result = to_json(&topic).unwrap();
        assert!(result.contains("\"status\": \"in_progress\""));
    }

    #[test]
    fn test_session_without_duration() {
        let start = Utc.with_ymd_and_hms(2024, 3, 6, 9, 0, 0).unwrap();
        let session = StudySession::new("alice", None, start, None).unwrap();
        let result = to_json(&session).unwrap();

        assert!(result.contains("\"duration_minutes\": null"));
        assert!(result.contains("\"start_time\": \"2024-03-06T09:00:00Z\""));
    }

    #[test]
    fn test_json_preserves_special_characters() {
        let result = to_json(&subject("Maths \"pure\" \\ applied\n")).unwrap();

        assert!(result.contains("\\\"pure\\\""));
        assert!(result.contains("\\\\"));
        assert!(result.contains("\\n"));
    }
}
