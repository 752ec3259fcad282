/*
[INPUT]:  Task API schema definitions and serde requirements
[OUTPUT]: Typed response structs for task creation, status and errors
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Deserializer, Serialize};

use super::enums::TaskStatus;
use super::models::TaskHandle;

/// Response of `POST /tasks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreated {
    pub task_id: TaskHandle,
}

/// Response of `GET /tasks/{task_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatusRecord {
    #[serde(default)]
    pub task_id: Option<TaskHandle>,
    pub task_status: TaskStatus,
    #[serde(default, deserialize_with = "result_as_text")]
    pub task_result: Option<String>,
}

/// Error body sent with 4xx answers, e.g.
/// `{"message": "Bad Request", "error": {"url": ["This field is required."]}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub error: serde_json::Value,
}

impl ApiErrorBody {
    /// Flatten `error` into a single line
    pub fn detail(&self) -> String {
        match &self.error {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Object(fields) => fields
                .iter()
                .map(|(field, messages)| match messages {
                    serde_json::Value::Array(items) => {
                        let joined: Vec<String> = items.iter().map(message_text).collect();
                        format!("{field}: {}", joined.join(", "))
                    }
                    other => format!("{field}: {other}"),
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

/// Strings without their JSON quotes, anything else as JSON text
fn message_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn result_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_record_with_null_result() {
        let record: TaskStatusRecord = serde_json::from_str(
            r#"{"task_id": "abc", "task_status": "PENDING", "task_result": null}"#,
        )
        .unwrap();

        assert_eq!(record.task_id, Some(TaskHandle::new("abc")));
        assert_eq!(record.task_status, TaskStatus::Pending);
        assert_eq!(record.task_result, None);
    }

    #[test]
    fn test_status_record_minimal_and_structured_result() {
        let record: TaskStatusRecord =
            serde_json::from_str(r#"{"task_status": "SUCCESS", "task_result": {"size": 3}}"#)
                .unwrap();

        assert_eq!(record.task_id, None);
        assert_eq!(record.task_result.as_deref(), Some("{\"size\":3}"));
    }

    #[test]
    fn test_error_body_detail() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"message": "Bad Request",
                "error": {"torrent_path": ["This field is required.", "Invalid input."]}}"#,
        )
        .unwrap();
        assert_eq!(
            body.detail(),
            "torrent_path: This field is required., Invalid input."
        );

        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message": "Bad Request", "error": "bad header"}"#).unwrap();
        assert_eq!(body.detail(), "bad header");

        let body: ApiErrorBody = serde_json::from_str(
            r#"{"message": "Bad Request", "error": {"folder": ["Too long.", 255]}}"#,
        )
        .unwrap();
        assert_eq!(body.detail(), "folder: Too long., 255");
    }
}
