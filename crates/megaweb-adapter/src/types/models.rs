/*
[INPUT]:  Task identifiers as returned by the task API
[OUTPUT]: TaskHandle newtype used as row key and poll path parameter
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the identifier format changes
*/

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier of a submitted task.
///
/// The server hands out UUID strings, but numeric identifiers are accepted and
/// kept as their decimal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskHandle {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TaskHandle {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for TaskHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Text(id) => Ok(TaskHandle(id)),
            RawId::Number(id) => Ok(TaskHandle(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_from_string_and_number() {
        let text: TaskHandle = serde_json::from_str("\"3f1c-42\"").unwrap();
        assert_eq!(text.as_str(), "3f1c-42");

        let number: TaskHandle = serde_json::from_str("1234").unwrap();
        assert_eq!(number, TaskHandle::new("1234"));
        assert_eq!(serde_json::to_string(&number).unwrap(), "\"1234\"");
    }

    #[test]
    fn test_handle_rejects_objects() {
        assert!(serde_json::from_str::<TaskHandle>("{\"id\": 1}").is_err());
    }
}
