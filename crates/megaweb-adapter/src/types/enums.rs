/*
[INPUT]:  Task API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums for task types and task statuses
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the server adds task types or status markers
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Task types accepted by the `Mega-Task` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskType {
    SaveFile,
    DebridAndSaveFile,
    DownloadMagnet,
    DownloadTorrent,
}

impl TaskType {
    pub const ALL: [TaskType; 4] = [
        TaskType::SaveFile,
        TaskType::DebridAndSaveFile,
        TaskType::DownloadMagnet,
        TaskType::DownloadTorrent,
    ];

    /// Header value sent as `Mega-Task`
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::SaveFile => "SaveFile",
            TaskType::DebridAndSaveFile => "DebridAndSaveFile",
            TaskType::DownloadMagnet => "DownloadMagnet",
            TaskType::DownloadTorrent => "DownloadTorrent",
        }
    }

    /// Human readable label
    pub fn description(&self) -> &'static str {
        match self {
            TaskType::SaveFile => "Save File",
            TaskType::DebridAndSaveFile => "Debrid & Save File",
            TaskType::DownloadMagnet => "Download Magnet",
            TaskType::DownloadTorrent => "Download Torrent",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|task_type| task_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let allowed: Vec<&str> = TaskType::ALL.iter().map(TaskType::as_str).collect();
                format!(
                    "unknown task type '{s}', allowed values are: {}",
                    allowed.join(", ")
                )
            })
    }
}

/// Status marker reported by `GET /tasks/{task_id}`.
///
/// Only `SUCCESS` and `FAILURE` end a poll loop. Markers the client does not
/// know are kept verbatim in [`TaskStatus::Other`] and treated as in progress.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    Received,
    Started,
    Retry,
    Revoked,
    Success,
    Failure,
    Other(String),
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failure)
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Received => "RECEIVED",
            TaskStatus::Started => "STARTED",
            TaskStatus::Retry => "RETRY",
            TaskStatus::Revoked => "REVOKED",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failure => "FAILURE",
            TaskStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PENDING" => TaskStatus::Pending,
            "RECEIVED" => TaskStatus::Received,
            "STARTED" => TaskStatus::Started,
            "RETRY" => TaskStatus::Retry,
            "REVOKED" => TaskStatus::Revoked,
            "SUCCESS" => TaskStatus::Success,
            "FAILURE" => TaskStatus::Failure,
            _ => TaskStatus::Other(raw),
        }
    }
}

impl From<&str> for TaskStatus {
    fn from(raw: &str) -> Self {
        TaskStatus::from(raw.to_string())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
