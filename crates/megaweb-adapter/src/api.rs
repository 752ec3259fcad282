/*
[INPUT]:  Task submissions and status queries
[OUTPUT]: TaskApi abstraction over the HTTP client plus a scripted mock
[POS]:    API seam - lets callers swap the transport in tests
[UPDATE]: When task endpoints are added to the client
*/

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::http::{MegaWebClient, MegaWebError, Result};
use crate::types::{TaskHandle, TaskPayload, TaskStatus, TaskStatusRecord, TaskType};

/// Operations of the Mega-Web task API
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// Create a task and return its handle
    async fn submit_task(&self, task_type: TaskType, payload: &TaskPayload) -> Result<TaskHandle>;

    /// Fetch the current status of a task
    async fn task_status(&self, handle: &TaskHandle) -> Result<TaskStatusRecord>;
}

#[async_trait]
impl TaskApi for MegaWebClient {
    async fn submit_task(&self, task_type: TaskType, payload: &TaskPayload) -> Result<TaskHandle> {
        MegaWebClient::submit_task(self, task_type, payload).await
    }

    async fn task_status(&self, handle: &TaskHandle) -> Result<TaskStatusRecord> {
        MegaWebClient::task_status(self, handle).await
    }
}

/// One scripted answer of [`MockTaskApi::task_status`]
#[derive(Debug, Clone)]
pub enum MockReply {
    Status(TaskStatusRecord),
    Fail(String),
}

impl MockReply {
    pub fn status(status: &str, result: Option<&str>) -> Self {
        MockReply::Status(TaskStatusRecord {
            task_id: None,
            task_status: TaskStatus::from(status),
            task_result: result.map(str::to_string),
        })
    }

    pub fn fail(message: &str) -> Self {
        MockReply::Fail(message.to_string())
    }
}

#[derive(Debug, Default)]
struct MockState {
    next_handles: VecDeque<TaskHandle>,
    issued: usize,
    submissions: Vec<(TaskType, TaskPayload)>,
    reject_submissions: Option<String>,
    replies: HashMap<TaskHandle, VecDeque<MockReply>>,
    last_status: HashMap<TaskHandle, TaskStatusRecord>,
    status_calls: HashMap<TaskHandle, usize>,
}

/// Scripted task API for testing
///
/// Status replies are consumed in order per handle. Once a handle's script is
/// used up, its last status is repeated, which models a task stuck in progress.
#[derive(Debug, Default)]
pub struct MockTaskApi {
    state: Mutex<MockState>,
}

impl MockTaskApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the handle returned by the next submission
    pub fn push_handle(&self, handle: impl Into<TaskHandle>) {
        self.lock().next_handles.push_back(handle.into());
    }

    /// Answer every submission with a 400 carrying `message`
    pub fn reject_submissions(&self, message: &str) {
        self.lock().reject_submissions = Some(message.to_string());
    }

    /// Append status replies for a handle
    pub fn script(
        &self,
        handle: impl Into<TaskHandle>,
        replies: impl IntoIterator<Item = MockReply>,
    ) {
        self.lock()
            .replies
            .entry(handle.into())
            .or_default()
            .extend(replies);
    }

    pub fn submissions(&self) -> Vec<(TaskType, TaskPayload)> {
        self.lock().submissions.clone()
    }

    pub fn status_calls(&self, handle: &TaskHandle) -> usize {
        self.lock().status_calls.get(handle).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl TaskApi for MockTaskApi {
    async fn submit_task(&self, task_type: TaskType, payload: &TaskPayload) -> Result<TaskHandle> {
        let mut state = self.lock();
        if let Some(message) = &state.reject_submissions {
            return Err(MegaWebError::api_error(StatusCode::BAD_REQUEST, message.clone()));
        }

        state.submissions.push((task_type, payload.clone()));
        state.issued += 1;
        let issued = state.issued;
        Ok(state
            .next_handles
            .pop_front()
            .unwrap_or_else(|| TaskHandle::new(format!("mock-task-{issued}"))))
    }

    async fn task_status(&self, handle: &TaskHandle) -> Result<TaskStatusRecord> {
        let mut state = self.lock();
        *state.status_calls.entry(handle.clone()).or_default() += 1;

        let next = state
            .replies
            .get_mut(handle)
            .and_then(|queue| queue.pop_front());

        match next {
            Some(MockReply::Status(mut record)) => {
                record.task_id.get_or_insert_with(|| handle.clone());
                state.last_status.insert(handle.clone(), record.clone());
                Ok(record)
            }
            Some(MockReply::Fail(message)) => Err(MegaWebError::InvalidResponse(message)),
            None => state.last_status.get(handle).cloned().ok_or_else(|| {
                MegaWebError::api_error(StatusCode::NOT_FOUND, format!("unknown task {handle}"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_script_then_sticks() {
        let api = MockTaskApi::new();
        let handle = TaskHandle::new("t1");
        api.script(
            "t1",
            [MockReply::status("PENDING", None), MockReply::status("STARTED", None)],
        );

        assert_eq!(api.task_status(&handle).await.unwrap().task_status, TaskStatus::Pending);
        assert_eq!(api.task_status(&handle).await.unwrap().task_status, TaskStatus::Started);
        let repeated = api.task_status(&handle).await.unwrap();
        assert_eq!(repeated.task_status, TaskStatus::Started);
        assert_eq!(repeated.task_id, Some(handle.clone()));
        assert_eq!(api.status_calls(&handle), 3);
    }

    #[tokio::test]
    async fn test_mock_submissions() {
        let api = MockTaskApi::new();
        api.push_handle("first");

        let payload: TaskPayload = [("url", "u")].into_iter().collect();
        let first = api.submit_task(TaskType::SaveFile, &payload).await.unwrap();
        let second = api.submit_task(TaskType::SaveFile, &payload).await.unwrap();

        assert_eq!(first, TaskHandle::new("first"));
        assert_eq!(second, TaskHandle::new("mock-task-2"));
        assert_eq!(api.submissions().len(), 2);

        api.reject_submissions("Bad Request");
        let err = api.submit_task(TaskType::SaveFile, &payload).await.unwrap_err();
        assert!(err.is_rejected());
    }

    #[tokio::test]
    async fn test_mock_unknown_handle() {
        let api = MockTaskApi::new();
        let err = api.task_status(&TaskHandle::new("nope")).await.unwrap_err();
        assert!(err.is_rejected());
    }
}
