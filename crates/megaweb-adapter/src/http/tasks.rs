/*
[INPUT]:  Task type, submission payload, task handle
[OUTPUT]: Task handle on creation, status record on query
[POS]:    HTTP layer - task creation and status endpoints
[UPDATE]: When the task endpoints or headers change
*/

use crate::http::{MegaWebClient, Result};
use crate::types::{TaskCreated, TaskHandle, TaskPayload, TaskStatusRecord, TaskType};
use reqwest::Method;
use tracing::debug;

/// Header carrying the task type on submission
pub const TASK_TYPE_HEADER: &str = "Mega-Task";

impl MegaWebClient {
    /// Create a task
    ///
    /// POST /tasks
    /// Requires: `Mega-Task` header naming the task type
    pub async fn submit_task(
        &self,
        task_type: TaskType,
        payload: &TaskPayload,
    ) -> Result<TaskHandle> {
        let builder = self
            .request(Method::POST, &["tasks"])?
            .header(TASK_TYPE_HEADER, task_type.as_str())
            .json(payload);

        let created: TaskCreated = self.send_json(builder).await?;
        debug!(%task_type, task_id = %created.task_id, "task created");
        Ok(created.task_id)
    }

    /// Query the status of a task
    ///
    /// GET /tasks/{task_id}
    pub async fn task_status(&self, handle: &TaskHandle) -> Result<TaskStatusRecord> {
        let builder = self.request(Method::GET, &["tasks", handle.as_str()])?;
        self.send_json(builder).await
    }
}
