/*
[INPUT]:  TaskApi, FormCatalog, PollPolicy, submissions and task handles
[OUTPUT]: One tokio poll loop per tracked task sharing a TaskTable
[POS]:    Execution layer - per-task poll loop supervision
[UPDATE]: When changing tracking, join or shutdown guarantees
*/

use megaweb_adapter::{MegaWebError, TaskApi, TaskHandle, TaskStatusRecord, TaskType};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::forms::{FieldValues, FormCatalog};
use crate::poller::{PollOutcome, PollPolicy, Poller};
use crate::submitter::{self, SubmitError, Submission};
use crate::table::{SharedTable, TaskTable};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct TrackedTask {
    handle: TaskHandle,
    join: JoinHandle<PollOutcome>,
}

/// Submits tasks and keeps one poll loop running per task handle.
pub struct TaskTracker {
    api: Arc<dyn TaskApi>,
    forms: FormCatalog,
    table: SharedTable,
    poller: Poller,
    shutdown: CancellationToken,
    tasks: Vec<TrackedTask>,
}

impl TaskTracker {
    pub fn new(api: Arc<dyn TaskApi>, forms: FormCatalog, policy: PollPolicy) -> Self {
        let table = TaskTable::shared();
        let shutdown = CancellationToken::new();
        let poller = Poller::new(api.clone(), table.clone(), policy, shutdown.clone());
        Self {
            api,
            forms,
            table,
            poller,
            shutdown,
            tasks: Vec::new(),
        }
    }

    pub fn table(&self) -> SharedTable {
        self.table.clone()
    }

    pub fn forms(&self) -> &FormCatalog {
        &self.forms
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Validate and submit a form, then start tracking the new task.
    pub async fn submit(
        &mut self,
        task_type: TaskType,
        values: &FieldValues,
    ) -> Result<Submission, SubmitError> {
        let submission = self.submit_only(task_type, values).await?;
        self.track(submission.handle.clone());
        Ok(submission)
    }

    /// Validate and submit a form without starting a poll loop.
    pub async fn submit_only(
        &self,
        task_type: TaskType,
        values: &FieldValues,
    ) -> Result<Submission, SubmitError> {
        let form = self.forms.get(task_type);
        submitter::submit(self.api.as_ref(), form, values).await
    }

    /// Start a poll loop for `handle`.
    ///
    /// Returns `false` when a loop for that handle is still running. A finished
    /// loop is replaced and its outcome dropped.
    pub fn track(&mut self, handle: TaskHandle) -> bool {
        if let Some(index) = self.tasks.iter().position(|task| task.handle == handle) {
            if !self.tasks[index].join.is_finished() {
                debug!(task_id = %handle, "task already tracked");
                return false;
            }
            self.tasks.remove(index);
        }

        let poller = self.poller.clone();
        let loop_handle = handle.clone();
        let join = tokio::spawn(async move { poller.run(loop_handle).await });
        self.tasks.push(TrackedTask { handle, join });
        true
    }

    pub fn is_tracking(&self, handle: &TaskHandle) -> bool {
        self.tasks
            .iter()
            .any(|task| &task.handle == handle && !task.join.is_finished())
    }

    pub fn tracked_count(&self) -> usize {
        self.tasks.len()
    }

    /// Fetch a task's status once and render it into the table.
    pub async fn refresh(&self, handle: &TaskHandle) -> Result<TaskStatusRecord, MegaWebError> {
        let record = self.api.task_status(handle).await?;
        self.table.lock().await.upsert(handle, &record);
        Ok(record)
    }

    /// Wait for every poll loop to stop, in tracking order.
    pub async fn wait_all(&mut self) -> Vec<(TaskHandle, PollOutcome)> {
        let tasks = std::mem::take(&mut self.tasks);
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            let outcome = join_outcome(&task.handle, task.join.await);
            outcomes.push((task.handle, outcome));
        }
        outcomes
    }

    /// Cancel every poll loop and wait for them, aborting loops that do not
    /// stop within the shutdown timeout.
    pub async fn shutdown_and_wait(&mut self) -> Vec<(TaskHandle, PollOutcome)> {
        self.shutdown.cancel();

        let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
        let tasks = std::mem::take(&mut self.tasks);
        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            let mut join = task.join;
            let outcome = tokio::select! {
                res = &mut join => join_outcome(&task.handle, res),
                _ = tokio::time::sleep_until(deadline) => {
                    warn!(task_id = %task.handle, "poll loop did not stop in time, aborting");
                    join.abort();
                    PollOutcome::Cancelled
                }
            };
            outcomes.push((task.handle, outcome));
        }
        outcomes
    }
}

fn join_outcome(
    handle: &TaskHandle,
    res: Result<PollOutcome, tokio::task::JoinError>,
) -> PollOutcome {
    match res {
        Ok(outcome) => outcome,
        Err(join_err) if join_err.is_cancelled() => PollOutcome::Cancelled,
        Err(join_err) => {
            error!(task_id = %handle, error = %join_err, "poll loop panicked");
            PollOutcome::Failed(format!("poll loop panicked: {join_err}"))
        }
    }
}
