/*
[INPUT]:  TaskApi, SharedTable, PollPolicy, CancellationToken, task handle
[OUTPUT]: Row updates for one task until a terminal status; PollOutcome
[POS]:    Polling layer - one GET-then-sleep loop per task
[UPDATE]: When changing termination rules or polling bounds
*/

use megaweb_adapter::{TaskApi, TaskHandle, TaskStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::table::{RowChange, SharedTable};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Bounds of one poll loop. Without `max_attempts` and `timeout` the loop
/// only ends on a terminal status, an error or shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub timeout: Option<Duration>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: None,
            timeout: None,
        }
    }
}

/// Why a poll loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// SUCCESS or FAILURE was observed
    Terminal(TaskStatus),
    /// A status request failed; the loop stopped without updating the row
    Failed(String),
    /// The policy's attempt or time bound was hit first
    Exhausted { attempts: u32 },
    Cancelled,
}

impl PollOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Terminal(TaskStatus::Success))
    }

    pub fn label(&self) -> String {
        match self {
            PollOutcome::Terminal(status) => status.to_string(),
            PollOutcome::Failed(error) => format!("tracking stopped: {error}"),
            PollOutcome::Exhausted { attempts } => {
                format!("gave up after {attempts} polls")
            }
            PollOutcome::Cancelled => "cancelled".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Poller {
    api: Arc<dyn TaskApi>,
    table: SharedTable,
    policy: PollPolicy,
    shutdown: CancellationToken,
}

impl Poller {
    pub fn new(
        api: Arc<dyn TaskApi>,
        table: SharedTable,
        policy: PollPolicy,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            api,
            table,
            policy,
            shutdown,
        }
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Poll `handle` until a terminal status, an error, a policy bound or shutdown.
    pub async fn run(&self, handle: TaskHandle) -> PollOutcome {
        let started = Instant::now();
        let deadline = self.policy.timeout.map(|timeout| started + timeout);
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let response = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!(task_id = %handle, "poll loop cancelled");
                    return PollOutcome::Cancelled;
                }
                response = self.api.task_status(&handle) => response,
            };

            let record = match response {
                Ok(record) => record,
                Err(err) => {
                    warn!(
                        task_id = %handle,
                        attempts,
                        retryable = err.is_retryable(),
                        error = %err,
                        "status request failed, tracking stopped"
                    );
                    return PollOutcome::Failed(err.to_string());
                }
            };

            let change = self.table.lock().await.upsert(&handle, &record);
            match change {
                RowChange::Inserted => {
                    info!(task_id = %handle, status = %record.task_status, "tracking task");
                }
                RowChange::StatusChanged { from } => {
                    info!(
                        task_id = %handle,
                        %from,
                        to = %record.task_status,
                        "task status changed"
                    );
                }
                RowChange::Refreshed => {
                    debug!(
                        task_id = %handle,
                        status = %record.task_status,
                        attempts,
                        "task polled"
                    );
                }
            }

            if record.task_status.is_terminal() {
                info!(task_id = %handle, status = %record.task_status, attempts, "task finished");
                return PollOutcome::Terminal(record.task_status);
            }

            if self
                .policy
                .max_attempts
                .is_some_and(|max_attempts| attempts >= max_attempts)
            {
                warn!(task_id = %handle, attempts, "poll attempts exhausted");
                return PollOutcome::Exhausted { attempts };
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!(task_id = %handle, "poll loop cancelled");
                    return PollOutcome::Cancelled;
                }
                _ = tokio::time::sleep(self.policy.interval) => {}
            }

            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                warn!(task_id = %handle, attempts, "poll timeout reached");
                return PollOutcome::Exhausted { attempts };
            }
        }
    }
}
