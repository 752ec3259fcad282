/*
[INPUT]:  TaskApi, FormSpec and user field values
[OUTPUT]: Submission (task handle + payload sent)
[POS]:    Submission layer - validate then POST /tasks
[UPDATE]: When submission flow or error reporting changes
*/

use megaweb_adapter::{MegaWebError, TaskApi, TaskHandle, TaskPayload, TaskType};
use thiserror::Error;
use tracing::{info, warn};

use crate::forms::{FieldValues, FormError, FormSpec};

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub task_type: TaskType,
    pub handle: TaskHandle,
    pub payload: TaskPayload,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("submit {task_type} task: {source}")]
    Api {
        task_type: TaskType,
        #[source]
        source: MegaWebError,
    },
}

/// Validate the form and create the task.
///
/// Nothing is sent when validation fails.
pub async fn submit(
    api: &dyn TaskApi,
    form: &FormSpec,
    values: &FieldValues,
) -> Result<Submission, SubmitError> {
    let task_type = form.task_type;
    let payload = form.validate(values)?;

    let handle = api
        .submit_task(task_type, &payload)
        .await
        .map_err(|source| {
            warn!(%task_type, error = %source, "task submission failed");
            SubmitError::Api { task_type, source }
        })?;

    info!(%task_type, task_id = %handle, fields = payload.len(), "task submitted");
    Ok(Submission {
        task_type,
        handle,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormCatalog;
    use megaweb_adapter::MockTaskApi;

    fn values(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_submit_sends_validated_payload() {
        let api = MockTaskApi::new();
        api.push_handle("h-1");
        let catalog = FormCatalog::new("/dl");

        let submission = submit(
            &api,
            catalog.get(TaskType::DownloadMagnet),
            &values(&[("magnet", "magnet:?xt=urn:btih:abc")]),
        )
        .await
        .unwrap();

        assert_eq!(submission.handle, TaskHandle::new("h-1"));
        let sent = api.submissions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, TaskType::DownloadMagnet);
        assert_eq!(sent[0].1, submission.payload);
        assert_eq!(sent[0].1.get("folder"), Some("/dl"));
    }

    #[tokio::test]
    async fn test_invalid_form_sends_nothing() {
        let api = MockTaskApi::new();
        let catalog = FormCatalog::new("/dl");

        let err = submit(&api, catalog.get(TaskType::SaveFile), &FieldValues::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SubmitError::Form(_)));
        assert!(api.submissions().is_empty());
    }

    #[tokio::test]
    async fn test_server_rejection_is_reported() {
        let api = MockTaskApi::new();
        api.reject_submissions("Bad Request: url: This field is required.");
        let catalog = FormCatalog::new("/dl");

        let err = submit(
            &api,
            catalog.get(TaskType::SaveFile),
            &values(&[("url", "https://host/a")]),
        )
        .await
        .unwrap_err();

        match err {
            SubmitError::Api { task_type, source } => {
                assert_eq!(task_type, TaskType::SaveFile);
                assert!(source.is_rejected());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
