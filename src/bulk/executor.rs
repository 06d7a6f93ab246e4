use super::outcome::{BulkOutcome, DEFAULT_CONFIRM_AFTER_ATTEMPTS};
use super::selection::Selection;
use crate::api::client::WorkflowBackend;
use crate::api::errors::ApiError;
use crate::api::types::WorkflowId;
use crate::workflows::WorkflowStatus;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum BulkError {
    #[error("No items selected")]
    NothingSelected,
    #[error("Nothing to retry: the last bulk action has no failed items")]
    NothingToRetry,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Clears the in-flight flag even if the request future is dropped
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Applies one status to many workflows and keeps what is needed to retry the failures
pub struct BulkActions<B> {
    backend: B,
    last: Option<BulkOutcome>,
    busy: Arc<AtomicBool>,
    confirm_after: u32,
}

impl<B: WorkflowBackend> BulkActions<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            last: None,
            busy: Arc::new(AtomicBool::new(false)),
            confirm_after: DEFAULT_CONFIRM_AFTER_ATTEMPTS,
        }
    }

    /// Number of prior retries after which `retry_failed` consults its confirm callback
    pub fn with_confirm_after(mut self, attempts: u32) -> Self {
        self.confirm_after = attempts;
        self
    }

    /// Share the in-flight flag with something that renders progress
    pub fn with_busy_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.busy = flag;
        self
    }

    pub fn last_outcome(&self) -> Option<&BulkOutcome> {
        self.last.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Send the selected ids in one request. A successful response clears the selection.
    pub async fn apply(
        &mut self,
        selection: &mut Selection,
        status: WorkflowStatus,
        comment: &str,
    ) -> Result<&BulkOutcome, BulkError> {
        if selection.is_empty() {
            return Err(BulkError::NothingSelected);
        }

        let ids = selection.ids();
        let attempts = self.last.as_ref().map_or(0, |o| o.attempts);
        info!(count = ids.len(), status = %status, "Applying bulk action");

        let outcome = self.dispatch(&ids, status, comment, attempts).await?;
        selection.clear();
        Ok(outcome)
    }

    /// Re-send exactly the ids that failed last time with the same status and comment.
    ///
    /// Once the attempt counter reaches the confirmation threshold `confirm` is asked
    /// first; declining returns `Ok(None)` without a request.
    pub async fn retry_failed<F>(&mut self, confirm: F) -> Result<Option<&BulkOutcome>, BulkError>
    where
        F: FnOnce(u32) -> bool,
    {
        let previous = match &self.last {
            Some(outcome) if outcome.has_failures() => outcome,
            _ => return Err(BulkError::NothingToRetry),
        };

        if previous.needs_confirmation_after(self.confirm_after) && !confirm(previous.attempts) {
            info!(attempts = previous.attempts, "Retry declined");
            return Ok(None);
        }

        let ids = previous.failed_ids();
        let status = previous.status;
        let comment = previous.comment.clone();
        let attempts = previous.attempts + 1;
        info!(count = ids.len(), attempt = attempts, "Retrying failed bulk items");

        self.dispatch(&ids, status, &comment, attempts).await.map(Some)
    }

    async fn dispatch(
        &mut self,
        ids: &[WorkflowId],
        status: WorkflowStatus,
        comment: &str,
        attempts: u32,
    ) -> Result<&BulkOutcome, BulkError> {
        let result = {
            let _busy = BusyGuard::engage(&self.busy);
            self.backend.bulk_update(ids, status, comment).await
        };

        match result {
            Ok(response) => {
                let outcome: &BulkOutcome = self
                    .last
                    .insert(BulkOutcome::new(response, status, comment, attempts));
                Ok(outcome)
            }
            Err(err) => {
                // An HTTP failure still reports which ids went through
                if let ApiError::BulkRejected { partial, .. } = &err {
                    self.last = Some(BulkOutcome::new(partial.clone(), status, comment, attempts));
                }
                warn!("Bulk request failed: {}", err);
                Err(err.into())
            }
        }
    }
}
