use crate::api::types::{BulkItemError, BulkUpdateResponse, WorkflowId};
use crate::workflows::WorkflowStatus;

/// Prior retries after which another retry asks the user first
pub const DEFAULT_CONFIRM_AFTER_ATTEMPTS: u32 = 2;

/// Result of the most recent bulk request plus what is needed to retry it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub updated: Vec<WorkflowId>,
    pub errors: Vec<BulkItemError>,
    pub status: WorkflowStatus,
    pub comment: String,
    /// Explicit retries so far; a fresh apply does not reset it
    pub attempts: u32,
}

impl BulkOutcome {
    pub fn new(
        response: BulkUpdateResponse,
        status: WorkflowStatus,
        comment: impl Into<String>,
        attempts: u32,
    ) -> Self {
        Self {
            updated: response.updated,
            errors: response.errors,
            status,
            comment: comment.into(),
            attempts,
        }
    }

    pub fn failed_ids(&self) -> Vec<WorkflowId> {
        self.errors.iter().map(|e| e.id).collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn needs_confirmation(&self) -> bool {
        self.needs_confirmation_after(DEFAULT_CONFIRM_AFTER_ATTEMPTS)
    }

    pub fn needs_confirmation_after(&self, threshold: u32) -> bool {
        self.attempts >= threshold
    }

    pub fn retry_label(&self) -> String {
        match self.attempts {
            0 => "Retry failed".to_string(),
            n => format!("Retry failed (attempt {})", n),
        }
    }

    pub fn confirmation_prompt(&self) -> String {
        format!(
            "You have retried {} time(s). Retrying again may still fail. Continue?",
            self.attempts
        )
    }
}
