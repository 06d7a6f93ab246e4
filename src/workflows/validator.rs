// Authoritative counterpart of the gate: the same decision, expressed the way the
// backend reports it (HTTP status + message) and applied per item for bulk updates.

use crate::api::types::{BulkItemError, BulkUpdateResponse, WorkflowId, WorkflowItem};
use crate::workflows::gate::{DenialReason, Gate, TransitionRequest};
use crate::workflows::status::{Actor, WorkflowStatus};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransitionRejection {
    pub reason: DenialReason,
    pub message: String,
}

impl TransitionRejection {
    pub fn http_status(&self) -> u16 {
        match self.reason {
            DenialReason::Forbidden => 403,
            DenialReason::CommentRequired => 400,
            DenialReason::NotAllowedTransition => 422,
        }
    }
}

pub fn validate_transition(
    gate: &Gate<'_>,
    request: &TransitionRequest<'_>,
) -> Result<(), TransitionRejection> {
    match gate.evaluate(request).denial() {
        None => Ok(()),
        Some(reason) => Err(TransitionRejection {
            reason,
            message: request.denial_message(reason),
        }),
    }
}

/// Apply one status change independently to every selected id.
/// Ids with no matching item are reported as `not found`.
pub fn partition_bulk(
    gate: &Gate<'_>,
    items: &[WorkflowItem],
    ids: &[WorkflowId],
    actor: Actor,
    status: WorkflowStatus,
    comment: Option<&str>,
) -> BulkUpdateResponse {
    let mut response = BulkUpdateResponse::default();

    for id in ids {
        let Some(item) = items.iter().find(|item| item.id == *id) else {
            response.errors.push(BulkItemError {
                id: *id,
                error: "not found".to_string(),
            });
            continue;
        };

        let request = TransitionRequest {
            actor,
            receiver_id: item.receiver_id,
            current: item.status(),
            requested: status,
            comment,
        };
        match validate_transition(gate, &request) {
            Ok(()) => response.updated.push(*id),
            Err(rejection) => response.errors.push(BulkItemError {
                id: *id,
                error: rejection.message,
            }),
        }
    }

    tracing::debug!(
        updated = response.updated.len(),
        failed = response.errors.len(),
        status = %status,
        "Partitioned bulk update"
    );
    response
}

/// Convenience for single-item checks against an inbox row
pub fn validate_item(
    gate: &Gate<'_>,
    item: &WorkflowItem,
    actor: Actor,
    status: WorkflowStatus,
    comment: Option<&str>,
) -> Result<(), TransitionRejection> {
    validate_transition(
        gate,
        &TransitionRequest {
            actor,
            receiver_id: item.receiver_id,
            current: item.status(),
            requested: status,
            comment,
        },
    )
}
