// Workflow action gate
//
// Advisory decision on whether an actor may move a workflow from one status to another.
// Pure: no I/O, no state. The backend repeats the same decision authoritatively.

use crate::workflows::graph::StatusGraph;
use crate::workflows::status::{Actor, Role, UserId, WorkflowStatus};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

static STANDARD_GRAPH: LazyLock<StatusGraph> = LazyLock::new(StatusGraph::standard);

/// Why an action was refused
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    #[error("status graph does not allow this transition")]
    NotAllowedTransition,
    #[error("actor has no authority over this workflow")]
    Forbidden,
    #[error("a comment is required for this action")]
    CommentRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Allowed,
    Denied(DenialReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn denial(&self) -> Option<DenialReason> {
        match self {
            Decision::Allowed => None,
            Decision::Denied(reason) => Some(*reason),
        }
    }

    /// Denied only for want of a comment; supplying one may flip the decision
    pub fn needs_comment(&self) -> bool {
        self.denial() == Some(DenialReason::CommentRequired)
    }
}

/// One requested status change, as seen by the gate
#[derive(Debug, Clone, Copy)]
pub struct TransitionRequest<'a> {
    pub actor: Actor,
    pub receiver_id: Option<UserId>,
    /// `None` when the backend reported a status outside the known set
    pub current: Option<WorkflowStatus>,
    pub requested: WorkflowStatus,
    pub comment: Option<&'a str>,
}

impl TransitionRequest<'_> {
    fn has_comment(&self) -> bool {
        self.comment.is_some_and(|c| !c.is_empty())
    }

    fn is_receiver(&self) -> bool {
        self.actor.is_receiver(self.receiver_id)
    }

    fn is_hod(&self) -> bool {
        self.actor.role == Role::Hod
    }

    /// Backend wording for a denial of this request
    pub fn denial_message(&self, reason: DenialReason) -> String {
        match reason {
            DenialReason::NotAllowedTransition => format!(
                "Invalid transition: {} -> {}",
                self.current.map(|s| s.as_str()).unwrap_or("unknown"),
                self.requested
            ),
            DenialReason::CommentRequired => match (self.actor.role, self.requested) {
                (Role::Admin, _) => "Comment required for this transition".to_string(),
                (_, WorkflowStatus::Rejected) => "Comment required for rejection".to_string(),
                (_, WorkflowStatus::Escalated) => "Comment required for escalation".to_string(),
                _ => "Comment required for this transition".to_string(),
            },
            DenialReason::Forbidden => match self.requested {
                WorkflowStatus::Acknowledged => {
                    "Only assigned receiver can acknowledge".to_string()
                }
                WorkflowStatus::Approved | WorkflowStatus::Rejected => {
                    "Only HOD or assigned receiver can approve/reject".to_string()
                }
                WorkflowStatus::Escalated => {
                    "Only HOD, Admin, or receiver can escalate".to_string()
                }
                _ => "Actor is not permitted to perform this transition".to_string(),
            },
        }
    }
}

/// Gate bound to a particular status graph
#[derive(Debug, Clone, Copy)]
pub struct Gate<'g> {
    graph: &'g StatusGraph,
}

impl Default for Gate<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl Gate<'static> {
    pub fn standard() -> Self {
        Self {
            graph: &STANDARD_GRAPH,
        }
    }
}

impl<'g> Gate<'g> {
    pub fn new(graph: &'g StatusGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &'g StatusGraph {
        self.graph
    }

    pub fn evaluate(&self, request: &TransitionRequest<'_>) -> Decision {
        let decision = self.decide(request);
        tracing::trace!(
            actor.id = %request.actor.id,
            actor.role = %request.actor.role,
            current = ?request.current,
            requested = %request.requested,
            decision = ?decision,
            "Gate evaluated"
        );
        decision
    }

    fn decide(&self, request: &TransitionRequest<'_>) -> Decision {
        use WorkflowStatus::*;

        let requested = request.requested;

        if request.current == Some(requested) {
            return Decision::Allowed;
        }

        // Admin skips the status graph but still has to justify rejections and escalations
        if request.actor.role == Role::Admin {
            if requested.demands_comment() && !request.has_comment() {
                return Decision::Denied(DenialReason::CommentRequired);
            }
            return Decision::Allowed;
        }

        let reachable = request
            .current
            .is_some_and(|current| self.graph.allows(current, requested));
        if !reachable {
            return Decision::Denied(DenialReason::NotAllowedTransition);
        }

        match requested {
            Acknowledged => {
                if !request.is_receiver() {
                    return Decision::Denied(DenialReason::Forbidden);
                }
                Decision::Allowed
            }
            Approved | Rejected => {
                if !request.is_hod() && !request.is_receiver() {
                    return Decision::Denied(DenialReason::Forbidden);
                }
                if requested == Rejected && !request.has_comment() {
                    return Decision::Denied(DenialReason::CommentRequired);
                }
                Decision::Allowed
            }
            Escalated => {
                let privileged = matches!(request.actor.role, Role::Hod | Role::Admin);
                if !privileged && !request.is_receiver() {
                    return Decision::Denied(DenialReason::Forbidden);
                }
                if !request.has_comment() {
                    return Decision::Denied(DenialReason::CommentRequired);
                }
                Decision::Allowed
            }
            Submitted | Pending | Archived => {
                if request.is_receiver() || request.is_hod() {
                    Decision::Allowed
                } else {
                    Decision::Denied(DenialReason::Forbidden)
                }
            }
        }
    }
}

/// Evaluate a status change against the standard graph
pub fn can_perform(
    actor_role: Role,
    actor_id: UserId,
    receiver_id: Option<UserId>,
    current_status: Option<WorkflowStatus>,
    requested_status: WorkflowStatus,
    comment: Option<&str>,
) -> Decision {
    Gate::standard().evaluate(&TransitionRequest {
        actor: Actor {
            id: actor_id,
            role: actor_role,
        },
        receiver_id,
        current: current_status,
        requested: requested_status,
        comment,
    })
}
