// Per-row action availability for the inbox view

use crate::api::types::WorkflowItem;
use crate::workflows::gate::{Decision, Gate, TransitionRequest};
use crate::workflows::status::{Actor, WorkflowStatus};
use std::fmt;

/// How a row's action control should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionAvailability {
    Enabled,
    /// Enabled, but activating it must collect a comment first
    NeedsComment,
    Disabled,
}

impl From<Decision> for ActionAvailability {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Allowed => ActionAvailability::Enabled,
            d if d.needs_comment() => ActionAvailability::NeedsComment,
            Decision::Denied(_) => ActionAvailability::Disabled,
        }
    }
}

impl ActionAvailability {
    pub fn is_usable(&self) -> bool {
        !matches!(self, ActionAvailability::Disabled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAction {
    pub target: WorkflowStatus,
    pub decision: Decision,
}

impl RowAction {
    pub fn availability(&self) -> ActionAvailability {
        self.decision.into()
    }

    pub fn label(&self) -> &'static str {
        match self.target {
            WorkflowStatus::Acknowledged => "Acknowledge",
            WorkflowStatus::Approved => "Approve",
            WorkflowStatus::Rejected => "Reject",
            WorkflowStatus::Escalated => "Escalate",
            WorkflowStatus::Submitted => "Resubmit",
            WorkflowStatus::Pending => "Mark pending",
            WorkflowStatus::Archived => "Archive",
        }
    }
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.availability() {
            ActionAvailability::Enabled => write!(f, "[{}]", self.label()),
            ActionAvailability::NeedsComment => write!(f, "[{}*]", self.label()),
            ActionAvailability::Disabled => write!(f, "({})", self.label().to_lowercase()),
        }
    }
}

/// Decisions for the candidate actions of one inbox row, evaluated without a comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowActions {
    pub acknowledge: RowAction,
    pub approve: RowAction,
    pub reject: RowAction,
    pub escalate: RowAction,
}

impl RowActions {
    pub fn for_item(gate: &Gate<'_>, actor: Actor, item: &WorkflowItem) -> Self {
        let action_for = |target| RowAction {
            target,
            decision: gate.evaluate(&TransitionRequest {
                actor,
                receiver_id: item.receiver_id,
                current: item.status(),
                requested: target,
                comment: None,
            }),
        };

        Self {
            acknowledge: action_for(WorkflowStatus::Acknowledged),
            approve: action_for(WorkflowStatus::Approved),
            reject: action_for(WorkflowStatus::Rejected),
            escalate: action_for(WorkflowStatus::Escalated),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowAction> {
        [&self.acknowledge, &self.approve, &self.reject, &self.escalate].into_iter()
    }

    pub fn any_usable(&self) -> bool {
        self.iter().any(|a| a.availability().is_usable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::gate::DenialReason;
    use crate::workflows::status::Role;
    use serde_json::json;

    fn row(status: &str, receiver: i64) -> WorkflowItem {
        serde_json::from_value(json!({"id": 1, "status": status, "receiver_id": receiver})).unwrap()
    }

    #[test]
    fn test_hod_on_pending_row() {
        let actions =
            RowActions::for_item(&Gate::standard(), Actor::new(5, Role::Hod), &row("pending", 5));
        assert_eq!(actions.approve.availability(), ActionAvailability::Enabled);
        assert_eq!(actions.reject.availability(), ActionAvailability::NeedsComment);
        assert_eq!(actions.escalate.availability(), ActionAvailability::NeedsComment);
        assert_eq!(
            actions.acknowledge.decision,
            Decision::Denied(DenialReason::NotAllowedTransition)
        );
        assert!(actions.any_usable());
    }

    #[test]
    fn test_stranger_sees_everything_disabled() {
        let actions =
            RowActions::for_item(&Gate::standard(), Actor::new(7, Role::Staff), &row("pending", 5));
        assert!(!actions.any_usable());
        assert_eq!(actions.approve.to_string(), "(approve)");
    }

    #[test]
    fn test_receiver_can_acknowledge_submitted() {
        let actions = RowActions::for_item(
            &Gate::standard(),
            Actor::new(5, Role::Staff),
            &row("submitted", 5),
        );
        assert_eq!(actions.acknowledge.availability(), ActionAvailability::Enabled);
        assert_eq!(actions.acknowledge.to_string(), "[Acknowledge]");
        assert_eq!(actions.approve.availability(), ActionAvailability::Disabled);
        assert_eq!(actions.escalate.to_string(), "[Escalate*]");
    }
}
