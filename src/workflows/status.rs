// Closed vocabularies for workflow statuses and actor roles

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown workflow status: '{0}'")]
    UnknownStatus(String),
    #[error("Unknown role: '{0}'")]
    UnknownRole(String),
}

/// Routing status of a single document workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowStatus {
    Submitted,
    Acknowledged,
    Pending,
    Approved,
    Rejected,
    Escalated,
    Archived,
}

impl WorkflowStatus {
    pub const ALL: [WorkflowStatus; 7] = [
        WorkflowStatus::Submitted,
        WorkflowStatus::Acknowledged,
        WorkflowStatus::Pending,
        WorkflowStatus::Approved,
        WorkflowStatus::Rejected,
        WorkflowStatus::Escalated,
        WorkflowStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Submitted => "submitted",
            WorkflowStatus::Acknowledged => "acknowledged",
            WorkflowStatus::Pending => "pending",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Rejected => "rejected",
            WorkflowStatus::Escalated => "escalated",
            WorkflowStatus::Archived => "archived",
        }
    }

    /// Statuses that must carry a justification whoever requests them
    pub fn demands_comment(&self) -> bool {
        matches!(self, WorkflowStatus::Rejected | WorkflowStatus::Escalated)
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseError::UnknownStatus(s.to_string()))
    }
}

/// Role taxonomy as delivered by the profile endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    #[serde(rename = "HOD")]
    Hod,
    Staff,
    Registry,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Hod, Role::Staff, Role::Registry];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Hod => "HOD",
            Role::Staff => "Staff",
            Role::Registry => "Registry",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ParseError::UnknownRole(s.to_string()))
    }
}

/// Backend user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The logged-in user attempting an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id: UserId(id), role }
    }

    /// True when the actor is the user designated on the item
    pub fn is_receiver(&self, receiver_id: Option<UserId>) -> bool {
        receiver_id == Some(self.id)
    }
}
