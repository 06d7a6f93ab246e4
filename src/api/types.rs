// Wire records exchanged with the document-tracking backend

use crate::workflows::status::{Role, UserId, WorkflowStatus};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(pub i64);

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A workflow row as listed in a user's inbox. Snapshot only; never mutated locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWorkflowItem")]
pub struct WorkflowItem {
    pub id: WorkflowId,
    /// Status string as reported by the backend
    pub status: String,
    pub receiver_id: Option<UserId>,
    pub file_id: Option<i64>,
    pub file_name: Option<String>,
    pub sender_name: Option<String>,
    pub submitted_at: Option<String>,
}

impl WorkflowItem {
    /// Parsed status; `None` when the backend sent something outside the known set
    pub fn status(&self) -> Option<WorkflowStatus> {
        self.status.parse().ok()
    }

    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("file")
    }

    pub fn display_sender(&self) -> &str {
        self.sender_name.as_deref().unwrap_or("-")
    }

    /// Submission time rendered for humans, or the raw value when it is not a known date format
    pub fn display_submitted_at(&self) -> String {
        let Some(raw) = self.submitted_at.as_deref() else {
            return "-".to_string();
        };
        chrono::DateTime::parse_from_rfc3339(raw)
            .or_else(|_| chrono::DateTime::parse_from_rfc2822(raw))
            .map(|dt| dt.with_timezone(&chrono::Utc).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|_| raw.to_string())
    }
}

// The inbox endpoints have used several spellings for the same fields; accept them all.
#[derive(Debug, Deserialize)]
struct RawWorkflowItem {
    workflow_id: Option<i64>,
    #[serde(rename = "workflowId")]
    workflow_id_camel: Option<i64>,
    id: Option<i64>,
    file_id: Option<i64>,
    #[serde(rename = "fileId")]
    file_id_camel: Option<i64>,
    status: Option<String>,
    receiver_id: Option<i64>,
    #[serde(rename = "receiverId")]
    receiver_id_camel: Option<i64>,
    receiver: Option<i64>,
    file_name: Option<String>,
    name: Option<String>,
    title: Option<String>,
    sender_name: Option<String>,
    from: Option<String>,
    from_user: Option<String>,
    dept: Option<String>,
    submitted_at: Option<String>,
    created_at: Option<String>,
    received_at: Option<String>,
}

impl TryFrom<RawWorkflowItem> for WorkflowItem {
    type Error = String;

    fn try_from(raw: RawWorkflowItem) -> Result<Self, Self::Error> {
        let id = raw
            .workflow_id
            .or(raw.workflow_id_camel)
            .or(raw.id)
            .or(raw.file_id)
            .ok_or_else(|| "workflow record carries no identifier".to_string())?;

        // When a separate workflow id is present, `id` names the file
        let file_id = raw
            .file_id
            .or(raw.file_id_camel)
            .or(if raw.workflow_id.is_some() || raw.workflow_id_camel.is_some() {
                raw.id
            } else {
                None
            });

        Ok(Self {
            id: WorkflowId(id),
            status: raw.status.unwrap_or_else(|| WorkflowStatus::Submitted.to_string()),
            receiver_id: raw
                .receiver_id
                .or(raw.receiver_id_camel)
                .or(raw.receiver)
                .map(UserId),
            file_id,
            file_name: raw.file_name.or(raw.name).or(raw.title),
            sender_name: raw.sender_name.or(raw.from).or(raw.from_user).or(raw.dept),
            submitted_at: raw.submitted_at.or(raw.created_at).or(raw.received_at),
        })
    }
}

/// Inbox listing; the backend answers with either a bare array or `{ "items": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InboxResponse {
    List(Vec<WorkflowItem>),
    Wrapped { items: Vec<WorkflowItem> },
}

impl InboxResponse {
    pub fn into_items(self) -> Vec<WorkflowItem> {
        match self {
            InboxResponse::List(items) | InboxResponse::Wrapped { items } => items,
        }
    }
}

/// Current user as returned by the profile endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: Option<String>,
    pub email: Option<String>,
    pub department_id: Option<i64>,
    pub role: String,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("Me")
    }

    pub fn role(&self) -> Result<Role, crate::workflows::ParseError> {
        self.role.parse()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboxStats {
    pub inbox_count: Option<i64>,
    pub pending_count: Option<i64>,
    pub processed_today: Option<i64>,
    pub overdue_count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: WorkflowStatus,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkUpdateRequest {
    pub workflow_ids: Vec<WorkflowId>,
    pub status: WorkflowStatus,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemError {
    pub id: WorkflowId,
    pub error: String,
}

/// Per-id partition of a bulk update. Partial failure is a normal outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUpdateResponse {
    #[serde(default)]
    pub updated: Vec<WorkflowId>,
    #[serde(default)]
    pub errors: Vec<BulkItemError>,
}

impl BulkUpdateResponse {
    pub fn failed_ids(&self) -> Vec<WorkflowId> {
        self.errors.iter().map(|e| e.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inbox_row_prefers_workflow_id_over_file_id() {
        let item: WorkflowItem = serde_json::from_value(json!({
            "workflow_id": 42,
            "id": 7,
            "title": "budget.pdf",
            "from_user": "alice",
            "received_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(item.id, WorkflowId(42));
        assert_eq!(item.file_id, Some(7));
        assert_eq!(item.display_name(), "budget.pdf");
        assert_eq!(item.display_sender(), "alice");
        assert_eq!(item.display_submitted_at(), "2024-05-01 10:00");
        // Missing status means the item was just routed
        assert_eq!(item.status(), Some(WorkflowStatus::Submitted));
        assert_eq!(item.receiver_id, None);
    }

    #[test]
    fn test_alternate_spellings() {
        let item: WorkflowItem = serde_json::from_value(json!({
            "workflowId": 3,
            "receiverId": 9,
            "status": "pending",
            "file_name": "memo.docx",
            "sender_name": "bob"
        }))
        .unwrap();
        assert_eq!(item.id, WorkflowId(3));
        assert_eq!(item.receiver_id, Some(UserId(9)));
        assert_eq!(item.status(), Some(WorkflowStatus::Pending));
    }

    #[test]
    fn test_unrecognised_status_is_kept_but_unparsed() {
        let item: WorkflowItem =
            serde_json::from_value(json!({"id": 1, "status": "in_progress"})).unwrap();
        assert_eq!(item.status, "in_progress");
        assert_eq!(item.status(), None);
    }

    #[test]
    fn test_row_without_identifier_is_rejected() {
        let result: Result<WorkflowItem, _> = serde_json::from_value(json!({"status": "pending"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_inbox_response_shapes() {
        let bare: InboxResponse = serde_json::from_value(json!([{"id": 1}])).unwrap();
        assert_eq!(bare.into_items().len(), 1);
        let wrapped: InboxResponse =
            serde_json::from_value(json!({"items": [{"id": 1}, {"id": 2}]})).unwrap();
        assert_eq!(wrapped.into_items().len(), 2);
    }

    #[test]
    fn test_bulk_request_wire_shape() {
        let request = BulkUpdateRequest {
            workflow_ids: vec![WorkflowId(1), WorkflowId(2)],
            status: WorkflowStatus::Approved,
            comment: String::new(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"workflow_ids": [1, 2], "status": "approved", "comment": ""})
        );
    }

    #[test]
    fn test_bulk_response_tolerates_missing_lists() {
        let response: BulkUpdateResponse =
            serde_json::from_value(json!({"errors": [{"id": 4, "error": "not found"}]})).unwrap();
        assert!(response.updated.is_empty());
        assert_eq!(response.failed_ids(), vec![WorkflowId(4)]);
    }
}
