//! Workflow backend client tests
//!
//! These tests use wiremock to stand in for the document-tracking backend so the
//! HTTP client and the bulk retry flow run against real requests without a server.

use pims_workflow::api::types::{WorkflowId, WorkflowItem};
use pims_workflow::bulk::{BulkActions, BulkError, Selection};
use pims_workflow::config::RateLimitConfig;
use pims_workflow::workflows::WorkflowStatus;
use pims_workflow::{ApiError, HttpWorkflowBackend, WorkflowBackend};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

/// Backend mock server plus a client pointed at it
struct BackendMock {
    server: MockServer,
}

impl BackendMock {
    async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    fn client(&self) -> HttpWorkflowBackend {
        HttpWorkflowBackend::new(
            &self.server.uri(),
            Some(TOKEN.to_string()),
            Duration::from_secs(5),
            &RateLimitConfig {
                requests_per_second: 100,
                burst_capacity: 100,
            },
        )
        .unwrap()
    }

    async fn mock_bulk(&self, ids: &[i64], status: u16, response: serde_json::Value) {
        Mock::given(method("PUT"))
            .and(path("/api/workflows/bulk"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_json(json!({
                "workflow_ids": ids,
                "status": "approved",
                "comment": ""
            })))
            .respond_with(ResponseTemplate::new(status).set_body_json(response))
            .expect(1)
            .mount(&self.server)
            .await;
    }
}

#[tokio::test]
async fn test_profile_is_fetched_with_bearer_token() {
    let mock = BackendMock::new().await;
    Mock::given(method("GET"))
        .and(path("/api/me"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "username": "hod.finance",
            "email": "hod@example.org",
            "department_id": 2,
            "role": "HOD"
        })))
        .expect(1)
        .mount(&mock.server)
        .await;

    let profile = mock.client().profile().await.unwrap();
    assert_eq!(profile.id, 5);
    assert_eq!(profile.display_name(), "hod.finance");
    assert_eq!(profile.role().unwrap().as_str(), "HOD");
}

#[tokio::test]
async fn test_inbox_accepts_both_response_shapes() {
    let mock = BackendMock::new().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/inbox"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"workflow_id": 11, "id": 3, "title": "budget.pdf", "from_user": "alice",
                 "received_at": "2024-05-01T10:00:00Z", "status": "pending", "receiver_id": 5},
                {"workflow_id": 12, "id": 4, "title": "memo.docx"}
            ]
        })))
        .mount(&mock.server)
        .await;

    let items: Vec<WorkflowItem> = mock.client().inbox().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, WorkflowId(11));
    assert_eq!(items[0].status(), Some(WorkflowStatus::Pending));
    assert_eq!(items[1].status(), Some(WorkflowStatus::Submitted));
}

#[tokio::test]
async fn test_update_status_sends_status_and_comment() {
    let mock = BackendMock::new().await;
    Mock::given(method("PUT"))
        .and(path("/api/workflows/42"))
        .and(body_json(json!({"status": "rejected", "comment": "unsigned"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&mock.server)
        .await;

    mock.client()
        .update_status(WorkflowId(42), WorkflowStatus::Rejected, "unsigned")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_rejected_update_surfaces_backend_message() {
    let mock = BackendMock::new().await;
    Mock::given(method("PUT"))
        .and(path("/api/workflows/42"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({"error": "Invalid transition: archived -> pending"})),
        )
        .mount(&mock.server)
        .await;

    let err = mock
        .client()
        .update_status(WorkflowId(42), WorkflowStatus::Pending, "")
        .await
        .unwrap_err();
    match err {
        ApiError::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "Invalid transition: archived -> pending");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_is_kept_verbatim() {
    let mock = BackendMock::new().await;
    Mock::given(method("GET"))
        .and(path("/api/staff/stats"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock.server)
        .await;

    let err = mock.client().stats().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(err.is_transient());
    assert!(err.to_string().contains("Bad Gateway"));
}

#[tokio::test]
async fn test_bulk_failure_status_keeps_partial_partition() {
    let mock = BackendMock::new().await;
    mock.mock_bulk(
        &[1, 2],
        500,
        json!({"updated": [1], "errors": [{"id": 2, "error": "database locked"}]}),
    )
    .await;

    let err = mock
        .client()
        .bulk_update(&[WorkflowId(1), WorkflowId(2)], WorkflowStatus::Approved, "")
        .await
        .unwrap_err();
    match err {
        ApiError::BulkRejected { status, partial, .. } => {
            assert_eq!(status, 500);
            assert_eq!(partial.updated, vec![WorkflowId(1)]);
            assert_eq!(partial.failed_ids(), vec![WorkflowId(2)]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_bulk_retry_targets_exactly_the_failed_ids() {
    let mock = BackendMock::new().await;
    mock.mock_bulk(
        &[1, 2, 3],
        200,
        json!({
            "updated": [1],
            "errors": [
                {"id": 2, "error": "Only HOD or assigned receiver can approve/reject"},
                {"id": 3, "error": "not found"}
            ]
        }),
    )
    .await;
    mock.mock_bulk(
        &[2, 3],
        200,
        json!({"updated": [2], "errors": [{"id": 3, "error": "not found"}]}),
    )
    .await;
    mock.mock_bulk(&[3], 200, json!({"updated": [3], "errors": []})).await;

    let mut actions = BulkActions::new(mock.client());
    let mut selection: Selection = [1, 2, 3].into_iter().map(WorkflowId).collect();

    let first = actions
        .apply(&mut selection, WorkflowStatus::Approved, "")
        .await
        .unwrap();
    assert_eq!(first.failed_ids(), vec![WorkflowId(2), WorkflowId(3)]);
    assert!(selection.is_empty());

    let second = actions.retry_failed(|_| true).await.unwrap().unwrap();
    assert_eq!(second.attempts, 1);
    assert_eq!(second.failed_ids(), vec![WorkflowId(3)]);

    let third = actions.retry_failed(|_| true).await.unwrap().unwrap();
    assert_eq!(third.attempts, 2);
    assert!(!third.has_failures());

    assert!(matches!(
        actions.retry_failed(|_| true).await,
        Err(BulkError::NothingToRetry)
    ));
}
