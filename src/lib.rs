// PIMS Workflow Library - document workflow gate, backend client and bulk actions
// This exposes the core components for testing and integration

pub mod api;
pub mod bulk;
pub mod cli;
pub mod config;
pub mod observability;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use api::{ApiError, HttpWorkflowBackend, WorkflowBackend};
pub use api::types::{BulkItemError, BulkUpdateResponse, Profile, WorkflowId, WorkflowItem};
pub use bulk::{BulkActions, BulkError, BulkOutcome, Selection};
pub use config::{config, init_config, PimsConfig};
pub use observability::{api_metrics, ApiMetrics, OperationTimer};
pub use telemetry::{
    create_workflow_span, generate_correlation_id, init_telemetry, shutdown_telemetry,
};
pub use workflows::{
    can_perform, Actor, Decision, DenialReason, Gate, Role, RowActions, StatusGraph, UserId,
    WorkflowStatus,
};
