// Client side of the document-tracking REST backend

pub mod client;
pub mod errors;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub use client::MockWorkflowBackend;
pub use client::{HttpWorkflowBackend, WorkflowBackend};
pub use errors::ApiError;
