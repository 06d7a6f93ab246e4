// Workflow status rules: vocabulary, shared status graph, advisory gate and its
// authoritative counterpart

pub mod actions;
pub mod gate;
pub mod graph;
pub mod status;
pub mod validator;

pub use actions::{ActionAvailability, RowAction, RowActions};
pub use gate::{can_perform, Decision, DenialReason, Gate, TransitionRequest};
pub use graph::{GraphError, StatusGraph};
pub use status::{Actor, ParseError, Role, UserId, WorkflowStatus};
pub use validator::{partition_bulk, validate_item, validate_transition, TransitionRejection};
