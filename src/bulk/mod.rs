// Multi-select status changes: the caller-owned selection, the last outcome with
// its retry bookkeeping, and the executor that talks to the backend.

pub mod executor;
pub mod outcome;
pub mod selection;

pub use executor::{BulkActions, BulkError};
pub use outcome::{BulkOutcome, DEFAULT_CONFIRM_AFTER_ATTEMPTS};
pub use selection::Selection;
