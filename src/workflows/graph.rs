// Status graph shared by the advisory gate and the authoritative validator.
// The edge list is data; everything that needs to know which moves exist reads it from here.

use crate::workflows::status::{ParseError, WorkflowStatus};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Forward moves available from each status, independent of who asks
const STANDARD_EDGES: &[(WorkflowStatus, &[WorkflowStatus])] = &[
    (
        WorkflowStatus::Submitted,
        &[
            WorkflowStatus::Acknowledged,
            WorkflowStatus::Pending,
            WorkflowStatus::Escalated,
        ],
    ),
    (
        WorkflowStatus::Acknowledged,
        &[WorkflowStatus::Pending, WorkflowStatus::Escalated],
    ),
    (
        WorkflowStatus::Pending,
        &[
            WorkflowStatus::Approved,
            WorkflowStatus::Rejected,
            WorkflowStatus::Escalated,
        ],
    ),
    (
        WorkflowStatus::Approved,
        &[WorkflowStatus::Archived, WorkflowStatus::Escalated],
    ),
    (
        WorkflowStatus::Rejected,
        &[WorkflowStatus::Submitted, WorkflowStatus::Escalated],
    ),
    (
        WorkflowStatus::Escalated,
        &[
            WorkflowStatus::Pending,
            WorkflowStatus::Approved,
            WorkflowStatus::Archived,
        ],
    ),
    (WorkflowStatus::Archived, &[]),
];

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Failed to read transition table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed transition table: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Transition table names an invalid status: {0}")]
    Status(#[from] ParseError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusGraph {
    edges: BTreeMap<WorkflowStatus, Vec<WorkflowStatus>>,
}

#[derive(Debug, Deserialize)]
struct GraphDocument {
    transitions: BTreeMap<String, Vec<String>>,
}

impl Default for StatusGraph {
    fn default() -> Self {
        Self::standard()
    }
}

impl StatusGraph {
    /// The document-approval graph used by the backend
    pub fn standard() -> Self {
        let edges = STANDARD_EDGES
            .iter()
            .map(|(from, to)| (*from, to.to_vec()))
            .collect();
        Self { edges }
    }

    /// Parse a `[transitions]` TOML table, e.g. `pending = ["approved", "rejected"]`.
    /// Statuses without an entry have no outgoing moves.
    pub fn from_toml_str(source: &str) -> Result<Self, GraphError> {
        let document: GraphDocument = toml::from_str(source)?;
        let mut edges = BTreeMap::new();
        for (from, targets) in document.transitions {
            let from: WorkflowStatus = from.parse()?;
            let targets = targets
                .iter()
                .map(|t| t.parse::<WorkflowStatus>())
                .collect::<Result<Vec<_>, _>>()?;
            edges.insert(from, targets);
        }
        Ok(Self { edges })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let graph = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.as_ref().display(), "Loaded workflow transition table");
        Ok(graph)
    }

    /// Moves available from `status`; empty for terminal statuses
    pub fn allowed_from(&self, status: WorkflowStatus) -> &[WorkflowStatus] {
        self.edges.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn allows(&self, from: WorkflowStatus, to: WorkflowStatus) -> bool {
        self.allowed_from(from).contains(&to)
    }

    pub fn is_terminal(&self, status: WorkflowStatus) -> bool {
        self.allowed_from(status).is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = (WorkflowStatus, &[WorkflowStatus])> + '_ {
        WorkflowStatus::ALL
            .into_iter()
            .map(move |status| (status, self.allowed_from(status)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WorkflowStatus::*;

    #[test]
    fn test_standard_table() {
        let graph = StatusGraph::standard();
        assert_eq!(graph.allowed_from(Submitted), &[Acknowledged, Pending, Escalated]);
        assert_eq!(graph.allowed_from(Acknowledged), &[Pending, Escalated]);
        assert_eq!(graph.allowed_from(Pending), &[Approved, Rejected, Escalated]);
        assert_eq!(graph.allowed_from(Approved), &[Archived, Escalated]);
        assert_eq!(graph.allowed_from(Rejected), &[Submitted, Escalated]);
        assert_eq!(graph.allowed_from(Escalated), &[Pending, Approved, Archived]);
        assert!(graph.allowed_from(Archived).is_empty());
    }

    #[test]
    fn test_archived_is_the_only_terminal_status() {
        let graph = StatusGraph::standard();
        let terminal: Vec<_> = WorkflowStatus::ALL
            .into_iter()
            .filter(|s| graph.is_terminal(*s))
            .collect();
        assert_eq!(terminal, vec![Archived]);
    }

    #[test]
    fn test_no_self_loops() {
        let graph = StatusGraph::standard();
        for status in WorkflowStatus::ALL {
            assert!(!graph.allows(status, status), "{status} loops onto itself");
        }
    }

    #[test]
    fn test_from_toml_matches_standard() {
        let source = r#"
            [transitions]
            submitted = ["acknowledged", "pending", "escalated"]
            acknowledged = ["pending", "escalated"]
            pending = ["approved", "rejected", "escalated"]
            approved = ["archived", "escalated"]
            rejected = ["submitted", "escalated"]
            escalated = ["pending", "approved", "archived"]
        "#;
        let graph = StatusGraph::from_toml_str(source).unwrap();
        assert_eq!(graph, {
            let mut standard = StatusGraph::standard();
            // archived is implicit in the document
            standard.edges.remove(&Archived);
            standard
        });
        assert!(graph.is_terminal(Archived));
    }

    #[test]
    fn test_from_toml_rejects_unknown_status() {
        let source = r#"
            [transitions]
            pending = ["approved", "in_review"]
        "#;
        let err = StatusGraph::from_toml_str(source).unwrap_err();
        assert!(matches!(
            err,
            GraphError::Status(ParseError::UnknownStatus(ref s)) if s == "in_review"
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            b"[transitions]\npending = [\"approved\"]\n",
        )
        .unwrap();
        let graph = StatusGraph::load(file.path()).unwrap();
        assert!(graph.allows(Pending, Approved));
        assert!(!graph.allows(Pending, Rejected));
    }
}
