use crate::api::types::WorkflowId;
use std::collections::BTreeSet;

/// Workflow ids picked for the next bulk action.
///
/// Owned by whoever renders the inbox and handed to
/// [`BulkActions::apply`](super::BulkActions::apply)
/// explicitly; nothing else holds a copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<WorkflowId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership of `id`; returns whether it is selected afterwards
    pub fn toggle(&mut self, id: WorkflowId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn insert(&mut self, id: WorkflowId) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: WorkflowId) -> bool {
        self.ids.remove(&id)
    }

    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = WorkflowId>,
    {
        self.ids.extend(ids);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: WorkflowId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Selected ids in ascending order
    pub fn ids(&self) -> Vec<WorkflowId> {
        self.ids.iter().copied().collect()
    }
}

impl FromIterator<WorkflowId> for Selection {
    fn from_iter<I: IntoIterator<Item = WorkflowId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
