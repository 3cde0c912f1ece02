//! Aggregate statistics over a workflow collection

use crate::workflow::WorkflowDefinition;
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts derived from a set of workflows. Recomputed on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowSummary {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Workflows n8n has archived; also counted as active or inactive
    pub archived: usize,
    /// Node type to number of nodes of that type across all workflows
    pub node_types: BTreeMap<String, usize>,
}

impl WorkflowSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one workflow into the counts
    pub fn record(&mut self, workflow: &WorkflowDefinition) {
        self.total += 1;
        if workflow.active {
            self.active += 1;
        } else {
            self.inactive += 1;
        }
        if workflow.is_archived() {
            self.archived += 1;
        }
        for (node_type, count) in workflow.node_type_counts() {
            *self.node_types.entry(node_type).or_insert(0) += count;
        }
    }

    /// Node types ordered by descending frequency, ties by name
    pub fn top_node_types(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut types: Vec<_> = self
            .node_types
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        types.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        types.truncate(limit);
        types
    }
}

impl<'a> Extend<&'a WorkflowDefinition> for WorkflowSummary {
    fn extend<I: IntoIterator<Item = &'a WorkflowDefinition>>(&mut self, iter: I) {
        for workflow in iter {
            self.record(workflow);
        }
    }
}

/// Summarize a collection of workflows
pub fn summarize(workflows: &[WorkflowDefinition]) -> WorkflowSummary {
    let mut summary = WorkflowSummary::new();
    summary.extend(workflows);
    summary
}
