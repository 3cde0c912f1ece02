//! Structural checks applied before a workflow is sent to n8n

use super::WorkflowDefinition;
use crate::error::{Error, Result};
use std::collections::HashSet;

impl WorkflowDefinition {
    /// Check the invariants n8n enforces on submission, so bad documents fail fast.
    ///
    /// - the name is not blank
    /// - every node has a type and node names are unique
    /// - every connection source and target resolves to a declared node
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidTemplate(
                "workflow name must not be empty".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for node in &self.nodes {
            if node.node_type.trim().is_empty() {
                return Err(Error::InvalidTemplate(format!(
                    "node '{}' has no type",
                    node.reference()
                )));
            }
            if !node.name.is_empty() && !names.insert(node.name.as_str()) {
                return Err(Error::InvalidTemplate(format!(
                    "duplicate node name '{}'",
                    node.name
                )));
            }
        }

        for source in self.connections.keys() {
            if self.node(source).is_none() {
                return Err(Error::InvalidTemplate(format!(
                    "connection source '{}' is not a declared node",
                    source
                )));
            }
        }

        for (source, target) in self.edges() {
            if self.node(&target.node).is_none() {
                return Err(Error::InvalidTemplate(format!(
                    "connection from '{}' targets undeclared node '{}'",
                    source, target.node
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::workflow::{ConnectionTarget, Node, WorkflowDefinition};

    fn workflow_with(nodes: &[(&str, &str)]) -> WorkflowDefinition {
        let mut workflow = WorkflowDefinition::new("Checks");
        workflow.nodes = nodes
            .iter()
            .map(|(name, node_type)| Node::new(*name, *node_type))
            .collect();
        workflow
    }

    #[test]
    fn test_valid_workflow() {
        let mut workflow = workflow_with(&[("A", "t.a"), ("B", "t.b")]);
        workflow.add_connection("A", "main", 0, ConnectionTarget::main("B"))
            .unwrap();
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_reference_by_id_is_accepted() {
        let mut workflow = WorkflowDefinition::new("Ids");
        let mut start = Node::new("", "Start");
        start.id = "n1".to_string();
        let mut end = Node::new("", "End");
        end.id = "n2".to_string();
        workflow.nodes = vec![start, end];
        workflow.add_connection("n1", "main", 0, ConnectionTarget::main("n2"))
            .unwrap();
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let workflow = WorkflowDefinition::new("  ");
        assert!(matches!(workflow.validate(), Err(Error::InvalidTemplate(_))));
    }

    #[test]
    fn test_undeclared_target_rejected() {
        let mut workflow = workflow_with(&[("A", "t.a")]);
        workflow.add_connection("A", "main", 0, ConnectionTarget::main("Ghost"))
            .unwrap();
        let err = workflow.validate().unwrap_err();
        assert!(err.to_string().contains("undeclared node 'Ghost'"));
    }

    #[test]
    fn test_undeclared_source_rejected() {
        let mut workflow = workflow_with(&[("A", "t.a")]);
        workflow.add_connection("Ghost", "main", 0, ConnectionTarget::main("A"))
            .unwrap();
        let err = workflow.validate().unwrap_err();
        assert!(err.to_string().contains("source 'Ghost'"));
    }

    #[test]
    fn test_duplicate_node_names_rejected() {
        let workflow = workflow_with(&[("A", "t.a"), ("A", "t.b")]);
        let err = workflow.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate node name"));
    }

    #[test]
    fn test_node_without_type_rejected() {
        let workflow = workflow_with(&[("A", "")]);
        assert!(matches!(workflow.validate(), Err(Error::InvalidTemplate(_))));
    }
}
