//! In-place edits of fetched workflows (rename, parameter changes, new nodes, duplication)

use super::{Connections, Node, WorkflowDefinition};
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Server-managed top-level fields that must not be carried into a copy.
const SERVER_METADATA: &[&str] = &["createdAt", "updatedAt", "versionId", "isArchived", "meta"];

impl WorkflowDefinition {
    /// Set a node parameter addressed by a dotted path, e.g. `options.systemMessage`.
    ///
    /// Intermediate objects are created when missing. Returns the previous value.
    pub fn set_node_parameter(
        &mut self,
        node: &str,
        path: &str,
        value: Value,
    ) -> Result<Option<Value>> {
        let parts: Vec<&str> = path.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(Error::InvalidTemplate(format!(
                "invalid parameter path '{}'",
                path
            )));
        }

        let workflow_name = self.name.clone();
        let target = self.node_mut(node).ok_or_else(|| Error::NodeNotFound {
            workflow: workflow_name,
            node: node.to_string(),
        })?;

        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| Error::InvalidTemplate("empty parameter path".to_string()))?;

        let mut current: &mut Map<String, Value> = &mut target.parameters;
        for (depth, part) in parents.iter().enumerate() {
            let entry = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            current = entry.as_object_mut().ok_or_else(|| {
                Error::InvalidTemplate(format!(
                    "parameter path '{}' crosses non-object value at '{}'",
                    path,
                    parts[..=depth].join(".")
                ))
            })?;
        }

        Ok(current.insert(last.to_string(), value))
    }

    /// A copy suitable for creating a new workflow under `new_name`.
    ///
    /// The copy has no id, is inactive, drops server metadata and node webhook ids,
    /// and suffixes node ids with `_copy`. Connections reference nodes by name and
    /// are carried over unchanged unless they pointed at a node id.
    pub fn duplicate(&self, new_name: impl Into<String>) -> WorkflowDefinition {
        let mut copy = self.clone();
        copy.id = None;
        copy.name = new_name.into();
        copy.active = false;
        for field in SERVER_METADATA {
            copy.extra.remove(*field);
        }

        let mut renamed = Vec::new();
        for node in &mut copy.nodes {
            node.extra.remove("webhookId");
            if !node.id.is_empty() {
                let new_id = format!("{}_copy", node.id);
                renamed.push((std::mem::replace(&mut node.id, new_id.clone()), new_id));
            }
        }

        // Only rewrite references that do not already resolve by name.
        let names: Vec<String> = copy.nodes.iter().map(|n| n.name.clone()).collect();
        let rename = |reference: &str| -> Option<String> {
            if names.iter().any(|n| n == reference) {
                return None;
            }
            renamed
                .iter()
                .find(|(old, _)| old == reference)
                .map(|(_, new)| new.clone())
        };

        let connections = std::mem::take(&mut copy.connections);
        for (source, mut outputs) in connections {
            for slots in outputs.values_mut() {
                for target in slots.iter_mut().flatten() {
                    if let Some(new) = rename(&target.node) {
                        target.node = new;
                    }
                }
            }
            let source = rename(&source).unwrap_or(source);
            copy.connections.insert(source, outputs);
        }

        copy
    }

    /// Append `node` and merge `connections` into the workflow's connection map.
    ///
    /// Targets are appended to the slot with the same index under the same source
    /// and output kind. The result must pass [`WorkflowDefinition::validate`]; on
    /// any error the workflow is left exactly as it was.
    pub fn add_node(&mut self, node: Node, connections: Connections) -> Result<()> {
        let before = self.clone();
        let result = self.merge_node(node, connections);
        if result.is_err() {
            *self = before;
        }
        result
    }

    fn merge_node(&mut self, node: Node, connections: Connections) -> Result<()> {
        if node.reference().is_empty() {
            return Err(Error::InvalidTemplate(
                "new node needs a name or an id".to_string(),
            ));
        }
        log::debug!("Adding node '{}' to '{}'", node.reference(), self.name);
        self.nodes.push(node);

        for (source, outputs) in connections {
            for (kind, slots) in outputs {
                for (index, targets) in slots.into_iter().enumerate() {
                    for target in targets {
                        self.add_connection(source.as_str(), kind.as_str(), index, target)?;
                    }
                }
            }
        }

        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::workflow::{ConnectionTarget, Connections, Node, WorkflowDefinition};
    use serde_json::json;

    fn chat_workflow() -> WorkflowDefinition {
        let mut workflow = WorkflowDefinition::new("Chat");
        workflow.id = Some("wf-9".to_string());
        workflow.active = true;
        workflow
            .extra
            .insert("versionId".to_string(), json!("abc"));
        workflow
            .extra
            .insert("createdAt".to_string(), json!("2025-01-01T00:00:00Z"));

        let mut hook = Node::new("Chat Webhook", "n8n-nodes-base.webhook");
        hook.id = "chat-webhook".to_string();
        hook.extra.insert("webhookId".to_string(), json!("f00"));
        let mut model = Node::new("OpenAI", "n8n-nodes-base.openAi");
        model.id = "openai-node".to_string();
        model
            .parameters
            .insert("model".to_string(), json!("gpt-3.5-turbo"));
        workflow.nodes = vec![hook, model];
        workflow.add_connection("Chat Webhook", "main", 0, ConnectionTarget::main("OpenAI"))
            .unwrap();
        workflow
    }

    #[test]
    fn test_set_top_level_parameter() {
        let mut workflow = chat_workflow();
        let previous = workflow
            .set_node_parameter("OpenAI", "model", json!("gpt-4-turbo"))
            .unwrap();

        assert_eq!(previous, Some(json!("gpt-3.5-turbo")));
        assert_eq!(
            workflow.node("OpenAI").unwrap().parameters["model"],
            "gpt-4-turbo"
        );
    }

    #[test]
    fn test_set_nested_parameter_creates_objects() {
        let mut workflow = chat_workflow();
        workflow
            .set_node_parameter("openai-node", "options.temperature", json!(0.2))
            .unwrap();

        assert_eq!(
            workflow.node("OpenAI").unwrap().parameters["options"],
            json!({"temperature": 0.2})
        );
    }

    #[test]
    fn test_set_parameter_unknown_node() {
        let mut workflow = chat_workflow();
        let err = workflow
            .set_node_parameter("Nope", "model", json!("x"))
            .unwrap_err();
        assert!(matches!(err, Error::NodeNotFound { .. }));
    }

    #[test]
    fn test_set_parameter_through_scalar_fails() {
        let mut workflow = chat_workflow();
        let err = workflow
            .set_node_parameter("OpenAI", "model.name", json!("x"))
            .unwrap_err();
        assert!(err.to_string().contains("non-object value at 'model'"));
    }

    #[test]
    fn test_set_parameter_rejects_empty_segments() {
        let mut workflow = chat_workflow();
        assert!(
            workflow
                .set_node_parameter("OpenAI", "options..x", json!(1))
                .is_err()
        );
    }

    #[test]
    fn test_add_node_with_connections() {
        let mut workflow = chat_workflow();
        let mut reply = Node::new("Reply", "n8n-nodes-base.respondToWebhook");
        reply
            .parameters
            .insert("respondWith".to_string(), json!("text"));

        let mut connections = Connections::new();
        connections
            .entry("OpenAI".to_string())
            .or_default()
            .insert("main".to_string(), vec![vec![ConnectionTarget::main("Reply")]]);
        connections
            .entry("Chat Webhook".to_string())
            .or_default()
            .insert("main".to_string(), vec![vec![ConnectionTarget::main("Reply")]]);

        workflow.add_node(reply, connections).unwrap();

        assert_eq!(workflow.nodes.len(), 3);
        assert_eq!(workflow.node("Reply").unwrap().parameters["respondWith"], "text");
        assert_eq!(workflow.connections["OpenAI"]["main"][0][0].node, "Reply");
        // existing targets in the same slot are kept
        let hook_targets = &workflow.connections["Chat Webhook"]["main"][0];
        assert_eq!(hook_targets.len(), 2);
        assert_eq!(hook_targets[0].node, "OpenAI");
        assert_eq!(hook_targets[1].node, "Reply");
    }

    #[test]
    fn test_add_node_undeclared_reference_leaves_workflow_unchanged() {
        let mut workflow = chat_workflow();
        let before = workflow.clone();

        let mut connections = Connections::new();
        connections
            .entry("Reply".to_string())
            .or_default()
            .insert("main".to_string(), vec![vec![ConnectionTarget::main("Ghost")]]);

        let err = workflow
            .add_node(Node::new("Reply", "n8n-nodes-base.noOp"), connections)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate(_)));
        assert!(err.to_string().contains("undeclared node 'Ghost'"));
        assert_eq!(workflow, before);
    }

    #[test]
    fn test_add_node_duplicate_name_rejected() {
        let mut workflow = chat_workflow();
        let before = workflow.clone();

        let err = workflow
            .add_node(Node::new("OpenAI", "n8n-nodes-base.noOp"), Connections::new())
            .unwrap_err();
        assert!(err.to_string().contains("duplicate node name 'OpenAI'"));
        assert_eq!(workflow, before);

        assert!(workflow
            .add_node(Node::new("", "n8n-nodes-base.noOp"), Connections::new())
            .is_err());
        assert_eq!(workflow, before);
    }

    #[test]
    fn test_duplicate() {
        let original = chat_workflow();
        let copy = original.duplicate("Chat (copy)");

        assert_eq!(copy.id, None);
        assert_eq!(copy.name, "Chat (copy)");
        assert!(!copy.active);
        assert!(!copy.extra.contains_key("versionId"));
        assert!(!copy.extra.contains_key("createdAt"));
        assert!(copy.extra.contains_key("settings"));
        assert_eq!(copy.nodes[0].id, "chat-webhook_copy");
        assert!(!copy.nodes[0].extra.contains_key("webhookId"));
        assert_eq!(copy.connections, original.connections);
        assert!(copy.validate().is_ok());
    }

    #[test]
    fn test_duplicate_rewrites_id_references() {
        let mut workflow = WorkflowDefinition::new("By id");
        let mut a = Node::new("", "t.a");
        a.id = "a".to_string();
        let mut b = Node::new("", "t.b");
        b.id = "b".to_string();
        workflow.nodes = vec![a, b];
        workflow.add_connection("a", "main", 0, ConnectionTarget::main("b"))
            .unwrap();

        let copy = workflow.duplicate("By id 2");
        assert_eq!(copy.connections["a_copy"]["main"][0][0].node, "b_copy");
        assert!(copy.validate().is_ok());
    }
}
