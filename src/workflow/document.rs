//! Conversion between raw JSON documents and [`WorkflowDefinition`]
//!
//! Pure data transformation: no network or filesystem access happens here.

use super::WorkflowDefinition;
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Top-level fields n8n accepts in a create or update request body.
pub const WRITABLE_FIELDS: &[&str] = &["name", "nodes", "connections", "settings", "staticData"];

/// Parse a JSON document into a workflow definition.
///
/// Fails with [`Error::MalformedDocument`] when `name` or `nodes` are missing or
/// have the wrong shape. Unknown fields are kept in `extra`.
pub fn parse(raw: &Value) -> Result<WorkflowDefinition> {
    if !raw.is_object() {
        return Err(Error::MalformedDocument(format!(
            "expected a JSON object, found {}",
            type_name(raw)
        )));
    }
    serde_json::from_value(raw.clone()).map_err(|e| Error::MalformedDocument(e.to_string()))
}

/// Parse a JSON text document.
pub fn parse_str(raw: &str) -> Result<WorkflowDefinition> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::MalformedDocument(e.to_string()))?;
    parse(&value)
}

/// Serialize a workflow definition back into its JSON document form.
pub fn serialize(workflow: &WorkflowDefinition) -> Value {
    let mut document = Map::new();
    // Unknown fields go in first so the typed fields always win on a key clash.
    for (key, value) in &workflow.extra {
        document.insert(key.clone(), value.clone());
    }
    if let Some(id) = &workflow.id {
        document.insert("id".to_string(), Value::String(id.clone()));
    }
    document.insert("name".to_string(), Value::String(workflow.name.clone()));
    document.insert("active".to_string(), Value::Bool(workflow.active));
    document.insert("nodes".to_string(), to_value(&workflow.nodes));
    document.insert("connections".to_string(), to_value(&workflow.connections));
    Value::Object(document)
}

/// Pretty-printed JSON text, as written to export files.
pub fn to_string_pretty(workflow: &WorkflowDefinition) -> Result<String> {
    serde_json::to_string_pretty(&serialize(workflow))
        .map_err(|e| Error::MalformedDocument(e.to_string()))
}

/// The body for `POST /workflows` and `PUT /workflows/{id}`.
///
/// n8n rejects read-only properties (`id`, `active`, `tags`, timestamps, ...), so
/// only [`WRITABLE_FIELDS`] are kept. `settings` is required by the API and
/// defaults to an empty object.
pub fn to_request_body(workflow: &WorkflowDefinition) -> Value {
    let document = serialize(workflow);
    let mut body = Map::new();
    if let Value::Object(fields) = document {
        for (key, value) in fields {
            if WRITABLE_FIELDS.contains(&key.as_str()) && !value.is_null() {
                body.insert(key, value);
            }
        }
    }
    body.entry("settings")
        .or_insert_with(|| Value::Object(Map::new()));
    Value::Object(body)
}

fn to_value<T: serde::Serialize>(value: &T) -> Value {
    // The model only contains maps with string keys, so this cannot fail.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{ConnectionTarget, Node};
    use serde_json::json;

    fn fetched_document() -> Value {
        json!({
            "id": "wf-1",
            "name": "Telegram Assistant",
            "active": true,
            "createdAt": "2025-06-01T10:00:00.000Z",
            "updatedAt": "2025-06-02T10:00:00.000Z",
            "versionId": "7f1c",
            "settings": {"executionOrder": "v1"},
            "staticData": null,
            "tags": [{"id": "t1", "name": "bots"}],
            "nodes": [
                {
                    "id": "telegram-trigger-001",
                    "name": "Telegram Trigger",
                    "type": "n8n-nodes-base.telegramTrigger",
                    "typeVersion": 1.2,
                    "position": [576, 32],
                    "parameters": {"updates": ["message"], "additionalFields": {}},
                    "webhookId": "0b5e",
                    "credentials": {"telegramApi": {"id": "c1", "name": "bot"}}
                },
                {
                    "id": "ai-agent-001",
                    "name": "AI Agent",
                    "type": "@n8n/n8n-nodes-langchain.agent",
                    "typeVersion": 2.2,
                    "position": [816, 32],
                    "parameters": {"promptType": "define"},
                    "alwaysOutputData": true
                }
            ],
            "connections": {
                "Telegram Trigger": {
                    "main": [[{"node": "AI Agent", "type": "main", "index": 0}]]
                }
            }
        })
    }

    #[test]
    fn test_parse_fetched_document() {
        let workflow = parse(&fetched_document()).unwrap();

        assert_eq!(workflow.id.as_deref(), Some("wf-1"));
        assert_eq!(workflow.name, "Telegram Assistant");
        assert!(workflow.active);
        assert_eq!(workflow.nodes.len(), 2);
        assert_eq!(workflow.nodes[0].node_type, "n8n-nodes-base.telegramTrigger");
        assert_eq!(workflow.nodes[0].extra["webhookId"], "0b5e");
        assert_eq!(workflow.nodes[1].extra["alwaysOutputData"], true);
        assert_eq!(
            workflow.connections["Telegram Trigger"]["main"][0][0],
            ConnectionTarget::main("AI Agent")
        );
        assert_eq!(workflow.extra["versionId"], "7f1c");
        assert_eq!(workflow.extra["settings"]["executionOrder"], "v1");
        assert!(workflow.validate().is_ok());
    }

    #[test]
    fn test_round_trip_preserves_unknown_fields() {
        let workflow = parse(&fetched_document()).unwrap();
        let reparsed = parse(&serialize(&workflow)).unwrap();
        assert_eq!(reparsed, workflow);

        // The serialized document is the fetched one, key for key.
        assert_eq!(serialize(&workflow), fetched_document());
    }

    #[test]
    fn test_round_trip_minimal_document() {
        let workflow = parse(&json!({
            "name": "Demo",
            "nodes": [{"id": "n1", "type": "Start"}],
            "connections": {}
        }))
        .unwrap();

        assert_eq!(workflow.id, None);
        assert!(!workflow.active);
        assert_eq!(workflow.nodes[0].id, "n1");
        assert!(workflow.nodes[0].parameters.is_empty());
        assert_eq!(parse(&serialize(&workflow)).unwrap(), workflow);
    }

    #[test]
    fn test_parse_missing_name() {
        let err = parse(&json!({"nodes": []})).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_parse_missing_nodes() {
        let err = parse(&json!({"name": "No nodes"})).unwrap_err();
        assert!(matches!(err, Error::MalformedDocument(_)));
    }

    #[test]
    fn test_parse_wrong_shapes() {
        assert!(matches!(
            parse(&json!({"name": "x", "nodes": {"a": 1}})),
            Err(Error::MalformedDocument(_))
        ));
        assert!(matches!(
            parse(&json!({"name": 5, "nodes": []})),
            Err(Error::MalformedDocument(_))
        ));
        assert!(matches!(
            parse(&json!(["not", "a", "workflow"])),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_parse_str_invalid_json() {
        assert!(matches!(
            parse_str("{ not json"),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_request_body_strips_read_only_fields() {
        let workflow = parse(&fetched_document()).unwrap();
        let body = to_request_body(&workflow);
        let mut keys: Vec<&str> = body
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        keys.sort();

        assert_eq!(keys, vec!["connections", "name", "nodes", "settings"]);
        assert_eq!(body["settings"]["executionOrder"], "v1");
        // Node-level extras are part of the node schema and survive.
        assert_eq!(body["nodes"][0]["webhookId"], "0b5e");
    }

    #[test]
    fn test_request_body_defaults_settings() {
        let mut workflow = WorkflowDefinition::new("Fresh");
        workflow.extra.clear();
        workflow.nodes.push(Node::new("Start", "n8n-nodes-base.manualTrigger"));

        let body = to_request_body(&workflow);
        assert_eq!(body["settings"], json!({}));
        assert!(body.get("active").is_none());
        assert!(body.get("id").is_none());
    }
}
