//! In-memory representation of an n8n workflow document
//!
//! Only the fields this crate reasons about are typed. Everything else
//! (`settings`, `staticData`, `tags`, timestamps, node credentials, ...) is kept
//! in the `extra` maps so a fetched document can be written back unchanged.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

/// Connection type used for ordinary data flow between nodes.
pub const MAIN_CONNECTION: &str = "main";

/// Outgoing connections of one node, keyed by output kind (`main`, `ai_tool`, ...).
///
/// Each kind holds one list per output slot; each slot lists the inputs it feeds.
pub type NodeConnections = BTreeMap<String, Vec<Vec<ConnectionTarget>>>;

/// Connections of a whole workflow, keyed by source node reference.
pub type Connections = BTreeMap<String, NodeConnections>;

/// Highest output slot [`WorkflowDefinition::add_connection`] will pad up to.
pub const MAX_OUTPUT_SLOT: usize = 255;

/// One workflow definition as stored by n8n.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Server-assigned identifier, absent until the workflow is created
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number"
    )]
    pub id: Option<String>,

    pub name: String,

    #[serde(default)]
    pub active: bool,

    pub nodes: Vec<Node>,

    #[serde(default, deserialize_with = "connections_or_null")]
    pub connections: Connections,

    /// Unknown top-level fields, preserved as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single step in a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Display name; n8n uses it as the key in `connections`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(
        rename = "typeVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub type_version: Option<Number>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[Number; 2]>,

    /// Node-type specific settings, passed through untouched
    #[serde(default, deserialize_with = "null_as_default")]
    pub parameters: Map<String, Value>,

    /// Unknown node fields (`credentials`, `disabled`, `webhookId`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The receiving end of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    /// Target node reference (its display name)
    pub node: String,
    /// Input kind on the target node
    #[serde(rename = "type")]
    pub kind: String,
    /// Input slot on the target node
    #[serde(default)]
    pub index: u32,
}

impl WorkflowDefinition {
    /// Create an empty, inactive workflow with default settings.
    pub fn new(name: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("settings".to_string(), Value::Object(Map::new()));
        Self {
            id: None,
            name: name.into(),
            active: false,
            nodes: Vec::new(),
            connections: Connections::new(),
            extra,
        }
    }

    /// Find a node by a connection-style reference (display name first, then id).
    pub fn node(&self, reference: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| !n.name.is_empty() && n.name == reference)
            .or_else(|| {
                self.nodes
                    .iter()
                    .find(|n| !n.id.is_empty() && n.id == reference)
            })
    }

    /// Mutable counterpart of [`WorkflowDefinition::node`].
    pub fn node_mut(&mut self, reference: &str) -> Option<&mut Node> {
        let index = self
            .nodes
            .iter()
            .position(|n| !n.name.is_empty() && n.name == reference)
            .or_else(|| {
                self.nodes
                    .iter()
                    .position(|n| !n.id.is_empty() && n.id == reference)
            })?;
        self.nodes.get_mut(index)
    }

    /// Append a connection from `source` output slot `output_index` to `target`.
    ///
    /// Missing output slots are padded with empty lists, matching how n8n stores them.
    /// References are not checked here; see [`WorkflowDefinition::validate`].
    ///
    /// # Errors
    /// `InvalidTemplate` if `output_index` is beyond [`MAX_OUTPUT_SLOT`].
    pub fn add_connection(
        &mut self,
        source: impl Into<String>,
        output_kind: impl Into<String>,
        output_index: usize,
        target: ConnectionTarget,
    ) -> Result<()> {
        let source = source.into();
        if output_index > MAX_OUTPUT_SLOT {
            return Err(Error::InvalidTemplate(format!(
                "output slot {} of '{}' is out of range (max {})",
                output_index, source, MAX_OUTPUT_SLOT
            )));
        }
        let slots = self
            .connections
            .entry(source)
            .or_default()
            .entry(output_kind.into())
            .or_default();
        if slots.len() <= output_index {
            slots.resize_with(output_index + 1, Vec::new);
        }
        slots[output_index].push(target);
        Ok(())
    }

    /// Iterate over every `(source, target)` pair in the connection map.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &ConnectionTarget)> {
        self.connections.iter().flat_map(|(source, outputs)| {
            outputs
                .values()
                .flatten()
                .flatten()
                .map(move |target| (source.as_str(), target))
        })
    }

    /// How often each node type occurs in this workflow.
    pub fn node_type_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.node_type.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Whether n8n has archived this workflow.
    pub fn is_archived(&self) -> bool {
        self.extra
            .get("isArchived")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Label used in logs: `name (id)` or just the name for unsaved workflows.
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("{} ({})", self.name, id),
            None => self.name.clone(),
        }
    }
}

impl Node {
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            node_type: node_type.into(),
            type_version: None,
            position: None,
            parameters: Map::new(),
            extra: Map::new(),
        }
    }

    /// The reference other nodes use to point at this one.
    pub fn reference(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

impl ConnectionTarget {
    pub fn new(node: impl Into<String>, kind: impl Into<String>, index: u32) -> Self {
        Self {
            node: node.into(),
            kind: kind.into(),
            index,
        }
    }

    /// A `main` connection into input slot 0.
    pub fn main(node: impl Into<String>) -> Self {
        Self::new(node, MAIN_CONNECTION, 0)
    }
}

/// Older n8n releases used numeric workflow ids.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number for id, found {}",
            other
        ))),
    }
}

/// Exported documents sometimes carry `null` where a map is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Like [`null_as_default`], and also reads `null` output slots as empty.
fn connections_or_null<'de, D>(deserializer: D) -> std::result::Result<Connections, D::Error>
where
    D: Deserializer<'de>,
{
    type Raw = BTreeMap<String, BTreeMap<String, Vec<Option<Vec<ConnectionTarget>>>>>;

    let raw = Option::<Raw>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|(source, outputs)| {
            let outputs: NodeConnections = outputs
                .into_iter()
                .map(|(kind, slots)| {
                    let slots = slots.into_iter().map(Option::unwrap_or_default).collect();
                    (kind, slots)
                })
                .collect();
            (source, outputs)
        })
        .collect())
}
