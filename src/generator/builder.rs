use crate::error::{Error, Result};
use crate::workflow::{ConnectionTarget, MAIN_CONNECTION, Node, WorkflowDefinition};
use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;

static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"));

const ORIGIN_X: i64 = 240;
const SPACING_X: i64 = 300;
const ORIGIN_Y: i64 = 300;

/// Description of one node to generate
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub name: String,
    pub node_type: String,
    /// Defaults to the slug of `name`
    pub id: Option<String>,
    pub type_version: f64,
    /// Defaults to a left-to-right layout by position in the node list
    pub position: Option<(i64, i64)>,
    pub parameters: Map<String, Value>,
    /// Extra node fields such as `credentials` or `alwaysOutputData`
    pub extra: Map<String, Value>,
}

impl NodeSpec {
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            id: None,
            type_version: 1.0,
            position: None,
            parameters: Map::new(),
            extra: Map::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn type_version(mut self, version: f64) -> Self {
        self.type_version = version;
        self
    }

    pub fn position(mut self, x: i64, y: i64) -> Self {
        self.position = Some((x, y));
        self
    }

    /// Set node parameters. Anything other than a JSON object is ignored.
    pub fn parameters(mut self, parameters: Value) -> Self {
        if let Value::Object(map) = parameters {
            self.parameters = map;
        }
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    fn into_node(self, index: usize) -> Result<Node> {
        let type_version = version_number(self.type_version).ok_or_else(|| {
            Error::InvalidTemplate(format!(
                "node '{}' has an invalid type version: {}",
                self.name, self.type_version
            ))
        })?;
        let (x, y) = self
            .position
            .unwrap_or((ORIGIN_X + SPACING_X * index as i64, ORIGIN_Y));

        let mut node = Node::new(self.name, self.node_type);
        node.id = self.id.unwrap_or_else(|| slugify(&node.name));
        node.type_version = Some(type_version);
        node.position = Some([Number::from(x), Number::from(y)]);
        node.parameters = self.parameters;
        node.extra = self.extra;
        Ok(node)
    }
}

/// Description of one connection, by node name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    pub from: String,
    pub to: String,
    /// Output and input kind, `main` unless set
    pub kind: String,
    pub output: usize,
    pub input: u32,
}

impl ConnectionSpec {
    /// A `main` connection from output 0 of `from` to input 0 of `to`
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind: MAIN_CONNECTION.to_string(),
            output: 0,
            input: 0,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn output(mut self, output: usize) -> Self {
        self.output = output;
        self
    }

    pub fn input(mut self, input: u32) -> Self {
        self.input = input;
        self
    }
}

/// Build a new, inactive workflow from node and connection descriptions
///
/// # Errors
/// [`Error::InvalidTemplate`] when the name is empty, two nodes share a name,
/// a connection names a node that is not in `nodes`, or an output slot is out of range.
///
/// # Example
/// ```
/// use n8n_workflow_manager::generator::{ConnectionSpec, NodeSpec, build_workflow};
///
/// let workflow = build_workflow(
///     "Ping",
///     vec![
///         NodeSpec::new("Webhook", "n8n-nodes-base.webhook"),
///         NodeSpec::new("Respond", "n8n-nodes-base.respondToWebhook"),
///     ],
///     vec![ConnectionSpec::new("Webhook", "Respond")],
/// )
/// .unwrap();
///
/// assert!(!workflow.active);
/// assert_eq!(workflow.nodes[1].id, "respond");
/// ```
pub fn build_workflow(
    name: impl Into<String>,
    nodes: Vec<NodeSpec>,
    connections: Vec<ConnectionSpec>,
) -> Result<WorkflowDefinition> {
    let mut workflow = WorkflowDefinition::new(name);

    workflow.nodes = nodes
        .into_iter()
        .enumerate()
        .map(|(index, spec)| spec.into_node(index))
        .collect::<Result<_>>()?;

    for spec in connections {
        let target = ConnectionTarget::new(spec.to, spec.kind.clone(), spec.input);
        workflow.add_connection(spec.from, spec.kind, spec.output, target)?;
    }

    workflow.validate()?;
    log::debug!(
        "Built workflow '{}' with {} node(s)",
        workflow.name,
        workflow.nodes.len()
    );
    Ok(workflow)
}

/// Lowercase, with every run of other characters collapsed to `-`
pub fn slugify(name: &str) -> String {
    NON_SLUG_CHARS
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

fn version_number(version: f64) -> Option<Number> {
    if version.is_finite() && version.fract() == 0.0 {
        Some(Number::from(version as i64))
    } else {
        Number::from_f64(version)
    }
}
