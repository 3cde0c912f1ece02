//! Transformer trait and the document parsing step

use crate::error::Result;
use crate::workflow::{WorkflowDefinition, document};
use serde_json::Value;

/// Transformer trait for transforming items between pipeline stages
///
/// Implementors define how to transform items:
/// - Parsing raw documents into typed workflows
/// - Validation
/// - Field rewrites
pub trait Transformer: Send + Sync {
    /// Input item type
    type Input: Send;

    /// Output item type after transformation
    type Output: Send;

    /// Transform a single item
    ///
    /// # Errors
    /// Returns an error if transformation fails (validation, conversion, etc.)
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform multiple items (default batch implementation)
    ///
    /// Override this for optimized batch processing
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}

/// Parses raw JSON documents into validated [`WorkflowDefinition`]s
///
/// # Example
/// ```
/// use n8n_workflow_manager::etl::{DocumentParser, Transformer};
/// use serde_json::json;
///
/// let parser = DocumentParser::new();
/// let workflow = parser
///     .transform(json!({
///         "name": "Demo",
///         "nodes": [{"id": "n1", "type": "Start"}],
///         "connections": {}
///     }))
///     .unwrap();
/// assert_eq!(workflow.name, "Demo");
/// ```
#[derive(Debug, Default)]
pub struct DocumentParser {
    rename: Option<String>,
}

impl DocumentParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every parsed workflow this name (used when importing a single file).
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            rename: Some(name.into()),
        }
    }
}

impl Transformer for DocumentParser {
    type Input = Value;
    type Output = WorkflowDefinition;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let mut workflow = document::parse(&input)?;
        if let Some(name) = &self.rename {
            workflow.name = name.clone();
        }
        workflow.validate()?;
        Ok(workflow)
    }
}
