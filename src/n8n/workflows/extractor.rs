//! Workflows API extractor
//!
//! Extracts workflow definitions from n8n via GET /api/v1/workflows

use crate::client::{ListQuery, N8nClient};
use crate::error::Result;
use crate::etl::Extractor;
use crate::workflow::WorkflowDefinition;

/// Extractor for n8n workflows
///
/// Lists every workflow on the instance, following pagination. An optional
/// [`ListQuery`] narrows the listing server-side.
///
/// # Example
/// ```no_run
/// use n8n_workflow_manager::client::{ListQuery, N8nClient};
/// use n8n_workflow_manager::config::ClientConfig;
/// use n8n_workflow_manager::etl::Extractor;
/// use n8n_workflow_manager::n8n::workflows::WorkflowsExtractor;
///
/// # async fn example() -> n8n_workflow_manager::Result<()> {
/// let client = N8nClient::try_new(&ClientConfig::from_env()?)?;
/// let extractor = WorkflowsExtractor::new(client).with_query(ListQuery::active(true));
/// let workflows = extractor.extract().await?;
/// # Ok(())
/// # }
/// ```
pub struct WorkflowsExtractor {
    client: N8nClient,
    query: ListQuery,
}

impl WorkflowsExtractor {
    pub fn new(client: N8nClient) -> Self {
        Self {
            client,
            query: ListQuery::default(),
        }
    }

    /// Restrict the listing with server-side filters
    pub fn with_query(mut self, query: ListQuery) -> Self {
        self.query = query;
        self
    }
}

impl Extractor for WorkflowsExtractor {
    type Item = WorkflowDefinition;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let workflows = self.client.list_workflows_with(&self.query).await?;

        log::info!(
            "Extracted {} workflow(s) from {}",
            workflows.len(),
            self.client.url()
        );

        Ok(workflows)
    }
}
