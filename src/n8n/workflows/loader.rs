//! Workflows API loader
//!
//! Loads workflow definitions to n8n via POST /api/v1/workflows

use crate::client::N8nClient;
use crate::error::Result;
use crate::etl::Loader;
use crate::workflow::WorkflowDefinition;

use owo_colors::OwoColorize;

/// Loader for n8n workflows
///
/// Creates each workflow as a new server-side workflow (n8n assigns the id),
/// optionally activating it afterwards. Loading stops at the first failure.
///
/// # Example
/// ```no_run
/// use n8n_workflow_manager::client::N8nClient;
/// use n8n_workflow_manager::config::ClientConfig;
/// use n8n_workflow_manager::etl::Loader;
/// use n8n_workflow_manager::n8n::workflows::WorkflowsLoader;
/// use n8n_workflow_manager::workflow::WorkflowDefinition;
///
/// # async fn example() -> n8n_workflow_manager::Result<()> {
/// let client = N8nClient::try_new(&ClientConfig::from_env()?)?;
/// let loader = WorkflowsLoader::new(client).activate(true);
///
/// let count = loader.load(vec![WorkflowDefinition::new("Empty")]).await?;
/// # Ok(())
/// # }
/// ```
pub struct WorkflowsLoader {
    client: N8nClient,
    activate: bool,
}

impl WorkflowsLoader {
    pub fn new(client: N8nClient) -> Self {
        Self {
            client,
            activate: false,
        }
    }

    /// Activate each workflow once it has been created
    pub fn activate(mut self, activate: bool) -> Self {
        self.activate = activate;
        self
    }

    async fn load_one(&self, workflow: &WorkflowDefinition) -> Result<WorkflowDefinition> {
        let created = self.client.create_workflow(workflow).await?;

        match (&created.id, self.activate) {
            (Some(id), true) => self.client.set_active(id, true).await,
            _ => Ok(created),
        }
    }
}

impl Loader for WorkflowsLoader {
    type Item = WorkflowDefinition;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        let mut count = 0;

        for workflow in &items {
            let loaded = self.load_one(workflow).await?;
            log::debug!(
                "Loaded workflow {} (active: {})",
                loaded.label().cyan(),
                loaded.active
            );
            count += 1;
        }

        log::info!("Loaded {} workflow(s)", count);
        Ok(count)
    }
}
