//! Bulk import and cleanup

use crate::client::N8nClient;
use crate::error::{Error, Result};
use crate::etl::{DocumentParser, Pipeline};
use crate::n8n::workflows::WorkflowsLoader;
use crate::storage::DirectoryReader;
use owo_colors::OwoColorize;
use std::path::Path;

/// Create every workflow document found at `path` (a `*.json` file or a directory of them)
///
/// Pipeline: DirectoryReader → DocumentParser → WorkflowsLoader
///
/// All documents are parsed and validated before the first one is created.
/// `name` overrides the document's name and is only accepted when `path`
/// holds a single document. Returns the number of workflows created.
pub async fn import_path(
    client: &N8nClient,
    path: impl AsRef<Path>,
    activate: bool,
    name: Option<&str>,
) -> Result<usize> {
    let path = path.as_ref();
    log::info!("Importing workflows from {}", path.display());

    let reader = DirectoryReader::new(path);
    let parser = match name {
        Some(name) => {
            let documents = reader.count()?;
            if documents > 1 {
                return Err(Error::Configuration(format!(
                    "a name can only be given for a single workflow, {} holds {}",
                    path.display(),
                    documents
                )));
            }
            DocumentParser::with_name(name)
        }
        None => DocumentParser::new(),
    };

    let pipeline = Pipeline::new(
        reader,
        parser,
        WorkflowsLoader::new(client.clone()).activate(activate),
    );

    pipeline.run().await
}

/// Outcome of [`prune_archived`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneReport {
    pub deleted: usize,
    pub failed: usize,
}

/// Delete every workflow n8n has archived
///
/// Each deletion is attempted independently; failures are logged and counted.
pub async fn prune_archived(client: &N8nClient) -> Result<PruneReport> {
    let archived: Vec<_> = client
        .list_workflows()
        .await?
        .into_iter()
        .filter(|w| w.is_archived())
        .collect();

    log::info!("Found {} archived workflow(s)", archived.len());

    let mut report = PruneReport::default();
    for workflow in &archived {
        let Some(id) = workflow.id.as_deref() else {
            continue;
        };
        match client.delete_workflow(id).await {
            Ok(()) => report.deleted += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::warn!("Failed to delete {}: {}", workflow.label().cyan(), e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}
