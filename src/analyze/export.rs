//! Bulk export of workflows to a directory

use super::summary::WorkflowSummary;
use crate::client::N8nClient;
use crate::error::{Error, Result};
use crate::etl::Extractor;
use crate::n8n::workflows::WorkflowsExtractor;
use crate::storage::{DirectoryWriter, ExportManifest, MANIFEST_FILE, ManifestEntry};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// A workflow that could not be written
#[derive(Debug)]
pub struct ExportFailure {
    /// `name (id)` of the workflow
    pub workflow: String,
    pub error: Error,
}

/// Outcome of an export: statistics over everything listed, plus per-file results
#[derive(Debug, Default)]
pub struct ExportReport {
    pub summary: WorkflowSummary,
    pub exported: Vec<PathBuf>,
    pub failed: Vec<ExportFailure>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// List every workflow on the instance and write each to `output_dir`
///
/// # Errors
/// Listing errors and failure to create `output_dir` abort the export. A
/// workflow that cannot be written is recorded in [`ExportReport::failed`]
/// and the export continues.
///
/// # Example
/// ```no_run
/// use n8n_workflow_manager::analyze::fetch_and_export_all;
/// use n8n_workflow_manager::client::N8nClient;
/// use n8n_workflow_manager::config::ClientConfig;
///
/// # async fn example() -> n8n_workflow_manager::Result<()> {
/// let client = N8nClient::try_new(&ClientConfig::from_env()?)?;
/// let report = fetch_and_export_all(&client, "workflows").await?;
/// println!("{} of {} written", report.exported.len(), report.summary.total);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_and_export_all(
    client: &N8nClient,
    output_dir: impl AsRef<Path>,
) -> Result<ExportReport> {
    let writer = DirectoryWriter::new(output_dir)?;
    let extractor = WorkflowsExtractor::new(client.clone());
    export_all(&extractor, &writer).await
}

/// Extract workflows from any source and write each through `writer`
pub async fn export_all<E>(extractor: &E, writer: &DirectoryWriter) -> Result<ExportReport>
where
    E: Extractor<Item = crate::workflow::WorkflowDefinition>,
{
    let workflows = extractor.extract().await?;

    let mut report = ExportReport::default();
    let mut manifest = ExportManifest::new();

    for workflow in &workflows {
        report.summary.record(workflow);

        match writer.write_workflow(workflow) {
            Ok(path) => {
                log::debug!("Exported {}", workflow.label().cyan());
                if let Some(id) = &workflow.id {
                    manifest.add(ManifestEntry {
                        id: id.clone(),
                        name: workflow.name.clone(),
                        file: DirectoryWriter::file_name(workflow),
                        active: workflow.active,
                    });
                }
                report.exported.push(path);
            }
            Err(error) => {
                log::warn!("Failed to export {}: {}", workflow.label().cyan(), error);
                report.failed.push(ExportFailure {
                    workflow: workflow.label(),
                    error,
                });
            }
        }
    }

    let manifest_path = writer.path().join(MANIFEST_FILE);
    if let Err(e) = manifest.write(&manifest_path) {
        log::warn!("Failed to write export index: {}", e);
    }

    log::info!(
        "Exported {} of {} workflow(s) to {}",
        report.exported.len(),
        report.summary.total,
        writer.path().display()
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::{Node, WorkflowDefinition};
    use tempfile::TempDir;

    struct Fixed(Vec<WorkflowDefinition>);

    impl Extractor for Fixed {
        type Item = WorkflowDefinition;
        async fn extract(&self) -> Result<Vec<Self::Item>> {
            Ok(self.0.clone())
        }
    }

    fn workflow(id: &str, name: &str, active: bool) -> WorkflowDefinition {
        let mut workflow = WorkflowDefinition::new(name);
        workflow.id = Some(id.to_string());
        workflow.active = active;
        workflow.nodes.push(Node::new("Start", "n8n-nodes-base.manualTrigger"));
        workflow
    }

    #[tokio::test]
    async fn test_export_writes_documents_and_index() {
        let temp = TempDir::new().unwrap();
        let writer = DirectoryWriter::new(temp.path()).unwrap();
        let source = Fixed(vec![workflow("1", "One", true), workflow("2", "Two", false)]);

        let report = export_all(&source, &writer).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.exported.len(), 2);
        assert_eq!(report.summary.active, 1);
        assert!(temp.path().join("1_One.json").is_file());

        let manifest = ExportManifest::read(temp.path().join(MANIFEST_FILE)).unwrap();
        assert_eq!(manifest.count(), 2);
        assert_eq!(manifest.get_by_id("2").unwrap().file, "2_Two.json");
    }

    #[tokio::test]
    async fn test_write_failure_is_isolated() {
        let temp = TempDir::new().unwrap();
        let writer = DirectoryWriter::new(temp.path()).unwrap();
        // A directory where the file should go makes that write fail
        std::fs::create_dir(temp.path().join("2_Two.json")).unwrap();

        let source = Fixed(vec![
            workflow("1", "One", true),
            workflow("2", "Two", false),
            workflow("3", "Three", false),
        ]);
        let report = export_all(&source, &writer).await.unwrap();

        assert_eq!(report.summary.total, 3);
        assert_eq!(report.exported.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].workflow, "Two (2)");
        assert!(matches!(report.failed[0].error, Error::Io { .. }));
    }
}
