//! n8n Workflows API
//!
//! Provides extract and load operations for n8n workflows.
//! Export index format: `workflows.yml` (see [`crate::storage::ExportManifest`])

mod extractor;
mod loader;

pub use extractor::WorkflowsExtractor;
pub use loader::WorkflowsLoader;
