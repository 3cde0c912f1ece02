//! Fetch & analyze
//!
//! Bulk operations over every workflow on an instance: statistics, export to
//! a directory, import from one, and cleanup of archived workflows.

mod bulk;
mod export;
mod summary;

pub use bulk::{PruneReport, import_path, prune_archived};
pub use export::{ExportFailure, ExportReport, export_all, fetch_and_export_all};
pub use summary::{WorkflowSummary, summarize};
