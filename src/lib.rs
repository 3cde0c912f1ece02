//! n8n Workflow Manager
//!
//! A client for the n8n public REST API: typed workflow CRUD, bulk export and
//! import of workflow documents, statistics over fetched workflows, and
//! template-based generation of new workflows.

pub mod analyze;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod etl;
pub mod generator;
pub mod n8n;
pub mod storage;
pub mod workflow;

// Re-exports for convenience
pub use analyze::{ExportReport, WorkflowSummary, fetch_and_export_all, summarize};
pub use client::{ListQuery, N8nClient};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use etl::{Extractor, Loader, Pipeline, Transformer};
pub use generator::{ConnectionSpec, NodeSpec, TemplateKind, build_workflow};
pub use storage::{DirectoryReader, DirectoryWriter};
pub use workflow::WorkflowDefinition;
