//! n8n API implementations
//!
//! ETL extractors and loaders backed by [`crate::client::N8nClient`].

pub mod workflows;

pub use workflows::{WorkflowsExtractor, WorkflowsLoader};
