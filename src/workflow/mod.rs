//! Workflow document model
//!
//! [`WorkflowDefinition`] mirrors the n8n workflow JSON: typed nodes and
//! connections plus an opaque map for everything else. The [`document`]
//! functions convert to and from raw JSON.

pub mod document;
mod edit;
mod model;
mod validate;

pub use model::{
    ConnectionTarget, Connections, MAIN_CONNECTION, MAX_OUTPUT_SLOT, Node, NodeConnections,
    WorkflowDefinition,
};
