//! Workflow generation
//!
//! Builds new workflow documents from a short description: a list of
//! [`NodeSpec`]s and the [`ConnectionSpec`]s between them. [`TemplateKind`]
//! wraps a few ready-made descriptions.

mod builder;
mod templates;

pub use builder::{ConnectionSpec, NodeSpec, build_workflow, slugify};
pub use templates::TemplateKind;
