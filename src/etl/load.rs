//! Loader trait for pushing workflows to a destination

use crate::error::Result;

/// Loader trait for loading items to a destination
///
/// Implementors define how to load items to destinations such as the n8n API
/// ([`WorkflowsLoader`](crate::n8n::workflows::WorkflowsLoader)).
///
/// # Example
/// ```no_run
/// use n8n_workflow_manager::etl::Loader;
/// use n8n_workflow_manager::Result;
///
/// struct CountingLoader;
///
/// impl Loader for CountingLoader {
///     type Item = String;
///
///     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
///         Ok(items.len())
///     }
/// }
/// ```
pub trait Loader: Send + Sync {
    /// The type of items to load
    type Item: Send;

    /// Load items to the destination
    ///
    /// Returns the number of items successfully loaded
    ///
    /// # Errors
    /// Returns an error if loading fails (network, I/O, validation, etc.)
    fn load(
        &self,
        items: Vec<Self::Item>,
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
}
