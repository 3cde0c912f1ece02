//! Extractor trait for pulling workflows out of a source

use crate::error::Result;

/// Extractor trait for extracting items from a source
///
/// Implementors define how to extract items from sources like:
/// - the n8n API ([`WorkflowsExtractor`](crate::n8n::workflows::WorkflowsExtractor))
/// - a directory of exported documents ([`DirectoryReader`](crate::storage::DirectoryReader))
///
/// # Example
/// ```no_run
/// use n8n_workflow_manager::etl::Extractor;
/// use n8n_workflow_manager::Result;
/// use std::path::PathBuf;
///
/// struct FileExtractor {
///     path: PathBuf,
/// }
///
/// impl Extractor for FileExtractor {
///     type Item = String;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         // Read files and return items
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    /// The type of items extracted
    type Item: Send;

    /// Extract items from the source
    ///
    /// # Errors
    /// Returns an error if extraction fails (network, I/O, parsing, etc.)
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
