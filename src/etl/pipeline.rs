//! Pipeline orchestration for ETL operations

use super::{Extractor, Loader, Transformer};
use crate::error::Result;

/// ETL Pipeline that orchestrates Extract, Transform, and Load operations
///
/// # Type Parameters
/// - `E`: Extractor type
/// - `T`: Transformer type (must transform from E::Item)
/// - `L`: Loader type (must load T::Output)
///
/// # Example
/// ```no_run
/// use n8n_workflow_manager::etl::{DocumentParser, Pipeline};
/// use n8n_workflow_manager::n8n::workflows::WorkflowsLoader;
/// use n8n_workflow_manager::storage::DirectoryReader;
/// # use n8n_workflow_manager::client::N8nClient;
///
/// # async fn example(client: N8nClient) -> n8n_workflow_manager::Result<()> {
/// let pipeline = Pipeline::new(
///     DirectoryReader::new("workflows"),
///     DocumentParser::new(),
///     WorkflowsLoader::new(client),
/// );
///
/// let count = pipeline.run().await?;
/// println!("Imported {} workflows", count);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    /// Create a new pipeline
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
        }
    }

    /// Run the complete ETL pipeline
    ///
    /// Steps:
    /// 1. Extract items from source
    /// 2. Transform every item (all items must transform before anything loads)
    /// 3. Load items to destination
    ///
    /// Returns the number of items successfully loaded
    ///
    /// # Errors
    /// Returns an error if any stage fails
    pub async fn run(&self) -> Result<usize> {
        log::debug!("Starting ETL pipeline");

        let items = self.extractor.extract().await?;
        log::debug!("Extracted {} items", items.len());

        if items.is_empty() {
            log::warn!("No items extracted, pipeline complete");
            return Ok(0);
        }

        let transformed = self.transformer.transform_many(items)?;
        log::debug!("Transformed {} items", transformed.len());

        let count = self.loader.load(transformed).await?;
        log::debug!("Loaded {} items", count);

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::{Arc, Mutex};

    struct MockExtractor(Vec<i32>);

    impl Extractor for MockExtractor {
        type Item = i32;
        async fn extract(&self) -> Result<Vec<Self::Item>> {
            Ok(self.0.clone())
        }
    }

    struct PositiveOnly;

    impl Transformer for PositiveOnly {
        type Input = i32;
        type Output = i32;
        fn transform(&self, input: Self::Input) -> Result<Self::Output> {
            if input < 0 {
                return Err(Error::InvalidTemplate(format!("negative: {}", input)));
            }
            Ok(input * 2)
        }
    }

    struct SumLoader(Arc<Mutex<i32>>);

    impl Loader for SumLoader {
        type Item = i32;
        async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
            let sum: i32 = items.iter().sum();
            *self.0.lock().unwrap() = sum;
            Ok(items.len())
        }
    }

    #[tokio::test]
    async fn test_pipeline() {
        let result = Arc::new(Mutex::new(0));

        let pipeline = Pipeline::new(
            MockExtractor(vec![1, 2, 3]),
            PositiveOnly,
            SumLoader(result.clone()),
        );

        let count = pipeline.run().await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(*result.lock().unwrap(), 12); // (1+2+3)*2 = 12
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let result = Arc::new(Mutex::new(-1));

        let pipeline = Pipeline::new(MockExtractor(vec![]), PositiveOnly, SumLoader(result.clone()));

        let count = pipeline.run().await.unwrap();
        assert_eq!(count, 0);
        assert_eq!(*result.lock().unwrap(), -1);
    }

    #[tokio::test]
    async fn test_transform_failure_loads_nothing() {
        let result = Arc::new(Mutex::new(-1));

        let pipeline = Pipeline::new(
            MockExtractor(vec![1, -2, 3]),
            PositiveOnly,
            SumLoader(result.clone()),
        );

        assert!(pipeline.run().await.is_err());
        assert_eq!(*result.lock().unwrap(), -1);
    }
}
