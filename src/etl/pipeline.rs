//! Pipeline orchestration

use super::{Extractor, Loader, Transformer};
use eyre::Result;
use owo_colors::OwoColorize;

/// Runs extract, transform and load in sequence for one resource type.
///
/// # Example
/// ```no_run
/// use searchctl::etl::Pipeline;
/// # use searchctl::etl::{Extractor, Transformer, Loader};
/// # use async_trait::async_trait;
/// # use eyre::Result;
/// # struct Names;
/// # impl Extractor for Names {
/// #     type Item = String;
/// #     async fn extract(&self) -> Result<Vec<Self::Item>> { Ok(vec![]) }
/// # }
/// # struct Upper;
/// # impl Transformer for Upper {
/// #     type Input = String;
/// #     type Output = String;
/// #     fn transform(&self, input: Self::Input) -> Result<Self::Output> { Ok(input.to_uppercase()) }
/// # }
/// # struct Count;
/// # #[async_trait]
/// # impl Loader for Count {
/// #     type Item = String;
/// #     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> { Ok(items.len()) }
/// # }
///
/// # async fn example() -> Result<()> {
/// let count = Pipeline::new(Names, Upper, Count)
///     .labeled("index-templates")
///     .run()
///     .await?;
/// println!("processed {}", count);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<E, T, L> {
    extractor: E,
    transformer: T,
    loader: L,
    label: String,
}

impl<E, T, L> Pipeline<E, T, L>
where
    E: Extractor,
    T: Transformer<Input = E::Item>,
    L: Loader<Item = T::Output>,
{
    pub fn new(extractor: E, transformer: T, loader: L) -> Self {
        Self {
            extractor,
            transformer,
            loader,
            label: "items".to_string(),
        }
    }

    /// Name used in progress logs.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Returns the number of items loaded. An empty extraction loads nothing.
    ///
    /// # Errors
    /// The first failing stage's error.
    pub async fn run(&self) -> Result<usize> {
        log::debug!("Extracting {}", self.label.cyan());
        let items = self.extractor.extract().await?;
        log::debug!("Extracted {} {}", items.len(), self.label);

        if items.is_empty() {
            log::debug!("No {} found", self.label);
            return Ok(0);
        }

        let transformed = self.transformer.transform_many(items)?;
        let count = self.loader.load(transformed).await?;
        log::info!("Processed {} {}", count, self.label.cyan());

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct FixedExtractor(Vec<i32>);

    impl Extractor for FixedExtractor {
        type Item = i32;
        async fn extract(&self) -> Result<Vec<Self::Item>> {
            Ok(self.0.clone())
        }
    }

    struct DoubleTransformer;

    impl Transformer for DoubleTransformer {
        type Input = i32;
        type Output = i32;
        fn transform(&self, input: Self::Input) -> Result<Self::Output> {
            Ok(input * 2)
        }
    }

    struct SumLoader(Arc<Mutex<Option<i32>>>);

    #[async_trait]
    impl Loader for SumLoader {
        type Item = i32;
        async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
            *self.0.lock().unwrap() = Some(items.iter().sum());
            Ok(items.len())
        }
    }

    #[tokio::test]
    async fn test_pipeline() {
        let result = Arc::new(Mutex::new(None));
        let count = Pipeline::new(
            FixedExtractor(vec![1, 2, 3]),
            DoubleTransformer,
            SumLoader(result.clone()),
        )
        .run()
        .await
        .unwrap();
        assert_eq!(count, 3);
        assert_eq!(*result.lock().unwrap(), Some(12));
    }

    #[tokio::test]
    async fn test_empty_extraction_skips_loader() {
        let result = Arc::new(Mutex::new(None));
        let count = Pipeline::new(
            FixedExtractor(vec![]),
            DoubleTransformer,
            SumLoader(result.clone()),
        )
        .labeled("policies")
        .run()
        .await
        .unwrap();
        assert_eq!(count, 0);
        assert_eq!(*result.lock().unwrap(), None);
    }
}
