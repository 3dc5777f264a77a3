//! Transformation stage

use eyre::Result;

/// Converts items between pipeline stages.
///
/// # Example
/// ```no_run
/// use searchctl::etl::Transformer;
/// use eyre::Result;
///
/// struct StripVersion;
///
/// impl Transformer for StripVersion {
///     type Input = serde_json::Value;
///     type Output = serde_json::Value;
///
///     fn transform(&self, mut input: Self::Input) -> Result<Self::Output> {
///         if let Some(obj) = input.as_object_mut() {
///             obj.remove("version");
///         }
///         Ok(input)
///     }
/// }
/// ```
pub trait Transformer: Send + Sync {
    type Input: Send;
    type Output: Send;

    /// # Errors
    /// Validation or conversion failures.
    fn transform(&self, input: Self::Input) -> Result<Self::Output>;

    /// Transform every item, stopping at the first failure.
    fn transform_many(&self, inputs: Vec<Self::Input>) -> Result<Vec<Self::Output>> {
        inputs.into_iter().map(|i| self.transform(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Halve;

    impl Transformer for Halve {
        type Input = i32;
        type Output = i32;

        fn transform(&self, input: i32) -> Result<i32> {
            if input % 2 != 0 {
                eyre::bail!("odd input: {}", input);
            }
            Ok(input / 2)
        }
    }

    #[test]
    fn test_transform_many_stops_on_error() {
        assert_eq!(Halve.transform_many(vec![2, 4]).unwrap(), vec![1, 2]);
        let err = Halve.transform_many(vec![2, 3, 4]).unwrap_err();
        assert_eq!(err.to_string(), "odd input: 3");
    }
}
