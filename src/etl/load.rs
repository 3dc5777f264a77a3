//! Loading stage

use async_trait::async_trait;
use eyre::Result;

/// Consumes transformed items: writes files, or creates resources on a
/// cluster.
///
/// # Example
/// ```no_run
/// use searchctl::etl::Loader;
/// use async_trait::async_trait;
/// use eyre::Result;
///
/// struct Printer;
///
/// #[async_trait]
/// impl Loader for Printer {
///     type Item = String;
///
///     async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
///         for item in &items {
///             println!("{}", item);
///         }
///         Ok(items.len())
///     }
/// }
/// ```
#[async_trait]
pub trait Loader: Send + Sync {
    type Item: Send;

    /// Returns the number of items loaded.
    ///
    /// # Errors
    /// Transport, I/O or validation failures.
    async fn load(&self, items: Vec<Self::Item>) -> Result<usize>;
}
