//! Extraction stage

use eyre::Result;

/// Produces the items a pipeline works on.
///
/// Implemented by the cluster-side resource extractor used for export and
/// by the directory reader used for import.
///
/// # Example
/// ```no_run
/// use searchctl::etl::Extractor;
/// use eyre::Result;
/// use std::path::PathBuf;
///
/// struct FileNames {
///     dir: PathBuf,
/// }
///
/// impl Extractor for FileNames {
///     type Item = PathBuf;
///
///     async fn extract(&self) -> Result<Vec<Self::Item>> {
///         let mut paths = Vec::new();
///         for entry in std::fs::read_dir(&self.dir)? {
///             paths.push(entry?.path());
///         }
///         Ok(paths)
///     }
/// }
/// ```
pub trait Extractor: Send + Sync {
    type Item: Send;

    /// # Errors
    /// Transport, I/O or parse failures.
    fn extract(&self) -> impl std::future::Future<Output = Result<Vec<Self::Item>>> + Send;
}
