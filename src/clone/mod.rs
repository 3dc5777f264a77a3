//! Export and import of cluster configuration
//!
//! Component templates, index templates, lifecycle policies, ingest
//! pipelines and cluster settings move between a cluster and a directory
//! tree, always in that order so templates exist before anything that
//! composes them.

mod applier;
mod exporter;
mod importer;

pub use applier::{ClusterApplier, label};
pub use exporter::{EnvelopeBuilder, ExportOptions, ExportedResource, Exporter, ResourceExtractor};
pub use importer::{DocumentLoader, ImportOptions, Importer};

use crate::document::{DocumentError, ResourceKind};

/// Resolve `--types` values (directory names, `ilm`, or `all`) to kinds in
/// clone order. No values selects every kind.
pub fn select_kinds(types: &[String], all: bool) -> Result<Vec<ResourceKind>, DocumentError> {
    if all || types.is_empty() {
        return Ok(ResourceKind::CLONE_ORDER.to_vec());
    }
    let mut requested = Vec::new();
    for name in types.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if name == "all" {
            return Ok(ResourceKind::CLONE_ORDER.to_vec());
        }
        let kind = ResourceKind::from_directory(name)
            .ok_or_else(|| DocumentError::UnknownKind(name.to_string()))?;
        requested.push(kind);
    }
    Ok(ResourceKind::CLONE_ORDER
        .into_iter()
        .filter(|kind| requested.contains(kind))
        .collect())
}
