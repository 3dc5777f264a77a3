//! Export root layout

use crate::document::{DocumentFormat, ResourceKind, clone_marker};
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Marker file name at the export root.
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// An export tree: `manifest.yaml` plus one directory per resource type.
pub struct ManifestDirectory {
    path: PathBuf,
}

impl ManifestDirectory {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create the root and write the marker. The marker is always YAML.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let dir = Self::new(path);
        std::fs::create_dir_all(&dir.path)
            .with_context(|| format!("Failed to create directory: {}", dir.path.display()))?;
        let text = DocumentFormat::Yaml.render(&clone_marker())?;
        let marker = dir.manifest_path();
        std::fs::write(&marker, text)
            .with_context(|| format!("Failed to write file: {}", marker.display()))?;
        Ok(dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }

    pub fn has_manifest(&self) -> bool {
        self.manifest_path().is_file()
    }

    /// Directory holding documents of one kind.
    pub fn type_dir(&self, kind: ResourceKind) -> PathBuf {
        self.path.join(kind.directory().unwrap_or(kind.as_str()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{normalize, read_document};
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_create_writes_marker() {
        let temp = TempDir::new().unwrap();
        let dir = ManifestDirectory::create(temp.path().join("out")).unwrap();
        assert!(dir.has_manifest());
        let marker = normalize(read_document(dir.manifest_path()).unwrap());
        assert_eq!(marker, json!({"kind": "CloneManifest", "metadata": {}, "spec": {}}));
    }

    #[test]
    fn test_type_dirs() {
        let dir = ManifestDirectory::new("/tmp/export");
        assert_eq!(
            dir.type_dir(ResourceKind::LifecyclePolicy),
            PathBuf::from("/tmp/export/lifecycle-policies")
        );
        assert_eq!(
            dir.type_dir(ResourceKind::ClusterSettings),
            PathBuf::from("/tmp/export/cluster-settings")
        );
    }
}
