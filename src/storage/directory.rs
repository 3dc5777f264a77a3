//! Per-type document directories

use crate::document::{DocumentFormat, ManifestEnvelope};
use crate::etl::{Extractor, Loader};
use async_trait::async_trait;
use eyre::{Context, Result};
use std::path::{Path, PathBuf};

/// Replace path separators so a resource name is a single file name.
pub fn safe_file_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Lists the document files under a directory, recursively, in
/// lexicographic path order.
pub struct DirectoryReader {
    path: PathBuf,
}

impl DirectoryReader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Files with a `.yaml`, `.yml` or `.json` extension. A missing
    /// directory has no files.
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if self.path.is_dir() {
            collect(&self.path, &mut files)?;
        }
        files.sort();
        Ok(files)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.files()?.len())
    }
}

fn collect(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect(&path, files)?;
        } else if DocumentFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    Ok(())
}

impl Extractor for DirectoryReader {
    type Item = PathBuf;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        self.files()
    }
}

/// Writes envelopes as `<dir>/<name>.<ext>`.
pub struct DirectoryWriter {
    path: PathBuf,
    format: DocumentFormat,
}

impl DirectoryWriter {
    pub fn new(path: impl AsRef<Path>, format: DocumentFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        Ok(Self { path, format })
    }

    /// File path for an envelope. Nameless kinds use their directory name.
    pub fn path_for(&self, envelope: &ManifestEnvelope) -> PathBuf {
        let stem = match envelope.name() {
            "" => envelope.kind.directory().unwrap_or("resource").to_string(),
            name => safe_file_name(name),
        };
        self.path
            .join(format!("{}.{}", stem, self.format.extension()))
    }

    pub fn write(&self, envelope: &ManifestEnvelope) -> Result<PathBuf> {
        let path = self.path_for(envelope);
        let text = self.format.render(&envelope.to_value())?;
        std::fs::write(&path, text)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }

    pub fn write_all(&self, envelopes: &[ManifestEnvelope]) -> Result<usize> {
        for envelope in envelopes {
            self.write(envelope)?;
        }
        Ok(envelopes.len())
    }
}

#[async_trait]
impl Loader for DirectoryWriter {
    type Item = ManifestEnvelope;

    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        self.write_all(&items)
    }
}
