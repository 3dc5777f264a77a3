//! Directory tree to cluster

use super::applier::{ClusterApplier, label};
use crate::batch::BatchReport;
use crate::document::{ManifestEnvelope, Normalizer, ResourceKind, read_document};
use crate::etl::{Extractor, Transformer};
use crate::storage::{DirectoryReader, ManifestDirectory};
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};

/// Reads a file into an envelope: parse by extension, normalize, then
/// extract `kind`, `metadata.name` and `spec`.
pub struct DocumentLoader {
    fallback_kind: Option<ResourceKind>,
    normalizer: Normalizer,
}

impl DocumentLoader {
    pub fn new(fallback_kind: Option<ResourceKind>, strict: bool) -> Self {
        Self {
            fallback_kind,
            normalizer: Normalizer::new(strict),
        }
    }
}

impl Transformer for DocumentLoader {
    type Input = PathBuf;
    type Output = ManifestEnvelope;

    fn transform(&self, path: Self::Input) -> Result<Self::Output> {
        let raw = read_document(&path)?;
        let value = self
            .normalizer
            .transform(raw)
            .with_context(|| format!("Invalid document: {}", path.display()))?;
        let envelope = ManifestEnvelope::from_document(value, self.fallback_kind)
            .with_context(|| format!("Invalid document: {}", path.display()))?;
        Ok(envelope)
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub kinds: Vec<ResourceKind>,
    pub continue_on_error: bool,
    pub dry_run: bool,
    pub strict: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            kinds: ResourceKind::CLONE_ORDER.to_vec(),
            continue_on_error: false,
            dry_run: false,
            strict: false,
        }
    }
}

/// Applies an export tree to a cluster in dependency order.
pub struct Importer {
    applier: ClusterApplier,
}

impl Importer {
    pub fn new(applier: ClusterApplier) -> Self {
        Self { applier }
    }

    /// Files are handled one at a time in lexicographic order within each
    /// type directory. Without `continue_on_error` the first failing file
    /// aborts the import. A dry run reads and validates but sends nothing.
    pub async fn import(&self, dir: impl AsRef<Path>, options: &ImportOptions) -> Result<BatchReport> {
        let root = ManifestDirectory::new(dir);
        if !root.path().is_dir() {
            eyre::bail!("Import directory not found: {}", root.path().display());
        }
        let mut report = BatchReport::new();

        for kind in ResourceKind::CLONE_ORDER {
            if !options.kinds.contains(&kind) {
                continue;
            }
            let files = DirectoryReader::new(root.type_dir(kind)).extract().await?;
            log::debug!("Found {} files for {}", files.len(), kind.cyan());
            let loader = DocumentLoader::new(Some(kind), options.strict);

            for file in files {
                let display = file.display().to_string();
                let outcome = self.import_one(&loader, file, options.dry_run).await;
                match outcome {
                    Ok(Outcome::Applied(label)) => {
                        log::info!("Applied {}", label.green());
                        report.succeed(label);
                    }
                    Ok(Outcome::Planned(label)) => {
                        report.plan(format!("{} from {}", label, display));
                    }
                    Err(err) if options.continue_on_error => {
                        report.fail(display, format!("{:#}", err));
                    }
                    Err(err) => return Err(err.wrap_err(format!("Failed to import {}", display))),
                }
            }
        }

        Ok(report)
    }

    async fn import_one(&self, loader: &DocumentLoader, file: PathBuf, dry_run: bool) -> Result<Outcome> {
        let envelope = loader.transform(file)?;
        let label = label(&envelope);
        if dry_run {
            return Ok(Outcome::Planned(label));
        }
        self.applier.apply(&envelope).await?;
        Ok(Outcome::Applied(label))
    }
}

enum Outcome {
    Applied(String),
    Planned(String),
}
