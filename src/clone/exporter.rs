//! Cluster to directory tree

use crate::batch::BatchReport;
use crate::client::{ClientError, Clientset};
use crate::document::{DocumentFormat, ManifestEnvelope, ResourceKind};
use crate::etl::{Extractor, Pipeline, Transformer};
use crate::pattern::{WildcardPattern, matches_any};
use crate::resources::ListApi;
use crate::storage::{DirectoryWriter, ManifestDirectory};
use crate::types::Named;
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::{Map, Value, json};
use std::path::Path;

/// What to export.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub kinds: Vec<ResourceKind>,
    /// Name patterns (`*` wildcards) a resource must match one of; empty
    /// means everything.
    pub names: Vec<String>,
    pub include_system: bool,
    pub format: DocumentFormat,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            kinds: ResourceKind::CLONE_ORDER.to_vec(),
            names: Vec::new(),
            include_system: false,
            format: DocumentFormat::Yaml,
        }
    }
}

/// A resource as fetched: its name and the body the cluster reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedResource {
    pub name: String,
    pub body: Value,
}

/// Lists one resource kind, keeping the names that match any pattern.
pub struct ResourceExtractor {
    clientset: Clientset,
    kind: ResourceKind,
    names: Vec<WildcardPattern>,
    include_system: bool,
}

impl ResourceExtractor {
    pub fn new(clientset: Clientset, kind: ResourceKind, include_system: bool) -> Self {
        Self {
            clientset,
            kind,
            names: Vec::new(),
            include_system,
        }
    }

    pub fn with_names(mut self, names: Vec<WildcardPattern>) -> Self {
        self.names = names;
        self
    }

    async fn fetch(&self) -> crate::client::Result<Vec<ExportedResource>> {
        match self.kind {
            ResourceKind::ComponentTemplate => {
                listed(&self.clientset.component_templates(), |t| {
                    Value::Object(t.body)
                })
                .await
            }
            ResourceKind::IndexTemplate => {
                listed(&self.clientset.index_templates(), |t| {
                    Value::Object(t.body)
                })
                .await
            }
            ResourceKind::LifecyclePolicy => {
                listed(&self.clientset.lifecycle_policies(), |p| p.policy).await
            }
            ResourceKind::IngestPipeline => {
                listed(&self.clientset.ingest(), |p| Value::Object(p.body)).await
            }
            ResourceKind::ClusterSettings => {
                let settings = self.clientset.cluster().settings().await?;
                Ok(vec![ExportedResource {
                    name: String::new(),
                    body: json!({
                        "persistent": settings.persistent,
                        "transient": settings.transient,
                    }),
                }])
            }
            ResourceKind::Index | ResourceKind::DataStream => Ok(Vec::new()),
        }
    }
}

/// Everything of one family; name filtering happens client-side.
async fn listed<A, F>(api: &A, body: F) -> crate::client::Result<Vec<ExportedResource>>
where
    A: ListApi,
    F: Fn(A::Resource) -> Value,
{
    Ok(api
        .list("")
        .await?
        .into_iter()
        .map(|resource| ExportedResource {
            name: resource.name().to_string(),
            body: body(resource),
        })
        .collect())
}

impl Extractor for ResourceExtractor {
    type Item = ExportedResource;

    async fn extract(&self) -> Result<Vec<Self::Item>> {
        let mut resources = self.fetch().await?;
        if !self.include_system {
            resources.retain(|r| !r.name.starts_with('.'));
        }
        if self.kind.requires_name() {
            resources.retain(|r| matches_any(&self.names, &r.name));
        }
        Ok(resources)
    }
}

/// Wraps fetched bodies into envelopes. Lifecycle policies are stored as
/// `{"policy": ...}` so the file can be sent back unchanged.
pub struct EnvelopeBuilder {
    kind: ResourceKind,
}

impl EnvelopeBuilder {
    pub fn new(kind: ResourceKind) -> Self {
        Self { kind }
    }
}

impl Transformer for EnvelopeBuilder {
    type Input = ExportedResource;
    type Output = ManifestEnvelope;

    fn transform(&self, input: Self::Input) -> Result<Self::Output> {
        let spec = match (self.kind, input.body) {
            (ResourceKind::LifecyclePolicy, policy) => json!({ "policy": policy }),
            (_, Value::Object(map)) => Value::Object(map),
            (_, Value::Null) => Value::Object(Map::new()),
            (_, other) => other,
        };
        Ok(ManifestEnvelope::new(self.kind, input.name, spec))
    }
}

/// Writes selected resource kinds from a cluster into an export tree.
pub struct Exporter {
    clientset: Clientset,
}

impl Exporter {
    pub fn new(clientset: Clientset) -> Self {
        Self { clientset }
    }

    /// Export into `dir`. The marker file is always written. A kind whose
    /// endpoint the cluster lacks is skipped; any other failure is recorded
    /// and the remaining kinds still run.
    pub async fn export(&self, dir: impl AsRef<Path>, options: &ExportOptions) -> Result<BatchReport> {
        let root = ManifestDirectory::create(dir)?;
        let mut report = BatchReport::new();
        let names = options
            .names
            .iter()
            .map(|name| WildcardPattern::new(name))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid --names pattern")?;

        for kind in ResourceKind::CLONE_ORDER {
            if !options.kinds.contains(&kind) {
                continue;
            }
            let Some(directory) = kind.directory() else {
                continue;
            };
            let writer = DirectoryWriter::new(root.type_dir(kind), options.format)?;
            let pipeline = Pipeline::new(
                ResourceExtractor::new(self.clientset.clone(), kind, options.include_system)
                    .with_names(names.clone()),
                EnvelopeBuilder::new(kind),
                writer,
            )
            .labeled(directory);

            match pipeline.run().await {
                Ok(count) => report.succeed(format!("{} {}", count, directory)),
                Err(err) if is_missing_endpoint(&err) => {
                    log::warn!("Skipping {}: endpoint not available", directory.yellow());
                    report.skip(directory);
                }
                Err(err) => report.fail(kind.to_string(), format!("{:#}", err)),
            }
        }

        log::info!("Exported resources to {}", root.path().display().cyan());
        Ok(report)
    }
}

fn is_missing_endpoint(err: &eyre::Report) -> bool {
    err.downcast_ref::<ClientError>()
        .is_some_and(ClientError::is_missing_endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::RecordingTransport;
    use crate::document::{normalize, read_document};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_envelope_builder_wraps_policies() {
        let envelope = EnvelopeBuilder::new(ResourceKind::LifecyclePolicy)
            .transform(ExportedResource {
                name: "hot".to_string(),
                body: json!({"phases": {"hot": {}}}),
            })
            .unwrap();
        assert_eq!(envelope.spec, json!({"policy": {"phases": {"hot": {}}}}));

        let envelope = EnvelopeBuilder::new(ResourceKind::IngestPipeline)
            .transform(ExportedResource {
                name: "geo".to_string(),
                body: json!({"processors": []}),
            })
            .unwrap();
        assert_eq!(envelope.spec, json!({"processors": []}));
    }

    #[tokio::test]
    async fn test_system_resources_are_filtered() {
        let transport = Arc::new(RecordingTransport::new().on_json(
            "GET",
            "/_ingest/pipeline",
            200,
            json!({".internal": {"processors": []}, "geo": {"processors": []}}),
        ));
        let clientset = Clientset::new(transport);
        let without = ResourceExtractor::new(clientset.clone(), ResourceKind::IngestPipeline, false)
            .extract()
            .await
            .unwrap();
        assert_eq!(without.len(), 1);
        assert_eq!(without[0].name, "geo");

        let with = ResourceExtractor::new(clientset, ResourceKind::IngestPipeline, true)
            .extract()
            .await
            .unwrap();
        assert_eq!(with.len(), 2);
    }

    #[tokio::test]
    async fn test_names_filter_one_listing_per_kind() {
        let transport = Arc::new(RecordingTransport::new().on_json(
            "GET",
            "/_index_template/*",
            200,
            json!({"index_templates": [
                {"name": "logs-app", "index_template": {"index_patterns": ["logs-app-*"]}},
                {"name": "metrics", "index_template": {"index_patterns": ["metrics-*"]}},
                {"name": "logs-db", "index_template": {"index_patterns": ["logs-db-*"]}},
                {"name": "base", "index_template": {"index_patterns": ["base-*"]}}
            ]}),
        ));
        let temp = TempDir::new().unwrap();
        let options = ExportOptions {
            kinds: vec![ResourceKind::IndexTemplate],
            names: vec!["logs-*".to_string(), "base".to_string()],
            ..Default::default()
        };
        let report = Exporter::new(Clientset::new(transport.clone()))
            .export(temp.path(), &options)
            .await
            .unwrap();

        assert_eq!(report.succeeded, vec!["3 index-templates"]);
        assert_eq!(transport.lines(), vec!["GET /_index_template/*"]);
        let dir = temp.path().join("index-templates");
        assert!(dir.join("logs-app.yaml").is_file());
        assert!(dir.join("logs-db.yaml").is_file());
        assert!(dir.join("base.yaml").is_file());
        assert!(!dir.join("metrics.yaml").exists());
    }

    #[tokio::test]
    async fn test_missing_endpoint_is_skipped() {
        let transport = Arc::new(
            RecordingTransport::new()
                .on("GET", "/_ilm/policy/*", 404, r#"{"error":"no handler found for uri"}"#)
                .on("GET", "/_plugins/_ism/policies", 404, r#"{"error":"no handler found for uri"}"#),
        );
        let temp = TempDir::new().unwrap();
        let options = ExportOptions {
            kinds: vec![ResourceKind::LifecyclePolicy],
            ..Default::default()
        };
        let report = Exporter::new(Clientset::new(transport))
            .export(temp.path(), &options)
            .await
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.skipped, vec!["lifecycle-policies"]);
        assert!(temp.path().join("manifest.yaml").is_file());
    }

    #[tokio::test]
    async fn test_other_failures_are_recorded() {
        let transport = Arc::new(
            RecordingTransport::new()
                .on("GET", "/_index_template/*", 500, r#"{"error":"boom"}"#)
                .on_json(
                    "GET",
                    "/_component_template/*",
                    200,
                    json!({"component_templates": [{"name": "base", "component_template": {"template": {}}}]}),
                ),
        );
        let temp = TempDir::new().unwrap();
        let options = ExportOptions {
            kinds: vec![ResourceKind::IndexTemplate, ResourceKind::ComponentTemplate],
            format: DocumentFormat::Json,
            ..Default::default()
        };
        let report = Exporter::new(Clientset::new(transport))
            .export(temp.path(), &options)
            .await
            .unwrap();
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "IndexTemplate");

        let written = temp.path().join("component-templates/base.json");
        let doc = normalize(read_document(written).unwrap());
        assert_eq!(doc["kind"], "ComponentTemplate");
        assert_eq!(doc["spec"], json!({"template": {}}));
    }
}
