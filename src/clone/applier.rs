//! Dispatch of resource envelopes to the matching create call

use crate::client::{Clientset, Result as ClientResult};
use crate::document::{ManifestEnvelope, ResourceKind};
use crate::etl::Loader;
use crate::resources::CreateApi;
use async_trait::async_trait;
use eyre::{Context, Result};
use owo_colors::OwoColorize;
use serde_json::Value;

/// Creates or updates resources on a cluster from envelopes.
pub struct ClusterApplier {
    clientset: Clientset,
}

impl ClusterApplier {
    pub fn new(clientset: Clientset) -> Self {
        Self { clientset }
    }

    /// Apply one envelope.
    pub async fn apply(&self, envelope: &ManifestEnvelope) -> ClientResult<()> {
        let name = envelope.name();
        let body = envelope.create_body();
        log::debug!("Applying {}/{}", envelope.kind, name.cyan());
        match envelope.kind {
            ResourceKind::ComponentTemplate => {
                self.clientset
                    .component_templates()
                    .create(name, Some(&body))
                    .await
            }
            ResourceKind::IndexTemplate => {
                self.clientset
                    .index_templates()
                    .create(name, Some(&body))
                    .await
            }
            ResourceKind::LifecyclePolicy => {
                self.clientset
                    .lifecycle_policies()
                    .create(name, Some(&body))
                    .await
            }
            ResourceKind::IngestPipeline => {
                self.clientset.ingest().create(name, Some(&body)).await
            }
            ResourceKind::ClusterSettings => self.clientset.cluster().update_settings(&body).await,
            ResourceKind::Index => {
                self.clientset
                    .indices()
                    .create(name, non_empty(&body))
                    .await
            }
            ResourceKind::DataStream => self.clientset.data_streams().create(name).await,
        }
    }
}

/// An empty mapping means "no body".
fn non_empty(body: &Value) -> Option<&Value> {
    match body {
        Value::Object(map) if map.is_empty() => None,
        Value::Null => None,
        _ => Some(body),
    }
}

/// Display label for an envelope: `Kind/name`, or just `Kind` for
/// singletons.
pub fn label(envelope: &ManifestEnvelope) -> String {
    match envelope.name() {
        "" => envelope.kind.to_string(),
        name => format!("{}/{}", envelope.kind, name),
    }
}

#[async_trait]
impl Loader for ClusterApplier {
    type Item = ManifestEnvelope;

    /// Applies in order and stops at the first failure.
    async fn load(&self, items: Vec<Self::Item>) -> Result<usize> {
        for envelope in &items {
            self.apply(envelope)
                .await
                .with_context(|| format!("Failed to apply {}", label(envelope)))?;
        }
        Ok(items.len())
    }
}
