//! Composition root for the resource sub-clients

use super::{Auth, HttpTransport, Result, Transport, TransportOptions};
use crate::resources::{
    Cluster, ComponentTemplates, DataStreams, IndexTemplates, Indices, Ingest, LifecyclePolicies,
    Nodes,
};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Everything needed to reach one cluster.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub url: Url,
    pub auth: Auth,
    pub insecure: bool,
    pub timeout: Duration,
}

/// Entry point for talking to a cluster.
///
/// Every sub-client shares the same transport. Sub-clients are cheap handles
/// created on each accessor call and hold no state of their own.
///
/// # Example
/// ```no_run
/// use searchctl::client::{Clientset, testing::RecordingTransport};
/// use std::sync::Arc;
///
/// # async fn example() -> eyre::Result<()> {
/// let transport = RecordingTransport::new().on("GET", "/_cluster/health", 200, r#"{"status":"green"}"#);
/// let clientset = Clientset::new(Arc::new(transport));
/// let health = clientset.cluster().health().await?;
/// assert_eq!(health.status, "green");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Clientset {
    transport: Arc<dyn Transport>,
}

impl Clientset {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Build a clientset backed by [`HttpTransport`].
    pub fn try_new(settings: &ConnectionSettings) -> Result<Self> {
        let options = TransportOptions {
            insecure_skip_tls_verify: settings.insecure,
            timeout: settings.timeout,
        };
        let transport = HttpTransport::try_new(settings.url.clone(), &settings.auth, options)?;
        Ok(Self::new(Arc::new(transport)))
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    pub fn cluster(&self) -> Cluster {
        Cluster::new(self.transport())
    }

    pub fn indices(&self) -> Indices {
        Indices::new(self.transport())
    }

    pub fn index_templates(&self) -> IndexTemplates {
        IndexTemplates::new(self.transport())
    }

    pub fn component_templates(&self) -> ComponentTemplates {
        ComponentTemplates::new(self.transport())
    }

    pub fn lifecycle_policies(&self) -> LifecyclePolicies {
        LifecyclePolicies::new(self.transport())
    }

    pub fn data_streams(&self) -> DataStreams {
        DataStreams::new(self.transport())
    }

    pub fn nodes(&self) -> Nodes {
        Nodes::new(self.transport())
    }

    pub fn ingest(&self) -> Ingest {
        Ingest::new(self.transport())
    }
}
