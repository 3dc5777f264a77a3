use super::{CreateApi, DeleteApi, ListApi, OK, check, delete_resource, put_resource};
use crate::client::{ClientError, Result, Transport};
use crate::types::IngestPipeline;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Ingest pipelines via `/_ingest/pipeline`.
///
/// Clusters without ingest pipelines answer a listing with 404 (or an empty
/// error body); both read as "no pipelines".
pub struct Ingest {
    transport: Arc<dyn Transport>,
}

impl Ingest {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

/// The API answers an object keyed by pipeline id.
fn unwrap_pipelines(body: Map<String, Value>) -> Vec<IngestPipeline> {
    body.into_iter()
        .map(|(name, definition)| IngestPipeline {
            name,
            body: match definition {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        })
        .collect()
}

#[async_trait]
impl ListApi for Ingest {
    type Resource = IngestPipeline;

    async fn list(&self, pattern: &str) -> Result<Vec<IngestPipeline>> {
        let path = match pattern.trim() {
            "" | "*" => "/_ingest/pipeline".to_string(),
            pattern => format!("/_ingest/pipeline/{}", pattern),
        };
        let response = self.transport.get(&path).await?;
        if response.status == 404 || (!response.is_success() && response.is_empty_body()) {
            return Ok(Vec::new());
        }
        let response = check(response, OK, "error getting ingest pipelines")?;
        Ok(unwrap_pipelines(response.json()?))
    }

    async fn get(&self, name: &str) -> Result<IngestPipeline> {
        let response = self
            .transport
            .get(&format!("/_ingest/pipeline/{}", name))
            .await?;
        if response.status == 404 {
            return Err(ClientError::not_found("ingest pipeline", name));
        }
        let response = check(response, OK, "error getting ingest pipeline")?;
        unwrap_pipelines(response.json()?)
            .into_iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ClientError::not_found("ingest pipeline", name))
    }
}

#[async_trait]
impl CreateApi for Ingest {
    async fn create(&self, name: &str, body: Option<&Value>) -> Result<()> {
        put_resource(
            self.transport.as_ref(),
            &format!("/_ingest/pipeline/{}", name),
            body,
            "error creating ingest pipeline",
        )
        .await
    }
}

#[async_trait]
impl DeleteApi for Ingest {
    async fn delete(&self, name: &str) -> Result<()> {
        delete_resource(
            self.transport.as_ref(),
            &format!("/_ingest/pipeline/{}", name),
            "error deleting ingest pipeline",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::RecordingTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_list_all_uses_bare_path() {
        let transport = Arc::new(RecordingTransport::new().on_json(
            "GET",
            "/_ingest/pipeline",
            200,
            json!({"geoip": {"description": "add geo", "processors": [{"geoip": {}}]}}),
        ));
        let ingest = Ingest::new(transport.clone());
        let empty = ingest.list("").await.unwrap();
        let star = ingest.list("*").await.unwrap();
        assert_eq!(empty, star);
        assert_eq!(empty[0].name, "geoip");
        assert_eq!(empty[0].processor_count(), 1);
        assert_eq!(
            transport.lines(),
            vec!["GET /_ingest/pipeline", "GET /_ingest/pipeline"]
        );
    }

    #[tokio::test]
    async fn test_missing_listing_is_empty() {
        let transport = Arc::new(
            RecordingTransport::new()
                .on("GET", "/_ingest/pipeline", 404, "{}")
                .on("GET", "/_ingest/pipeline/x*", 500, "{}"),
        );
        let ingest = Ingest::new(transport);
        assert!(ingest.list("").await.unwrap().is_empty());
        assert!(ingest.list("x*").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_real_error_is_surfaced() {
        let transport = Arc::new(RecordingTransport::new().on(
            "GET",
            "/_ingest/pipeline",
            401,
            r#"{"error":"unauthorized"}"#,
        ));
        let err = Ingest::new(transport).list("").await.unwrap_err();
        assert_eq!(err.http_status(), Some(401));
    }

    #[tokio::test]
    async fn test_get_404_is_not_found() {
        let transport = Arc::new(RecordingTransport::new());
        let err = Ingest::new(transport).get("nope").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound { .. }));
    }
}
