use super::{CREATED, DeleteApi, ListApi, OK, all_if_empty, check, delete_resource};
use crate::client::{ClientError, Result, Transport};
use crate::types::{DataStream, RolloverResponse};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    data_streams: Vec<DataStream>,
}

/// Data streams via `/_data_stream`, plus rollover.
pub struct DataStreams {
    transport: Arc<dyn Transport>,
}

impl DataStreams {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Create a data stream. A matching index template with `data_stream`
    /// enabled must already exist; no body is sent.
    pub async fn create(&self, name: &str) -> Result<()> {
        let response = self
            .transport
            .put(&format!("/_data_stream/{}", name), None)
            .await?;
        check(response, CREATED, "error creating data stream")?;
        Ok(())
    }

    /// Roll `name` over to a new backing index.
    ///
    /// The request body carries `conditions` only when there are any; an
    /// empty body rolls over unconditionally. `lazy` defers the rollover to
    /// the next write.
    pub async fn rollover(
        &self,
        name: &str,
        conditions: &Map<String, Value>,
        lazy: bool,
    ) -> Result<RolloverResponse> {
        let mut path = format!("/{}/_rollover", name);
        if lazy {
            path.push_str("?lazy=true");
        }
        let body = if conditions.is_empty() {
            json!({})
        } else {
            json!({ "conditions": conditions })
        };
        let response = self.transport.post(&path, Some(&body)).await?;
        check(response, OK, "error rolling over data stream")?.json()
    }
}

#[async_trait]
impl ListApi for DataStreams {
    type Resource = DataStream;

    async fn list(&self, pattern: &str) -> Result<Vec<DataStream>> {
        let path = format!("/_data_stream/{}", all_if_empty(pattern, "*"));
        let response = check(self.transport.get(&path).await?, OK, "error getting data streams")?;
        let listing: Listing = response.json()?;
        Ok(listing.data_streams)
    }

    async fn get(&self, name: &str) -> Result<DataStream> {
        self.list(name)
            .await?
            .into_iter()
            .find(|ds| ds.name == name)
            .ok_or_else(|| ClientError::not_found("data stream", name))
    }
}

#[async_trait]
impl DeleteApi for DataStreams {
    async fn delete(&self, name: &str) -> Result<()> {
        delete_resource(
            self.transport.as_ref(),
            &format!("/_data_stream/{}", name),
            "error deleting data stream",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::RecordingTransport;

    #[tokio::test]
    async fn test_list_decodes_streams() {
        let transport = Arc::new(RecordingTransport::new().on_json(
            "GET",
            "/_data_stream/*",
            200,
            json!({"data_streams": [{
                "name": "logs-app",
                "timestamp_field": {"name": "@timestamp"},
                "indices": [{"index_name": ".ds-logs-app-000001", "index_uuid": "u1"}],
                "generation": 1,
                "status": "GREEN",
                "template": "logs",
                "lifecycle": {"enabled": true}
            }]}),
        ));
        let streams = DataStreams::new(transport).list("").await.unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].timestamp_field.name, "@timestamp");
        assert_eq!(streams[0].indices[0].index_name, ".ds-logs-app-000001");
        assert!(streams[0].extra.contains_key("lifecycle"));
    }

    #[tokio::test]
    async fn test_create_sends_no_body() {
        let transport = Arc::new(RecordingTransport::new().on(
            "PUT",
            "/_data_stream/logs-app",
            200,
            r#"{"acknowledged":true}"#,
        ));
        DataStreams::new(transport.clone()).create("logs-app").await.unwrap();
        assert_eq!(transport.requests()[0].body, None);
    }

    #[tokio::test]
    async fn test_rollover_with_conditions_and_lazy() {
        let transport = Arc::new(RecordingTransport::new().on_json(
            "POST",
            "/logs-app/_rollover?lazy=true",
            200,
            json!({"acknowledged": true, "old_index": "a", "new_index": "b", "rolled_over": false}),
        ));
        let mut conditions = Map::new();
        conditions.insert("max_age".to_string(), json!("7d"));

        let response = DataStreams::new(transport.clone())
            .rollover("logs-app", &conditions, true)
            .await
            .unwrap();
        assert_eq!(response.new_index, "b");
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"conditions": {"max_age": "7d"}}))
        );
    }

    #[tokio::test]
    async fn test_unconditional_rollover_sends_empty_object() {
        let transport = Arc::new(RecordingTransport::new().on(
            "POST",
            "/logs-app/_rollover",
            200,
            r#"{"rolled_over":true}"#,
        ));
        let response = DataStreams::new(transport.clone())
            .rollover("logs-app", &Map::new(), false)
            .await
            .unwrap();
        assert!(response.rolled_over);
        assert_eq!(transport.requests()[0].body, Some(json!({})));
    }
}
