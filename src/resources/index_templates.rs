use super::{CreateApi, DeleteApi, ListApi, OK, all_if_empty, check, delete_resource, put_resource};
use crate::client::{ClientError, Result, Transport};
use crate::types::IndexTemplate;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    index_templates: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    name: String,
    #[serde(default)]
    index_template: Map<String, Value>,
}

/// Composable index templates via `/_index_template`.
pub struct IndexTemplates {
    transport: Arc<dyn Transport>,
}

impl IndexTemplates {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn fetch(&self, pattern: &str, context: &str) -> Result<Vec<IndexTemplate>> {
        let path = format!("/_index_template/{}", pattern);
        let response = check(self.transport.get(&path).await?, OK, context)?;
        let listing: Listing = response.json()?;
        Ok(listing
            .index_templates
            .into_iter()
            .map(|entry| IndexTemplate {
                name: entry.name,
                body: entry.index_template,
            })
            .collect())
    }
}

#[async_trait]
impl ListApi for IndexTemplates {
    type Resource = IndexTemplate;

    async fn list(&self, pattern: &str) -> Result<Vec<IndexTemplate>> {
        self.fetch(all_if_empty(pattern, "*"), "error getting index templates")
            .await
    }

    async fn get(&self, name: &str) -> Result<IndexTemplate> {
        self.fetch(name, "error getting index template")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ClientError::not_found("index template", name))
    }
}

#[async_trait]
impl CreateApi for IndexTemplates {
    async fn create(&self, name: &str, body: Option<&Value>) -> Result<()> {
        put_resource(
            self.transport.as_ref(),
            &format!("/_index_template/{}", name),
            body,
            "error creating index template",
        )
        .await
    }
}

#[async_trait]
impl DeleteApi for IndexTemplates {
    async fn delete(&self, name: &str) -> Result<()> {
        delete_resource(
            self.transport.as_ref(),
            &format!("/_index_template/{}", name),
            "error deleting index template",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::RecordingTransport;
    use serde_json::json;

    fn listing() -> Value {
        json!({
            "index_templates": [
                {"name": "logs", "index_template": {"index_patterns": ["logs-*"], "composed_of": ["base"]}},
                {"name": "metrics", "index_template": {"index_patterns": ["metrics-*"], "priority": 10}}
            ]
        })
    }

    #[tokio::test]
    async fn test_list_unwraps_named_entries() {
        let transport = Arc::new(RecordingTransport::new().on_json(
            "GET",
            "/_index_template/*",
            200,
            listing(),
        ));
        let templates = IndexTemplates::new(transport.clone()).list("").await.unwrap();
        assert_eq!(templates.len(), 2);
        assert_eq!(templates[0].name, "logs");
        assert_eq!(templates[0].composed_of(), vec!["base"]);
        assert_eq!(templates[1].priority(), Some(10));
        assert_eq!(transport.lines(), vec!["GET /_index_template/*"]);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let transport = Arc::new(RecordingTransport::new().on(
            "GET",
            "/_index_template/nope",
            200,
            r#"{"index_templates":[]}"#,
        ));
        let err = IndexTemplates::new(transport).get("nope").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_create_sends_body() {
        let transport = Arc::new(RecordingTransport::new().on(
            "PUT",
            "/_index_template/logs",
            200,
            r#"{"acknowledged":true}"#,
        ));
        let body = json!({"index_patterns": ["logs-*"]});
        IndexTemplates::new(transport.clone())
            .create("logs", Some(&body))
            .await
            .unwrap();
        assert_eq!(transport.requests()[0].body, Some(body));
    }
}
