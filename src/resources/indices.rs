use super::{CreateApi, DeleteApi, ListApi, OK, all_if_empty, check, delete_resource, find_exact, put_resource};
use crate::client::{Result, Transport};
use crate::types::Index;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

const CAT_COLUMNS: &str =
    "index,health,status,uuid,pri,rep,docs.count,docs.deleted,store.size,pri.store.size";

/// Indices via `_cat/indices` and `PUT|DELETE /{index}`.
pub struct Indices {
    transport: Arc<dyn Transport>,
}

impl Indices {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl ListApi for Indices {
    type Resource = Index;

    async fn list(&self, pattern: &str) -> Result<Vec<Index>> {
        let pattern = all_if_empty(pattern, "_all");
        let path = format!("/_cat/indices/{}?format=json&h={}", pattern, CAT_COLUMNS);
        let response = check(self.transport.get(&path).await?, OK, "error getting indices")?;
        response.json()
    }

    /// `list(name)` followed by an exact-name scan.
    async fn get(&self, name: &str) -> Result<Index> {
        let indices = self.list(name).await?;
        find_exact(indices, name, "index")
    }
}

#[async_trait]
impl CreateApi for Indices {
    async fn create(&self, name: &str, body: Option<&Value>) -> Result<()> {
        put_resource(
            self.transport.as_ref(),
            &format!("/{}", name),
            body,
            "error creating index",
        )
        .await
    }
}

#[async_trait]
impl DeleteApi for Indices {
    async fn delete(&self, name: &str) -> Result<()> {
        delete_resource(self.transport.as_ref(), &format!("/{}", name), "error deleting index").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::RecordingTransport;
    use serde_json::json;

    const ALL: &str = "/_cat/indices/_all";

    #[tokio::test]
    async fn test_empty_and_star_patterns_are_the_same_request() {
        let transport = Arc::new(RecordingTransport::new().on(
            "GET",
            ALL,
            200,
            r#"[{"index":"a"},{"index":"b"}]"#,
        ));
        let indices = Indices::new(transport.clone());

        let empty = indices.list("").await.unwrap();
        let star = indices.list("*").await.unwrap();
        assert_eq!(empty, star);
        assert_eq!(empty.len(), 2);

        let requests = transport.requests();
        assert_eq!(requests[0].path, requests[1].path);
        assert!(requests[0].path.starts_with("/_cat/indices/_all?format=json&h=index,"));
    }

    #[tokio::test]
    async fn test_get_returns_exact_match_not_prefix() {
        let transport = Arc::new(RecordingTransport::new().on_json(
            "GET",
            "/_cat/indices/myindex",
            200,
            json!([{"index": "myindex-2"}, {"index": "myindex", "docs.count": "7"}]),
        ));
        let index = Indices::new(transport).get("myindex").await.unwrap();
        assert_eq!(index.name, "myindex");
        assert_eq!(index.docs_count, "7");
    }

    #[tokio::test]
    async fn test_get_fails_when_only_prefix_matches() {
        let transport = Arc::new(RecordingTransport::new().on_json(
            "GET",
            "/_cat/indices/myindex",
            200,
            json!([{"index": "myindex-2"}]),
        ));
        let err = Indices::new(transport).get("myindex").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_create_accepts_201_with_empty_body() {
        let transport = Arc::new(RecordingTransport::new().on("PUT", "/logs-2024", 201, ""));
        Indices::new(transport.clone())
            .create("logs-2024", None)
            .await
            .unwrap();
        assert_eq!(transport.requests()[0].body, None);
    }

    #[tokio::test]
    async fn test_create_surfaces_error_body() {
        let transport = Arc::new(RecordingTransport::new().on(
            "PUT",
            "/logs-2024",
            400,
            r#"{"error":"already_exists"}"#,
        ));
        let err = Indices::new(transport)
            .create("logs-2024", None)
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(400));
        assert!(err.to_string().contains(r#"{"error":"already_exists"}"#));
    }

    #[tokio::test]
    async fn test_delete_requires_200() {
        let transport = Arc::new(
            RecordingTransport::new()
                .on("DELETE", "/old", 200, r#"{"acknowledged":true}"#)
                .on("DELETE", "/gone", 404, r#"{"error":"index_not_found_exception"}"#),
        );
        let indices = Indices::new(transport);
        indices.delete("old").await.unwrap();
        let err = indices.delete("gone").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
