use super::{OK, check};
use crate::client::{Result, Transport};
use crate::types::{
    AllocationExplainRequest, AllocationExplanation, ClusterHealth, ClusterInfo, ClusterSettings,
    ClusterState, ClusterStats, PendingTasks, RerouteOptions, Shard,
};
use serde_json::{Value, json};
use std::sync::Arc;

const SHARD_COLUMNS: &str = "index,shard,prirep,state,docs,store,ip,node,unassigned.reason";

/// Cluster-wide endpoints.
pub struct Cluster {
    transport: Arc<dyn Transport>,
}

/// Append `?k=v&...` when there are any query pairs.
fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{}?{}", path, query)
}

impl Cluster {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        check(self.transport.get(path).await?, OK, context)?.json()
    }

    pub async fn health(&self) -> Result<ClusterHealth> {
        self.get_json("/_cluster/health", "error getting cluster health")
            .await
    }

    pub async fn info(&self) -> Result<ClusterInfo> {
        self.get_json("/", "error getting cluster info").await
    }

    pub async fn stats(&self) -> Result<ClusterStats> {
        self.get_json("/_cluster/stats", "error getting cluster stats")
            .await
    }

    /// `GET /_cluster/state[/{metrics}[/{indices}]]`. Indices without metrics
    /// select `_all` metrics.
    pub async fn state(
        &self,
        metrics: &[String],
        indices: Option<&str>,
        master_timeout: Option<&str>,
    ) -> Result<ClusterState> {
        let mut path = "/_cluster/state".to_string();
        let indices = indices.map(str::trim).filter(|i| !i.is_empty());
        if !metrics.is_empty() || indices.is_some() {
            let metrics = if metrics.is_empty() {
                "_all".to_string()
            } else {
                metrics.join(",")
            };
            path.push('/');
            path.push_str(&metrics);
        }
        if let Some(indices) = indices {
            path.push('/');
            path.push_str(indices);
        }
        let mut query = Vec::new();
        if let Some(timeout) = master_timeout.filter(|t| !t.is_empty()) {
            query.push(("master_timeout", timeout));
        }
        self.get_json(&with_query(&path, &query), "error getting cluster state")
            .await
    }

    pub async fn pending_tasks(&self) -> Result<PendingTasks> {
        self.get_json("/_cluster/pending_tasks", "error getting pending tasks")
            .await
    }

    /// Rows of `_cat/shards`, optionally for one index pattern.
    pub async fn shards(&self, pattern: &str) -> Result<Vec<Shard>> {
        let pattern = match pattern.trim() {
            "" => String::new(),
            p => format!("/{}", p),
        };
        let path = format!("/_cat/shards{}?format=json&h={}", pattern, SHARD_COLUMNS);
        self.get_json(&path, "error getting shards").await
    }

    /// `POST /_cluster/allocation/explain`. An empty request sends no body,
    /// which explains the first unassigned shard.
    pub async fn explain_allocation(
        &self,
        request: &AllocationExplainRequest,
        include_yes_decisions: bool,
        include_disk_info: bool,
    ) -> Result<AllocationExplanation> {
        let mut query = Vec::new();
        if include_yes_decisions {
            query.push(("include_yes_decisions", "true"));
        }
        if include_disk_info {
            query.push(("include_disk_info", "true"));
        }
        let path = with_query("/_cluster/allocation/explain", &query);
        let body = if request.is_empty() {
            None
        } else {
            Some(serde_json::to_value(request)?)
        };
        let response = self.transport.post(&path, body.as_ref()).await?;
        check(response, OK, "error explaining allocation")?.json()
    }

    /// `POST /_cluster/reroute` with `{"commands": [...]}`.
    pub async fn reroute(&self, commands: &[Value], options: RerouteOptions) -> Result<Value> {
        let mut query = Vec::new();
        if options.dry_run {
            query.push(("dry_run", "true"));
        }
        if options.explain {
            query.push(("explain", "true"));
        }
        if options.retry_failed {
            query.push(("retry_failed", "true"));
        }
        let path = with_query("/_cluster/reroute", &query);
        let body = json!({ "commands": commands });
        let response = self.transport.post(&path, Some(&body)).await?;
        check(response, OK, "error rerouting cluster")?.json()
    }

    pub async fn settings(&self) -> Result<ClusterSettings> {
        self.get_json("/_cluster/settings", "error getting cluster settings")
            .await
    }

    /// `PUT /_cluster/settings`. Only 200 is success.
    pub async fn update_settings(&self, body: &Value) -> Result<()> {
        let response = self.transport.put("/_cluster/settings", Some(body)).await?;
        check(response, OK, "error updating cluster settings")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::RecordingTransport;

    #[tokio::test]
    async fn test_health_and_info() {
        let transport = Arc::new(
            RecordingTransport::new()
                .on_json(
                    "GET",
                    "/_cluster/health",
                    200,
                    json!({"cluster_name": "prod", "status": "yellow", "number_of_nodes": 3, "unassigned_shards": 2}),
                )
                .on_json(
                    "GET",
                    "/",
                    200,
                    json!({"name": "n1", "cluster_name": "prod", "version": {"number": "2.11.0", "distribution": "opensearch"}}),
                ),
        );
        let cluster = Cluster::new(transport);
        let health = cluster.health().await.unwrap();
        assert_eq!(health.status, "yellow");
        assert_eq!(health.unassigned_shards, 2);

        let info = cluster.info().await.unwrap();
        assert_eq!(info.version_number(), "2.11.0");
        assert_eq!(info.distribution(), "opensearch");
    }

    #[tokio::test]
    async fn test_state_path_building() {
        let transport = Arc::new(RecordingTransport::new());
        let cluster = Cluster::new(transport.clone());
        let metrics = vec!["metadata".to_string(), "blocks".to_string()];
        let _ = cluster.state(&metrics, Some("logs-*"), Some("30s")).await;
        let _ = cluster.state(&[], Some("logs-*"), None).await;
        let _ = cluster.state(&[], None, None).await;
        assert_eq!(
            transport.lines(),
            vec![
                "GET /_cluster/state/metadata,blocks/logs-*?master_timeout=30s",
                "GET /_cluster/state/_all/logs-*",
                "GET /_cluster/state",
            ]
        );
    }

    #[tokio::test]
    async fn test_reroute_flags_and_body() {
        let transport = Arc::new(RecordingTransport::new().on(
            "POST",
            "/_cluster/reroute?dry_run=true&retry_failed=true",
            200,
            r#"{"acknowledged":true}"#,
        ));
        let commands = vec![json!({"move": {"index": "a", "shard": 0, "from_node": "n1", "to_node": "n2"}})];
        let options = RerouteOptions {
            dry_run: true,
            retry_failed: true,
            ..Default::default()
        };
        Cluster::new(transport.clone())
            .reroute(&commands, options)
            .await
            .unwrap();
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"commands": commands}))
        );
    }

    #[tokio::test]
    async fn test_explain_allocation_query_and_body() {
        let transport = Arc::new(RecordingTransport::new().on_json(
            "POST",
            "/_cluster/allocation/explain?include_yes_decisions=true&include_disk_info=true",
            200,
            json!({"index": "logs", "shard": 0, "primary": true, "current_state": "unassigned", "can_allocate": "no"}),
        ));
        let request = AllocationExplainRequest {
            index: Some("logs".to_string()),
            shard: Some(0),
            primary: Some(true),
        };
        let explanation = Cluster::new(transport.clone())
            .explain_allocation(&request, true, true)
            .await
            .unwrap();
        assert_eq!(explanation.can_allocate, "no");
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"index": "logs", "shard": 0, "primary": true}))
        );
    }

    #[tokio::test]
    async fn test_empty_explain_sends_no_body() {
        let transport = Arc::new(RecordingTransport::new().on(
            "POST",
            "/_cluster/allocation/explain",
            200,
            r#"{"index":"x","shard":1,"primary":false,"current_state":"unassigned"}"#,
        ));
        Cluster::new(transport.clone())
            .explain_allocation(&AllocationExplainRequest::default(), false, false)
            .await
            .unwrap();
        assert_eq!(transport.requests()[0].body, None);
    }

    #[tokio::test]
    async fn test_shards_path() {
        let transport = Arc::new(RecordingTransport::new().on(
            "GET",
            "/_cat/shards/logs",
            200,
            r#"[{"index":"logs","shard":"0","prirep":"p","state":"STARTED","docs":"10","store":null,"ip":"10.0.0.1","node":"n1"}]"#,
        ));
        let shards = Cluster::new(transport.clone()).shards("logs").await.unwrap();
        assert_eq!(shards[0].state, "STARTED");
        assert_eq!(shards[0].store, "");
        assert!(transport.lines()[0].starts_with("GET /_cat/shards/logs?format=json&h=index,"));
    }

    #[tokio::test]
    async fn test_update_settings_requires_200() {
        let transport = Arc::new(RecordingTransport::new().on(
            "PUT",
            "/_cluster/settings",
            201,
            "{}",
        ));
        let err = Cluster::new(transport)
            .update_settings(&json!({"persistent": {}}))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(201));
    }
}
