//! Integration tests for the command handlers
//!
//! Handlers run against a recorded cluster and write into a buffer, the
//! same way the binary writes to stdout.

use eyre::Result;
use searchctl::cli::{self, NodeView, ResourceType, Session};
use searchctl::client::Clientset;
use searchctl::client::testing::RecordingTransport;
use searchctl::output::OutputFormat;
use searchctl::rollover::RolloverConditions;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn session(transport: &Arc<RecordingTransport>, output: OutputFormat) -> Session {
    Session::new(Clientset::new(transport.clone()), output).with_assume_yes(true)
}

fn write(dir: &Path, name: &str, text: &str) -> Result<std::path::PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, text)?;
    Ok(path)
}

#[tokio::test]
async fn test_wildcard_delete_issues_exactly_the_matching_deletes() -> Result<()> {
    let transport = Arc::new(
        RecordingTransport::new()
            .on_json(
                "GET",
                "/_cat/indices/_all",
                200,
                json!([
                    {"index": "logs-2024-01"},
                    {"index": "logs-2024-02"},
                    {"index": "metrics-2024-01"},
                    {"index": "logs"}
                ]),
            )
            .on("DELETE", "/logs-2024-01", 200, r#"{"acknowledged":true}"#)
            .on("DELETE", "/logs-2024-02", 200, r#"{"acknowledged":true}"#),
    );

    let mut out = Vec::new();
    cli::delete(
        &session(&transport, OutputFormat::Table),
        ResourceType::Indices,
        "logs-*",
        &mut out,
    )
    .await?;

    let deletes: Vec<String> = transport.mutations().iter().map(|r| r.line()).collect();
    assert_eq!(deletes, vec!["DELETE /logs-2024-01", "DELETE /logs-2024-02"]);
    Ok(())
}

#[tokio::test]
async fn test_wildcard_delete_reports_partial_failure() -> Result<()> {
    let transport = Arc::new(
        RecordingTransport::new()
            .on_json(
                "GET",
                "/_data_stream/*",
                200,
                json!({"data_streams": [{"name": "logs-a"}, {"name": "logs-b"}]}),
            )
            .on("DELETE", "/_data_stream/logs-a", 500, r#"{"error":"busy"}"#)
            .on("DELETE", "/_data_stream/logs-b", 200, "{}"),
    );

    let mut out = Vec::new();
    let err = cli::delete(
        &session(&transport, OutputFormat::Table),
        ResourceType::DataStreams,
        "logs-*",
        &mut out,
    )
    .await
    .unwrap_err();

    assert!(err.to_string().starts_with("1 of 2 operations failed"));
    assert_eq!(transport.mutations().len(), 2);
    assert!(String::from_utf8(out)?.contains("Data stream logs-b deleted"));
    Ok(())
}

#[tokio::test]
async fn test_rollover_file_conditions_override_flags() -> Result<()> {
    let temp = TempDir::new()?;
    let file = write(
        temp.path(),
        "conditions.yaml",
        "max_age: 7d\nmax_docs: 1000\n",
    )?;
    let transport = Arc::new(RecordingTransport::new().on_json(
        "POST",
        "/logs-app/_rollover",
        200,
        json!({"acknowledged": true, "rolled_over": false, "old_index": ".ds-logs-app-000001"}),
    ));
    let flags = RolloverConditions {
        max_age: Some("1d".to_string()),
        max_size: Some("50gb".to_string()),
        ..Default::default()
    };

    let mut out = Vec::new();
    cli::rollover(
        &session(&transport, OutputFormat::Table),
        "logs-app",
        &flags,
        Some(&file),
        false,
        &mut out,
    )
    .await?;

    let sent = transport.mutations();
    assert_eq!(
        sent[0].body,
        Some(json!({"conditions": {"max_age": "7d", "max_docs": 1000, "max_size": "50gb"}}))
    );
    assert!(String::from_utf8(out)?.contains("NO ROLLOVER NEEDED"));
    Ok(())
}

#[tokio::test]
async fn test_lazy_rollover_as_json() -> Result<()> {
    let transport = Arc::new(RecordingTransport::new().on_json(
        "POST",
        "/logs-app/_rollover?lazy=true",
        200,
        json!({"acknowledged": true, "rolled_over": false}),
    ));
    let mut out = Vec::new();
    cli::rollover(
        &session(&transport, OutputFormat::Json),
        "logs-app",
        &RolloverConditions::default(),
        None,
        true,
        &mut out,
    )
    .await?;
    assert_eq!(transport.mutations()[0].body, Some(json!({})));
    let printed: Value = serde_json::from_slice(&out)?;
    assert_eq!(printed["acknowledged"], json!(true));
    Ok(())
}

#[tokio::test]
async fn test_apply_dispatches_each_kind_to_its_endpoint() -> Result<()> {
    let temp = TempDir::new()?;
    let transport = Arc::new(
        RecordingTransport::new()
            .on("PUT", "/_index_template/logs", 200, "{}")
            .on("PUT", "/_ingest/pipeline/geo", 200, "{}")
            .on("PUT", "/_cluster/settings", 200, "{}")
            .on("PUT", "/_data_stream/logs-app", 200, "{}")
            .on("PUT", "/orders", 200, "{}"),
    );
    let session = session(&transport, OutputFormat::Table);
    let files = [
        write(
            temp.path(),
            "template.yaml",
            "kind: IndexTemplate\nmetadata:\n  name: logs\nspec:\n  index_patterns: [logs-*]\n",
        )?,
        write(
            temp.path(),
            "pipeline.json",
            r#"{"kind": "IngestPipeline", "metadata": {"name": "geo"}, "spec": {"processors": []}}"#,
        )?,
        write(
            temp.path(),
            "settings.yaml",
            "kind: ClusterSettings\nspec:\n  persistent:\n    indices.recovery.max_bytes_per_sec: 50mb\n",
        )?,
        write(
            temp.path(),
            "stream.yaml",
            "kind: DataStream\nmetadata:\n  name: logs-app\n",
        )?,
        write(
            temp.path(),
            "index.yaml",
            "kind: Index\nmetadata:\n  name: orders\nspec:\n  settings:\n    number_of_shards: 2\n",
        )?,
    ];
    for file in &files {
        cli::apply(&session, file, false, &mut Vec::new()).await?;
    }

    assert_eq!(
        transport.lines(),
        vec![
            "PUT /_index_template/logs",
            "PUT /_ingest/pipeline/geo",
            "PUT /_cluster/settings",
            "PUT /_data_stream/logs-app",
            "PUT /orders",
        ]
    );
    let sent = transport.requests();
    assert_eq!(sent[3].body, None);
    assert_eq!(sent[4].body, Some(json!({"settings": {"number_of_shards": 2}})));
    Ok(())
}

#[tokio::test]
async fn test_apply_policy_falls_back_to_ism() -> Result<()> {
    let temp = TempDir::new()?;
    let file = write(
        temp.path(),
        "policy.yaml",
        "kind: LifecyclePolicy\nmetadata:\n  name: rollover\nspec:\n  policy:\n    description: roll daily\n    states: []\n",
    )?;
    let transport = Arc::new(
        RecordingTransport::new()
            .on("PUT", "/_ilm/policy/rollover", 405, r#"{"error":"Incorrect HTTP method"}"#)
            .on("PUT", "/_plugins/_ism/policies/rollover", 201, r#"{"_id":"rollover"}"#),
    );
    let mut out = Vec::new();
    cli::apply(&session(&transport, OutputFormat::Table), &file, false, &mut out).await?;

    assert_eq!(
        transport.lines(),
        vec!["PUT /_ilm/policy/rollover", "PUT /_plugins/_ism/policies/rollover"]
    );
    assert_eq!(
        transport.requests()[1].body,
        Some(json!({"policy": {"description": "roll daily", "states": []}}))
    );
    assert!(String::from_utf8(out)?.starts_with("LifecyclePolicy/rollover applied"));
    Ok(())
}

#[tokio::test]
async fn test_get_policies_on_opensearch() -> Result<()> {
    let transport = Arc::new(
        RecordingTransport::new()
            .on("GET", "/_ilm/policy/*", 404, r#"{"error":"no handler found for uri"}"#)
            .on_json(
                "GET",
                "/_plugins/_ism/policies",
                200,
                json!({"policies": [
                    {"_id": "hot", "policy": {"states": []}},
                    {"_id": "delete-old", "policy": {"states": []}}
                ]}),
            ),
    );
    let mut out = Vec::new();
    cli::get(
        &session(&transport, OutputFormat::Json),
        ResourceType::LifecyclePolicies,
        None,
        &NodeView::default(),
        &mut out,
    )
    .await?;

    let listed: Value = serde_json::from_slice(&out)?;
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["hot", "delete-old"]);
    Ok(())
}

#[tokio::test]
async fn test_dry_run_never_mutates() -> Result<()> {
    let temp = TempDir::new()?;
    let file = write(
        temp.path(),
        "template.yaml",
        "kind: ComponentTemplate\nmetadata:\n  name: base\nspec:\n  template: {}\n",
    )?;
    let transport = Arc::new(RecordingTransport::new().on_json(
        "GET",
        "/_cat/indices/_all",
        200,
        json!([{"index": "logs-1"}]),
    ));
    let session = session(&transport, OutputFormat::Table).with_dry_run(true);

    cli::apply(&session, &file, false, &mut Vec::new()).await?;
    cli::create(&session, ResourceType::Indices, "orders", None, &mut Vec::new()).await?;
    cli::delete(&session, ResourceType::Indices, "logs-*", &mut Vec::new()).await?;
    cli::delete(&session, ResourceType::IngestPipelines, "geo", &mut Vec::new()).await?;
    cli::rollover(
        &session,
        "logs-app",
        &RolloverConditions::default(),
        None,
        false,
        &mut Vec::new(),
    )
    .await?;

    assert!(transport.mutations().is_empty());
    Ok(())
}
