//! Resource models decoded from cluster responses
//!
//! `_cat` rows are flat string records. Templates, pipelines and policies keep
//! their definition as an opaque JSON body so nothing is lost on export.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A resource with a unique name.
pub trait Named {
    fn name(&self) -> &str;

    /// Names starting with `.` belong to the engine itself.
    fn is_system(&self) -> bool {
        self.name().starts_with('.')
    }
}

/// `_cat` APIs return `null` for unavailable columns and sometimes numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterHealth {
    pub cluster_name: String,
    pub status: String,
    pub timed_out: bool,
    pub number_of_nodes: u64,
    pub number_of_data_nodes: u64,
    pub active_primary_shards: u64,
    pub active_shards: u64,
    pub relocating_shards: u64,
    pub initializing_shards: u64,
    pub unassigned_shards: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterInfo {
    pub name: String,
    pub cluster_name: String,
    pub cluster_uuid: String,
    pub version: Map<String, Value>,
    pub tagline: String,
}

impl ClusterInfo {
    /// `version.number`, e.g. `8.15.0`.
    pub fn version_number(&self) -> &str {
        self.version
            .get("number")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// `version.distribution`, present on OpenSearch only.
    pub fn distribution(&self) -> &str {
        self.version
            .get("distribution")
            .and_then(Value::as_str)
            .unwrap_or("elasticsearch")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterStats {
    pub cluster_name: String,
    pub indices: Map<String, Value>,
    pub nodes: Map<String, Value>,
}

/// `GET /_cluster/state`; only the envelope fields are typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterState {
    pub cluster_name: String,
    pub state_uuid: String,
    #[serde(flatten)]
    pub sections: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingTasks {
    pub tasks: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    pub persistent: Map<String, Value>,
    pub transient: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub defaults: Map<String, Value>,
}

/// One row of `_cat/shards`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shard {
    #[serde(deserialize_with = "lenient_string")]
    pub index: String,
    #[serde(deserialize_with = "lenient_string")]
    pub shard: String,
    #[serde(deserialize_with = "lenient_string")]
    pub prirep: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub docs: String,
    #[serde(deserialize_with = "lenient_string")]
    pub store: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ip: String,
    #[serde(deserialize_with = "lenient_string")]
    pub node: String,
    #[serde(
        rename = "unassigned.reason",
        deserialize_with = "lenient_string",
        skip_serializing_if = "String::is_empty"
    )]
    pub unassigned_reason: String,
}

/// Which shard to explain. All fields empty asks the cluster to pick the
/// first unassigned shard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationExplainRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
}

impl AllocationExplainRequest {
    pub fn is_empty(&self) -> bool {
        self.index.is_none() && self.shard.is_none() && self.primary.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationExplanation {
    pub index: String,
    pub shard: u32,
    pub primary: bool,
    pub current_state: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub can_allocate: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub allocate_explanation: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RerouteOptions {
    pub dry_run: bool,
    pub explain: bool,
    pub retry_failed: bool,
}

/// Shard allocation switches, written as transient cluster settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationSettings {
    /// `cluster.routing.allocation.enable`
    pub enable: Option<String>,
    /// `cluster.routing.rebalance.enable`
    pub rebalance: Option<String>,
    /// `cluster.routing.allocation.awareness.attributes`, comma-separated
    pub awareness_attributes: Option<String>,
}

impl AllocationSettings {
    pub fn is_empty(&self) -> bool {
        self.enable.is_none() && self.rebalance.is_none() && self.awareness_attributes.is_none()
    }

    /// The set switches keyed by setting name.
    pub fn to_transient(&self) -> Map<String, Value> {
        [
            ("cluster.routing.allocation.enable", &self.enable),
            ("cluster.routing.rebalance.enable", &self.rebalance),
            ("cluster.routing.allocation.awareness.attributes", &self.awareness_attributes),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            let value = value.as_deref()?.trim();
            Some((key.to_string(), Value::String(value.to_string())))
        })
        .collect()
    }
}

/// One row of `_cat/indices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Index {
    #[serde(rename = "index", deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub health: String,
    #[serde(deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(deserialize_with = "lenient_string")]
    pub uuid: String,
    #[serde(rename = "pri", deserialize_with = "lenient_string")]
    pub primary: String,
    #[serde(rename = "rep", deserialize_with = "lenient_string")]
    pub replica: String,
    #[serde(rename = "docs.count", deserialize_with = "lenient_string")]
    pub docs_count: String,
    #[serde(rename = "docs.deleted", deserialize_with = "lenient_string")]
    pub docs_deleted: String,
    #[serde(rename = "store.size", deserialize_with = "lenient_string")]
    pub store_size: String,
    #[serde(rename = "pri.store.size", deserialize_with = "lenient_string")]
    pub primary_store_size: String,
}

impl Named for Index {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One row of `_cat/nodes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub host: String,
    #[serde(deserialize_with = "lenient_string")]
    pub ip: String,
    #[serde(rename = "heap.percent", deserialize_with = "lenient_string")]
    pub heap_percent: String,
    #[serde(rename = "ram.percent", deserialize_with = "lenient_string")]
    pub ram_percent: String,
    #[serde(deserialize_with = "lenient_string")]
    pub cpu: String,
    #[serde(deserialize_with = "lenient_string")]
    pub load_1m: String,
    #[serde(deserialize_with = "lenient_string")]
    pub load_5m: String,
    #[serde(deserialize_with = "lenient_string")]
    pub load_15m: String,
    #[serde(rename = "node.role", deserialize_with = "lenient_string")]
    pub node_role: String,
    #[serde(deserialize_with = "lenient_string")]
    pub master: String,
}

impl Named for Node {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Node {
    /// The elected master is marked `*` in `_cat/nodes`.
    pub fn is_master(&self) -> bool {
        self.master == "*"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimestampField {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStreamIndex {
    pub index_name: String,
    pub index_uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer_ilm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStream {
    pub name: String,
    pub timestamp_field: TimestampField,
    pub indices: Vec<DataStreamIndex>,
    pub generation: u64,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub template: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ilm_policy: String,
    pub hidden: bool,
    pub system: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Named for DataStream {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloverResponse {
    pub acknowledged: bool,
    pub shards_acknowledged: bool,
    pub old_index: String,
    pub new_index: String,
    pub rolled_over: bool,
    pub dry_run: bool,
    pub conditions: Map<String, Value>,
}

/// Composable index template. `body` is the definition as the cluster
/// returns it (`index_patterns`, `template`, `composed_of`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexTemplate {
    pub name: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Named for IndexTemplate {
    fn name(&self) -> &str {
        &self.name
    }
}

impl IndexTemplate {
    pub fn index_patterns(&self) -> Vec<&str> {
        string_list(self.body.get("index_patterns"))
    }

    pub fn composed_of(&self) -> Vec<&str> {
        string_list(self.body.get("composed_of"))
    }

    pub fn priority(&self) -> Option<i64> {
        self.body.get("priority").and_then(Value::as_i64)
    }

    pub fn version(&self) -> Option<i64> {
        self.body.get("version").and_then(Value::as_i64)
    }

    pub fn is_data_stream(&self) -> bool {
        self.body.contains_key("data_stream")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    pub name: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Named for ComponentTemplate {
    fn name(&self) -> &str {
        &self.name
    }
}

impl ComponentTemplate {
    pub fn version(&self) -> Option<i64> {
        self.body.get("version").and_then(Value::as_i64)
    }

    /// Top-level sections of `template` (settings, mappings, aliases).
    pub fn sections(&self) -> Vec<&str> {
        self.body
            .get("template")
            .and_then(Value::as_object)
            .map(|t| t.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Lifecycle policy in either dialect. `version` and `modified_date` are
/// only reported by the ILM dialect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifecyclePolicy {
    pub name: String,
    pub policy: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_date: Option<String>,
}

impl Named for LifecyclePolicy {
    fn name(&self) -> &str {
        &self.name
    }
}

impl LifecyclePolicy {
    /// Phase names (ILM) or state names (ISM).
    pub fn phases(&self) -> Vec<&str> {
        if let Some(phases) = self.policy.get("phases").and_then(Value::as_object) {
            return phases.keys().map(String::as_str).collect();
        }
        self.policy
            .get("states")
            .and_then(Value::as_array)
            .map(|states| {
                states
                    .iter()
                    .filter_map(|s| s.get("name").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestPipeline {
    pub name: String,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl Named for IngestPipeline {
    fn name(&self) -> &str {
        &self.name
    }
}

impl IngestPipeline {
    pub fn description(&self) -> &str {
        self.body
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn processor_count(&self) -> usize {
        self.body
            .get("processors")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

fn string_list(value: Option<&Value>) -> Vec<&str> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(s)) => vec![s.as_str()],
        _ => Vec::new(),
    }
}
