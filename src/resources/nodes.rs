use super::{ListApi, OK, check};
use crate::client::{ClientError, Result, Transport};
use crate::pattern::WildcardPattern;
use crate::types::Node;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::Arc;

const CAT_PATH: &str = "/_cat/nodes?format=json&h=name,host,ip,heap.percent,ram.percent,cpu,load_1m,load_5m,load_15m,node.role,master";

/// Table columns shown by default.
pub const NODE_COLUMNS: &[&str] = &[
    "NAME",
    "HOST",
    "IP",
    "HEAP.PERCENT",
    "RAM.PERCENT",
    "CPU",
    "LOAD_1M",
    "ROLE",
    "MASTER",
];

/// Extra columns for wide output.
pub const NODE_WIDE_COLUMNS: &[&str] = &["LOAD_5M", "LOAD_15M"];

/// Nodes via `_cat/nodes`. The endpoint has no name filter, so patterns are
/// applied client-side.
pub struct Nodes {
    transport: Arc<dyn Transport>,
}

impl Nodes {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn all(&self) -> Result<Vec<Node>> {
        let response = check(self.transport.get(CAT_PATH).await?, OK, "error getting nodes")?;
        response.json()
    }
}

#[async_trait]
impl ListApi for Nodes {
    type Resource = Node;

    async fn list(&self, pattern: &str) -> Result<Vec<Node>> {
        let nodes = self.all().await?;
        let pattern = pattern.trim();
        if pattern.is_empty() || pattern == "*" {
            return Ok(nodes);
        }
        let matcher = WildcardPattern::new(pattern)?;
        Ok(nodes
            .into_iter()
            .filter(|n| matcher.matches(&n.name) || matcher.matches(&n.ip))
            .collect())
    }

    /// Match by exact name first, then by IP.
    async fn get(&self, name: &str) -> Result<Node> {
        let mut nodes = self.all().await?;
        let position = nodes
            .iter()
            .position(|n| n.name == name)
            .or_else(|| nodes.iter().position(|n| n.ip == name));
        match position {
            Some(i) => Ok(nodes.swap_remove(i)),
            None => Err(ClientError::not_found("node", name)),
        }
    }
}

/// Value of a named column (case-insensitive). Unknown columns are empty.
pub fn column_value<'a>(node: &'a Node, column: &str) -> &'a str {
    match column.to_ascii_uppercase().as_str() {
        "NAME" => &node.name,
        "HOST" => &node.host,
        "IP" => &node.ip,
        "HEAP.PERCENT" => &node.heap_percent,
        "RAM.PERCENT" => &node.ram_percent,
        "CPU" => &node.cpu,
        "LOAD_1M" => &node.load_1m,
        "LOAD_5M" => &node.load_5m,
        "LOAD_15M" => &node.load_15m,
        "ROLE" => &node.node_role,
        "MASTER" => &node.master,
        _ => "",
    }
}

/// Whether `node` carries `role`. Accepts full role names, common aliases
/// and the one-letter codes `_cat/nodes` prints.
pub fn has_role(node: &Node, role: &str) -> bool {
    let role = role.trim().to_ascii_lowercase();
    let roles = node.node_role.to_ascii_lowercase();
    match role.as_str() {
        "" => true,
        "master" | "m" => node.is_master() || roles.contains('m'),
        "data" | "d" => roles.contains('d'),
        "ingest" | "i" => roles.contains('i'),
        "ml" | "machine_learning" | "l" => roles.contains('l'),
        "transform" | "t" => roles.contains('t'),
        "remote" | "remote_cluster_client" | "r" => roles.contains('r'),
        "voting" | "voting_only" | "v" => roles.contains('v'),
        "coordinating" | "coord" | "-" => roles.is_empty() || roles == "-",
        other => roles.contains(other),
    }
}

/// One sort column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey(pub String);

impl SortKey {
    /// Parse `"CPU,heap.percent"` into keys.
    pub fn parse_list(csv: &str) -> Vec<SortKey> {
        parse_columns(csv).into_iter().map(SortKey).collect()
    }

    /// Numeric when both values parse as numbers, lexical otherwise.
    fn compare(&self, a: &Node, b: &Node) -> Ordering {
        let (va, vb) = (column_value(a, &self.0), column_value(b, &self.0));
        match (va.parse::<f64>(), vb.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => va.cmp(vb),
        }
    }
}

/// Upper-cased, trimmed, non-empty column names from a CSV list.
pub fn parse_columns(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_ascii_uppercase)
        .collect()
}

/// Client-side filter, sort and limit applied to a node listing.
#[derive(Debug, Clone, Default)]
pub struct NodeSelector {
    pub role: Option<String>,
    /// Substring of name or IP, case-insensitive.
    pub name: Option<String>,
    pub sort: Vec<SortKey>,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl NodeSelector {
    pub fn apply(&self, nodes: Vec<Node>) -> Vec<Node> {
        let name = self
            .name
            .as_deref()
            .map(|n| n.trim().to_ascii_lowercase())
            .filter(|n| !n.is_empty());

        let mut selected: Vec<Node> = nodes
            .into_iter()
            .filter(|n| self.role.as_deref().is_none_or(|r| has_role(n, r)))
            .filter(|n| {
                name.as_deref().is_none_or(|needle| {
                    format!("{} {}", n.name, n.ip)
                        .to_ascii_lowercase()
                        .contains(needle)
                })
            })
            .collect();

        if !self.sort.is_empty() {
            selected.sort_by(|a, b| {
                let ordering = self
                    .sort
                    .iter()
                    .map(|key| key.compare(a, b))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal);
                if self.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            selected.truncate(limit);
        }
        selected
    }
}
