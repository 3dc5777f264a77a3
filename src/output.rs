//! Rendering of command results
//!
//! Lists render as aligned tables (or JSON/YAML); single resources render
//! as `key: value` details or as a full document.

use crate::document::{DocumentError, DocumentFormat};
use crate::resources::{NODE_COLUMNS, NODE_WIDE_COLUMNS, column_value};
use crate::types::{
    ComponentTemplate, DataStream, Index, IndexTemplate, IngestPipeline, LifecyclePolicy, Node,
    Shard,
};
use serde::Serialize;
use serde_json::{Map, Value};

/// `--output` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Wide,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn is_wide(self) -> bool {
        self == Self::Wide
    }

    /// The document format behind JSON/YAML output, if any.
    pub fn document_format(self) -> Option<DocumentFormat> {
        match self {
            Self::Json => Some(DocumentFormat::Json),
            Self::Yaml => Some(DocumentFormat::Yaml),
            Self::Table | Self::Wide => None,
        }
    }

    /// Extension for exported files: JSON only when asked for.
    pub fn export_format(self) -> DocumentFormat {
        self.document_format().unwrap_or(DocumentFormat::Yaml)
    }
}

const EMPTY: &str = "No resources found";
const GAP: &str = "  ";

/// Column-aligned text table.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build from generic records. Headers follow `preferred` when given
    /// (unknown names are dropped), else the keys of the first record in
    /// sorted order.
    pub fn from_records(records: &[Map<String, Value>], preferred: Option<&[&str]>) -> Self {
        let Some(first) = records.first() else {
            return Self::default();
        };
        let mut available: Vec<&str> = first.keys().map(String::as_str).collect();
        available.sort_unstable();
        let headers: Vec<String> = match preferred {
            Some(order) => order
                .iter()
                .filter(|h| available.contains(h))
                .map(|h| h.to_string())
                .collect(),
            None => available.iter().map(|h| h.to_string()).collect(),
        };
        let mut table = Table::new(headers.iter().map(|h| h.to_ascii_uppercase()));
        for record in records {
            table.push(
                headers
                    .iter()
                    .map(|h| record.get(h).map(cell).unwrap_or_default())
                    .collect(),
            );
        }
        table
    }

    /// Render with two spaces between columns. An empty table renders the
    /// "No resources found" notice instead.
    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return format!("{}\n", EMPTY);
        }
        let columns = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().take(columns).enumerate() {
                widths[i] = widths[i].max(value.chars().count());
            }
        }

        let mut out = String::new();
        let mut write_line = |cells: &[String]| {
            let mut line = String::new();
            for (i, width) in widths.iter().enumerate() {
                let value = cells.get(i).map(String::as_str).unwrap_or("");
                if i + 1 == columns {
                    line.push_str(value);
                } else {
                    line.push_str(value);
                    line.push_str(&" ".repeat(width - value.chars().count()));
                    line.push_str(GAP);
                }
            }
            out.push_str(line.trim_end());
            out.push('\n');
        };
        write_line(&self.headers);
        for row in &self.rows {
            write_line(row);
        }
        out
    }
}

/// Scalars print bare; arrays of scalars join with commas; anything else
/// prints as compact JSON.
fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => {
            items.iter().map(cell).collect::<Vec<_>>().join(",")
        }
        other => other.to_string(),
    }
}

fn or_dash(value: String) -> String {
    if value.is_empty() { "-".to_string() } else { value }
}

/// A resource that renders as one table row.
pub trait TableRow {
    fn headers(wide: bool) -> Vec<&'static str>;
    fn row(&self, wide: bool) -> Vec<String>;
}

pub fn table_of<T: TableRow>(items: &[T], wide: bool) -> Table {
    let mut table = Table::new(T::headers(wide));
    for item in items {
        table.push(item.row(wide));
    }
    table
}

impl TableRow for Index {
    fn headers(wide: bool) -> Vec<&'static str> {
        let mut headers = vec!["HEALTH", "STATUS", "INDEX", "PRI", "REP", "DOCS.COUNT", "STORE.SIZE"];
        if wide {
            headers.extend(["UUID", "DOCS.DELETED", "PRI.STORE.SIZE"]);
        }
        headers
    }

    fn row(&self, wide: bool) -> Vec<String> {
        let mut row = vec![
            self.health.clone(),
            self.status.clone(),
            self.name.clone(),
            self.primary.clone(),
            self.replica.clone(),
            self.docs_count.clone(),
            self.store_size.clone(),
        ];
        if wide {
            row.extend([
                self.uuid.clone(),
                self.docs_deleted.clone(),
                self.primary_store_size.clone(),
            ]);
        }
        row
    }
}

impl TableRow for Node {
    fn headers(wide: bool) -> Vec<&'static str> {
        let mut headers = NODE_COLUMNS.to_vec();
        if wide {
            headers.extend(NODE_WIDE_COLUMNS);
        }
        headers
    }

    fn row(&self, wide: bool) -> Vec<String> {
        Self::headers(wide)
            .into_iter()
            .map(|column| column_value(self, column).to_string())
            .collect()
    }
}

/// Nodes with user-chosen columns.
pub fn node_table(nodes: &[Node], columns: &[String]) -> Table {
    let mut table = Table::new(columns.iter().cloned());
    for node in nodes {
        table.push(
            columns
                .iter()
                .map(|c| column_value(node, c).to_string())
                .collect(),
        );
    }
    table
}

impl TableRow for DataStream {
    fn headers(wide: bool) -> Vec<&'static str> {
        let mut headers = vec!["NAME", "TIMESTAMP-FIELD", "STATUS", "TEMPLATE", "INDICES", "GENERATION"];
        if wide {
            headers.extend(["ILM-POLICY", "HIDDEN"]);
        }
        headers
    }

    fn row(&self, wide: bool) -> Vec<String> {
        let mut row = vec![
            self.name.clone(),
            self.timestamp_field.name.clone(),
            self.status.clone(),
            or_dash(self.template.clone()),
            self.indices.len().to_string(),
            self.generation.to_string(),
        ];
        if wide {
            row.extend([or_dash(self.ilm_policy.clone()), self.hidden.to_string()]);
        }
        row
    }
}

impl TableRow for IndexTemplate {
    fn headers(wide: bool) -> Vec<&'static str> {
        let mut headers = vec!["NAME", "INDEX-PATTERNS", "PRIORITY", "VERSION"];
        if wide {
            headers.extend(["COMPOSED-OF", "DATA-STREAM"]);
        }
        headers
    }

    fn row(&self, wide: bool) -> Vec<String> {
        let optional = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
        let mut row = vec![
            self.name.clone(),
            self.index_patterns().join(","),
            optional(self.priority()),
            optional(self.version()),
        ];
        if wide {
            row.extend([
                or_dash(self.composed_of().join(",")),
                self.is_data_stream().to_string(),
            ]);
        }
        row
    }
}

impl TableRow for ComponentTemplate {
    fn headers(_wide: bool) -> Vec<&'static str> {
        vec!["NAME", "VERSION", "SECTIONS"]
    }

    fn row(&self, _wide: bool) -> Vec<String> {
        vec![
            self.name.clone(),
            self.version().map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
            or_dash(self.sections().join(",")),
        ]
    }
}

impl TableRow for LifecyclePolicy {
    fn headers(wide: bool) -> Vec<&'static str> {
        let mut headers = vec!["NAME", "PHASES"];
        if wide {
            headers.extend(["VERSION", "MODIFIED"]);
        }
        headers
    }

    fn row(&self, wide: bool) -> Vec<String> {
        let mut row = vec![self.name.clone(), or_dash(self.phases().join(","))];
        if wide {
            row.extend([
                self.version.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()),
                or_dash(self.modified_date.clone().unwrap_or_default()),
            ]);
        }
        row
    }
}

impl TableRow for IngestPipeline {
    fn headers(_wide: bool) -> Vec<&'static str> {
        vec!["NAME", "PROCESSORS", "DESCRIPTION"]
    }

    fn row(&self, _wide: bool) -> Vec<String> {
        vec![
            self.name.clone(),
            self.processor_count().to_string(),
            self.description().to_string(),
        ]
    }
}

impl TableRow for Shard {
    fn headers(wide: bool) -> Vec<&'static str> {
        let mut headers = vec!["INDEX", "SHARD", "PRIREP", "STATE", "DOCS", "STORE", "NODE"];
        if wide {
            headers.extend(["IP", "UNASSIGNED.REASON"]);
        }
        headers
    }

    fn row(&self, wide: bool) -> Vec<String> {
        let mut row = vec![
            self.index.clone(),
            self.shard.clone(),
            self.prirep.clone(),
            self.state.clone(),
            self.docs.clone(),
            self.store.clone(),
            self.node.clone(),
        ];
        if wide {
            row.extend([self.ip.clone(), self.unassigned_reason.clone()]);
        }
        row
    }
}

/// Pretty JSON (with trailing newline) or YAML.
pub fn render_document<T: Serialize>(value: &T, format: DocumentFormat) -> Result<String, DocumentError> {
    format.render(&serde_json::to_value(value)?)
}

/// Render a list: a table for table/wide output, else the whole list as a
/// document.
pub fn render_list<T: TableRow + Serialize>(items: &[T], format: OutputFormat) -> Result<String, DocumentError> {
    match format.document_format() {
        Some(doc) => render_document(&items, doc),
        None => Ok(table_of(items, format.is_wide()).render()),
    }
}

/// `key: value` lines with aligned values, keys in the given order.
pub fn render_details(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len() + 1).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(key, value)| format!("{:<width$}  {}\n", format!("{}:", key), value, width = width))
        .collect()
}
