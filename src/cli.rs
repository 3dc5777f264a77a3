//! CLI helper functions
//!
//! One handler per command. Handlers write their result to `out` (stdout in
//! the binary) and return errors for the caller to report. Mutating handlers
//! honor [`Session::dry_run`]; deletes ask for confirmation unless
//! [`Session::assume_yes`] is set.

use crate::batch;
use crate::client::Clientset;
use crate::clone::{
    ClusterApplier, DocumentLoader, ExportOptions, Exporter, ImportOptions, Importer, label,
};
use crate::config::{ConfigFile, EnvOverrides};
use crate::document::{DocumentFormat, ManifestEnvelope, ResourceKind, normalize, read_document};
use crate::etl::Transformer;
use crate::output::{
    OutputFormat, Table, TableRow, node_table, render_details, render_document, render_list,
};
use crate::pattern::WildcardPattern;
use crate::resources::{DeleteApi, ListApi, NodeSelector};
use crate::rollover::RolloverConditions;
use crate::types::{AllocationExplainRequest, AllocationSettings, RerouteOptions, RolloverResponse};
use eyre::{Context, Result, bail, eyre};
use owo_colors::OwoColorize;
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::io::{BufRead, Write};
use std::path::Path;

/// Connect using the config file and `SEARCHCTL_*` overrides.
///
/// The config is found via `config_path`, then `SEARCHCTL_CONFIG`, then
/// `~/.searchctl/config.yaml`; `context` overrides its current context.
pub fn load_clientset(config_path: Option<&Path>, context: Option<&str>) -> Result<Clientset> {
    let file = ConfigFile::load(config_path).context("Failed to load config")?;
    let settings = file
        .config
        .resolve(context, &EnvOverrides::from_env())
        .context("Failed to resolve connection")?;
    log::debug!("Connecting to {} ({})", settings.url.cyan(), settings.auth);
    Clientset::try_new(&settings).context("Failed to create client")
}

/// Per-invocation state shared by the cluster handlers.
pub struct Session {
    pub clientset: Clientset,
    pub output: OutputFormat,
    pub dry_run: bool,
    pub assume_yes: bool,
}

impl Session {
    pub fn new(clientset: Clientset, output: OutputFormat) -> Self {
        Self {
            clientset,
            output,
            dry_run: false,
            assume_yes: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    /// Format for single documents: YAML unless JSON was asked for.
    fn document_format(&self) -> DocumentFormat {
        self.output.export_format()
    }

    /// Ask on stdin. Only `y` or `yes` accepts.
    pub fn confirm(&self, action: &str) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        let mut stderr = std::io::stderr();
        write!(stderr, "Are you sure you want to {}? (y/N): ", action)?;
        stderr.flush()?;
        let mut answer = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("Failed to read confirmation")?;
        Ok(is_yes(&answer))
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Resource types accepted by `get`, `describe`, `create` and `delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResourceType {
    #[value(aliases = ["index", "idx"])]
    Indices,
    #[value(aliases = ["node", "no"])]
    Nodes,
    #[value(aliases = ["data-stream", "datastream", "datastreams", "ds"])]
    DataStreams,
    #[value(aliases = ["index-template", "it"])]
    IndexTemplates,
    #[value(aliases = ["component-template", "ct"])]
    ComponentTemplates,
    #[value(aliases = ["lifecycle-policy", "ilm", "ism", "lp"])]
    LifecyclePolicies,
    #[value(aliases = ["ingest-pipeline", "pipeline", "pipelines", "ip"])]
    IngestPipelines,
}

impl ResourceType {
    pub fn noun(self) -> &'static str {
        match self {
            Self::Indices => "index",
            Self::Nodes => "node",
            Self::DataStreams => "data stream",
            Self::IndexTemplates => "index template",
            Self::ComponentTemplates => "component template",
            Self::LifecyclePolicies => "lifecycle policy",
            Self::IngestPipelines => "ingest pipeline",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            Self::Indices => "indices",
            Self::Nodes => "nodes",
            Self::DataStreams => "data streams",
            Self::IndexTemplates => "index templates",
            Self::ComponentTemplates => "component templates",
            Self::LifecyclePolicies => "lifecycle policies",
            Self::IngestPipelines => "ingest pipelines",
        }
    }

    /// The noun with its first letter upper-cased.
    fn title(self) -> String {
        let noun = self.noun();
        let mut chars = noun.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }

    /// The envelope kind created for this type. Nodes have none.
    pub fn kind(self) -> Option<ResourceKind> {
        match self {
            Self::Indices => Some(ResourceKind::Index),
            Self::Nodes => None,
            Self::DataStreams => Some(ResourceKind::DataStream),
            Self::IndexTemplates => Some(ResourceKind::IndexTemplate),
            Self::ComponentTemplates => Some(ResourceKind::ComponentTemplate),
            Self::LifecyclePolicies => Some(ResourceKind::LifecyclePolicy),
            Self::IngestPipelines => Some(ResourceKind::IngestPipeline),
        }
    }
}

/// Node listing options for `get nodes`.
#[derive(Debug, Clone, Default)]
pub struct NodeView {
    pub selector: NodeSelector,
    /// Custom table columns; empty uses the default set.
    pub columns: Vec<String>,
}

async fn list_with<A>(api: &A, resource: ResourceType, pattern: &str, output: OutputFormat) -> Result<String>
where
    A: ListApi,
    A::Resource: TableRow + Serialize,
{
    let items = api
        .list(pattern)
        .await
        .with_context(|| format!("Failed to list {}", resource.plural()))?;
    log::debug!("Listed {} {}", items.len(), resource.plural());
    Ok(render_list(&items, output)?)
}

/// List resources matching `pattern` (all when absent).
pub async fn get(
    session: &Session,
    resource: ResourceType,
    pattern: Option<&str>,
    nodes: &NodeView,
    out: &mut impl Write,
) -> Result<()> {
    let pattern = pattern.unwrap_or("*");
    let clientset = &session.clientset;
    let output = session.output;
    let text = match resource {
        ResourceType::Indices => list_with(&clientset.indices(), resource, pattern, output).await?,
        ResourceType::DataStreams => {
            list_with(&clientset.data_streams(), resource, pattern, output).await?
        }
        ResourceType::IndexTemplates => {
            list_with(&clientset.index_templates(), resource, pattern, output).await?
        }
        ResourceType::ComponentTemplates => {
            list_with(&clientset.component_templates(), resource, pattern, output).await?
        }
        ResourceType::LifecyclePolicies => {
            list_with(&clientset.lifecycle_policies(), resource, pattern, output).await?
        }
        ResourceType::IngestPipelines => {
            list_with(&clientset.ingest(), resource, pattern, output).await?
        }
        ResourceType::Nodes => {
            let listed = clientset
                .nodes()
                .list(pattern)
                .await
                .context("Failed to list nodes")?;
            let selected = nodes.selector.apply(listed);
            if nodes.columns.is_empty() || output.document_format().is_some() {
                render_list(&selected, output)?
            } else {
                node_table(&selected, &nodes.columns).render()
            }
        }
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

async fn describe_with<A>(api: &A, resource: ResourceType, name: &str, format: DocumentFormat) -> Result<String>
where
    A: ListApi,
    A::Resource: Serialize,
{
    let item = api
        .get(name)
        .await
        .with_context(|| format!("Failed to describe {} {}", resource.noun(), name))?;
    Ok(render_document(&item, format)?)
}

/// Show one resource in full. Table output falls back to YAML.
pub async fn describe(session: &Session, resource: ResourceType, name: &str, out: &mut impl Write) -> Result<()> {
    let clientset = &session.clientset;
    let format = session.document_format();
    let text = match resource {
        ResourceType::Indices => describe_with(&clientset.indices(), resource, name, format).await?,
        ResourceType::Nodes => describe_with(&clientset.nodes(), resource, name, format).await?,
        ResourceType::DataStreams => {
            describe_with(&clientset.data_streams(), resource, name, format).await?
        }
        ResourceType::IndexTemplates => {
            describe_with(&clientset.index_templates(), resource, name, format).await?
        }
        ResourceType::ComponentTemplates => {
            describe_with(&clientset.component_templates(), resource, name, format).await?
        }
        ResourceType::LifecyclePolicies => {
            describe_with(&clientset.lifecycle_policies(), resource, name, format).await?
        }
        ResourceType::IngestPipelines => {
            describe_with(&clientset.ingest(), resource, name, format).await?
        }
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Body of `create index-template NAME` without a file: matches `NAME-*`
/// with one primary shard, no replicas and a minimal mapping.
pub fn default_index_template(name: &str) -> Value {
    json!({
        "index_patterns": [format!("{}-*", name)],
        "template": {
            "settings": {
                "number_of_shards": 1,
                "number_of_replicas": 0
            },
            "mappings": {
                "properties": {
                    "@timestamp": {"type": "date"},
                    "message": {"type": "text"}
                }
            }
        }
    })
}

/// Read a request body from a YAML or JSON file. An envelope contributes
/// its `spec`.
pub fn read_body(path: &Path) -> Result<Value> {
    let value = normalize(
        read_document(path).with_context(|| format!("Failed to read {}", path.display()))?,
    );
    match value {
        Value::Object(mut map) if map.contains_key("kind") && map.contains_key("spec") => {
            Ok(map.remove("spec").unwrap_or(Value::Null))
        }
        Value::Object(_) => Ok(value),
        _ => bail!("Body file {} must contain a mapping", path.display()),
    }
}

/// Create one resource, from a body file where the type takes one.
pub async fn create(
    session: &Session,
    resource: ResourceType,
    name: &str,
    file: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let kind = resource
        .kind()
        .ok_or_else(|| eyre!("{} cannot be created", resource.plural()))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("A {} name is required", resource.noun());
    }

    let spec = match file {
        Some(path) => {
            if resource == ResourceType::DataStreams {
                log::warn!("Data streams take no body, ignoring {}", path.display());
            }
            read_body(path)?
        }
        None => match resource {
            ResourceType::IndexTemplates => default_index_template(name),
            ResourceType::Indices | ResourceType::DataStreams => json!({}),
            _ => bail!("A body file is required to create a {} (use -f)", resource.noun()),
        },
    };
    let envelope = ManifestEnvelope::new(kind, name, spec);

    if session.dry_run {
        writeln!(out, "Would create {} {}", resource.noun(), name)?;
        if resource != ResourceType::DataStreams {
            let body = envelope.create_body();
            if body.as_object().is_some_and(|m| !m.is_empty()) {
                out.write_all(DocumentFormat::Json.render(&body)?.as_bytes())?;
            }
        }
        return Ok(());
    }

    ClusterApplier::new(session.clientset.clone())
        .apply(&envelope)
        .await
        .with_context(|| format!("Failed to create {} {}", resource.noun(), name))?;
    log::debug!("Created {} {}", resource.noun(), name.cyan());
    writeln!(out, "{} {} created successfully", resource.title(), name)?;
    Ok(())
}

/// Delete by name, or every match of a wildcard pattern for indices and
/// data streams.
pub async fn delete(session: &Session, resource: ResourceType, name: &str, out: &mut impl Write) -> Result<()> {
    let clientset = &session.clientset;
    match resource {
        ResourceType::Indices => delete_matching(session, &clientset.indices(), resource, name, out).await,
        ResourceType::DataStreams => {
            delete_matching(session, &clientset.data_streams(), resource, name, out).await
        }
        ResourceType::IndexTemplates => {
            delete_named(session, &clientset.index_templates(), resource, name, out).await
        }
        ResourceType::ComponentTemplates => {
            delete_named(session, &clientset.component_templates(), resource, name, out).await
        }
        ResourceType::LifecyclePolicies => {
            delete_named(session, &clientset.lifecycle_policies(), resource, name, out).await
        }
        ResourceType::IngestPipelines => {
            delete_named(session, &clientset.ingest(), resource, name, out).await
        }
        ResourceType::Nodes => bail!("Nodes cannot be deleted"),
    }
}

async fn delete_matching<A>(
    session: &Session,
    api: &A,
    resource: ResourceType,
    pattern: &str,
    out: &mut impl Write,
) -> Result<()>
where
    A: ListApi + DeleteApi,
{
    if !WildcardPattern::is_wildcard(pattern) {
        return delete_named(session, api, resource, pattern, out).await;
    }

    let names = batch::matching_names(api, pattern)
        .await
        .with_context(|| format!("Failed to list {}", resource.plural()))?;
    if names.is_empty() {
        writeln!(out, "No {} match pattern {}", resource.plural(), pattern)?;
        return Ok(());
    }

    writeln!(out, "Found {} matching {}:", names.len(), resource.plural())?;
    for name in &names {
        writeln!(out, "  - {}", name)?;
    }
    if session.dry_run {
        writeln!(out, "Dry run: no {} deleted", resource.plural())?;
        return Ok(());
    }
    if !session.confirm(&format!("delete {} {}", names.len(), resource.plural()))? {
        writeln!(out, "Delete operation cancelled.")?;
        return Ok(());
    }

    let report = batch::delete_names(api, names).await;
    for name in &report.succeeded {
        writeln!(out, "{} {} deleted", resource.title(), name)?;
    }
    report.into_result()?;
    Ok(())
}

async fn delete_named<A>(
    session: &Session,
    api: &A,
    resource: ResourceType,
    name: &str,
    out: &mut impl Write,
) -> Result<()>
where
    A: DeleteApi + ?Sized,
{
    if session.dry_run {
        writeln!(out, "Would delete {} {}", resource.noun(), name)?;
        return Ok(());
    }
    if !session.confirm(&format!("delete {} {}", resource.noun(), name))? {
        writeln!(out, "Delete operation cancelled.")?;
        return Ok(());
    }
    api.delete(name)
        .await
        .with_context(|| format!("Failed to delete {} {}", resource.noun(), name))?;
    writeln!(out, "{} {} deleted", resource.title(), name)?;
    Ok(())
}

/// Create or update the resource described by an envelope file.
pub async fn apply(session: &Session, file: &Path, strict: bool, out: &mut impl Write) -> Result<()> {
    let envelope = DocumentLoader::new(None, strict).transform(file.to_path_buf())?;
    let label = label(&envelope);
    if session.dry_run {
        writeln!(out, "Would apply {} from {}", label, file.display())?;
        return Ok(());
    }
    ClusterApplier::new(session.clientset.clone())
        .apply(&envelope)
        .await
        .with_context(|| format!("Failed to apply {}", label))?;
    writeln!(out, "{} applied from {}", label, file.display())?;
    Ok(())
}

/// Roll a data stream over. Conditions from the file override flags.
pub async fn rollover(
    session: &Session,
    name: &str,
    conditions: &RolloverConditions,
    file: Option<&Path>,
    lazy: bool,
    out: &mut impl Write,
) -> Result<()> {
    let conditions = conditions
        .merged_with_file(file)
        .context("Failed to read rollover conditions")?;

    if session.dry_run {
        writeln!(out, "Would rollover data stream: {}", name)?;
        if !conditions.is_empty() {
            writeln!(out, "Conditions:")?;
            out.write_all(
                DocumentFormat::Json
                    .render(&Value::Object(conditions))?
                    .as_bytes(),
            )?;
        }
        if lazy {
            writeln!(out, "Lazy: true")?;
        }
        return Ok(());
    }

    let response = session
        .clientset
        .data_streams()
        .rollover(name, &conditions, lazy)
        .await
        .with_context(|| format!("Failed to rollover data stream {}", name))?;
    let text = match session.output.document_format() {
        Some(format) => render_document(&response, format)?,
        None => rollover_details(&response),
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

fn rollover_details(response: &RolloverResponse) -> String {
    let status = if response.rolled_over {
        "SUCCESS"
    } else {
        "NO ROLLOVER NEEDED"
    };
    let mut pairs = vec![
        ("Rollover Status", status.to_string()),
        ("Old Index", response.old_index.clone()),
        ("New Index", response.new_index.clone()),
    ];
    for (condition, met) in &response.conditions {
        pairs.push((condition.as_str(), met.to_string()));
    }
    pairs.push(("Acknowledged", response.acknowledged.to_string()));
    render_details(&pairs)
}

/// Export cluster configuration into `dir`.
pub async fn export(session: &Session, dir: &Path, options: &ExportOptions, out: &mut impl Write) -> Result<()> {
    if session.dry_run {
        writeln!(out, "Would export to {}:", dir.display())?;
        for kind in &options.kinds {
            writeln!(out, "  - {}", kind.directory().unwrap_or(kind.as_str()))?;
        }
        return Ok(());
    }
    let report = Exporter::new(session.clientset.clone())
        .export(dir, options)
        .await
        .with_context(|| format!("Failed to export to {}", dir.display()))?;
    for line in &report.succeeded {
        writeln!(out, "Exported {}", line)?;
    }
    for skipped in &report.skipped {
        writeln!(out, "Skipped {}: endpoint not available", skipped)?;
    }
    report.into_result()?;
    Ok(())
}

/// Import an export tree from `dir`. The global dry run implies an import
/// dry run.
pub async fn import(session: &Session, dir: &Path, options: &ImportOptions, out: &mut impl Write) -> Result<()> {
    let options = ImportOptions {
        dry_run: options.dry_run || session.dry_run,
        ..options.clone()
    };
    let report = Importer::new(ClusterApplier::new(session.clientset.clone()))
        .import(dir, &options)
        .await?;
    if options.dry_run {
        writeln!(out, "Would apply {} resources:", report.planned.len())?;
        for planned in &report.planned {
            writeln!(out, "  - {}", planned)?;
        }
    } else {
        writeln!(
            out,
            "Imported {} resources from {}",
            report.succeeded.len(),
            dir.display()
        )?;
    }
    report.into_result()?;
    Ok(())
}

pub async fn cluster_health(session: &Session, out: &mut impl Write) -> Result<()> {
    let health = session
        .clientset
        .cluster()
        .health()
        .await
        .context("Failed to get cluster health")?;
    let text = match session.output.document_format() {
        Some(format) => render_document(&health, format)?,
        None => render_details(&[
            ("Cluster", health.cluster_name.clone()),
            ("Status", health.status.clone()),
            ("Nodes", health.number_of_nodes.to_string()),
            ("Data Nodes", health.number_of_data_nodes.to_string()),
            ("Active Primary Shards", health.active_primary_shards.to_string()),
            ("Active Shards", health.active_shards.to_string()),
            ("Relocating Shards", health.relocating_shards.to_string()),
            ("Initializing Shards", health.initializing_shards.to_string()),
            ("Unassigned Shards", health.unassigned_shards.to_string()),
        ]),
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

pub async fn cluster_info(session: &Session, out: &mut impl Write) -> Result<()> {
    let info = session
        .clientset
        .cluster()
        .info()
        .await
        .context("Failed to get cluster info")?;
    let text = match session.output.document_format() {
        Some(format) => render_document(&info, format)?,
        None => render_details(&[
            ("Name", info.name.clone()),
            ("Cluster Name", info.cluster_name.clone()),
            ("Cluster UUID", info.cluster_uuid.clone()),
            ("Version", info.version_number().to_string()),
            ("Distribution", info.distribution().to_string()),
            ("Tagline", info.tagline.clone()),
        ]),
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Nested lookup rendered as text; missing values are empty.
fn lookup(map: &Map<String, Value>, path: &[&str]) -> String {
    let mut current = map.get(path[0]);
    for key in &path[1..] {
        current = current.and_then(|v| v.get(key));
    }
    match current {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

pub async fn cluster_stats(session: &Session, out: &mut impl Write) -> Result<()> {
    let stats = session
        .clientset
        .cluster()
        .stats()
        .await
        .context("Failed to get cluster stats")?;
    let text = match session.output.document_format() {
        Some(format) => render_document(&stats, format)?,
        None => render_details(&[
            ("Cluster", stats.cluster_name.clone()),
            ("Nodes", lookup(&stats.nodes, &["count", "total"])),
            ("Indices", lookup(&stats.indices, &["count"])),
            ("Shards", lookup(&stats.indices, &["shards", "total"])),
            ("Documents", lookup(&stats.indices, &["docs", "count"])),
            ("Store Size", lookup(&stats.indices, &["store", "size_in_bytes"])),
        ]),
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Cluster state sections, always as a document.
pub async fn cluster_state(
    session: &Session,
    metrics: &[String],
    indices: Option<&str>,
    master_timeout: Option<&str>,
    out: &mut impl Write,
) -> Result<()> {
    let state = session
        .clientset
        .cluster()
        .state(metrics, indices, master_timeout)
        .await
        .context("Failed to get cluster state")?;
    out.write_all(render_document(&state, session.document_format())?.as_bytes())?;
    Ok(())
}

const PENDING_TASK_COLUMNS: &[&str] = &["insert_order", "priority", "source", "time_in_queue"];

pub async fn cluster_pending_tasks(session: &Session, out: &mut impl Write) -> Result<()> {
    let pending = session
        .clientset
        .cluster()
        .pending_tasks()
        .await
        .context("Failed to get pending tasks")?;
    let text = match session.output.document_format() {
        Some(format) => render_document(&pending, format)?,
        None => {
            let records: Vec<Map<String, Value>> = pending
                .tasks
                .iter()
                .filter_map(|task| task.as_object().cloned())
                .collect();
            let columns = (!session.output.is_wide()).then_some(PENDING_TASK_COLUMNS);
            Table::from_records(&records, columns).render()
        }
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

pub async fn cluster_shards(session: &Session, pattern: Option<&str>, out: &mut impl Write) -> Result<()> {
    let shards = session
        .clientset
        .cluster()
        .shards(pattern.unwrap_or_default())
        .await
        .context("Failed to get shards")?;
    out.write_all(render_list(&shards, session.output)?.as_bytes())?;
    Ok(())
}

pub async fn cluster_allocation_explain(
    session: &Session,
    request: &AllocationExplainRequest,
    include_yes_decisions: bool,
    include_disk_info: bool,
    out: &mut impl Write,
) -> Result<()> {
    let explanation = session
        .clientset
        .cluster()
        .explain_allocation(request, include_yes_decisions, include_disk_info)
        .await
        .context("Failed to explain shard allocation")?;
    let text = match session.output.document_format() {
        Some(format) => render_document(&explanation, format)?,
        None => render_details(&[
            ("Index", explanation.index.clone()),
            ("Shard", explanation.shard.to_string()),
            ("Primary", explanation.primary.to_string()),
            ("Current State", explanation.current_state.clone()),
            ("Can Allocate", explanation.can_allocate.clone()),
            ("Explanation", explanation.allocate_explanation.clone()),
        ]),
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Reroute commands from a file holding either a list or `{commands: [...]}`.
pub fn read_reroute_commands(path: &Path) -> Result<Vec<Value>> {
    let value = normalize(
        read_document(path).with_context(|| format!("Failed to read {}", path.display()))?,
    );
    match value {
        Value::Array(commands) => Ok(commands),
        Value::Object(mut map) => match map.remove("commands") {
            Some(Value::Array(commands)) => Ok(commands),
            _ => bail!("{} has no commands list", path.display()),
        },
        _ => bail!("{} must contain a list of reroute commands", path.display()),
    }
}

/// Reroute shards. A dry run asks the cluster to simulate without applying.
pub async fn cluster_reroute(
    session: &Session,
    file: Option<&Path>,
    options: RerouteOptions,
    out: &mut impl Write,
) -> Result<()> {
    let commands = match file {
        Some(path) => read_reroute_commands(path)?,
        None => Vec::new(),
    };
    let options = RerouteOptions {
        dry_run: options.dry_run || session.dry_run,
        ..options
    };
    let response = session
        .clientset
        .cluster()
        .reroute(&commands, options)
        .await
        .context("Failed to reroute")?;
    let text = match session.output.document_format() {
        Some(format) => render_document(&response, format)?,
        None => {
            let acknowledged = response
                .get("acknowledged")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            render_details(&[
                ("Commands", commands.len().to_string()),
                ("Dry Run", options.dry_run.to_string()),
                ("Acknowledged", acknowledged.to_string()),
            ])
        }
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}

/// Persistent and transient settings, always as a document.
pub async fn cluster_settings(session: &Session, out: &mut impl Write) -> Result<()> {
    let settings = session
        .clientset
        .cluster()
        .settings()
        .await
        .context("Failed to get cluster settings")?;
    out.write_all(render_document(&settings, session.document_format())?.as_bytes())?;
    Ok(())
}

pub async fn cluster_settings_update(session: &Session, file: &Path, out: &mut impl Write) -> Result<()> {
    let body = read_body(file)?;
    let has_section = ["persistent", "transient"]
        .iter()
        .any(|key| body.get(key).is_some_and(Value::is_object));
    if !has_section {
        bail!("{} must set persistent or transient settings", file.display());
    }
    if session.dry_run {
        writeln!(out, "Would update cluster settings:")?;
        out.write_all(DocumentFormat::Json.render(&body)?.as_bytes())?;
        return Ok(());
    }
    session
        .clientset
        .cluster()
        .update_settings(&body)
        .await
        .context("Failed to update cluster settings")?;
    writeln!(out, "Cluster settings updated")?;
    Ok(())
}

/// Set shard allocation switches as transient settings. A file supplies a
/// base body whose transient section the flags overlay. With neither, the
/// current settings are shown.
pub async fn cluster_allocation_settings(
    session: &Session,
    settings: &AllocationSettings,
    file: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    if settings.is_empty() && file.is_none() {
        return cluster_settings(session, out).await;
    }

    let mut body = match file {
        Some(path) => read_body(path)?,
        None => json!({}),
    };
    let Value::Object(sections) = &mut body else {
        bail!("Allocation settings must be a mapping");
    };
    let transient = sections
        .entry("transient")
        .or_insert_with(|| Value::Object(Map::new()));
    let Value::Object(transient) = transient else {
        bail!("transient settings must be a mapping");
    };
    transient.extend(settings.to_transient());

    if session.dry_run {
        writeln!(out, "Would update cluster allocation settings:")?;
        out.write_all(DocumentFormat::Json.render(&body)?.as_bytes())?;
        return Ok(());
    }
    session
        .clientset
        .cluster()
        .update_settings(&body)
        .await
        .context("Failed to update cluster allocation settings")?;
    writeln!(out, "Cluster allocation settings updated")?;
    Ok(())
}

/// The config with credentials masked.
pub fn config_view(file: &ConfigFile, output: OutputFormat, out: &mut impl Write) -> Result<()> {
    let mut config = file.config.clone();
    for named in &mut config.users {
        let user = &mut named.user;
        for secret in [&mut user.password, &mut user.api_key] {
            if secret.is_some() {
                *secret = Some("REDACTED".to_string());
            }
        }
    }
    out.write_all(render_document(&config, output.export_format())?.as_bytes())?;
    Ok(())
}

pub fn config_current_context(file: &ConfigFile, out: &mut impl Write) -> Result<()> {
    let name = file.config.current_context_name(None)?;
    writeln!(out, "{}", name)?;
    Ok(())
}

pub fn config_get_contexts(file: &ConfigFile, out: &mut impl Write) -> Result<()> {
    let mut table = Table::new(["CURRENT", "NAME", "CLUSTER", "USER"]);
    for named in &file.config.contexts {
        let marker = if named.name == file.config.current_context {
            "*"
        } else {
            ""
        };
        table.push(vec![
            marker.to_string(),
            named.name.clone(),
            named.context.cluster.clone(),
            named.context.user.clone(),
        ]);
    }
    out.write_all(table.render().as_bytes())?;
    Ok(())
}

/// Switch and persist the current context.
pub fn config_use_context(file: &mut ConfigFile, name: &str, out: &mut impl Write) -> Result<()> {
    file.config.use_context(name)?;
    file.save().context("Failed to save config")?;
    writeln!(out, "Switched to context \"{}\"", name)?;
    Ok(())
}

/// Build and version details.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_commit: String,
    pub build_date: String,
    pub target: String,
}

pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_commit: option_env!("SEARCHCTL_GIT_COMMIT")
            .unwrap_or("unknown")
            .to_string(),
        build_date: option_env!("SEARCHCTL_BUILD_DATE")
            .unwrap_or("unknown")
            .to_string(),
        target: format!("{}-{}", std::env::consts::ARCH, std::env::consts::OS),
    }
}

pub fn version(output: OutputFormat, out: &mut impl Write) -> Result<()> {
    let info = version_info();
    let text = match output.document_format() {
        Some(format) => render_document(&info, format)?,
        None => render_details(&[
            ("Version", info.version.clone()),
            ("Git Commit", info.git_commit.clone()),
            ("Build Date", info.build_date.clone()),
            ("Target", info.target.clone()),
        ]),
    };
    out.write_all(text.as_bytes())?;
    Ok(())
}
