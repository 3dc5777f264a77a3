use clap::{Args, Parser, Subcommand, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use searchctl::cli::{self, NodeView, ResourceType, Session};
use searchctl::clone::{ExportOptions, ImportOptions, select_kinds};
use searchctl::config::ConfigFile;
use searchctl::output::OutputFormat;
use searchctl::resources::{NodeSelector, SortKey, parse_columns};
use searchctl::rollover::RolloverConditions;
use searchctl::types::{AllocationExplainRequest, AllocationSettings, RerouteOptions};
use std::io::Write;
use std::path::PathBuf;

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// searchctl: kubectl-style administration for Elasticsearch and OpenSearch clusters
#[derive(Parser)]
#[command(name = "searchctl", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source credentials from
    #[arg(short, long, global = true, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: $SEARCHCTL_CONFIG or ~/.searchctl/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Context to use instead of current-context
    #[arg(long, global = true)]
    context: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Show what would change without changing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List resources
    Get {
        #[arg(value_enum)]
        resource: ResourceType,

        /// Name or wildcard pattern (default: all)
        name: Option<String>,

        #[command(flatten)]
        nodes: NodeArgs,
    },

    /// Show one resource in full
    Describe {
        #[arg(value_enum)]
        resource: ResourceType,

        name: String,
    },

    /// Create a resource
    Create {
        #[arg(value_enum)]
        resource: ResourceType,

        name: String,

        /// YAML or JSON body file; an envelope's spec is used
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Delete a resource; indices and data streams accept wildcard patterns
    Delete {
        #[arg(value_enum)]
        resource: ResourceType,

        name: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Create or update the resource described by a manifest file
    Apply {
        /// Manifest file with kind, metadata.name and spec
        #[arg(short, long)]
        file: PathBuf,

        /// Reject documents with non-string keys instead of dropping them
        #[arg(long)]
        strict: bool,
    },

    /// Roll over a data stream
    Rollover {
        #[command(subcommand)]
        target: RolloverTarget,
    },

    /// Export or import cluster configuration
    Clone {
        #[command(subcommand)]
        command: CloneCommands,
    },

    /// Cluster-wide operations
    Cluster {
        #[command(subcommand)]
        command: ClusterCommands,
    },

    /// Inspect or change the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Print version information
    Version,
}

#[derive(Args)]
struct NodeArgs {
    /// Only nodes with this role (master, data, ingest, ml, ... or a one-letter code)
    #[arg(long)]
    role: Option<String>,

    /// Only nodes whose name or IP contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Comma-separated columns to sort by
    #[arg(long)]
    sort: Option<String>,

    /// Sort in descending order
    #[arg(long)]
    desc: bool,

    /// Show at most this many nodes
    #[arg(long)]
    limit: Option<usize>,

    /// Comma-separated columns to show
    #[arg(long)]
    columns: Option<String>,
}

impl NodeArgs {
    fn into_view(self) -> NodeView {
        NodeView {
            selector: NodeSelector {
                role: self.role,
                name: self.filter,
                sort: self.sort.as_deref().map(SortKey::parse_list).unwrap_or_default(),
                descending: self.desc,
                limit: self.limit,
            },
            columns: self.columns.as_deref().map(parse_columns).unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum RolloverTarget {
    /// Roll over a data stream to a new backing index
    #[command(visible_alias = "ds", alias = "data-stream")]
    Datastream {
        name: String,

        #[arg(long)]
        max_age: Option<String>,

        #[arg(long)]
        max_docs: Option<u64>,

        #[arg(long)]
        max_size: Option<String>,

        #[arg(long)]
        max_primary_shard_size: Option<String>,

        #[arg(long)]
        max_primary_shard_docs: Option<u64>,

        /// Conditions file; its values override the flags
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Roll over on the next write instead of now
        #[arg(long)]
        lazy: bool,
    },
}

#[derive(Subcommand)]
enum CloneCommands {
    /// Write cluster configuration to a directory tree
    Export {
        #[arg(default_value = "./cluster-export")]
        dir: PathBuf,

        /// Types to export (component-templates, index-templates, lifecycle-policies, ingest-pipelines, cluster-settings)
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Name patterns to export
        #[arg(long, value_delimiter = ',')]
        names: Vec<String>,

        /// Export every type
        #[arg(long)]
        all: bool,

        /// Include system resources (names starting with '.')
        #[arg(long)]
        include_system: bool,
    },

    /// Apply an exported directory tree to a cluster
    Import {
        #[arg(default_value = "./cluster-export")]
        dir: PathBuf,

        /// Types to import
        #[arg(long, value_delimiter = ',')]
        types: Vec<String>,

        /// Keep going after a failed file
        #[arg(long)]
        continue_on_error: bool,

        /// Reject documents with non-string keys instead of dropping them
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Subcommand)]
enum ClusterCommands {
    /// Cluster health summary
    Health,

    /// Name, version and distribution
    Info,

    /// Node and index counts
    Stats,

    /// Cluster state, optionally restricted to some metrics
    State {
        /// Metrics to return (metadata, routing_table, nodes, ...)
        #[arg(long, value_delimiter = ',')]
        metrics: Vec<String>,

        /// Index pattern to restrict metadata to
        #[arg(long)]
        indices: Option<String>,

        #[arg(long)]
        master_timeout: Option<String>,
    },

    /// Cluster-level changes not yet executed
    PendingTasks,

    /// Shard placement, optionally for one index pattern
    Shards { pattern: Option<String> },

    /// Explain why a shard is or is not allocated
    AllocationExplain {
        #[arg(long)]
        index: Option<String>,

        #[arg(long)]
        shard: Option<u32>,

        #[arg(long)]
        primary: Option<bool>,

        #[arg(long)]
        include_yes_decisions: bool,

        #[arg(long)]
        include_disk_info: bool,
    },

    /// Move, cancel or allocate shards
    Reroute {
        /// File with reroute commands
        #[arg(short, long)]
        file: Option<PathBuf>,

        #[arg(long)]
        explain: bool,

        #[arg(long)]
        retry_failed: bool,
    },

    /// Get or set shard allocation settings (enable, rebalance, awareness)
    AllocationSettings {
        /// Allocation enable
        #[arg(long, value_parser = ["all", "primaries", "new_primaries", "none"])]
        enable: Option<String>,

        /// Rebalance enable
        #[arg(long, value_parser = ["all", "primaries", "replicas", "none"])]
        rebalance: Option<String>,

        /// Allocation awareness attributes (comma-separated)
        #[arg(long)]
        awareness_attrs: Option<String>,

        /// Settings file whose transient section the flags overlay
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show or update cluster settings
    Settings {
        #[command(subcommand)]
        command: Option<SettingsCommands>,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show persistent and transient settings
    Get,

    /// Update settings from a file with persistent and/or transient sections
    Update {
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the config with credentials masked
    View,

    /// Print the current context name
    CurrentContext,

    /// List contexts
    GetContexts,

    /// Switch the current context
    UseContext { name: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let Cli {
        env,
        debug,
        config,
        context,
        output,
        dry_run,
        command,
    } = Cli::parse();
    // The dotenv file is optional
    dotenvy::from_filename(&env).ok();

    let log_level = match debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    let mut stdout = std::io::stdout().lock();

    let command = match command {
        Commands::Version => return cli::version(output, &mut stdout),
        Commands::Config { command } => {
            let mut file = ConfigFile::load(config.as_deref())?;
            return match command {
                ConfigCommands::View => cli::config_view(&file, output, &mut stdout),
                ConfigCommands::CurrentContext => cli::config_current_context(&file, &mut stdout),
                ConfigCommands::GetContexts => cli::config_get_contexts(&file, &mut stdout),
                ConfigCommands::UseContext { name } => {
                    cli::config_use_context(&mut file, &name, &mut stdout)
                }
            };
        }
        command => command,
    };

    let clientset = cli::load_clientset(config.as_deref(), context.as_deref())?;
    let session = Session::new(clientset, output).with_dry_run(dry_run);
    if dry_run {
        log::info!("{}", "Dry run: no changes will be made".yellow());
    }

    run(session, command, &mut stdout).await?;
    stdout.flush()?;
    Ok(())
}

async fn run(session: Session, command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Get {
            resource,
            name,
            nodes,
        } => cli::get(&session, resource, name.as_deref(), &nodes.into_view(), out).await,
        Commands::Describe { resource, name } => cli::describe(&session, resource, &name, out).await,
        Commands::Create {
            resource,
            name,
            file,
        } => cli::create(&session, resource, &name, file.as_deref(), out).await,
        Commands::Delete {
            resource,
            name,
            yes,
        } => {
            let session = session.with_assume_yes(yes);
            cli::delete(&session, resource, &name, out).await
        }
        Commands::Apply { file, strict } => cli::apply(&session, &file, strict, out).await,
        Commands::Rollover {
            target:
                RolloverTarget::Datastream {
                    name,
                    max_age,
                    max_docs,
                    max_size,
                    max_primary_shard_size,
                    max_primary_shard_docs,
                    file,
                    lazy,
                },
        } => {
            let conditions = RolloverConditions {
                max_age,
                max_docs,
                max_size,
                max_primary_shard_size,
                max_primary_shard_docs,
            };
            cli::rollover(&session, &name, &conditions, file.as_deref(), lazy, out).await
        }
        Commands::Clone { command } => match command {
            CloneCommands::Export {
                dir,
                types,
                names,
                all,
                include_system,
            } => {
                let options = ExportOptions {
                    kinds: select_kinds(&types, all)?,
                    names,
                    include_system,
                    format: session.output.export_format(),
                };
                log::info!("Exporting to {}", dir.display().bright_black());
                cli::export(&session, &dir, &options, out).await
            }
            CloneCommands::Import {
                dir,
                types,
                continue_on_error,
                strict,
            } => {
                let options = ImportOptions {
                    kinds: select_kinds(&types, false)?,
                    continue_on_error,
                    dry_run: false,
                    strict,
                };
                log::info!("Importing from {}", dir.display().bright_black());
                cli::import(&session, &dir, &options, out).await
            }
        },
        Commands::Cluster { command } => match command {
            ClusterCommands::Health => cli::cluster_health(&session, out).await,
            ClusterCommands::Info => cli::cluster_info(&session, out).await,
            ClusterCommands::Stats => cli::cluster_stats(&session, out).await,
            ClusterCommands::State {
                metrics,
                indices,
                master_timeout,
            } => {
                cli::cluster_state(
                    &session,
                    &metrics,
                    indices.as_deref(),
                    master_timeout.as_deref(),
                    out,
                )
                .await
            }
            ClusterCommands::PendingTasks => cli::cluster_pending_tasks(&session, out).await,
            ClusterCommands::Shards { pattern } => {
                cli::cluster_shards(&session, pattern.as_deref(), out).await
            }
            ClusterCommands::AllocationExplain {
                index,
                shard,
                primary,
                include_yes_decisions,
                include_disk_info,
            } => {
                let request = AllocationExplainRequest {
                    index,
                    shard,
                    primary,
                };
                cli::cluster_allocation_explain(
                    &session,
                    &request,
                    include_yes_decisions,
                    include_disk_info,
                    out,
                )
                .await
            }
            ClusterCommands::Reroute {
                file,
                explain,
                retry_failed,
            } => {
                let options = RerouteOptions {
                    dry_run: false,
                    explain,
                    retry_failed,
                };
                cli::cluster_reroute(&session, file.as_deref(), options, out).await
            }
            ClusterCommands::AllocationSettings {
                enable,
                rebalance,
                awareness_attrs,
                file,
            } => {
                let settings = AllocationSettings {
                    enable,
                    rebalance,
                    awareness_attributes: awareness_attrs,
                };
                cli::cluster_allocation_settings(&session, &settings, file.as_deref(), out).await
            }
            ClusterCommands::Settings { command } => match command {
                None | Some(SettingsCommands::Get) => cli::cluster_settings(&session, out).await,
                Some(SettingsCommands::Update { file }) => {
                    cli::cluster_settings_update(&session, &file, out).await
                }
            },
        },
        Commands::Config { .. } | Commands::Version => Ok(()),
    }
}
