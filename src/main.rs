//! `ssr-routing`: evaluate routing table requests against a cluster config.
//!
//! ```text
//!   cluster.toml ──▶ loader ──▶ LiveConfig + StaticTopology ◀── watcher (--watch)
//!                                    │
//!   request (database, context) ──▶ PluginRegistry ──▶ ssr plugin ──▶ RoutingResult (JSON)
//!                                                         │
//!                                                         └──▶ TopologyPolicy (delegate)
//! ```

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use ssr_routing::config::watcher::{spawn_reload_task, ConfigWatcher};
use ssr_routing::config::{load_config, LiveConfig, RoutingSettings, ServerConfig};
use ssr_routing::observability::logging;
use ssr_routing::routing::matcher::{Matcher, MemberMatcher};
use ssr_routing::routing::{
    DatabaseId, PluginRegistry, RoutingContext, RoutingPolicy, ServerSideRoutingPlugin,
    TopologyPolicy,
};
use ssr_routing::{RoutingResult, SocketAddress, StaticTopology, TopologyService};

#[derive(Parser)]
#[command(name = "ssr-routing")]
#[command(about = "Evaluate server-side routing decisions for a cluster", long_about = None)]
struct Cli {
    /// Cluster configuration file (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload the configuration file when it changes.
    #[arg(short, long, requires = "config")]
    watch: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single routing table request
    Resolve {
        #[arg(short, long, default_value = "neo4j")]
        database: String,

        /// Routing context as a JSON object, e.g. '{"address":"lb:7687"}'
        #[arg(long)]
        context: Option<String>,
    },
    /// Report whether an address is known to the cluster
    Check { address: String },
    /// Read one JSON routing context per line from stdin, answer on stdout
    ServeStdin {
        #[arg(short, long, default_value = "neo4j")]
        database: String,
    },
}

struct Routing {
    live: Arc<LiveConfig>,
    topology: Arc<StaticTopology>,
    registry: PluginRegistry,
}

impl Routing {
    fn new(config: &ServerConfig) -> Result<Self, Box<dyn Error>> {
        let live = Arc::new(LiveConfig::new(config.routing.clone()));
        let topology = Arc::new(StaticTopology::from_config(&config.topology));

        let fallback = Arc::new(TopologyPolicy::new(topology.clone(), live.clone()));
        let ssr = Arc::new(ServerSideRoutingPlugin::new(
            topology.clone(),
            live.clone(),
            fallback.clone(),
        ));

        let mut registry = PluginRegistry::new();
        registry.register(ssr)?;
        registry.register(fallback)?;
        // Fail fast on a plugin name nothing registered.
        registry.select(&config.routing)?;

        Ok(Self {
            live,
            topology,
            registry,
        })
    }

    fn resolve(&self, database: &DatabaseId, context: &RoutingContext) -> Result<RoutingResult, Box<dyn Error>> {
        let plugin = self.registry.select(&self.live.snapshot())?;
        Ok(plugin.resolve(database, context)?)
    }
}

fn parse_context(raw: &str) -> Result<RoutingContext, Box<dyn Error>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    RoutingContext::from_json(value).ok_or_else(|| "routing context must be a JSON object".into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        plugin = %config.routing.plugin,
        patterns = config.routing.allow_client_side_routing_addresses.len(),
        routing_ttl_secs = config.routing.routing_ttl_secs,
        core_members = config.topology.core.len(),
        read_replicas = config.topology.read_replicas.len(),
        "Configuration loaded"
    );

    let routing = Routing::new(&config)?;

    // Keep the watcher alive for the whole run.
    let _watcher = match (&cli.config, cli.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            spawn_reload_task(
                updates,
                routing.live.clone(),
                routing.topology.clone(),
                routing.registry.names(),
            );
            Some(watcher.run()?)
        }
        _ => None,
    };

    match cli.command {
        Commands::Resolve { database, context } => {
            let context = match context {
                Some(raw) => parse_context(&raw)?,
                None => RoutingContext::new(),
            };
            let result = routing.resolve(&DatabaseId::new(database), &context)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Check { address } => {
            let address = SocketAddress::parse(&address)?;
            let snapshot = routing.topology.snapshot();
            let config = routing.live.snapshot();

            let reason = if MemberMatcher::new(&snapshot).matches(&address) {
                "member"
            } else if config.allow_list().matches(&address) {
                "allow-list"
            } else {
                "unknown"
            };
            let report = json!({
                "address": address,
                "known": reason != "unknown",
                "reason": reason,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::ServeStdin { database } => {
            let database = DatabaseId::new(database);
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            while let Some(line) = lines.next_line().await? {
                if line.trim().is_empty() {
                    continue;
                }
                let reply = match parse_context(&line).and_then(|ctx| routing.resolve(&database, &ctx)) {
                    Ok(result) => json!({ "result": result }),
                    Err(e) => json!({ "error": e.to_string() }),
                };
                println!("{reply}");
            }
            tracing::info!("Input closed, exiting");
        }
    }

    Ok(())
}
