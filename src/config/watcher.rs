//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::live::LiveConfig;
use crate::config::loader::load_config;
use crate::config::schema::ServerConfig;
use crate::observability::metrics;
use crate::routing::registry::RegistryError;
use crate::topology::{snapshot_from_config, StaticTopology};

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<ServerConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<ServerConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to be delivered.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        reload_from_file(&path, &tx);
                    }
                }
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Config watcher started");
        Ok(watcher)
    }
}

/// Load, validate and forward one reload; failures keep the current configuration.
fn reload_from_file(path: &Path, tx: &mpsc::UnboundedSender<ServerConfig>) {
    tracing::info!(path = ?path, "Config file change detected, reloading");
    match load_config(path) {
        Ok(new_config) => {
            if tx.send(new_config).is_err() {
                tracing::debug!(path = ?path, "Config update receiver dropped, skipping reload");
            }
        }
        Err(e) => {
            metrics::record_config_reload(false);
            tracing::error!(path = ?path, error = %e, "Config reload rejected, keeping current configuration");
        }
    }
}

/// Apply one validated configuration to the live routing state.
///
/// The configured plugin must be one of `known_plugins`; otherwise nothing
/// is applied and the previous generation stays live.
pub fn apply_update(
    config: &ServerConfig,
    live: &LiveConfig,
    topology: &StaticTopology,
    known_plugins: &[&str],
) -> Result<(), RegistryError> {
    let plugin = config.routing.plugin.as_str();
    if !known_plugins.contains(&plugin) {
        metrics::record_config_reload(false);
        return Err(RegistryError::Unknown(plugin.to_string()));
    }

    live.store(config.routing.clone());
    topology.store(snapshot_from_config(&config.topology));
    metrics::record_config_reload(true);

    tracing::info!(
        plugin = %plugin,
        patterns = config.routing.allow_client_side_routing_addresses.len(),
        routing_ttl_secs = config.routing.routing_ttl_secs,
        core_members = config.topology.core.len(),
        read_replicas = config.topology.read_replicas.len(),
        "Configuration reloaded"
    );
    Ok(())
}

/// Drain config updates into the live state until the sender side closes.
pub fn spawn_reload_task(
    mut updates: mpsc::UnboundedReceiver<ServerConfig>,
    live: Arc<LiveConfig>,
    topology: Arc<StaticTopology>,
    known_plugins: Vec<&'static str>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(config) = updates.recv().await {
            if let Err(e) = apply_update(&config, &live, &topology, &known_plugins) {
                tracing::error!(
                    error = %e,
                    known = ?known_plugins,
                    "Config reload rejected, keeping current configuration"
                );
            }
        }
        tracing::debug!("Config update channel closed");
    })
}
