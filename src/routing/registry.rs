//! Routing plugin registry.
//!
//! Plugins register under their `plugin_name()`; the `[routing] plugin`
//! option picks which one serves routing table requests.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::config::RoutingConfig;
use crate::routing::RoutingPlugin;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("a routing plugin named '{0}' is already registered")]
    Duplicate(String),

    #[error("no routing plugin named '{0}' is registered")]
    Unknown(String),
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<&'static str, Arc<dyn RoutingPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Arc<dyn RoutingPlugin>) -> Result<(), RegistryError> {
        let name = plugin.plugin_name();
        if self.plugins.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        tracing::debug!(plugin = name, "Registered routing plugin");
        self.plugins.insert(name, plugin);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RoutingPlugin>> {
        self.plugins.get(name).cloned()
    }

    /// Plugin named by the current routing configuration.
    pub fn select(&self, config: &RoutingConfig) -> Result<Arc<dyn RoutingPlugin>, RegistryError> {
        self.get(&config.plugin)
            .ok_or_else(|| RegistryError::Unknown(config.plugin.clone()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.plugins.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
