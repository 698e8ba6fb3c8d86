//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the routing
//! service. All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Routing plugin settings (dynamic).
    pub routing: RoutingConfig,

    /// Static cluster membership.
    pub topology: TopologyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Routing plugin settings.
///
/// Everything in this section may change at runtime through a reload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Name of the registered routing plugin to serve requests with.
    pub plugin: String,

    /// Addresses or address patterns that allow client side routing.
    /// `?` matches one character, `*` any run of characters.
    pub allow_client_side_routing_addresses: Vec<String>,

    /// Lifetime advertised on routing tables, in seconds.
    pub routing_ttl_secs: u64,
}

impl RoutingConfig {
    pub fn routing_ttl(&self) -> Duration {
        Duration::from_secs(self.routing_ttl_secs)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            plugin: "ssr".to_string(),
            allow_client_side_routing_addresses: Vec::new(),
            routing_ttl_secs: 300, // 5 minutes
        }
    }
}

/// Cluster members known to the static topology provider.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Voting members.
    pub core: Vec<MemberConfig>,

    /// Read replicas.
    pub read_replicas: Vec<MemberConfig>,
}

/// A single cluster member.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MemberConfig {
    /// Unique member identifier.
    pub id: String,

    /// Advertised Bolt address (e.g., "10.0.0.5:7687").
    pub bolt_address: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
