//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Routing table request (database, routing context)
//!     → registry.rs (select configured plugin)
//!     → resolver.rs (extract client address)
//!     → matcher.rs (is the address advertised or allow-listed?)
//!     → known / absent: delegate to RoutingPolicy (policy.rs or external)
//!     → unknown: single-address RoutingResult with configured TTL
//! ```
//!
//! # Design Decisions
//! - Stateless per request; collaborators are injected once at construction
//! - Config and topology are read fresh on every request
//! - Delegation by composition: the plugin holds a `dyn RoutingPolicy`

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::address::SocketAddress;

pub mod context;
pub mod matcher;
pub mod policy;
pub mod registry;
pub mod resolver;

pub use context::{ContextValue, RoutingContext, ADDRESS_CONTEXT_KEY};
pub use policy::TopologyPolicy;
pub use registry::{PluginRegistry, RegistryError};
pub use resolver::{ClientAddress, ServerSideRoutingPlugin};

/// Name of the database a routing table is requested for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DatabaseId(String);

impl DatabaseId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Routing table handed back to the driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingResult {
    pub routers: Vec<SocketAddress>,
    pub readers: Vec<SocketAddress>,
    pub writers: Vec<SocketAddress>,
    /// Time to live in milliseconds.
    pub ttl_millis: u64,
}

impl RoutingResult {
    pub fn new(
        routers: Vec<SocketAddress>,
        readers: Vec<SocketAddress>,
        writers: Vec<SocketAddress>,
        ttl: Duration,
    ) -> Self {
        Self {
            routers,
            readers,
            writers,
            ttl_millis: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Every role served by one address.
    pub fn single(address: SocketAddress, ttl: Duration) -> Self {
        let addresses = vec![address];
        Self::new(addresses.clone(), addresses.clone(), addresses, ttl)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_millis)
    }
}

/// Errors that reject a routing request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error(
        "An address key is included in the routing context, but its value could not be parsed (found {found})"
    )]
    MalformedAddress { found: &'static str },

    #[error("Routing procedure failed: {0}")]
    ProcedureCallFailed(String),
}

/// Server-selection policy producing routing tables.
pub trait RoutingPolicy: Send + Sync {
    fn resolve(
        &self,
        database: &DatabaseId,
        context: &RoutingContext,
    ) -> Result<RoutingResult, RequestError>;
}

/// A routing policy registered under a name.
pub trait RoutingPlugin: RoutingPolicy {
    fn plugin_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_result_uses_one_address_everywhere() {
        let addr = SocketAddress::new("198.51.100.9", 7687);
        let result = RoutingResult::single(addr.clone(), Duration::from_secs(300));

        assert_eq!(result.routers, vec![addr.clone()]);
        assert_eq!(result.readers, vec![addr.clone()]);
        assert_eq!(result.writers, vec![addr]);
        assert_eq!(result.ttl_millis, 300_000);
        assert_eq!(result.ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_result_serializes_addresses_as_strings() {
        let result = RoutingResult::single(SocketAddress::new("10.0.0.5", 7687), Duration::from_millis(1500));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["routers"][0], "10.0.0.5:7687");
        assert_eq!(json["ttl_millis"], 1500);
    }
}
