//! Server-side routing decision point for clustered Bolt deployments.
//!
//! Drivers that connect through a load balancer may declare an address the
//! cluster does not advertise. The `ssr` routing plugin either hands such a
//! driver a routing table containing only that address, or falls back to the
//! regular server-selection policy when the address is absent or known.

pub mod address;
pub mod config;
pub mod observability;
pub mod routing;
pub mod topology;

pub use address::SocketAddress;
pub use config::{LiveConfig, RoutingSettings, ServerConfig};
pub use routing::{
    DatabaseId, RequestError, RoutingContext, RoutingPlugin, RoutingPolicy, RoutingResult,
    ServerSideRoutingPlugin,
};
pub use topology::{StaticTopology, TopologyService, TopologySnapshot};
