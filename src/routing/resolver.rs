//! Server-side routing plugin.
//!
//! # Responsibilities
//! - Extract the address a driver declares in its routing context
//! - Delegate to the server-selection policy when the address is absent or known
//! - Answer with a single-address routing table when the address is unknown
//!
//! # Decision Table
//! ```text
//! address entry               outcome
//! ─────────────────────────   ──────────────────────────────────────
//! missing / NoValue           delegate
//! Text, unparseable           delegate (warned)
//! Text, member or allowed     delegate
//! Text, unknown               [addr] as routers/readers/writers, ttl
//! any other type              RequestError::MalformedAddress
//! ```
//!
//! # Design Decisions
//! - An unparseable string is tolerated but a non-string value is rejected
//! - One config snapshot and one topology snapshot per request
//! - The allow-list comes precompiled with the config snapshot

use std::sync::Arc;

use crate::address::SocketAddress;
use crate::config::RoutingSettings;
use crate::observability::metrics::{self, Decision};
use crate::routing::context::{ContextValue, RoutingContext, ADDRESS_CONTEXT_KEY};
use crate::routing::matcher::is_known_with;
use crate::routing::{DatabaseId, RequestError, RoutingPlugin, RoutingPolicy, RoutingResult};
use crate::topology::TopologyService;

/// Name the plugin registers under.
pub const PLUGIN_NAME: &str = "ssr";

/// Outcome of looking for a client-declared address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAddress {
    /// No address entry, or an explicit no-value marker.
    Absent,
    /// A textual entry that parsed.
    Provided(SocketAddress),
    /// A textual entry that did not parse; handled like `Absent`.
    Unparseable(String),
}

impl ClientAddress {
    /// Read the address entry of a routing context.
    ///
    /// Fails only when the entry holds a value that is not text.
    pub fn from_context(context: &RoutingContext) -> Result<Self, RequestError> {
        match context.get(ADDRESS_CONTEXT_KEY) {
            None | Some(ContextValue::NoValue) => Ok(ClientAddress::Absent),
            Some(ContextValue::Text(raw)) => Ok(match SocketAddress::parse(raw) {
                Ok(addr) => ClientAddress::Provided(addr),
                Err(_) => ClientAddress::Unparseable(raw.clone()),
            }),
            Some(other) => Err(RequestError::MalformedAddress {
                found: other.type_name(),
            }),
        }
    }
}

/// Routing plugin that honours client-declared addresses unknown to the cluster.
pub struct ServerSideRoutingPlugin {
    topology: Arc<dyn TopologyService>,
    settings: Arc<dyn RoutingSettings>,
    policy: Arc<dyn RoutingPolicy>,
}

impl ServerSideRoutingPlugin {
    pub fn new(
        topology: Arc<dyn TopologyService>,
        settings: Arc<dyn RoutingSettings>,
        policy: Arc<dyn RoutingPolicy>,
    ) -> Self {
        Self {
            topology,
            settings,
            policy,
        }
    }

    /// Whether an address is advertised by a member or allowed by configuration.
    pub fn is_known_advertised_address(&self, address: &SocketAddress) -> bool {
        let config = self.settings.snapshot();
        let topology = self.topology.snapshot();
        is_known_with(address, &topology, config.allow_list())
    }

    fn delegate(
        &self,
        database: &DatabaseId,
        context: &RoutingContext,
        decision: Decision,
    ) -> Result<RoutingResult, RequestError> {
        metrics::record_decision(decision);
        tracing::debug!(
            database = %database,
            context_entries = context.len(),
            outcome = decision.as_str(),
            "Delegating routing table request"
        );
        self.policy.resolve(database, context)
    }
}

impl RoutingPolicy for ServerSideRoutingPlugin {
    fn resolve(
        &self,
        database: &DatabaseId,
        context: &RoutingContext,
    ) -> Result<RoutingResult, RequestError> {
        let client_address = ClientAddress::from_context(context).inspect_err(|e| {
            metrics::record_decision(Decision::Rejected);
            tracing::debug!(database = %database, error = %e, "Rejecting routing table request");
        })?;

        let address = match client_address {
            ClientAddress::Absent => {
                return self.delegate(database, context, Decision::DelegatedAbsent)
            }
            ClientAddress::Unparseable(raw) => {
                tracing::warn!(database = %database, address = %raw, "Ignoring unparseable client address");
                return self.delegate(database, context, Decision::DelegatedUnparseable);
            }
            ClientAddress::Provided(address) => address,
        };

        let config = self.settings.snapshot();
        let topology = self.topology.snapshot();
        if is_known_with(&address, &topology, config.allow_list()) {
            return self.delegate(database, context, Decision::DelegatedKnown);
        }

        metrics::record_decision(Decision::Direct);
        tracing::debug!(
            database = %database,
            address = %address,
            outcome = Decision::Direct.as_str(),
            "Routing directly to client-declared address"
        );
        Ok(RoutingResult::single(address, config.routing_ttl()))
    }
}

impl RoutingPlugin for ServerSideRoutingPlugin {
    fn plugin_name(&self) -> &'static str {
        PLUGIN_NAME
    }
}
