//! Topology-backed fallback policy.
//!
//! Builds a routing table straight from the current membership: cores route
//! and write, read replicas read. When no read replica exists the cores serve
//! reads as well. Server groups and ranking are left to external policies.

use std::sync::Arc;

use crate::address::SocketAddress;
use crate::config::RoutingSettings;
use crate::routing::{
    DatabaseId, RequestError, RoutingContext, RoutingPlugin, RoutingPolicy, RoutingResult,
};
use crate::topology::{Members, TopologyService};

pub struct TopologyPolicy {
    topology: Arc<dyn TopologyService>,
    settings: Arc<dyn RoutingSettings>,
}

impl TopologyPolicy {
    pub fn new(topology: Arc<dyn TopologyService>, settings: Arc<dyn RoutingSettings>) -> Self {
        Self { topology, settings }
    }
}

fn addresses(members: &Members) -> Vec<SocketAddress> {
    members.values().map(|m| m.bolt_address.clone()).collect()
}

impl RoutingPolicy for TopologyPolicy {
    fn resolve(
        &self,
        database: &DatabaseId,
        _context: &RoutingContext,
    ) -> Result<RoutingResult, RequestError> {
        let snapshot = self.topology.snapshot();
        if snapshot.core.is_empty() {
            return Err(RequestError::ProcedureCallFailed(format!(
                "no core members available to route database '{}'",
                database.name()
            )));
        }

        let cores = addresses(&snapshot.core);
        let readers = if snapshot.read_replicas.is_empty() {
            cores.clone()
        } else {
            addresses(&snapshot.read_replicas)
        };

        Ok(RoutingResult::new(
            cores.clone(),
            readers,
            cores,
            self.settings.routing_ttl(),
        ))
    }
}

impl RoutingPlugin for TopologyPolicy {
    fn plugin_name(&self) -> &'static str {
        "topology"
    }
}
