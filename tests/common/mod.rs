//! Shared fixtures for routing integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ssr_routing::config::{LiveConfig, RoutingConfig};
use ssr_routing::topology::{MemberId, MemberInfo, Members};
use ssr_routing::{
    DatabaseId, RequestError, RoutingContext, RoutingPolicy, RoutingResult,
    ServerSideRoutingPlugin, SocketAddress, StaticTopology, TopologySnapshot,
};

/// Policy double that records what it was asked and returns a fixed table.
pub struct RecordingPolicy {
    pub result: RoutingResult,
    calls: AtomicUsize,
    seen: Mutex<Vec<(DatabaseId, RoutingContext)>>,
}

impl RecordingPolicy {
    pub fn new() -> Self {
        let core = vec![addr("10.0.0.5:7687"), addr("10.0.0.6:7687")];
        let replicas = vec![addr("10.0.1.7:7687")];
        Self {
            result: RoutingResult::new(core.clone(), replicas, core, Duration::from_secs(42)),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn last_request(&self) -> Option<(DatabaseId, RoutingContext)> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl RoutingPolicy for RecordingPolicy {
    fn resolve(
        &self,
        database: &DatabaseId,
        context: &RoutingContext,
    ) -> Result<RoutingResult, RequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((database.clone(), context.clone()));
        Ok(self.result.clone())
    }
}

pub fn addr(raw: &str) -> SocketAddress {
    SocketAddress::parse(raw).unwrap()
}

pub fn members(entries: &[(&str, &str)]) -> Members {
    entries
        .iter()
        .map(|(id, a)| (MemberId::new(*id), MemberInfo::new(addr(a))))
        .collect()
}

/// Two cores and one read replica.
pub fn cluster() -> TopologySnapshot {
    TopologySnapshot::new(
        members(&[("core-1", "10.0.0.5:7687"), ("core-2", "10.0.0.6:7687")]),
        members(&[("replica-1", "10.0.1.7:7687")]),
    )
}

pub struct Harness {
    pub plugin: ServerSideRoutingPlugin,
    pub policy: Arc<RecordingPolicy>,
    pub config: Arc<LiveConfig>,
    #[allow(dead_code)]
    pub topology: Arc<StaticTopology>,
}

pub fn harness(patterns: &[&str], ttl_secs: u64) -> Harness {
    let topology = Arc::new(StaticTopology::new(cluster()));
    let config = Arc::new(LiveConfig::new(RoutingConfig {
        allow_client_side_routing_addresses: patterns.iter().map(|p| p.to_string()).collect(),
        routing_ttl_secs: ttl_secs,
        ..RoutingConfig::default()
    }));
    let policy = Arc::new(RecordingPolicy::new());
    let plugin = ServerSideRoutingPlugin::new(topology.clone(), config.clone(), policy.clone());

    Harness {
        plugin,
        policy,
        config,
        topology,
    }
}

pub fn db() -> DatabaseId {
    DatabaseId::new("neo4j")
}
