//! Cluster topology as seen by the routing plugin.
//!
//! # Responsibilities
//! - Describe core and read-replica members with their advertised Bolt address
//! - Define the provider trait the routing plugin reads snapshots from
//! - Provide a static, hot-swappable provider built from configuration
//!
//! # Design Decisions
//! - Snapshots are immutable values; providers hand out fresh ones per call
//! - `StaticTopology` swaps whole snapshots atomically (ArcSwap), never mutates

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;

use crate::address::SocketAddress;
use crate::config::schema::{MemberConfig, TopologyConfig};

/// Identity of a cluster member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata published by a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    /// Client-facing address drivers should connect to.
    pub bolt_address: SocketAddress,
}

impl MemberInfo {
    pub fn new(bolt_address: SocketAddress) -> Self {
        Self { bolt_address }
    }
}

pub type Members = BTreeMap<MemberId, MemberInfo>;

/// Point-in-time view of the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TopologySnapshot {
    pub core: Members,
    pub read_replicas: Members,
}

impl TopologySnapshot {
    pub fn new(core: Members, read_replicas: Members) -> Self {
        Self {
            core,
            read_replicas,
        }
    }

    /// Advertised client addresses of every member, cores first.
    pub fn bolt_addresses(&self) -> impl Iterator<Item = &SocketAddress> {
        self.core
            .values()
            .chain(self.read_replicas.values())
            .map(|m| &m.bolt_address)
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty() && self.read_replicas.is_empty()
    }
}

/// Source of cluster membership.
pub trait TopologyService: Send + Sync {
    /// Voting members.
    fn core_members(&self) -> Members;

    /// Read replicas.
    fn read_replica_members(&self) -> Members;

    /// Both roles combined into one snapshot.
    fn snapshot(&self) -> TopologySnapshot {
        TopologySnapshot::new(self.core_members(), self.read_replica_members())
    }
}

/// Topology provider backed by a swappable snapshot.
#[derive(Debug)]
pub struct StaticTopology {
    current: ArcSwap<TopologySnapshot>,
}

impl StaticTopology {
    pub fn new(snapshot: TopologySnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Build from the `[topology]` config section.
    /// Members with unparseable addresses are skipped with a warning.
    pub fn from_config(config: &TopologyConfig) -> Self {
        Self::new(snapshot_from_config(config))
    }

    /// Replace the whole snapshot.
    pub fn store(&self, snapshot: TopologySnapshot) {
        self.current.store(Arc::new(snapshot));
    }
}

impl TopologyService for StaticTopology {
    fn core_members(&self) -> Members {
        self.current.load().core.clone()
    }

    fn read_replica_members(&self) -> Members {
        self.current.load().read_replicas.clone()
    }

    fn snapshot(&self) -> TopologySnapshot {
        // Single load so both roles come from the same generation.
        (**self.current.load()).clone()
    }
}

/// Convert config members into a snapshot.
pub fn snapshot_from_config(config: &TopologyConfig) -> TopologySnapshot {
    TopologySnapshot::new(
        members_from_config(&config.core),
        members_from_config(&config.read_replicas),
    )
}

fn members_from_config(members: &[MemberConfig]) -> Members {
    let mut out = Members::new();
    for member in members {
        match SocketAddress::parse(&member.bolt_address) {
            Ok(addr) => {
                out.insert(MemberId::new(member.id.clone()), MemberInfo::new(addr));
            }
            Err(e) => {
                tracing::warn!(member = %member.id, address = %member.bolt_address, error = %e, "Invalid member address");
            }
        }
    }
    out
}
