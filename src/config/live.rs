//! Runtime view of the dynamic routing settings.
//!
//! # Design Decisions
//! - Readers take one `Arc` snapshot per request; writers swap whole configs
//! - No locks on the read path (ArcSwap)
//! - Allow-list patterns are compiled once per stored generation, not per request

use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;

use crate::config::schema::RoutingConfig;
use crate::routing::matcher::AllowList;

/// One installed routing configuration together with its compiled allow-list.
#[derive(Debug)]
pub struct RoutingGeneration {
    config: RoutingConfig,
    allow_list: AllowList,
}

impl RoutingGeneration {
    pub fn new(config: RoutingConfig) -> Self {
        let allow_list = AllowList::compile(&config.allow_client_side_routing_addresses);
        Self { config, allow_list }
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }
}

impl Deref for RoutingGeneration {
    type Target = RoutingConfig;

    fn deref(&self) -> &RoutingConfig {
        &self.config
    }
}

/// Accessor for the routing options the plugin consults on every request.
pub trait RoutingSettings: Send + Sync {
    /// Consistent copy of all routing options.
    fn snapshot(&self) -> Arc<RoutingGeneration>;

    /// Configured allow-list patterns, in declaration order.
    fn allow_list_patterns(&self) -> Vec<String> {
        self.snapshot().allow_client_side_routing_addresses.clone()
    }

    /// Lifetime advertised on routing tables.
    fn routing_ttl(&self) -> Duration {
        self.snapshot().routing_ttl()
    }
}

/// Hot-swappable routing configuration.
#[derive(Debug)]
pub struct LiveConfig {
    current: ArcSwap<RoutingGeneration>,
}

impl LiveConfig {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(RoutingGeneration::new(config)),
        }
    }

    /// Install a new configuration; in-flight requests keep their snapshot.
    pub fn store(&self, config: RoutingConfig) {
        self.current.store(Arc::new(RoutingGeneration::new(config)));
    }

    pub fn current(&self) -> Arc<RoutingGeneration> {
        self.current.load_full()
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

impl RoutingSettings for LiveConfig {
    fn snapshot(&self) -> Arc<RoutingGeneration> {
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_is_visible_to_new_reads_only() {
        let live = LiveConfig::default();
        let before = live.snapshot();

        live.store(RoutingConfig {
            allow_client_side_routing_addresses: vec!["*.lb.local".into()],
            routing_ttl_secs: 10,
            ..RoutingConfig::default()
        });

        assert!(before.allow_client_side_routing_addresses.is_empty());
        assert!(before.allow_list().is_empty());
        assert_eq!(before.routing_ttl(), Duration::from_secs(300));
        assert_eq!(live.allow_list_patterns(), vec!["*.lb.local".to_string()]);
        assert_eq!(live.routing_ttl(), Duration::from_secs(10));
    }

    #[test]
    fn test_allow_list_is_compiled_once_per_generation() {
        let live = LiveConfig::new(RoutingConfig {
            allow_client_side_routing_addresses: vec!["10.0.0.*".into(), "?".repeat(200_000)],
            ..RoutingConfig::default()
        });

        let first = live.snapshot();
        let second = live.snapshot();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.allow_list().len(), 1);

        live.store(RoutingConfig {
            allow_client_side_routing_addresses: vec!["a".into(), "b".into()],
            ..RoutingConfig::default()
        });
        let third = live.snapshot();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.allow_list().len(), 2);
        assert_eq!(first.allow_list().len(), 1);
    }
}
