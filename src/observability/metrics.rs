//! Routing decision metrics.
//!
//! # Metrics
//! - `ssr_routing_decisions_total` (counter): decisions by `outcome`
//! - `ssr_config_reloads_total` (counter): reloads by `result`
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; no-ops until a recorder is installed
//! - Label values are static strings

/// Terminal outcome of one routing table request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No client address; delegated.
    DelegatedAbsent,
    /// Client address text did not parse; delegated.
    DelegatedUnparseable,
    /// Client address advertised or allow-listed; delegated.
    DelegatedKnown,
    /// Client address unknown; single-address table returned.
    Direct,
    /// Address entry was not text.
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::DelegatedAbsent => "delegated_absent",
            Decision::DelegatedUnparseable => "delegated_unparseable",
            Decision::DelegatedKnown => "delegated_known",
            Decision::Direct => "direct",
            Decision::Rejected => "rejected",
        }
    }
}

pub fn record_decision(decision: Decision) {
    metrics::counter!("ssr_routing_decisions_total", "outcome" => decision.as_str()).increment(1);
}

pub fn record_config_reload(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    metrics::counter!("ssr_config_reloads_total", "result" => result).increment(1);
}
