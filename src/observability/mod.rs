//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing + config subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (decision and reload counters)
//! ```
//!
//! # Design Decisions
//! - Structured fields (database, address, outcome) on every decision event
//! - Metrics are cheap and recorder-agnostic

pub mod logging;
pub mod metrics;
