//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, pattern compilation)
//!     → ServerConfig (validated, immutable)
//!     → [routing] section stored in LiveConfig, [topology] in StaticTopology
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<RoutingGeneration> / Arc<TopologySnapshot>
//!     → the next routing request observes the new values
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - A failed reload keeps the current configuration

pub mod live;
pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use live::{LiveConfig, RoutingGeneration, RoutingSettings};
pub use loader::{load_config, ConfigError};
pub use schema::{MemberConfig, RoutingConfig, ServerConfig, TopologyConfig};
