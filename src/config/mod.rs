//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, EXPRESS_* env overrides)
//!     → validation.rs (semantic checks)
//!     → ExpressConfig (validated, immutable)
//!     → sections cloned into each subsystem at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    BlockchainConfig, ExpressConfig, ListenerConfig, NotifyConfig, ObservabilityConfig,
    RelayConfig, SinkKind,
};
