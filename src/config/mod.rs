//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → loader.rs (ACL source → AccessControlList)
//!     → shared via Arc to the interceptor and hub
//! ```
//!
//! # Design Decisions
//! - Config and ACL are immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_acl, load_config, parse_config, ConfigError};
pub use schema::{AclConfig, ListenerConfig, ObservabilityConfig, ServiceConfig, TelemetryConfig};
