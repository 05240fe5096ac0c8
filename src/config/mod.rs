//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → prefix applied to the registry, the rest handed to the HTTP server
//! ```
//!
//! # Design Decisions
//! - Config is read once at start-up; there is no reload (routes are frozen)
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ServerConfig;
pub use schema::{DispatchConfig, LimitsConfig, ListenerConfig, LogFormat, ObservabilityConfig};
pub use validation::ValidationError;
