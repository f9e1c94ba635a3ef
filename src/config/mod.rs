//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → environment variables and CLI flags (applied by each binary)
//!     → validation.rs (semantic checks per tool)
//!     → AttestConfig (immutable for the rest of the run)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal or absent config files
//! - Private keys are never part of the file schema
//! - Validation separates syntactic (serde) from semantic checks and
//!   reports every problem at once

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AttestConfig, AttestationConfig, MockServerConfig, ObservabilityConfig, RpcConfig,
    SettlementConfig, WatcherConfig,
};
pub use validation::ValidationError;
