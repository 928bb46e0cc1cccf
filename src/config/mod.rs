//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RuntimeConfig (validated, immutable)
//!     → registry options, logging, exit codes
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start; hooks are static afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ExitConfig, LogFormat, ObservabilityConfig, RegistryConfig, RuntimeConfig};
pub use validation::ValidationError;
