//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML. Every field
//! has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Hook execution behavior.
    pub registry: RegistryConfig,

    /// Process exit codes reported by the loader.
    pub exit: ExitConfig,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Hook execution configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Convert a panicking hook into a recorded failure.
    pub catch_panics: bool,

    /// Release already-started hooks when startup aborts.
    pub unwind_on_startup_failure: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            catch_panics: true,
            unwind_on_startup_failure: true,
        }
    }
}

/// Exit codes used when hooks fail.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExitConfig {
    /// Reported when startup aborts and main never runs.
    pub startup_failure_code: i32,

    /// Reported when main succeeded but cleanup hooks failed.
    pub cleanup_failure_code: i32,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            // EX_SOFTWARE
            startup_failure_code: 70,
            cleanup_failure_code: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.observability.log_format, LogFormat::Pretty);
        assert!(config.registry.catch_panics);
        assert!(config.registry.unwind_on_startup_failure);
        assert_eq!(config.exit.startup_failure_code, 70);
    }

    #[test]
    fn test_partial_toml() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            [observability]
            log_format = "json"

            [registry]
            catch_panics = false
            "#,
        )
        .unwrap();
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.observability.log_level, "info");
        assert!(!config.registry.catch_panics);
        assert!(config.registry.unwind_on_startup_failure);
    }
}
