//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (known log level, exit codes in 1..=255)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RuntimeConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::RuntimeConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown log level `{0}`")]
    UnknownLogLevel(String),

    #[error("{field} must be between 1 and 255, got {value}")]
    ExitCodeOutOfRange { field: &'static str, value: i32 },

    #[error("startup and cleanup failure codes must differ (both {0})")]
    AmbiguousExitCodes(i32),
}

/// Check a parsed configuration.
pub fn validate_config(config: &RuntimeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    let exit = &config.exit;
    for (field, value) in [
        ("exit.startup_failure_code", exit.startup_failure_code),
        ("exit.cleanup_failure_code", exit.cleanup_failure_code),
    ] {
        if !(1..=255).contains(&value) {
            errors.push(ValidationError::ExitCodeOutOfRange { field, value });
        }
    }
    if exit.startup_failure_code == exit.cleanup_failure_code {
        errors.push(ValidationError::AmbiguousExitCodes(exit.startup_failure_code));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RuntimeConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RuntimeConfig::default();
        config.observability.log_level = "loud".into();
        config.exit.startup_failure_code = 0;
        config.exit.cleanup_failure_code = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0], ValidationError::UnknownLogLevel("loud".into()));
        assert!(errors.contains(&ValidationError::AmbiguousExitCodes(0)));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = RuntimeConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
