//! # Configuration Validation
//!
//! Validates the merged configuration with the `validator` crate and adds
//! the cross-field checks a derive cannot express.

use crate::config::Config;
use crate::config::ConnectWiseConfig;
use validator::{Validate, ValidationError, ValidationErrors};

/// Validate configuration structure.
///
/// ## Validation Rules
/// ### ConnectWise
/// - `page_size`: 1-1000
/// - `max_records`: 1-10000, and not smaller than `page_size`
/// - `pool_size`: 1-100
/// - `timeout_seconds`: 1-300
/// - `api_base`: a URL when set
///
/// ### Pipeline
/// - `concurrency_limit`: 1-64
/// - `deadline_seconds`: at least 1 when set
///
/// ### Generation
/// - `default_provider`: 1-255 characters
/// - `max_output_tokens`: 1-65536
/// - `timeout_seconds`: 1-900
///
/// ### Observability
/// - `logging_level`: must be "trace", "debug", "info", "warn", or "error"
pub fn validate_config(config: &Config) -> Result<(), ValidationErrors> {
    config.validate()?;
    validate_record_window(&config.connectwise).map_err(|e| {
        let mut errors = ValidationErrors::new();
        errors.add("max_records", e);
        errors
    })
}

fn validate_record_window(cw: &ConnectWiseConfig) -> Result<(), ValidationError> {
    if cw.max_records < cw.page_size {
        return Err(ValidationError::new("max_records_below_page_size"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_concurrency_zero() {
        let mut config = Config::default();
        config.pipeline.concurrency_limit = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_concurrency_too_high() {
        let mut config = Config::default();
        config.pipeline.concurrency_limit = 65;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_invalid_logging_level() {
        let mut config = Config::default();
        config.observability.logging_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_valid_logging_levels() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            let mut config = Config::default();
            config.observability.logging_level = level.to_string();
            assert!(validate_config(&config).is_ok(), "level {level}");
        }
    }

    #[test]
    fn test_validate_api_base_must_be_url() {
        let mut config = Config::default();
        config.connectwise.api_base = Some("not a url".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_deadline() {
        let mut config = Config::default();
        config.pipeline.deadline_seconds = Some(0);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_default_provider() {
        let mut config = Config::default();
        config.generation.default_provider = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_max_records_below_page_size() {
        let mut config = Config::default();
        config.connectwise.page_size = 500;
        config.connectwise.max_records = 100;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.field_errors().contains_key("max_records"));
    }
}
