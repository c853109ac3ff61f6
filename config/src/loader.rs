//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! - `CW_*`: ConnectWise Manage settings
//! - `RECAP_*`: Pipeline, generation and observability settings
//! - `*_API_BASE`: Provider endpoint overrides
//! - `HOST`, `PORT`: HTTP listener
//!
//! Unset or empty variables fall back to the defaults in [`crate::config`].
//! A variable that is set but does not parse is an error, not a silent
//! fallback.

use crate::config::Config;
use crate::layer::{
    ConfigLayer, ConnectWiseLayer, GenerationLayer, ObservabilityLayer, PipelineLayer,
    ServerLayer
};
use std::env;
use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String
    }
}

/// Load configuration from environment variables.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_env()?;
///     println!("Concurrency: {}", config.pipeline.concurrency_limit);
///     Ok(())
/// }
/// ```
///
/// ## Environment Variables
/// ### ConnectWise (`CW_*`)
/// - `CW_SITE_URL`, `CW_COMPANY_ID`, `CW_PUBLIC_KEY`, `CW_PRIVATE_KEY`
/// - `CW_CLIENT_ID`: Optional `clientId` header
/// - `CW_API_BASE`: Full REST base URL override
/// - `CW_PAGE_SIZE` (default: 1000), `CW_MAX_RECORDS` (default: 1000)
/// - `CW_POOL_SIZE` (default: 20), `CW_TIMEOUT_SECONDS` (default: 30)
///
/// ### Pipeline
/// - `RECAP_CONCURRENCY_LIMIT`: Parallel detail fetches (default: 10)
/// - `RECAP_DEADLINE_SECONDS`: Optional aggregation deadline
///
/// ### Generation
/// - `RECAP_DEFAULT_PROVIDER` (default: "gemini:gemini-2.5-pro")
/// - `RECAP_MAX_OUTPUT_TOKENS` (default: 8192)
/// - `RECAP_GENERATION_TIMEOUT_SECONDS` (default: 300)
/// - `GEMINI_API_BASE`, `OPENAI_API_BASE`, `ANTHROPIC_API_BASE`
///
/// ### Server
/// - `HOST` (default: "0.0.0.0"), `PORT` (default: 5000)
///
/// ### Observability
/// - `RECAP_LOG_LEVEL` (default: "info")
/// - `RECAP_METRICS_ENABLED` (default: true)
pub fn load_from_env() -> Result<Config, EnvError> {
    Ok(load_layer_from_env()?.into_config())
}

/// Only the variables that are set, so an env value equal to the default
/// still overrides the file.
pub fn load_layer_from_env() -> Result<ConfigLayer, EnvError> {
    Ok(ConfigLayer {
        connectwise: ConnectWiseLayer {
            site_url: env_string("CW_SITE_URL"),
            company_id: env_string("CW_COMPANY_ID"),
            public_key: env_string("CW_PUBLIC_KEY"),
            private_key: env_string("CW_PRIVATE_KEY"),
            client_id: env_string("CW_CLIENT_ID"),
            api_base: env_string("CW_API_BASE"),
            page_size: parse_env("CW_PAGE_SIZE")?,
            max_records: parse_env("CW_MAX_RECORDS")?,
            pool_size: parse_env("CW_POOL_SIZE")?,
            timeout_seconds: parse_env("CW_TIMEOUT_SECONDS")?
        },
        pipeline: PipelineLayer {
            concurrency_limit: parse_env("RECAP_CONCURRENCY_LIMIT")?,
            deadline_seconds: parse_env("RECAP_DEADLINE_SECONDS")?
        },
        generation: GenerationLayer {
            default_provider: env_string("RECAP_DEFAULT_PROVIDER"),
            max_output_tokens: parse_env("RECAP_MAX_OUTPUT_TOKENS")?,
            timeout_seconds: parse_env("RECAP_GENERATION_TIMEOUT_SECONDS")?,
            gemini_base_url: env_string("GEMINI_API_BASE"),
            openai_base_url: env_string("OPENAI_API_BASE"),
            anthropic_base_url: env_string("ANTHROPIC_API_BASE")
        },
        server: ServerLayer {
            host: env_string("HOST"),
            port: parse_env("PORT")?
        },
        observability: ObservabilityLayer {
            logging_level: env_string("RECAP_LOG_LEVEL"),
            metrics_enabled: parse_env("RECAP_METRICS_ENABLED")?
        }
    })
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str) -> Result<Option<T>, EnvError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display
{
    match env_string(key) {
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| EnvError::Invalid {
            key: key.to_string(),
            value: raw,
            reason: e.to_string()
        }),
        None => Ok(None)
    }
}
