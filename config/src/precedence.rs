//! # Configuration Precedence
//!
//! Merges configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)
//!
//! Each source is read as a [`ConfigLayer`] holding only what it sets, so
//! an unset environment leaves file values alone while an explicit value
//! always wins, even one equal to the default.

use crate::config::Config;
use crate::file_loader::{ConfigFileError, load_layer_from_file};
use crate::layer::ConfigLayer;
use crate::loader::{EnvError, load_layer_from_env};
use crate::validator::validate_config;
use std::path::Path;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    File(#[from] ConfigFileError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationErrors)
}

/// Merge multiple configuration sources with precedence.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, merge_configs, load_layer_from_file, load_layer_from_env};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let from_file = load_layer_from_file(Path::new("recap.toml"))?;
///     let from_env = load_layer_from_env()?;
///
///     let _config = merge_configs(Config::default(), from_file, "file", from_env, "env", None, "cli");
///     Ok(())
/// }
/// ```
pub fn merge_configs(
    defaults: Config,
    file_layer: ConfigLayer,
    file_source_name: &str,
    env_layer: ConfigLayer,
    env_source_name: &str,
    cli_layer: Option<ConfigLayer>,
    cli_source_name: &str
) -> Config {
    let mut config = defaults;

    merge_with_logging(&mut config, &file_layer, file_source_name);
    merge_with_logging(&mut config, &env_layer, env_source_name);

    if let Some(cli) = cli_layer {
        merge_with_logging(&mut config, &cli, cli_source_name);
    }

    config
}

/// Defaults, then the optional file, then the process environment, then
/// `cli_layer`. The result is validated before it is returned.
pub fn load_layered(
    config_path: Option<&Path>,
    cli_layer: Option<ConfigLayer>
) -> Result<Config, LoadError> {
    let file_layer = match config_path {
        Some(path) => load_layer_from_file(path)?,
        None => ConfigLayer::default()
    };
    let env_layer = load_layer_from_env()?;

    let config = merge_configs(
        Config::default(),
        file_layer,
        "file",
        env_layer,
        "env",
        cli_layer,
        "cli"
    );
    validate_config(&config)?;
    Ok(config)
}

fn merge_with_logging(config: &mut Config, layer: &ConfigLayer, source_name: &str) {
    let changes = layer.apply_to(config);
    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }
}
