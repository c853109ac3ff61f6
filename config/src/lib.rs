//! # Configuration System
//!
//! Configuration for the Recap service and CLI.
//!
//! This crate provides:
//! - Configuration structures for every subsystem
//! - Environment variable loading (12-factor app principles)
//! - Configuration file loading (TOML/YAML)
//! - Configuration precedence (CLI > env > file > defaults)
//! - Configuration validation

pub mod config;
pub mod file_loader;
pub mod layer;
pub mod loader;
pub mod precedence;
pub mod validator;

pub use config::{
    Config, ConnectWiseConfig, GenerationConfig, ObservabilityConfig, PipelineConfig,
    ServerConfig
};
pub use file_loader::{
    ConfigFileError, load_from_file, load_from_toml, load_from_yaml, load_layer_from_file
};
pub use layer::{
    ConfigLayer, ConnectWiseLayer, GenerationLayer, ObservabilityLayer, PipelineLayer,
    ServerLayer
};
pub use loader::{EnvError, load_from_env, load_layer_from_env};
pub use precedence::{LoadError, load_layered, merge_configs};
pub use validator::validate_config;
pub use ::validator::Validate;
