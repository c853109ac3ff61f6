//! # Configuration File Loading
//!
//! Loads configuration from TOML or YAML files, picking the parser from the
//! file extension. Every section and field is optional in the file; omitted
//! values take their defaults.

use crate::config::Config;
use crate::layer::ConfigLayer;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Configuration file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(String),

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml
}

impl FileFormat {
    fn detect(path: &Path) -> Result<Self, ConfigFileError> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigFileError::NoExtension)?;

        match extension.to_lowercase().as_str() {
            "toml" => Ok(FileFormat::Toml),
            "yaml" | "yml" => Ok(FileFormat::Yaml),
            other => Err(ConfigFileError::UnsupportedFormat(other.to_string()))
        }
    }

    fn parse<T: DeserializeOwned>(self, contents: &str) -> Result<T, ConfigFileError> {
        match self {
            FileFormat::Toml => {
                toml::from_str(contents).map_err(|e| ConfigFileError::TomlParse(e.to_string()))
            }
            FileFormat::Yaml => serde_yaml::from_str(contents)
                .map_err(|e| ConfigFileError::YamlParse(e.to_string()))
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigFileError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ConfigFileError::FileNotFound(path.display().to_string()),
        _ => ConfigFileError::Io(e)
    })
}

/// Load configuration from a TOML file.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_toml;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_toml(Path::new("recap.toml"))?;
///     println!("Listening on port {}", config.server.port);
///     Ok(())
/// }
/// ```
pub fn load_from_toml(path: &Path) -> Result<Config, ConfigFileError> {
    FileFormat::Toml.parse(&read(path)?)
}

/// Load configuration from a YAML file.
pub fn load_from_yaml(path: &Path) -> Result<Config, ConfigFileError> {
    FileFormat::Yaml.parse(&read(path)?)
}

/// Load configuration from file with auto-detection.
///
/// ## Supported Formats
/// - `.toml`: TOML format
/// - `.yaml` / `.yml`: YAML format
///
/// ## Error Handling
/// Returns `ConfigFileError` for a missing file, a missing or unknown
/// extension, or a parse failure in the detected format.
pub fn load_from_file(path: &Path) -> Result<Config, ConfigFileError> {
    let format = FileFormat::detect(path)?;
    format.parse(&read(path)?)
}

/// Like [`load_from_file`], keeping only the fields the file spells out.
pub fn load_layer_from_file(path: &Path) -> Result<ConfigLayer, ConfigFileError> {
    let format = FileFormat::detect(path)?;
    format.parse(&read(path)?)
}
