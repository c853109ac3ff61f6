//! # Configuration Structures
//!
//! All configuration structures for the Recap service and CLI.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization, with per-field defaults
//! - Use `validator` for range and format checks
//!
//! Provider API keys are deliberately absent: they are read from the process
//! environment at backend construction time.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Top-level configuration aggregating every subsystem section.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.pipeline.concurrency_limit, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    /// ConnectWise Manage API connection
    #[serde(default)]
    #[validate(nested)]
    pub connectwise: ConnectWiseConfig,

    /// Detail fan-out settings
    #[serde(default)]
    #[validate(nested)]
    pub pipeline: PipelineConfig,

    /// Text generation defaults and endpoint overrides
    #[serde(default)]
    #[validate(nested)]
    pub generation: GenerationConfig,

    /// HTTP listener
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    /// Logging and metrics
    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig
}

/// ConnectWise Manage connection settings.
///
/// ## Fields
/// - `site_url`: Manage host, e.g. `api-na.myconnectwise.net`
/// - `company_id`, `public_key`, `private_key`: API member credentials
/// - `client_id`: Developer client id, sent as the `clientId` header when set
/// - `api_base`: Full REST base URL; overrides the one derived from `site_url`
/// - `page_size`: Rows requested per listing page (default: 1000, range: 1-1000)
/// - `max_records`: Upper bound on tickets fetched per board (default: 1000)
/// - `pool_size`: Idle connections kept per host (default: 20, range: 1-100)
/// - `timeout_seconds`: Per-request timeout (default: 30, range: 1-300)
#[derive(Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ConnectWiseConfig {
    #[serde(default)]
    pub site_url: String,

    #[serde(default)]
    pub company_id: String,

    #[serde(default)]
    pub public_key: String,

    #[serde(default)]
    pub private_key: String,

    #[serde(default)]
    pub client_id: Option<String>,

    #[serde(default)]
    #[validate(url)]
    pub api_base: Option<String>,

    #[serde(default = "default_cw_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub page_size: u32,

    #[serde(default = "default_cw_max_records")]
    #[validate(range(min = 1, max = 10000))]
    pub max_records: u32,

    #[serde(default = "default_cw_pool_size")]
    #[validate(range(min = 1, max = 100))]
    pub pool_size: usize,

    #[serde(default = "default_cw_timeout")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_seconds: u64
}

pub(crate) fn default_cw_page_size() -> u32 {
    1000
}

pub(crate) fn default_cw_max_records() -> u32 {
    1000
}

pub(crate) fn default_cw_pool_size() -> usize {
    20
}

pub(crate) fn default_cw_timeout() -> u64 {
    30
}

impl ConnectWiseConfig {
    /// True when every credential needed for Basic auth is present.
    pub fn is_configured(&self) -> bool {
        (!self.site_url.is_empty() || self.api_base.is_some())
            && !self.company_id.is_empty()
            && !self.public_key.is_empty()
            && !self.private_key.is_empty()
    }

    /// Names of the credential fields that are still empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.site_url.is_empty() && self.api_base.is_none() {
            missing.push("site_url");
        }
        if self.company_id.is_empty() {
            missing.push("company_id");
        }
        if self.public_key.is_empty() {
            missing.push("public_key");
        }
        if self.private_key.is_empty() {
            missing.push("private_key");
        }
        missing
    }

    pub fn base_url(&self) -> String {
        match &self.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}/v4_6_release/apis/3.0", self.site_url)
        }
    }
}

impl Default for ConnectWiseConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            company_id: String::new(),
            public_key: String::new(),
            private_key: String::new(),
            client_id: None,
            api_base: None,
            page_size: default_cw_page_size(),
            max_records: default_cw_max_records(),
            pool_size: default_cw_pool_size(),
            timeout_seconds: default_cw_timeout()
        }
    }
}

impl fmt::Debug for ConnectWiseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectWiseConfig")
            .field("site_url", &self.site_url)
            .field("company_id", &self.company_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"***")
            .field("client_id", &self.client_id)
            .field("api_base", &self.api_base)
            .field("page_size", &self.page_size)
            .field("max_records", &self.max_records)
            .field("pool_size", &self.pool_size)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Detail fan-out settings.
///
/// ## Fields
/// - `concurrency_limit`: Parallel detail fetches (default: 10, range: 1-64)
/// - `deadline_seconds`: Optional wall-clock budget for one aggregation run;
///   records still in flight when it expires are counted as not succeeded
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct PipelineConfig {
    #[serde(default = "default_concurrency_limit")]
    #[validate(range(min = 1, max = 64))]
    pub concurrency_limit: usize,

    #[serde(default)]
    #[validate(range(min = 1))]
    pub deadline_seconds: Option<u64>
}

pub(crate) fn default_concurrency_limit() -> usize {
    10
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: default_concurrency_limit(),
            deadline_seconds: None
        }
    }
}

/// Text generation defaults.
///
/// ## Fields
/// - `default_provider`: Compound `provider:model` used when a request names
///   none (default: "gemini:gemini-2.5-pro")
/// - `max_output_tokens`: Output budget passed to providers that need one
/// - `timeout_seconds`: Per-call HTTP timeout (default: 300)
/// - `*_base_url`: Endpoint overrides, mostly for tests and proxies
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    #[validate(length(min = 1, max = 255))]
    pub default_provider: String,

    #[serde(default = "default_max_output_tokens")]
    #[validate(range(min = 1, max = 65536))]
    pub max_output_tokens: u32,

    #[serde(default = "default_generation_timeout")]
    #[validate(range(min = 1, max = 900))]
    pub timeout_seconds: u64,

    #[serde(default)]
    #[validate(url)]
    pub gemini_base_url: Option<String>,

    #[serde(default)]
    #[validate(url)]
    pub openai_base_url: Option<String>,

    #[serde(default)]
    #[validate(url)]
    pub anthropic_base_url: Option<String>
}

pub(crate) fn default_provider() -> String {
    "gemini:gemini-2.5-pro".to_string()
}

pub(crate) fn default_max_output_tokens() -> u32 {
    8192
}

pub(crate) fn default_generation_timeout() -> u64 {
    300
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_generation_timeout(),
            gemini_base_url: None,
            openai_base_url: None,
            anthropic_base_url: None
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    #[serde(default = "default_server_port")]
    #[validate(range(min = 1, max = 65535))]
    pub port: u16
}

pub(crate) fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_server_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port()
        }
    }
}

/// Logging and metrics settings.
///
/// ## Fields
/// - `logging_level`: trace/debug/info/warn/error (default: "info")
/// - `metrics_enabled`: Install the Prometheus recorder (default: true)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default = "default_logging_level")]
    #[validate(custom(function = "validate_logging_level"))]
    pub logging_level: String,

    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool
}

pub(crate) fn default_logging_level() -> String {
    "info".to_string()
}

pub(crate) fn default_metrics_enabled() -> bool {
    true
}

fn validate_logging_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level"))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            logging_level: default_logging_level(),
            metrics_enabled: default_metrics_enabled()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.pipeline.concurrency_limit, 10);
        assert_eq!(config.pipeline.deadline_seconds, None);
        assert_eq!(config.generation.default_provider, "gemini:gemini-2.5-pro");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.connectwise.page_size, 1000);
        assert!(!config.connectwise.is_configured());
    }

    #[test]
    fn test_base_url_from_site() {
        let cw = ConnectWiseConfig {
            site_url: "api-na.myconnectwise.net".to_string(),
            ..Default::default()
        };
        assert_eq!(
            cw.base_url(),
            "https://api-na.myconnectwise.net/v4_6_release/apis/3.0"
        );
    }

    #[test]
    fn test_base_url_override_strips_trailing_slash() {
        let cw = ConnectWiseConfig {
            api_base: Some("http://127.0.0.1:9000/".to_string()),
            ..Default::default()
        };
        assert_eq!(cw.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_missing_fields() {
        let cw = ConnectWiseConfig {
            site_url: "site".to_string(),
            company_id: "acme".to_string(),
            ..Default::default()
        };
        assert_eq!(cw.missing_fields(), vec!["public_key", "private_key"]);
        assert!(!cw.is_configured());
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let cw = ConnectWiseConfig {
            private_key: "super-secret".to_string(),
            ..Default::default()
        };
        let rendered = format!("{:?}", cw);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }
}
