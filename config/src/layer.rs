//! # Configuration Layers
//!
//! A layer holds only the values one source set explicitly. `None` means
//! "not set here", so a layer can override a lower one with any value,
//! including the default.

use crate::config::{
    Config, ConnectWiseConfig, GenerationConfig, ObservabilityConfig, PipelineConfig,
    ServerConfig
};
use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigLayer {
    pub connectwise: ConnectWiseLayer,
    pub pipeline: PipelineLayer,
    pub generation: GenerationLayer,
    pub server: ServerLayer,
    pub observability: ObservabilityLayer
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectWiseLayer {
    pub site_url: Option<String>,
    pub company_id: Option<String>,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
    pub client_id: Option<String>,
    pub api_base: Option<String>,
    pub page_size: Option<u32>,
    pub max_records: Option<u32>,
    pub pool_size: Option<usize>,
    pub timeout_seconds: Option<u64>
}

impl std::fmt::Debug for ConnectWiseLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectWiseLayer")
            .field("site_url", &self.site_url)
            .field("company_id", &self.company_id)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "***"))
            .field("client_id", &self.client_id)
            .field("api_base", &self.api_base)
            .field("page_size", &self.page_size)
            .field("max_records", &self.max_records)
            .field("pool_size", &self.pool_size)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineLayer {
    pub concurrency_limit: Option<usize>,
    pub deadline_seconds: Option<u64>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GenerationLayer {
    pub default_provider: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub gemini_base_url: Option<String>,
    pub openai_base_url: Option<String>,
    pub anthropic_base_url: Option<String>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerLayer {
    pub host: Option<String>,
    pub port: Option<u16>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ObservabilityLayer {
    pub logging_level: Option<String>,
    pub metrics_enabled: Option<bool>
}

/// Writes a set value over the current one, recording the change.
macro_rules! apply_field {
    ($changes:ident, $section:literal, $base:ident, $layer:ident, $field:ident) => {
        if let Some(value) = &$layer.$field {
            if *value != $base.$field {
                $changes.push(format!("{}.{} = {:?}", $section, stringify!($field), value));
            }
            $base.$field = value.clone();
        }
    };
}

/// Same as `apply_field!` for fields that are optional in [`Config`].
macro_rules! apply_optional {
    ($changes:ident, $section:literal, $base:ident, $layer:ident, $field:ident) => {
        if let Some(value) = &$layer.$field {
            if $base.$field.as_ref() != Some(value) {
                $changes.push(format!("{}.{} = {:?}", $section, stringify!($field), value));
            }
            $base.$field = Some(value.clone());
        }
    };
}

impl ConfigLayer {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies every set value onto `config` and returns a line per changed
    /// field, with the private key masked.
    pub fn apply_to(&self, config: &mut Config) -> Vec<String> {
        let mut changes = Vec::new();
        self.connectwise.apply_to(&mut config.connectwise, &mut changes);
        self.pipeline.apply_to(&mut config.pipeline, &mut changes);
        self.generation.apply_to(&mut config.generation, &mut changes);
        self.server.apply_to(&mut config.server, &mut changes);
        self.observability
            .apply_to(&mut config.observability, &mut changes);
        changes
    }

    pub fn into_config(self) -> Config {
        let mut config = Config::default();
        self.apply_to(&mut config);
        config
    }
}

impl ConnectWiseLayer {
    fn apply_to(&self, base: &mut ConnectWiseConfig, changes: &mut Vec<String>) {
        let layer = self;
        apply_field!(changes, "connectwise", base, layer, site_url);
        apply_field!(changes, "connectwise", base, layer, company_id);
        apply_field!(changes, "connectwise", base, layer, public_key);
        if let Some(key) = &layer.private_key {
            if *key != base.private_key {
                changes.push("connectwise.private_key = ***".to_string());
            }
            base.private_key.clone_from(key);
        }
        apply_optional!(changes, "connectwise", base, layer, client_id);
        apply_optional!(changes, "connectwise", base, layer, api_base);
        apply_field!(changes, "connectwise", base, layer, page_size);
        apply_field!(changes, "connectwise", base, layer, max_records);
        apply_field!(changes, "connectwise", base, layer, pool_size);
        apply_field!(changes, "connectwise", base, layer, timeout_seconds);
    }
}

impl PipelineLayer {
    fn apply_to(&self, base: &mut PipelineConfig, changes: &mut Vec<String>) {
        let layer = self;
        apply_field!(changes, "pipeline", base, layer, concurrency_limit);
        apply_optional!(changes, "pipeline", base, layer, deadline_seconds);
    }
}

impl GenerationLayer {
    fn apply_to(&self, base: &mut GenerationConfig, changes: &mut Vec<String>) {
        let layer = self;
        apply_field!(changes, "generation", base, layer, default_provider);
        apply_field!(changes, "generation", base, layer, max_output_tokens);
        apply_field!(changes, "generation", base, layer, timeout_seconds);
        apply_optional!(changes, "generation", base, layer, gemini_base_url);
        apply_optional!(changes, "generation", base, layer, openai_base_url);
        apply_optional!(changes, "generation", base, layer, anthropic_base_url);
    }
}

impl ServerLayer {
    fn apply_to(&self, base: &mut ServerConfig, changes: &mut Vec<String>) {
        let layer = self;
        apply_field!(changes, "server", base, layer, host);
        apply_field!(changes, "server", base, layer, port);
    }
}

impl ObservabilityLayer {
    fn apply_to(&self, base: &mut ObservabilityConfig, changes: &mut Vec<String>) {
        let layer = self;
        apply_field!(changes, "observability", base, layer, logging_level);
        apply_field!(changes, "observability", base, layer, metrics_enabled);
    }
}
