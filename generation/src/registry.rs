//! Static provider table and the registry that turns it into backends.

use crate::anthropic::AnthropicBackend;
use crate::credentials::{CredentialSource, EnvCredentials};
use crate::gemini::GeminiBackend;
use crate::openai::OpenAiBackend;
use crate::{BackendFactory, BackendHandle, GenerationBackend};
use config::GenerationConfig;
use errors::BackendError;
use recap_core::{ProviderCatalogEntry, ProviderSpec};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Anthropic
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic")
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            _ => Err(BackendError::UnknownProvider {
                provider_key: s.to_string()
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub display_name: &'static str
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub kind: ProviderKind,
    pub key: &'static str,
    pub display_name: &'static str,
    pub credential_env: &'static str,
    pub models: &'static [ModelDescriptor]
}

impl ProviderDescriptor {
    pub fn default_model(&self) -> &'static str {
        self.models.first().map_or("", |m| m.id)
    }

    /// One catalog entry per model, in table order.
    pub fn catalog_entries(&self) -> impl Iterator<Item = ProviderCatalogEntry> + '_ {
        self.models.iter().map(move |model| ProviderCatalogEntry {
            compound_id: ProviderSpec::new(self.key, Some(model.id.to_string())).to_string(),
            provider_key: self.key.to_string(),
            display_name: format!("{} ({})", self.display_name, model.display_name),
            model_id: model.id.to_string()
        })
    }
}

pub static PROVIDERS: &[ProviderDescriptor] = &[
    ProviderDescriptor {
        kind: ProviderKind::Gemini,
        key: "gemini",
        display_name: "Google Gemini",
        credential_env: "GOOGLE_API_KEY",
        models: &[
            ModelDescriptor {
                id: "gemini-2.5-pro",
                display_name: "Gemini 2.5 Pro"
            },
            ModelDescriptor {
                id: "gemini-2.5-flash",
                display_name: "Gemini 2.5 Flash"
            },
        ]
    },
    ProviderDescriptor {
        kind: ProviderKind::OpenAi,
        key: "openai",
        display_name: "OpenAI",
        credential_env: "OPENAI_API_KEY",
        models: &[
            ModelDescriptor {
                id: "gpt-4o",
                display_name: "GPT-4o"
            },
            ModelDescriptor {
                id: "gpt-4o-mini",
                display_name: "GPT-4o mini"
            },
        ]
    },
    ProviderDescriptor {
        kind: ProviderKind::Anthropic,
        key: "anthropic",
        display_name: "Anthropic Claude",
        credential_env: "ANTHROPIC_API_KEY",
        models: &[
            ModelDescriptor {
                id: "claude-sonnet-4-20250514",
                display_name: "Claude Sonnet 4"
            },
            ModelDescriptor {
                id: "claude-3-5-haiku-20241022",
                display_name: "Claude 3.5 Haiku"
            },
        ]
    },
];

/// Looks up a provider in the static table.
pub fn descriptor(provider_key: &str) -> Result<&'static ProviderDescriptor, BackendError> {
    let kind: ProviderKind = provider_key.parse()?;
    PROVIDERS
        .iter()
        .find(|d| d.kind == kind)
        .ok_or_else(|| BackendError::UnknownProvider {
            provider_key: provider_key.to_string()
        })
}

pub(crate) fn models_for(kind: ProviderKind) -> &'static [ModelDescriptor] {
    PROVIDERS
        .iter()
        .find(|d| d.kind == kind)
        .map(|d| d.models)
        .unwrap_or_default()
}

/// Catalog of every (provider, model) pair whose credential is present.
pub fn available_providers(credentials: &dyn CredentialSource) -> Vec<ProviderCatalogEntry> {
    PROVIDERS
        .iter()
        .filter(|d| credentials.is_present(d.credential_env))
        .flat_map(|d| d.catalog_entries())
        .collect()
}

/// Builds live HTTP backends from the static table.
pub struct ProviderRegistry {
    credentials: Arc<dyn CredentialSource>,
    client: reqwest::Client,
    max_output_tokens: u32,
    timeout: Duration,
    gemini_base_url: Option<String>,
    openai_base_url: Option<String>,
    anthropic_base_url: Option<String>
}

impl ProviderRegistry {
    pub fn new(
        config: &GenerationConfig,
        credentials: Arc<dyn CredentialSource>
    ) -> Result<Self, BackendError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Configuration {
                provider_key: "*".to_string(),
                reason: format!("failed to build HTTP client: {e}")
            })?;

        Ok(Self {
            credentials,
            client,
            max_output_tokens: config.max_output_tokens,
            timeout,
            gemini_base_url: config.gemini_base_url.clone(),
            openai_base_url: config.openai_base_url.clone(),
            anthropic_base_url: config.anthropic_base_url.clone()
        })
    }

    /// Registry reading API keys from the process environment.
    pub fn from_env(config: &GenerationConfig) -> Result<Self, BackendError> {
        Self::new(config, Arc::new(EnvCredentials))
    }

    /// Resolves a provider and checks its credential. `model_id = None`
    /// selects the provider's first listed model; ids outside the table are
    /// passed through to the provider unchanged.
    pub fn create_backend(
        &self,
        provider_key: &str,
        model_id: Option<&str>
    ) -> Result<BackendHandle, BackendError> {
        let descriptor = descriptor(provider_key)?;
        let api_key = self.credentials.get(descriptor.credential_env).ok_or_else(|| {
            BackendError::MissingCredential {
                provider_key: descriptor.key.to_string(),
                env_var: descriptor.credential_env.to_string()
            }
        })?;

        let backend: Arc<dyn GenerationBackend> = match descriptor.kind {
            ProviderKind::Gemini => Arc::new(GeminiBackend::new(
                self.client.clone(),
                api_key,
                self.gemini_base_url.clone(),
                self.max_output_tokens
            )),
            ProviderKind::OpenAi => Arc::new(OpenAiBackend::new(
                api_key,
                self.openai_base_url.clone(),
                self.max_output_tokens,
                self.timeout
            )),
            ProviderKind::Anthropic => Arc::new(AnthropicBackend::new(
                self.client.clone(),
                api_key,
                self.anthropic_base_url.clone(),
                self.max_output_tokens
            ))
        };

        let model = model_id.unwrap_or_else(|| descriptor.default_model());
        tracing::debug!(provider = descriptor.key, model, "Created generation backend");
        Ok(BackendHandle::new(backend, model))
    }
}

impl BackendFactory for ProviderRegistry {
    fn create_backend(&self, spec: &ProviderSpec) -> Result<BackendHandle, BackendError> {
        ProviderRegistry::create_backend(self, &spec.provider_key, spec.model_id.as_deref())
    }

    fn list_available_providers(&self) -> Vec<ProviderCatalogEntry> {
        available_providers(self.credentials.as_ref())
    }
}
