//! # Generation Backends
//!
//! A uniform interface over the text-generation providers, selected by a
//! compound `provider:model` identifier.
//!
//! - [`registry::PROVIDERS`] is the static table of known providers and
//!   their models; the first model listed is each provider's default
//! - [`ProviderRegistry`] builds backends and computes the live catalog
//!   from whichever credentials are currently present
//! - [`BackendHandle`] pins a backend to one model and records metrics

pub mod anthropic;
pub mod credentials;
pub mod gemini;
mod http;
pub mod mock;
pub mod openai;
pub mod registry;

use async_trait::async_trait;
use errors::{BackendError, GenerationError};
use metrics::{counter, histogram};
use recap_core::{ProviderCatalogEntry, ProviderSpec};
use std::sync::Arc;
use std::time::Instant;

pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use mock::{ScriptedBackend, ScriptedFactory};
pub use registry::{
    ModelDescriptor, PROVIDERS, ProviderDescriptor, ProviderKind, ProviderRegistry,
    available_providers, descriptor
};

/// One text-generation provider integration.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn provider_key(&self) -> &str;

    /// Models this provider offers, default first.
    fn list_models(&self) -> &'static [ModelDescriptor];

    /// Single attempt; transport and upstream errors become
    /// [`GenerationError`] without retry.
    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, GenerationError>;
}

/// Builds backends from a [`ProviderSpec`] and lists what is usable.
pub trait BackendFactory: Send + Sync {
    fn create_backend(&self, spec: &ProviderSpec) -> Result<BackendHandle, BackendError>;

    fn list_available_providers(&self) -> Vec<ProviderCatalogEntry>;
}

/// A backend bound to the model it will be called with.
#[derive(Clone)]
pub struct BackendHandle {
    backend: Arc<dyn GenerationBackend>,
    model_id: String
}

impl BackendHandle {
    pub fn new(backend: Arc<dyn GenerationBackend>, model_id: impl Into<String>) -> Self {
        Self {
            backend,
            model_id: model_id.into()
        }
    }

    pub fn provider_key(&self) -> &str {
        self.backend.provider_key()
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn list_models(&self) -> &'static [ModelDescriptor] {
        self.backend.list_models()
    }

    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let provider = self.provider_key().to_string();
        counter!("recap_generation_requests_total", "provider" => provider.clone()).increment(1);
        let start = Instant::now();

        let result = self.backend.generate(prompt, &self.model_id).await;

        histogram!("recap_generation_duration_seconds", "provider" => provider.clone())
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(text) if text.trim().is_empty() => {
                counter!("recap_generation_failures_total", "provider" => provider.clone())
                    .increment(1);
                Err(GenerationError::new(
                    provider,
                    &self.model_id,
                    "provider returned no text"
                ))
            }
            Ok(text) => {
                tracing::info!(
                    provider = %provider,
                    model = %self.model_id,
                    chars = text.len(),
                    "Generation succeeded"
                );
                Ok(text)
            }
            Err(e) => {
                counter!("recap_generation_failures_total", "provider" => provider).increment(1);
                tracing::warn!(error = %e, "Generation failed");
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendHandle")
            .field("provider_key", &self.provider_key())
            .field("model_id", &self.model_id)
            .finish()
    }
}
