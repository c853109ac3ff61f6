//! Scripted backend for tests. Records every prompt it is given.

use crate::credentials::{CredentialSource, StaticCredentials};
use crate::registry::{ModelDescriptor, available_providers, descriptor};
use crate::{BackendFactory, BackendHandle, GenerationBackend};
use async_trait::async_trait;
use errors::{BackendError, GenerationError};
use parking_lot::Mutex;
use recap_core::{ProviderCatalogEntry, ProviderSpec};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail(String)
}

/// A call observed by [`ScriptedBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub prompt: String,
    pub model_id: String
}

pub struct ScriptedBackend {
    provider_key: String,
    script: Mutex<Script>,
    calls: Mutex<Vec<RecordedCall>>
}

impl ScriptedBackend {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_script("gemini", Script::Reply(text.into()))
    }

    pub fn failing(cause: impl Into<String>) -> Self {
        Self::with_script("gemini", Script::Fail(cause.into()))
    }

    fn with_script(provider_key: &str, script: Script) -> Self {
        Self {
            provider_key: provider_key.to_string(),
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new())
        }
    }

    #[must_use]
    pub fn for_provider(mut self, provider_key: impl Into<String>) -> Self {
        self.provider_key = provider_key.into();
        self
    }

    pub fn set_reply(&self, text: impl Into<String>) {
        *self.script.lock() = Script::Reply(text.into());
    }

    pub fn set_failure(&self, cause: impl Into<String>) {
        *self.script.lock() = Script::Fail(cause.into());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.calls.lock().last().map(|c| c.prompt.clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn provider_key(&self) -> &str {
        &self.provider_key
    }

    fn list_models(&self) -> &'static [ModelDescriptor] {
        descriptor(&self.provider_key)
            .map(|d| d.models)
            .unwrap_or_default()
    }

    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, GenerationError> {
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            model_id: model_id.to_string()
        });

        let script = self.script.lock().clone();
        match script {
            Script::Reply(text) => Ok(text),
            Script::Fail(cause) => Err(GenerationError::new(&self.provider_key, model_id, cause))
        }
    }
}

/// Factory that resolves providers against the real static table and
/// credential rules but hands out one shared [`ScriptedBackend`].
pub struct ScriptedFactory {
    backend: Arc<ScriptedBackend>,
    credentials: StaticCredentials
}

impl ScriptedFactory {
    /// Every provider is treated as configured.
    pub fn new(backend: Arc<ScriptedBackend>) -> Self {
        Self {
            backend,
            credentials: StaticCredentials::new()
                .with("GOOGLE_API_KEY", "test")
                .with("OPENAI_API_KEY", "test")
                .with("ANTHROPIC_API_KEY", "test")
        }
    }

    pub fn with_credentials(backend: Arc<ScriptedBackend>, credentials: StaticCredentials) -> Self {
        Self {
            backend,
            credentials
        }
    }

    pub fn backend(&self) -> &Arc<ScriptedBackend> {
        &self.backend
    }
}

impl BackendFactory for ScriptedFactory {
    fn create_backend(&self, spec: &ProviderSpec) -> Result<BackendHandle, BackendError> {
        let descriptor = descriptor(&spec.provider_key)?;
        if !self.credentials.is_present(descriptor.credential_env) {
            return Err(BackendError::MissingCredential {
                provider_key: descriptor.key.to_string(),
                env_var: descriptor.credential_env.to_string()
            });
        }
        let model = spec
            .model_id
            .clone()
            .unwrap_or_else(|| descriptor.default_model().to_string());
        Ok(BackendHandle::new(self.backend.clone(), model))
    }

    fn list_available_providers(&self) -> Vec<ProviderCatalogEntry> {
        available_providers(&self.credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_backend_records_prompts() {
        let backend = Arc::new(ScriptedBackend::replying("# Report"));
        let handle = BackendHandle::new(backend.clone(), "gemini-2.5-pro");

        let text = handle.generate("prompt body").await.unwrap();
        assert_eq!(text, "# Report");
        assert_eq!(
            backend.calls(),
            vec![RecordedCall {
                prompt: "prompt body".to_string(),
                model_id: "gemini-2.5-pro".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_scripted_failure_surfaces_generation_error() {
        let backend = Arc::new(ScriptedBackend::failing("quota exceeded"));
        let handle = BackendHandle::new(backend.clone(), "gemini-2.5-flash");

        let err = handle.generate("p").await.unwrap_err();
        assert_eq!(err.provider_key, "gemini");
        assert_eq!(err.model_id, "gemini-2.5-flash");
        assert_eq!(err.cause, "quota exceeded");
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_reply_is_a_generation_error() {
        let backend = Arc::new(ScriptedBackend::replying("   "));
        let handle = BackendHandle::new(backend, "gemini-2.5-pro");
        assert!(handle.generate("p").await.is_err());
    }

    #[test]
    fn test_factory_applies_registry_rules() {
        let backend = Arc::new(ScriptedBackend::replying("ok"));
        let factory = ScriptedFactory::with_credentials(
            backend,
            StaticCredentials::new().with("OPENAI_API_KEY", "sk")
        );

        let handle = factory.create_backend(&ProviderSpec::parse("openai")).unwrap();
        assert_eq!(handle.model_id(), "gpt-4o");

        assert!(matches!(
            factory.create_backend(&ProviderSpec::parse("gemini")),
            Err(BackendError::MissingCredential { .. })
        ));
        assert!(matches!(
            factory.create_backend(&ProviderSpec::parse("unknown")),
            Err(BackendError::UnknownProvider { .. })
        ));
        assert_eq!(factory.list_available_providers().len(), 2);
    }
}
