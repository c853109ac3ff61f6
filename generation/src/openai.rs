//! OpenAI chat completions backend.

use crate::GenerationBackend;
use crate::registry::{ModelDescriptor, ProviderKind, models_for};
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs
};
use async_trait::async_trait;
use errors::GenerationError;
use std::time::Duration;

const PROVIDER_KEY: &str = "openai";

pub struct OpenAiBackend {
    client: async_openai::Client<OpenAIConfig>,
    max_completion_tokens: u32,
    timeout: Duration
}

impl OpenAiBackend {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        max_completion_tokens: u32,
        timeout: Duration
    ) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = base_url {
            config = config.with_api_base(base.trim_end_matches('/'));
        }

        Self {
            client: async_openai::Client::with_config(config),
            max_completion_tokens,
            timeout
        }
    }
}

#[async_trait]
impl GenerationBackend for OpenAiBackend {
    fn provider_key(&self) -> &str {
        PROVIDER_KEY
    }

    fn list_models(&self) -> &'static [ModelDescriptor] {
        models_for(ProviderKind::OpenAi)
    }

    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, GenerationError> {
        let fail = |cause: String| GenerationError::new(PROVIDER_KEY, model_id, cause);

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| fail(e.to_string()))?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(model_id)
            .max_completion_tokens(self.max_completion_tokens)
            .messages([message.into()])
            .build()
            .map_err(|e| fail(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| fail(format!("timed out after {}s", self.timeout.as_secs())))?
            .map_err(|e| fail(e.to_string()))?;

        Ok(response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default())
    }
}
