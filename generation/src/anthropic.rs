//! Anthropic Messages API backend.

use crate::GenerationBackend;
use crate::http::post_json;
use crate::registry::{ModelDescriptor, ProviderKind, models_for};
use async_trait::async_trait;
use errors::GenerationError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const PROVIDER_KEY: &str = "anthropic";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>
}

impl MessagesResponse {
    fn into_text(self) -> String {
        self.content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect()
    }
}

pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_tokens: u32
}

impl AnthropicBackend {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: Option<String>,
        max_tokens: u32
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| ANTHROPIC_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_tokens
        }
    }
}

#[async_trait]
impl GenerationBackend for AnthropicBackend {
    fn provider_key(&self) -> &str {
        PROVIDER_KEY
    }

    fn list_models(&self) -> &'static [ModelDescriptor] {
        models_for(ProviderKind::Anthropic)
    }

    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, GenerationError> {
        let url = format!("{}/v1/messages", self.base_url);

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            GenerationError::new(PROVIDER_KEY, model_id, "API key is not a valid header value")
        })?;
        headers.insert(HeaderName::from_static("x-api-key"), key);
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION)
        );

        let body = MessagesRequest {
            model: model_id,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt
            }]
        };

        let response: MessagesResponse =
            post_json(&self.client, &url, headers, &body, PROVIDER_KEY, model_id).await?;
        Ok(response.into_text())
    }
}
