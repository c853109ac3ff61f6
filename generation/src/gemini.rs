//! Google Gemini `generateContent` backend.

use crate::http::post_json;
use crate::registry::{ModelDescriptor, ProviderKind, models_for};
use crate::GenerationBackend;
use async_trait::async_trait;
use errors::GenerationError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const PROVIDER_KEY: &str = "gemini";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>
}

impl GenerateContentResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    max_output_tokens: u32
}

impl GeminiBackend {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        base_url: Option<String>,
        max_output_tokens: u32
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| GEMINI_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_output_tokens
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn provider_key(&self) -> &str {
        PROVIDER_KEY
    }

    fn list_models(&self) -> &'static [ModelDescriptor] {
        models_for(ProviderKind::Gemini)
    }

    async fn generate(&self, prompt: &str, model_id: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model_id);

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key).map_err(|_| {
            GenerationError::new(PROVIDER_KEY, model_id, "API key is not a valid header value")
        })?;
        headers.insert(HeaderName::from_static("x-goog-api-key"), key);

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }]
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens
            }
        };

        let response: GenerateContentResponse =
            post_json(&self.client, &url, headers, &body, PROVIDER_KEY, model_id).await?;
        Ok(response.into_text())
    }
}
