use errors::GenerationError;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String
}

/// POSTs a JSON body and decodes a JSON reply, folding every failure into a
/// [`GenerationError`] for `provider_key`/`model_id`.
pub(crate) async fn post_json<B, T>(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    body: &B,
    provider_key: &str,
    model_id: &str
) -> Result<T, GenerationError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned
{
    let fail = |cause: String| GenerationError::new(provider_key, model_id, cause);

    let response = client
        .post(url)
        .headers(headers)
        .json(body)
        .send()
        .await
        .map_err(|e| fail(format!("request failed: {e}")))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| fail(format!("failed to read response: {e}")))?;

    if !status.is_success() {
        // Both Gemini and Anthropic wrap errors as {"error": {"message": ...}}.
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or(text);
        return Err(fail(format!("HTTP {}: {}", status.as_u16(), message)));
    }

    serde_json::from_str(&text).map_err(|e| fail(format!("malformed response: {e}")))
}
