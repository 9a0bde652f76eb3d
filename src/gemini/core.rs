use reqwest::{Client, Response};

use super::models::{
    ErrorEnvelope, GenerateContentRequest, GenerateContentResponse, ListModelsResponse, ModelInfo,
};
use crate::client::ChatError;

const GENERIC_ERROR: &str = "Gemini API Error";

/// Ask `model` for the next reply and return its text.
///
/// The credential is passed as the `key` query parameter. A success
/// without any text is an `EmptyGeneration` error.
pub async fn generate_content(
    http: &Client,
    api_hostname: &str,
    api_key: &str,
    model: &str,
    request: &GenerateContentRequest,
) -> Result<String, ChatError> {
    let url = format!(
        "{}/v1beta/models/{}:generateContent",
        api_hostname.trim_end_matches('/'),
        model
    );
    tracing::debug!(
        "Requesting generation from {} with {} contents",
        model,
        request.contents.len()
    );

    let response = http
        .post(url)
        .query(&[("key", api_key)])
        .json(request)
        .send()
        .await?;
    let body = success_body(response).await?;

    let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
    parsed
        .text()
        .map(str::to_string)
        .ok_or(ChatError::EmptyGeneration)
}

/// List the models available to `api_key` that can be used with
/// `generate_content`.
pub async fn list_models(
    http: &Client,
    api_hostname: &str,
    api_key: &str,
) -> Result<Vec<ModelInfo>, ChatError> {
    let url = format!("{}/v1beta/models", api_hostname.trim_end_matches('/'));
    let response = http.get(url).query(&[("key", api_key)]).send().await?;
    let body = success_body(response).await?;

    let parsed: ListModelsResponse = serde_json::from_str(&body)?;
    Ok(parsed
        .models
        .into_iter()
        .filter(ModelInfo::supports_generate_content)
        .collect())
}

async fn success_body(response: Response) -> Result<String, ChatError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }

    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| GENERIC_ERROR.to_string());
    tracing::warn!("Gemini API returned {}: {}", status, message);

    Err(ChatError::Upstream {
        status: status.as_u16(),
        message,
    })
}
