//! Gets the next reply for a conversation, either through the proxy
//! server or by calling Gemini directly with the user's own key.
mod error;

use http::StatusCode;
use reqwest::Client;

use crate::api::public::chat::{ChatMessage, ChatRequest, ChatResponse, ErrorResponse};
use crate::chat::{Settings, Turn};
use crate::gemini::{GenerateContentRequest, generate_content, normalize_turns};

pub use error::{ChatError, PROXY_UNAVAILABLE_MESSAGE};

const GENERIC_PROXY_ERROR: &str = "Proxy Error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Proxy,
    Direct,
}

impl Mode {
    /// Direct mode whenever the user saved a key of their own.
    pub fn for_settings(settings: &Settings) -> Self {
        if settings.api_key().is_some() {
            Mode::Direct
        } else {
            Mode::Proxy
        }
    }
}

#[derive(Clone)]
pub struct ResponseClient {
    http: Client,
    proxy_url: String,
    gemini_api_hostname: String,
}

impl ResponseClient {
    pub fn new(proxy_url: &str, gemini_api_hostname: &str) -> Self {
        Self {
            http: Client::new(),
            proxy_url: proxy_url.trim_end_matches('/').to_string(),
            gemini_api_hostname: gemini_api_hostname.to_string(),
        }
    }

    /// Return the reply to `turns`. Nothing is recorded here; the
    /// caller decides what to store.
    pub async fn generate(&self, turns: &[Turn], settings: &Settings) -> Result<String, ChatError> {
        match settings.api_key() {
            Some(api_key) => self.direct(turns, settings, api_key).await,
            None => self.proxy(turns, settings).await,
        }
    }

    async fn proxy(&self, turns: &[Turn], settings: &Settings) -> Result<String, ChatError> {
        let payload = ChatRequest {
            messages: turns.iter().map(ChatMessage::from).collect(),
            system_prompt: Some(settings.system_prompt.clone()),
            model: Some(settings.model.clone()),
        };
        let url = format!("{}/api/chat", self.proxy_url);
        tracing::debug!("Sending {} messages to proxy {}", payload.messages.len(), url);

        let response = self.http.post(url).json(&payload).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED {
            return Err(ChatError::ProxyUnavailable);
        }

        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| GENERIC_PROXY_ERROR.to_string());
            return Err(ChatError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        parsed
            .content()
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .ok_or(ChatError::EmptyGeneration)
    }

    async fn direct(
        &self,
        turns: &[Turn],
        settings: &Settings,
        api_key: &str,
    ) -> Result<String, ChatError> {
        let normalized = normalize_turns(turns, Some(&settings.system_prompt));
        let request = GenerateContentRequest::new(
            normalized.contents,
            normalized.system_instruction.as_deref(),
        );
        generate_content(
            &self.http,
            &self.gemini_api_hostname,
            api_key,
            &settings.model,
            &request,
        )
        .await
    }
}
