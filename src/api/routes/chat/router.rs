//! Router for the chat proxy API

use std::sync::{Arc, RwLock};

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State, routing::post};

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::chat::Turn;
use crate::client::ChatError;
use crate::core::AppConfig;
use crate::gemini::{GenerateContentRequest, generate_content, normalize_turns};

type SharedState = Arc<RwLock<AppState>>;

/// Forward a conversation to Gemini using the server's credential and
/// return the reply in a chat completion style envelope.
async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<public::ChatRequest>, JsonRejection>,
) -> Result<Json<public::ChatResponse>, ApiError> {
    let Json(payload) = payload?;

    let (http, api_key, api_hostname, default_model) = {
        let shared_state = state.read().expect("Unable to read share state");
        let AppConfig {
            gemini_api_key,
            gemini_api_hostname,
            default_model,
            ..
        } = &shared_state.config;
        (
            shared_state.http.clone(),
            gemini_api_key.clone(),
            gemini_api_hostname.clone(),
            default_model.clone(),
        )
    };

    let api_key =
        api_key.ok_or_else(|| ChatError::Configuration("Missing GEMINI_API_KEY".to_string()))?;
    let model = payload
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(default_model);

    let turns: Vec<Turn> = payload
        .messages
        .into_iter()
        .map(public::ChatMessage::into_turn)
        .collect();
    let normalized = normalize_turns(&turns, payload.system_prompt.as_deref());
    if normalized.contents.is_empty() {
        tracing::warn!("Forwarding a request with no user turns");
    }
    let request = GenerateContentRequest::new(
        normalized.contents,
        normalized.system_instruction.as_deref(),
    );

    let text = generate_content(&http, &api_hostname, &api_key, &model, &request).await?;

    Ok(Json(public::ChatResponse::new(&text)))
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
