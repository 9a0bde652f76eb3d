//! Test utilities for integration tests
use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};

use parley::api::AppState;
use parley::api::app;
use parley::core::AppConfig;

/// Config pointing at a fake Gemini API. No files are touched.
pub fn test_config(gemini_api_hostname: &str, gemini_api_key: Option<&str>) -> AppConfig {
    AppConfig {
        storage_path: String::from("./"),
        db_path: String::from("./parley.db"),
        gemini_api_key: gemini_api_key.map(str::to_string),
        gemini_api_hostname: gemini_api_hostname.to_string(),
        proxy_url: String::from("http://127.0.0.1:2222"),
        default_model: String::from("gemini-2.0-flash"),
        system_message: String::from("You are a helpful AI assistant."),
    }
}

/// Creates a test application router backed by `config`.
pub fn test_app(config: AppConfig) -> Router {
    let app_state = AppState::new(config);
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}
