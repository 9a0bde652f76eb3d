use thiserror::Error;

pub const PROXY_UNAVAILABLE_MESSAGE: &str =
    "Proxy not found. Add an API key in settings to call the model directly.";

/// Everything that can go wrong while asking for the next reply.
#[derive(Error, Debug)]
pub enum ChatError {
    /// The proxy has no credential to call the provider with
    #[error("Server configuration error: {0}")]
    Configuration(String),

    /// The proxy endpoint doesn't exist (404 or 405)
    #[error("{}", PROXY_UNAVAILABLE_MESSAGE)]
    ProxyUnavailable,

    /// Non-success status from the proxy or the provider
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("No response generated.")]
    EmptyGeneration,

    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
