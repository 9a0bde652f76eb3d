use anyhow::{Result, anyhow};
use reqwest::Client;

use crate::chat::Settings;
use crate::core::{AppConfig, SharedKv};
use crate::gemini::list_models;

/// Print the models that support `generateContent`. Uses the saved
/// API key, falling back to `GEMINI_API_KEY`.
pub async fn run(kv: SharedKv, config: &AppConfig) -> Result<()> {
    let settings = Settings::load(&kv, config)?;
    let api_key = settings
        .api_key()
        .map(str::to_string)
        .or_else(|| config.gemini_api_key.clone())
        .ok_or(anyhow!(
            "No API key found. Save one with `parley config --api-key` or set GEMINI_API_KEY"
        ))?;

    let models = list_models(&Client::new(), &config.gemini_api_hostname, &api_key).await?;

    println!("Available models:");
    for model in models.iter() {
        let marker = if model.id() == settings.model { "*" } else { "-" };
        println!("{} {}", marker, model.id());
    }
    Ok(())
}
