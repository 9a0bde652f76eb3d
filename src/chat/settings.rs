use anyhow::{Error, Result};

use crate::core::{AppConfig, SharedKv};

pub const API_KEY_KEY: &str = "gemini_api_key";
pub const MODEL_KEY: &str = "gemini_model";
pub const SYSTEM_PROMPT_KEY: &str = "system_prompt";

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub model: String,
    pub system_prompt: String,
}

/// Values entered by the user on save. `None` leaves a field alone.
#[derive(Default, Debug)]
pub struct SettingsUpdate {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
}

impl Settings {
    pub fn defaults(config: &AppConfig) -> Self {
        Self {
            api_key: None,
            model: config.default_model.clone(),
            system_prompt: config.system_message.clone(),
        }
    }

    /// Stored values override the defaults. Blank stored values are
    /// treated as missing.
    pub fn load(kv: &SharedKv, config: &AppConfig) -> Result<Self, Error> {
        let mut settings = Self::defaults(config);
        if let Some(key) = non_blank(kv.get(API_KEY_KEY)?) {
            settings.api_key = Some(key);
        }
        if let Some(model) = non_blank(kv.get(MODEL_KEY)?) {
            settings.model = model;
        }
        if let Some(prompt) = non_blank(kv.get(SYSTEM_PROMPT_KEY)?) {
            settings.system_prompt = prompt;
        }
        Ok(settings)
    }

    /// The credential used for direct calls, if one is set.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Apply a user save and persist it. A blank API key removes the
    /// stored key. Blank model or system prompt values are ignored.
    pub fn save(&mut self, kv: &SharedKv, update: SettingsUpdate) -> Result<(), Error> {
        if let Some(key) = update.api_key {
            match non_blank(Some(key)) {
                Some(key) => {
                    kv.set(API_KEY_KEY, &key)?;
                    self.api_key = Some(key);
                }
                None => {
                    kv.remove(API_KEY_KEY)?;
                    self.api_key = None;
                }
            }
        }
        if let Some(model) = non_blank(update.model) {
            kv.set(MODEL_KEY, &model)?;
            self.model = model;
        }
        if let Some(prompt) = non_blank(update.system_prompt) {
            kv.set(SYSTEM_PROMPT_KEY, &prompt)?;
            self.system_prompt = prompt;
        }
        tracing::debug!("Saved settings (model: {})", self.model);
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
