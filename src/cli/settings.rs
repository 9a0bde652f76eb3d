use anyhow::Result;

use crate::chat::{Settings, SettingsUpdate};
use crate::client::Mode;
use crate::core::{AppConfig, SharedKv};

pub fn run(
    kv: SharedKv,
    config: &AppConfig,
    model: Option<String>,
    system_prompt: Option<String>,
    api_key: Option<String>,
) -> Result<()> {
    let mut settings = Settings::load(&kv, config)?;

    if model.is_some() || system_prompt.is_some() || api_key.is_some() {
        settings.save(
            &kv,
            SettingsUpdate {
                api_key,
                model,
                system_prompt,
            },
        )?;
        println!("Settings saved!\n");
    }

    print_settings(&settings);
    Ok(())
}

pub fn print_settings(settings: &Settings) {
    let mode = match Mode::for_settings(settings) {
        Mode::Direct => "direct (using your API key)",
        Mode::Proxy => "proxy",
    };
    println!("Model:         {}", settings.model);
    println!("Mode:          {}", mode);
    println!("API key:       {}", mask_key(settings.api_key()));
    println!("System prompt: {}", settings.system_prompt);
}

fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(key) => {
            let visible: String = key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            format!("****{}", visible)
        }
    }
}
