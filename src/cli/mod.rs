use std::fs;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod history;
pub mod models;
pub mod serve;
pub mod settings;

use crate::core::{AppConfig, MemoryKv, SharedKv, SqliteKv, telemetry};

#[derive(Subcommand)]
enum Command {
    /// Run the chat proxy server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Start an interactive chat session
    Chat {
        /// Keep the history in memory only
        #[arg(long, action, default_value = "false")]
        ephemeral: bool,
    },
    /// List saved conversations, most recent first
    History {},
    /// Print a saved conversation
    Show {
        id: String,
        /// Print a standalone HTML page instead of plain text
        #[arg(long, action, default_value = "false")]
        html: bool,
    },
    /// Delete every saved conversation
    Clear {},
    /// Show or update settings
    Config {
        /// Model used for replies e.g. gemini-2.0-flash
        #[arg(long)]
        model: Option<String>,
        /// Instruction that steers the assistant
        #[arg(long)]
        system_prompt: Option<String>,
        /// Gemini API key for calling the model directly. Pass an
        /// empty string to go back to using the proxy.
        #[arg(long)]
        api_key: Option<String>,
    },
    /// List models that can generate replies
    Models {},
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// Open the settings and history store for client commands.
pub fn open_kv(config: &AppConfig, ephemeral: bool) -> Result<SharedKv> {
    if ephemeral {
        return Ok(Arc::new(MemoryKv::new()));
    }
    fs::create_dir_all(&config.storage_path)?;
    Ok(Arc::new(SqliteKv::open(&config.db_path)?))
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // The server sets up its own logging
    if !matches!(args.command, Some(Command::Serve { .. })) {
        telemetry::init(telemetry::client_directive());
    }

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Chat { ephemeral }) => {
            let kv = open_kv(&config, ephemeral)?;
            chat::run(kv, &config).await?;
        }
        Some(Command::History {}) => {
            history::list(open_kv(&config, false)?)?;
        }
        Some(Command::Show { id, html }) => {
            history::show(open_kv(&config, false)?, &id, html)?;
        }
        Some(Command::Clear {}) => {
            history::clear(open_kv(&config, false)?)?;
        }
        Some(Command::Config {
            model,
            system_prompt,
            api_key,
        }) => {
            settings::run(
                open_kv(&config, false)?,
                &config,
                model,
                system_prompt,
                api_key,
            )?;
        }
        Some(Command::Models {}) => {
            models::run(open_kv(&config, false)?, &config).await?;
        }
        None => {}
    }

    Ok(())
}
