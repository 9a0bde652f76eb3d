use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Error, Result, anyhow};

use super::models::{Conversation, Role, Turn};
use super::settings::{Settings, SettingsUpdate};
use super::store::ConversationStore;
use crate::client::ResponseClient;
use crate::core::{AppConfig, SharedKv};

/// What happened to a message passed to `ChatSession::send_message`.
#[derive(Debug, PartialEq)]
pub enum SendOutcome {
    /// Blank input, or a reply is already being generated
    Ignored,
    Replied(Turn),
    /// The request failed and the error was stored as a system turn
    Failed(Turn),
}

/// A user's chat: the stored history, their settings, the
/// conversation currently being written to, and whether a reply is in
/// flight.
///
/// Only one reply is generated at a time. Sending while one is in
/// flight does nothing.
pub struct ChatSession {
    kv: SharedKv,
    store: Mutex<ConversationStore>,
    settings: Mutex<Settings>,
    current_id: Mutex<String>,
    client: ResponseClient,
    generating: AtomicBool,
}

/// Clears the generating flag however the request ends.
struct GeneratingGuard<'a>(&'a AtomicBool);

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, Error> {
    mutex
        .lock()
        .map_err(|_| anyhow!("Chat session lock poisoned"))
}

impl ChatSession {
    pub fn new(kv: SharedKv, config: &AppConfig) -> Result<Self, Error> {
        let client = ResponseClient::new(&config.proxy_url, &config.gemini_api_hostname);
        Self::with_client(kv, config, client)
    }

    pub fn with_client(
        kv: SharedKv,
        config: &AppConfig,
        client: ResponseClient,
    ) -> Result<Self, Error> {
        let mut store = ConversationStore::load(kv.clone())?;
        let settings = Settings::load(&kv, config)?;
        let current_id = store.create_conversation();

        Ok(Self {
            kv,
            store: Mutex::new(store),
            settings: Mutex::new(settings),
            current_id: Mutex::new(current_id),
            client,
            generating: AtomicBool::new(false),
        })
    }

    pub fn current_id(&self) -> Result<String, Error> {
        Ok(lock(&self.current_id)?.clone())
    }

    /// The conversation being written to. `None` until its first
    /// message is sent.
    pub fn current_conversation(&self) -> Result<Option<Conversation>, Error> {
        let id = self.current_id()?;
        Ok(lock(&self.store)?.get_conversation(&id).cloned())
    }

    pub fn conversations(&self) -> Result<Vec<Conversation>, Error> {
        Ok(lock(&self.store)?.list_conversations().to_vec())
    }

    pub fn conversation(&self, id: &str) -> Result<Option<Conversation>, Error> {
        Ok(lock(&self.store)?.get_conversation(id).cloned())
    }

    pub fn new_chat(&self) -> Result<String, Error> {
        let id = lock(&self.store)?.create_conversation();
        *lock(&self.current_id)? = id.clone();
        Ok(id)
    }

    /// Switch to an existing conversation. Unknown IDs leave the
    /// current conversation alone.
    pub fn load_chat(&self, id: &str) -> Result<Option<Conversation>, Error> {
        let conversation = self.conversation(id)?;
        if conversation.is_some() {
            *lock(&self.current_id)? = id.to_string();
        }
        Ok(conversation)
    }

    /// Remove every conversation and start a fresh one.
    pub fn clear_history(&self) -> Result<String, Error> {
        lock(&self.store)?.clear_all()?;
        self.new_chat()
    }

    pub fn settings(&self) -> Result<Settings, Error> {
        Ok(lock(&self.settings)?.clone())
    }

    pub fn save_settings(&self, update: SettingsUpdate) -> Result<Settings, Error> {
        let mut settings = lock(&self.settings)?;
        settings.save(&self.kv, update)?;
        Ok(settings.clone())
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::SeqCst)
    }

    /// Append `text` as a user turn to the current conversation and
    /// ask for a reply. The reply, or the error that prevented one, is
    /// appended as well. Errors returned from here are storage
    /// failures only.
    pub async fn send_message(&self, text: &str) -> Result<SendOutcome, Error> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Ignored);
        }
        if self.generating.swap(true, Ordering::SeqCst) {
            tracing::debug!("Ignoring message sent while a reply is generating");
            return Ok(SendOutcome::Ignored);
        }
        let _guard = GeneratingGuard(&self.generating);

        let id = self.current_id()?;
        let turns = {
            let mut store = lock(&self.store)?;
            store.append_turn(&id, Role::User, text)?;
            store
                .get_conversation(&id)
                .map(|c| c.turns.clone())
                .unwrap_or_default()
        };
        let settings = self.settings()?;

        match self.client.generate(&turns, &settings).await {
            Ok(reply) => {
                let turn = lock(&self.store)?.append_turn(&id, Role::Assistant, &reply)?;
                Ok(SendOutcome::Replied(turn))
            }
            Err(e) => {
                tracing::error!("Failed to get a reply for conversation {}: {}", id, e);
                let turn = lock(&self.store)?.append_turn(&id, Role::System, &e.to_string())?;
                Ok(SendOutcome::Failed(turn))
            }
        }
    }
}
