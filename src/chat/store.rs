use anyhow::{Error, Result};

use super::models::{Conversation, Role, Turn, now_millis};
use crate::core::SharedKv;

pub const HISTORY_KEY: &str = "chat_history";

/// Ordered list of conversations, most recently touched first, backed
/// by a key-value store. Every mutation writes the whole list back.
pub struct ConversationStore {
    kv: SharedKv,
    conversations: Vec<Conversation>,
    last_id: i64,
}

impl ConversationStore {
    /// Load the history from `kv`. A stored value that doesn't parse
    /// is dropped and the store starts empty.
    pub fn load(kv: SharedKv) -> Result<Self, Error> {
        let conversations = match kv.get(HISTORY_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<Conversation>>(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable chat history: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };

        Ok(Self {
            kv,
            conversations,
            last_id: 0,
        })
    }

    /// Allocate an ID for a new conversation. Nothing is stored until
    /// the first turn is appended.
    pub fn create_conversation(&mut self) -> String {
        let mut id = now_millis().max(self.last_id + 1);
        while self.get_conversation(&id.to_string()).is_some() {
            id += 1;
        }
        self.last_id = id;
        id.to_string()
    }

    /// Append a turn and move its conversation to the front. The list
    /// in memory only changes once the write has succeeded.
    pub fn append_turn(&mut self, id: &str, role: Role, content: &str) -> Result<Turn, Error> {
        let turn = Turn::new(role, content);

        let mut conversations = self.conversations.clone();
        let conversation = match conversations.iter().position(|c| c.id == id) {
            Some(idx) => {
                let mut conversation = conversations.remove(idx);
                conversation.turns.push(turn.clone());
                conversation
            }
            None => {
                tracing::debug!("Starting conversation {}", id);
                Conversation::new(id, turn.clone())
            }
        };
        conversations.insert(0, conversation);

        self.persist(&conversations)?;
        self.conversations = conversations;
        Ok(turn)
    }

    pub fn list_conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get_conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    pub fn clear_all(&mut self) -> Result<(), Error> {
        self.persist(&[])?;
        self.conversations.clear();
        Ok(())
    }

    fn persist(&self, conversations: &[Conversation]) -> Result<(), Error> {
        let data = serde_json::to_string(conversations)?;
        self.kv.set(HISTORY_KEY, &data)
    }
}
