//! The core models for a locally stored chat history.
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Longest title, in characters, before it gets cut off.
pub const TITLE_MAX_CHARS: usize = 30;
pub const TITLE_ELLIPSIS: &str = "...";

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
    // Errors surfaced to the user are stored in the conversation with
    // this role
    #[serde(rename = "system")]
    System,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

impl Turn {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            timestamp: now_millis(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub timestamp: i64,
    #[serde(rename = "messages")]
    pub turns: Vec<Turn>,
}

impl Conversation {
    /// A conversation only exists once it has its first turn. The
    /// title is derived from that turn.
    pub fn new(id: &str, first: Turn) -> Self {
        Self {
            id: id.to_string(),
            title: derive_title(&first.content),
            timestamp: first.timestamp,
            turns: vec![first],
        }
    }
}

/// Takes the first 30 characters of `content`, marking the cut with
/// an ellipsis.
pub fn derive_title(content: &str) -> String {
    let mut chars = content.chars();
    let title: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{}{}", title, TITLE_ELLIPSIS)
    } else {
        title
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
