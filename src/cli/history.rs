use anyhow::Result;

use crate::chat::ConversationStore;
use crate::core::SharedKv;
use crate::render::{
    CmarkMarkdown, render_conversation_html, render_history_line, render_turn_terminal,
};

pub fn list(kv: SharedKv) -> Result<()> {
    let store = ConversationStore::load(kv)?;
    let conversations = store.list_conversations();
    if conversations.is_empty() {
        println!("No conversations yet.");
    }
    for conversation in conversations {
        println!("{}", render_history_line(conversation, false));
    }
    Ok(())
}

pub fn show(kv: SharedKv, id: &str, html: bool) -> Result<()> {
    let store = ConversationStore::load(kv)?;
    let Some(conversation) = store.get_conversation(id) else {
        println!("Conversation {} not found", id);
        return Ok(());
    };

    if html {
        print!("{}", render_conversation_html(conversation, &CmarkMarkdown));
    } else {
        println!("{}\n", conversation.title);
        for turn in conversation.turns.iter() {
            println!("{}", render_turn_terminal(turn));
        }
    }
    Ok(())
}

pub fn clear(kv: SharedKv) -> Result<()> {
    let mut store = ConversationStore::load(kv)?;
    let count = store.list_conversations().len();
    store.clear_all()?;
    println!("Deleted {} conversations", count);
    Ok(())
}
