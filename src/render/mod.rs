//! Turning conversations into something to look at.
mod markdown;
mod presentation;

pub use markdown::{MarkdownRenderer, CmarkMarkdown, escape_html};
pub use presentation::{
    TypingIndicator, render_conversation_html, render_history_line, render_turn_html,
    render_turn_terminal,
};
