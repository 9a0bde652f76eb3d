use std::io::Write;

use chrono::{DateTime, Local};
use colored::Colorize;

use super::markdown::{MarkdownRenderer, escape_html};
use crate::chat::{Conversation, Role, Turn};

fn label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "AI Assistant",
        Role::System => "Error",
    }
}

fn css_class(role: Role) -> &'static str {
    match role {
        Role::User => "turn turn-user",
        Role::Assistant => "turn turn-assistant",
        Role::System => "turn turn-error",
    }
}

fn time_of_day(timestamp: i64) -> String {
    DateTime::from_timestamp_millis(timestamp)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Role styled HTML block for a single turn. Only assistant replies
/// are treated as markdown.
pub fn render_turn_html(turn: &Turn, markdown: &impl MarkdownRenderer) -> String {
    let body = match turn.role {
        Role::Assistant => format!(
            r#"<div class="markdown-content">{}</div>"#,
            markdown.to_html(&turn.content)
        ),
        Role::User | Role::System => format!(
            r#"<p class="plain-content">{}</p>"#,
            escape_html(&turn.content)
        ),
    };

    format!(
        r#"<div class="{}"><div class="turn-header"><span class="turn-label">{}</span><span class="turn-time">{}</span></div>{}</div>"#,
        css_class(turn.role),
        label(turn.role),
        time_of_day(turn.timestamp),
        body
    )
}

const PAGE_STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }
.turn { padding: 1rem; border-bottom: 1px solid #ddd; }
.turn-assistant { background: #f7f7f8; }
.turn-error { color: #b91c1c; background: #fef2f2; }
.turn-header { display: flex; gap: 0.5rem; font-weight: 600; }
.turn-time { color: #888; font-weight: 400; font-size: 0.8rem; }
.plain-content { white-space: pre-wrap; }
pre { background: #1e1e1e; color: #eee; padding: 0.75rem; overflow-x: auto; }
"#;

/// A standalone HTML page with every turn in `conversation`.
pub fn render_conversation_html(
    conversation: &Conversation,
    markdown: &impl MarkdownRenderer,
) -> String {
    let turns: String = conversation
        .turns
        .iter()
        .map(|turn| render_turn_html(turn, markdown))
        .collect();
    let title = escape_html(&conversation.title);

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>{PAGE_STYLE}</style>\n</head>\n<body>\n<h1>{title}</h1>\n{turns}\n</body>\n</html>\n"
    )
}

/// Turn as shown in the terminal: a colored label line followed by the
/// raw content.
pub fn render_turn_terminal(turn: &Turn) -> String {
    let header = format!("{} {}", label(turn.role), time_of_day(turn.timestamp));
    let header = match turn.role {
        Role::User => header.blue().bold(),
        Role::Assistant => header.green().bold(),
        Role::System => header.red().bold(),
    };
    let content = match turn.role {
        Role::System => turn.content.red().to_string(),
        _ => turn.content.clone(),
    };
    format!("{}\n{}\n", header, content)
}

/// One line per conversation for the history listing. `current` marks
/// the conversation being written to.
pub fn render_history_line(conversation: &Conversation, current: bool) -> String {
    let marker = if current { "*" } else { " " };
    let created = DateTime::from_timestamp_millis(conversation.timestamp)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    format!(
        "{} {}  {}  {} ({} turns)",
        marker,
        conversation.id.dimmed(),
        created,
        conversation.title,
        conversation.turns.len()
    )
}

/// The transient "generating" notice shown while a reply is in flight.
pub struct TypingIndicator<W: Write> {
    out: W,
    visible: bool,
}

const TYPING_TEXT: &str = "AI Assistant is typing...";

impl<W: Write> TypingIndicator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            visible: false,
        }
    }

    pub fn show(&mut self) {
        if !self.visible {
            let _ = write!(self.out, "{}", TYPING_TEXT.dimmed());
            let _ = self.out.flush();
            self.visible = true;
        }
    }

    /// Erase the notice from the current line.
    pub fn hide(&mut self) {
        if self.visible {
            let _ = write!(self.out, "\r{}\r", " ".repeat(TYPING_TEXT.len()));
            let _ = self.out.flush();
            self.visible = false;
        }
    }
}

impl<W: Write> Drop for TypingIndicator<W> {
    fn drop(&mut self) {
        self.hide();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::CmarkMarkdown;

    fn turn(role: Role, content: &str) -> Turn {
        Turn {
            role,
            content: content.to_string(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_assistant_turn_renders_markdown() {
        let html = render_turn_html(&turn(Role::Assistant, "**hi**"), &CmarkMarkdown);
        assert!(html.starts_with(r#"<div class="turn turn-assistant">"#));
        assert!(html.contains("AI Assistant"));
        assert!(html.contains("<p><strong>hi</strong></p>"));
    }

    #[test]
    fn test_user_turn_is_escaped_verbatim() {
        let html = render_turn_html(&turn(Role::User, "**<b>hi</b>**"), &CmarkMarkdown);
        assert!(html.contains("turn-user"));
        assert!(html.contains("**&lt;b&gt;hi&lt;/b&gt;**"));
    }

    #[test]
    fn test_error_turn_is_marked() {
        let html = render_turn_html(&turn(Role::System, "No response generated."), &CmarkMarkdown);
        assert!(html.contains("turn-error"));
        assert!(html.contains(">Error<"));
        assert!(html.contains("No response generated."));
    }

    #[test]
    fn test_conversation_page() {
        let mut conversation = Conversation::new("1", turn(Role::User, "Hello <there>"));
        conversation.turns.push(turn(Role::Assistant, "# Hi"));
        let page = render_conversation_html(&conversation, &CmarkMarkdown);

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Hello &lt;there&gt;</title>"));
        assert!(page.contains("<h1>Hi</h1>"));
        assert_eq!(page.matches(r#"<div class="turn "#).count(), 2);
    }

    #[test]
    fn test_terminal_turn() {
        colored::control::set_override(false);
        let rendered = render_turn_terminal(&turn(Role::User, "Hello"));
        assert!(rendered.starts_with("You "));
        assert!(rendered.ends_with("\nHello\n"));
    }

    #[test]
    fn test_typing_indicator() {
        colored::control::set_override(false);
        let mut out: Vec<u8> = Vec::new();
        {
            let mut indicator = TypingIndicator::new(&mut out);
            indicator.show();
            indicator.show();
            indicator.hide();
            indicator.hide();
        }
        let written = String::from_utf8(out).unwrap();
        assert_eq!(written.matches(TYPING_TEXT).count(), 1);
        assert_eq!(written.matches('\r').count(), 2);
        assert!(written.ends_with('\r'));
    }
}
