//! Markdown to HTML for assistant replies.
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

pub trait MarkdownRenderer {
    fn to_html(&self, markdown: &str) -> String;
}

const LINK_SCHEMES: [&str; 3] = ["http:", "https:", "mailto:"];

/// CommonMark renderer for model output. Raw HTML is shown as text,
/// single newlines become `<br />` and links only survive for web and
/// mail targets.
#[derive(Default, Clone, Copy)]
pub struct CmarkMarkdown;

impl MarkdownRenderer for CmarkMarkdown {
    fn to_html(&self, markdown: &str) -> String {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        // One entry per open link or image: whether its tags were dropped
        let mut dropped: Vec<bool> = Vec::new();

        let parser = Parser::new_ext(markdown, options).filter_map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
            Event::SoftBreak => Some(Event::HardBreak),
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                let lang = match lang.split_whitespace().next() {
                    Some(lang) => CowStr::from(lang.to_string()),
                    None => CowStr::Borrowed("plaintext"),
                };
                Some(Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))))
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                if is_safe_url(&dest_url) {
                    dropped.push(false);
                    Some(Event::InlineHtml(CowStr::from(format!(
                        r#"<a href="{}" target="_blank" rel="noopener">"#,
                        escape_html(&dest_url)
                    ))))
                } else {
                    dropped.push(true);
                    None
                }
            }
            Event::End(TagEnd::Link) => match dropped.pop() {
                Some(false) => Some(Event::InlineHtml(CowStr::Borrowed("</a>"))),
                _ => None,
            },
            Event::Start(Tag::Image { ref dest_url, .. }) => {
                let safe = is_safe_url(dest_url);
                dropped.push(!safe);
                safe.then_some(event)
            }
            Event::End(TagEnd::Image) => match dropped.pop() {
                Some(false) => Some(event),
                _ => None,
            },
            other => Some(other),
        });

        let mut out = String::new();
        html::push_html(&mut out, parser);
        out
    }
}

fn is_safe_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    LINK_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
