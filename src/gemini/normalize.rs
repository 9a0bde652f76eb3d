//! Adapts a stored conversation to the alternating-turn shape Gemini
//! requires.
use super::models::{Content, ContentRole};
use crate::chat::{Role, Turn};

const MERGE_SEPARATOR: &str = "\n\n";

#[derive(Debug, PartialEq)]
pub struct NormalizedTurns {
    pub contents: Vec<Content>,
    pub system_instruction: Option<String>,
}

/// Convert `turns` into Gemini `contents`.
///
/// System turns are never sent as contents. The explicit
/// `system_instruction` wins when it is non-blank, otherwise the
/// first system turn is used. Back to back turns with the same role
/// are merged and a leading model turn is dropped since the API
/// rejects both. An empty result is left for the caller to handle.
pub fn normalize_turns(turns: &[Turn], system_instruction: Option<&str>) -> NormalizedTurns {
    let system_instruction = system_instruction
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            turns
                .iter()
                .find(|t| t.role == Role::System)
                .map(|t| t.content.clone())
        });

    let chat_turns = turns
        .iter()
        .filter(|t| t.role != Role::System)
        .map(|t| Content::new(content_role(t.role), &t.content));

    let mut contents = merge_consecutive(chat_turns, None);
    if contents.first().is_some_and(|c| c.role == ContentRole::Model) {
        contents.remove(0);
    }
    let contents = merge_consecutive(contents, Some(ContentRole::Model));

    NormalizedTurns {
        contents,
        system_instruction,
    }
}

fn content_role(role: Role) -> ContentRole {
    match role {
        Role::Assistant => ContentRole::Model,
        Role::User | Role::System => ContentRole::User,
    }
}

/// Merge neighbors that share a role. Restrict merging to `only` when
/// given.
fn merge_consecutive(
    contents: impl IntoIterator<Item = Content>,
    only: Option<ContentRole>,
) -> Vec<Content> {
    let mut merged: Vec<Content> = Vec::new();
    for content in contents {
        match merged.last_mut() {
            Some(last)
                if last.role == content.role && only.is_none_or(|role| role == content.role) =>
            {
                let text = format!("{}{}{}", last.text(), MERGE_SEPARATOR, content.text());
                *last = Content::new(last.role, &text);
            }
            _ => merged.push(content),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: Role, content: &str) -> Turn {
        Turn {
            role,
            content: content.to_string(),
            timestamp: 0,
        }
    }

    fn user(text: &str) -> Content {
        Content::new(ContentRole::User, text)
    }

    fn model(text: &str) -> Content {
        Content::new(ContentRole::Model, text)
    }

    #[test]
    fn test_merges_consecutive_user_turns() {
        let turns = vec![
            turn(Role::User, "a"),
            turn(Role::User, "b"),
            turn(Role::Assistant, "c"),
        ];
        let actual = normalize_turns(&turns, None);
        assert_eq!(actual.contents, vec![user("a\n\nb"), model("c")]);
    }

    #[test]
    fn test_drops_leading_model_turn() {
        let turns = vec![turn(Role::Assistant, "x"), turn(Role::User, "y")];
        let actual = normalize_turns(&turns, None);
        assert_eq!(actual.contents, vec![user("y")]);
    }

    #[test]
    fn test_merges_consecutive_model_turns() {
        let turns = vec![
            turn(Role::User, "q"),
            turn(Role::Assistant, "a1"),
            turn(Role::Assistant, "a2"),
            turn(Role::User, "q2"),
        ];
        let actual = normalize_turns(&turns, None);
        assert_eq!(
            actual.contents,
            vec![user("q"), model("a1\n\na2"), user("q2")]
        );
    }

    #[test]
    fn test_already_normalized_is_unchanged() {
        let turns = vec![
            turn(Role::User, "hi"),
            turn(Role::Assistant, "hello"),
            turn(Role::User, "how are you?"),
        ];
        let once = normalize_turns(&turns, Some("Be nice."));
        assert_eq!(
            once.contents,
            vec![user("hi"), model("hello"), user("how are you?")]
        );

        // Feed the output back in as turns
        let roundtrip: Vec<Turn> = once
            .contents
            .iter()
            .map(|c| {
                let role = match c.role {
                    ContentRole::User => Role::User,
                    ContentRole::Model => Role::Assistant,
                };
                turn(role, c.text())
            })
            .collect();
        let twice = normalize_turns(&roundtrip, Some("Be nice."));
        assert_eq!(twice, once);
    }

    #[test]
    fn test_system_turns_are_excluded() {
        let turns = vec![
            turn(Role::User, "hello"),
            turn(Role::System, "Error: Proxy Error"),
            turn(Role::User, "hello again"),
        ];
        let actual = normalize_turns(&turns, Some("You are a helpful AI assistant."));
        assert_eq!(actual.contents, vec![user("hello\n\nhello again")]);
        assert_eq!(
            actual.system_instruction.as_deref(),
            Some("You are a helpful AI assistant.")
        );
    }

    #[test]
    fn test_system_turn_used_without_explicit_instruction() {
        let turns = vec![turn(Role::System, "Be terse."), turn(Role::User, "hi")];
        let actual = normalize_turns(&turns, None);
        assert_eq!(actual.system_instruction.as_deref(), Some("Be terse."));

        let blank = normalize_turns(&turns, Some(" "));
        assert_eq!(blank.system_instruction.as_deref(), Some("Be terse."));
    }

    #[test]
    fn test_empty_input() {
        let actual = normalize_turns(&[], None);
        assert!(actual.contents.is_empty());
        assert_eq!(actual.system_instruction, None);
    }

    #[test]
    fn test_only_model_turns() {
        let turns = vec![turn(Role::Assistant, "x"), turn(Role::Assistant, "y")];
        // The merged model turn is dropped as a whole
        let actual = normalize_turns(&turns, None);
        assert!(actual.contents.is_empty());
    }
}
