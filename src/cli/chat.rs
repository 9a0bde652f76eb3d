use std::io;

use anyhow::Result;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use super::settings::print_settings;
use crate::chat::{ChatSession, SendOutcome};
use crate::client::Mode;
use crate::core::{AppConfig, SharedKv};
use crate::render::{TypingIndicator, render_history_line, render_turn_terminal};

const HELP: &str = r#"Commands:
  /new          start a new conversation
  /history      list saved conversations
  /load <id>    continue a saved conversation
  /clear        delete every saved conversation
  /settings     show the current settings
  /help         show this message
  /quit         exit
Anything else is sent as a message."#;

#[derive(Debug, PartialEq)]
enum ReplCommand<'a> {
    Send(&'a str),
    New,
    History,
    Load(&'a str),
    Clear,
    Settings,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> ReplCommand<'_> {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ReplCommand::Send(line);
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match (name, arg) {
        ("new", _) => ReplCommand::New,
        ("history", _) => ReplCommand::History,
        ("load", id) if !id.is_empty() => ReplCommand::Load(id),
        ("clear", _) => ReplCommand::Clear,
        ("settings", _) => ReplCommand::Settings,
        ("help", _) => ReplCommand::Help,
        ("quit" | "exit", _) => ReplCommand::Quit,
        _ => ReplCommand::Unknown(line),
    }
}

pub async fn run(kv: SharedKv, config: &AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let session = ChatSession::new(kv, config)?;

    let settings = session.settings()?;
    let mode = match Mode::for_settings(&settings) {
        Mode::Direct => "directly".to_string(),
        Mode::Proxy => format!("through {}", config.proxy_url),
    };
    println!(
        "Chatting with {} {}. Type /help for commands.",
        settings.model, mode
    );

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                match handle_line(&mut rl, &session, &line).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    // Storage errors are reported and the session carries on
                    Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

async fn handle_line(rl: &mut DefaultEditor, session: &ChatSession, line: &str) -> Result<Flow> {
    match parse_command(line) {
        ReplCommand::Send(text) => send(session, text).await?,
        ReplCommand::New => {
            session.new_chat()?;
            println!("Started a new conversation");
        }
        ReplCommand::History => {
            let current = session.current_id()?;
            let conversations = session.conversations()?;
            if conversations.is_empty() {
                println!("No conversations yet.");
            }
            for conversation in conversations.iter() {
                println!(
                    "{}",
                    render_history_line(conversation, conversation.id == current)
                );
            }
        }
        ReplCommand::Load(id) => match session.load_chat(id)? {
            Some(conversation) => {
                println!("{}\n", conversation.title);
                for turn in conversation.turns.iter() {
                    println!("{}", render_turn_terminal(turn));
                }
            }
            None => println!("Conversation {} not found", id),
        },
        ReplCommand::Clear => {
            let answer = rl.readline("Clear all conversations? [y/N] ")?;
            if answer.trim().eq_ignore_ascii_case("y") {
                session.clear_history()?;
                println!("History cleared");
            }
        }
        ReplCommand::Settings => print_settings(&session.settings()?),
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Quit => return Ok(Flow::Quit),
        ReplCommand::Unknown(line) => {
            println!("Unknown command: {}. Type /help for commands.", line)
        }
    }
    Ok(Flow::Continue)
}

async fn send(session: &ChatSession, text: &str) -> Result<()> {
    let outcome = {
        let mut indicator = TypingIndicator::new(io::stderr());
        indicator.show();
        session.send_message(text).await?
    };

    match outcome {
        SendOutcome::Replied(turn) | SendOutcome::Failed(turn) => {
            println!("{}", render_turn_terminal(&turn));
        }
        SendOutcome::Ignored => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("Hello there"), ReplCommand::Send("Hello there"));
        assert_eq!(parse_command("  /new "), ReplCommand::New);
        assert_eq!(parse_command("/history"), ReplCommand::History);
        assert_eq!(
            parse_command("/load 1718000000000"),
            ReplCommand::Load("1718000000000")
        );
        assert_eq!(parse_command("/load"), ReplCommand::Unknown("/load"));
        assert_eq!(parse_command("/clear"), ReplCommand::Clear);
        assert_eq!(parse_command("/settings"), ReplCommand::Settings);
        assert_eq!(parse_command("/help"), ReplCommand::Help);
        assert_eq!(parse_command("/exit"), ReplCommand::Quit);
        assert_eq!(parse_command("/bogus"), ReplCommand::Unknown("/bogus"));
    }
}
