//! Interactive chat about one document.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use redraft_application::EditingUseCase;
use redraft_core::RedraftError;
use redraft_core::session::Message;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper, history::DefaultHistory};

use crate::render;

const COMMANDS: [&str; 6] = ["/accept", "/reject", "/diff", "/versions", "/help", "/quit"];

/// rustyline helper providing slash-command completion, highlighting and hints.
#[derive(Clone)]
struct ChatHelper {
    commands: Vec<String>,
}

impl ChatHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ChatHelper {}

/// What one line of input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Accept,
    Reject,
    Diff,
    Versions,
    Help,
    Quit,
    Unknown(&'a str),
    Say(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    match line {
        "/accept" => Input::Accept,
        "/reject" => Input::Reject,
        "/diff" => Input::Diff,
        "/versions" => Input::Versions,
        "/help" => Input::Help,
        "/quit" | "/exit" | "quit" | "exit" => Input::Quit,
        other if other.starts_with('/') => Input::Unknown(other),
        other => Input::Say(other),
    }
}

/// Runs the REPL until `/quit` or EOF, then closes the session.
pub async fn run(editing: &EditingUseCase, document_id: &str) -> Result<()> {
    let document = editing.get_document(document_id).await?;
    let session_id = editing.create_session(document_id).await?;

    let mut rl: Editor<ChatHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ChatHelper::new()));

    println!("{}", "=== Redraft ===".bright_magenta().bold());
    println!(
        "{}",
        format!(
            "Editing {} ({}, v{}). Type an instruction, or /help.",
            document.id, document.kind, document.current_version_number
        )
        .bright_black()
    );
    println!();
    println!("{}", document.current_text);
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let outcome = match parse_input(trimmed) {
                    Input::Quit => break,
                    Input::Help => {
                        print_help();
                        Ok(())
                    }
                    Input::Unknown(cmd) => {
                        println!("{}", format!("Unknown command {cmd}. Try /help.").yellow());
                        Ok(())
                    }
                    Input::Say(text) => say(editing, &session_id, text).await,
                    Input::Diff => show_pending(editing, &session_id).await,
                    Input::Accept => accept(editing, &session_id).await,
                    Input::Reject => reject(editing, &session_id).await,
                    Input::Versions => versions(editing, document_id).await,
                };

                if let Err(e) = outcome {
                    report(&e);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    editing.close_session(&session_id).await?;
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

async fn say(editing: &EditingUseCase, session_id: &str, text: &str) -> redraft_core::Result<()> {
    println!("{}", "…".bright_black());
    let reply = editing.send_message(session_id, text).await?;
    print_model(&reply);
    if reply.edit_suggestion.is_some() {
        show_pending(editing, session_id).await?;
        println!("{}", "/accept or /reject".bright_black());
    }
    Ok(())
}

async fn show_pending(editing: &EditingUseCase, session_id: &str) -> redraft_core::Result<()> {
    match editing.preview_suggestion(session_id).await? {
        Some(preview) => {
            println!();
            println!("{}", render::segments(&preview.segments));
            println!(
                "{}  {}",
                render::summary(&preview.summary),
                preview.suggestion.reason.italic()
            );
            println!();
        }
        None => println!("{}", "No suggestion is pending.".bright_black()),
    }
    Ok(())
}

async fn accept(editing: &EditingUseCase, session_id: &str) -> redraft_core::Result<()> {
    let Some(pending) = editing.pending_suggestion(session_id).await? else {
        println!("{}", "No suggestion is pending.".bright_black());
        return Ok(());
    };
    let outcome = editing.gateway().apply(&pending.id).await?;
    println!(
        "{}",
        format!("Saved as version {}.", outcome.version.version_number).bright_green()
    );
    Ok(())
}

async fn reject(editing: &EditingUseCase, session_id: &str) -> redraft_core::Result<()> {
    let Some(pending) = editing.pending_suggestion(session_id).await? else {
        println!("{}", "No suggestion is pending.".bright_black());
        return Ok(());
    };
    let ack = editing.gateway().reject(&pending.id).await?;
    print_model(&ack);
    Ok(())
}

async fn versions(editing: &EditingUseCase, document_id: &str) -> redraft_core::Result<()> {
    for version in editing.list_versions(document_id).await? {
        println!("{}", render::version_line(&version));
    }
    Ok(())
}

fn print_model(message: &Message) {
    for line in message.content.lines() {
        println!("{}", line.bright_blue());
    }
}

fn print_help() {
    println!("{}", "Free text is sent to the model as an instruction.".bright_black());
    println!("{}", "  /diff      show the pending suggestion".bright_black());
    println!("{}", "  /accept    save the pending suggestion as a new version".bright_black());
    println!("{}", "  /reject    discard the pending suggestion".bright_black());
    println!("{}", "  /versions  list the document's versions".bright_black());
    println!("{}", "  /quit      leave".bright_black());
}

/// Validation and conflict errors are shown next to the input; anything else
/// is reported generically (details are in the log file).
fn report(err: &RedraftError) {
    if err.is_inline() {
        println!("{}", err.to_string().yellow());
    } else if err.is_upstream_timeout() {
        println!("{}", "The model took too long to answer. Try again.".yellow());
    } else {
        tracing::error!("[repl] {}", err);
        println!("{}", format!("Something went wrong: {}", err).red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("/accept"), Input::Accept);
        assert_eq!(parse_input("/reject"), Input::Reject);
        assert_eq!(parse_input("/diff"), Input::Diff);
        assert_eq!(parse_input("/versions"), Input::Versions);
        assert_eq!(parse_input("/quit"), Input::Quit);
        assert_eq!(parse_input("exit"), Input::Quit);
        assert_eq!(parse_input("/undo"), Input::Unknown("/undo"));
        assert_eq!(parse_input("make it shorter"), Input::Say("make it shorter"));
    }

    #[test]
    fn test_every_listed_command_parses() {
        for command in COMMANDS {
            assert!(!matches!(parse_input(command), Input::Unknown(_) | Input::Say(_)));
        }
    }
}
