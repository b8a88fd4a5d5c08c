//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the completion endpoint.

use std::path::PathBuf;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Switch the input language between English and Hindi.
    Language,

    /// Screen a file for attachment.
    Attach(PathBuf),

    /// Reprint the conversation so far.
    History,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics (message count, current model, etc.).
    Stats,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use nyaai::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/attach lease.pdf").is_some());
/// assert!(parse_command("Can my landlord keep the deposit?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "lang" | "language" => ChatCommand::Language,
        "attach" | "upload" => match argument {
            Some(path) => ChatCommand::Attach(PathBuf::from(path)),
            None => ChatCommand::Invalid("/attach requires a file path".to_string()),
        },
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear conversation history
  /lang                  Switch input hints between English and Hindi
  /attach <file>         Attach a PDF, DOCX, PNG or JPG document
  /history               Reprint the conversation
  /stats                 Show session statistics
  /help                  Show this help message
  /quit                  Exit the chat

Press Ctrl+C while a reply is being typed to show it in full."#
}
