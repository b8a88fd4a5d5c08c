//! Interactive terminal chat with the NyaAI legal assistant.
//!
//! This module provides a REPL chat interface built on top of the
//! completion client. It supports:
//!
//! - One outstanding request at a time, with replies typed out character by
//!   character
//! - English and Hindi input hints
//! - Attachment screening for legal documents
//! - Slash commands for session control
//!
//! # Architecture
//!
//! - [`store`](ConversationStore): the conversation and its in-flight guard
//! - [`session`](ChatSession): turns input into completion requests
//! - [`reveal`](play): drives the typewriter onto a renderer
//! - [`input`](LineReader): terminal reads on their own thread
//! - [`config`](ChatConfig): CLI argument parsing and configuration
//! - [`commands`](parse_command): slash command parsing

mod attachment;
mod commands;
mod config;
mod input;
mod language;
mod notification;
mod reveal;
mod session;
mod store;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use attachment::{ALLOWED_MIME_TYPES, AttachmentVerdict, mime_for_path, screen};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{
    ChatArgs, ChatConfig, DEFAULT_MAX_TOKENS, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
};
pub use input::{Input, LineReader, LineSource};
pub use language::Language;
pub use notification::{Notification, Severity};
pub use reveal::{SkipSwitch, play};
pub use session::{ChatSession, ConfigCompleter, IgnoreReason, SessionStats, SubmitOutcome};
pub use store::{
    ConversationStore, PendingTurn, REVEAL_CHAR_INTERVAL, REVEAL_GRACE, Reveal, TurnOutcome,
    reveal_duration,
};
