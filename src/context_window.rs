//! Selection of prior turns that accompany each completion request.
//!
//! Every request replays conversation history to the endpoint.  A
//! [`ContextWindow`] decides how much of it: all of it, or only the newest
//! messages.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::types::{Message, MessageRole};

/// Policy for how much history is sent with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextWindow {
    /// Send the whole conversation.
    #[default]
    Unbounded,

    /// Send at most this many of the newest messages.
    ///
    /// The window never opens on an assistant turn; if the cut lands there,
    /// that message is dropped as well.
    LastMessages(usize),
}

impl ContextWindow {
    /// Returns the slice of `history` that should be sent.
    pub fn select<'a>(&self, history: &'a [Message]) -> &'a [Message] {
        match *self {
            ContextWindow::Unbounded => history,
            ContextWindow::LastMessages(limit) => {
                let mut start = history.len().saturating_sub(limit);
                while start < history.len() && history[start].role == MessageRole::Assistant {
                    start += 1;
                }
                &history[start..]
            }
        }
    }
}

impl fmt::Display for ContextWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextWindow::Unbounded => write!(f, "unbounded"),
            ContextWindow::LastMessages(limit) => write!(f, "last {limit} messages"),
        }
    }
}

impl FromStr for ContextWindow {
    type Err = Error;

    /// Parses `all`/`unbounded` or a message count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "unbounded" => Ok(ContextWindow::Unbounded),
            other => other
                .parse::<usize>()
                .map(ContextWindow::LastMessages)
                .map_err(|_| {
                    Error::validation(
                        format!("invalid context window: {s}"),
                        Some("context-messages".to_string()),
                    )
                }),
        }
    }
}
