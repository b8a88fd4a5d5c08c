use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

/// Identifier of a message within one conversation store.
///
/// Identifiers come from a per-store monotonic counter, so two messages
/// appended in the same instant still get distinct ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    /// Wraps a raw counter value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw counter value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "msg-{}", self.0)
    }
}

/// Author of a conversation message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

impl MessageRole {
    /// The role name used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

/// One entry of a conversation.
///
/// Messages are immutable once appended; the typewriter reveal is a view over
/// `content`, never a mutation of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique id within the owning store.
    pub id: MessageId,

    /// Who wrote the message.
    pub role: MessageRole,

    /// Full text of the message.
    pub content: String,

    /// When the message was appended.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Message {
    /// Creates a message stamped with the current local time.
    pub fn new(id: MessageId, role: MessageRole, content: impl Into<String>) -> Self {
        let timestamp = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self {
            id,
            role,
            content: content.into(),
            timestamp,
        }
    }

    /// Returns true if the user authored this message.
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Formats the timestamp as `HH:MM`.
    pub fn clock_time(&self) -> String {
        self.timestamp
            .format(format_description!("[hour]:[minute]"))
            .unwrap_or_default()
    }

    /// Number of characters in the content.
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn id_display() {
        assert_eq!(MessageId::new(7).to_string(), "msg-7");
        assert!(MessageId::new(1) < MessageId::new(2));
    }

    #[test]
    fn clock_time_is_hours_and_minutes() {
        let mut message = Message::new(MessageId::new(1), MessageRole::User, "hi");
        message.timestamp = datetime!(2024-03-09 07:05:59 UTC);
        assert_eq!(message.clock_time(), "07:05");
    }

    #[test]
    fn char_len_counts_characters() {
        let message = Message::new(MessageId::new(1), MessageRole::Assistant, "नमस्ते");
        assert_eq!(message.char_len(), 6);
        assert!(!message.is_user());
    }
}
