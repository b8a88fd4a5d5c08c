//! Volatile conversation state for one chat session.
//!
//! The store owns the ordered message list, the in-flight guard that allows
//! at most one outstanding completion request, the single "currently
//! revealing" marker, and an epoch that invalidates replies arriving after
//! the conversation was cleared.

use std::time::Duration;

use tokio::time::Instant;

use crate::error::Error;
use crate::types::{Message, MessageId, MessageRole};

/// Time the typewriter spends on each character.
pub const REVEAL_CHAR_INTERVAL: Duration = Duration::from_millis(20);

/// Extra time the reveal marker stays set after the last character.
pub const REVEAL_GRACE: Duration = Duration::from_millis(500);

/// How long a reply of `chars` characters stays marked as revealing.
pub fn reveal_duration(chars: usize) -> Duration {
    let chars = u32::try_from(chars).unwrap_or(u32::MAX);
    REVEAL_CHAR_INTERVAL
        .saturating_mul(chars)
        .saturating_add(REVEAL_GRACE)
}

/// A user turn whose completion has been issued but not yet resolved.
///
/// Hand it back to [`ConversationStore::finish_turn`] with the result.
#[derive(Debug)]
#[must_use = "a pending turn keeps the store in flight until it is finished"]
pub struct PendingTurn {
    epoch: u64,
    user_message: MessageId,
    user_text: String,
    history: Vec<Message>,
}

impl PendingTurn {
    /// Conversation before the new user message, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Text of the new user message.
    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    /// Id of the appended user message.
    pub fn user_message(&self) -> MessageId {
        self.user_message
    }

    /// Epoch the turn was issued under.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// What happened to a finished turn.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The reply was appended under this id and is now revealing.
    Answered(MessageId),

    /// The completion failed; the user message stays, nothing was appended.
    Failed(Error),

    /// The conversation was cleared while the request was out; the result
    /// was dropped.
    Discarded,
}

/// The message currently being revealed and when the marker expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reveal {
    /// The revealing message.
    pub id: MessageId,
    /// When the marker clears.
    pub clears_at: Instant,
}

/// Ordered, append-only conversation with an in-flight guard.
#[derive(Debug, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    next_id: u64,
    in_flight: bool,
    epoch: u64,
    reveal: Option<Reveal>,
}

impl ConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user message and opens a completion turn.
    ///
    /// Returns `None` without touching the conversation when `text` is blank
    /// or another request is still in flight.
    pub fn append_user(&mut self, text: &str) -> Option<PendingTurn> {
        let text = text.trim();
        if text.is_empty() || self.in_flight {
            return None;
        }
        let history = self.messages.clone();
        let id = self.push(MessageRole::User, text.to_string());
        self.in_flight = true;
        Some(PendingTurn {
            epoch: self.epoch,
            user_message: id,
            user_text: text.to_string(),
            history,
        })
    }

    /// Appends an assistant message and marks it as the one revealing.
    ///
    /// Any earlier reveal marker is replaced.  The marker clears
    /// [`reveal_duration`] after now.
    pub fn append_assistant(&mut self, text: impl Into<String>) -> MessageId {
        let text = text.into();
        let clears_at = Instant::now() + reveal_duration(text.chars().count());
        let id = self.push(MessageRole::Assistant, text);
        self.reveal = Some(Reveal { id, clears_at });
        id
    }

    /// Resolves a turn opened by [`append_user`](Self::append_user).
    pub fn finish_turn(&mut self, turn: PendingTurn, result: Result<String, Error>) -> TurnOutcome {
        self.in_flight = false;
        if turn.epoch != self.epoch {
            return TurnOutcome::Discarded;
        }
        match result {
            Ok(reply) => TurnOutcome::Answered(self.append_assistant(reply)),
            Err(err) => TurnOutcome::Failed(err),
        }
    }

    /// Empties the conversation and drops the reveal marker.
    ///
    /// A request still in flight keeps the guard set; its reply will be
    /// discarded when it arrives.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.reveal = None;
        self.epoch += 1;
    }

    /// Clears the reveal marker if its deadline has passed.
    pub fn expire_reveal(&mut self, now: Instant) -> Option<MessageId> {
        match self.reveal {
            Some(reveal) if now >= reveal.clears_at => {
                self.reveal = None;
                Some(reveal.id)
            }
            _ => None,
        }
    }

    /// When the reveal marker will clear, if it is still active.
    pub fn reveal_deadline(&self) -> Option<Instant> {
        self.active_reveal().map(|reveal| reveal.clears_at)
    }

    /// The message currently revealing, if any.
    ///
    /// A marker whose deadline has passed counts as cleared even before
    /// [`expire_reveal`](Self::expire_reveal) drops it.
    pub fn revealing(&self) -> Option<MessageId> {
        self.active_reveal().map(|reveal| reveal.id)
    }

    /// Returns true if `id` is the message currently revealing.
    pub fn is_revealing(&self, id: MessageId) -> bool {
        self.revealing() == Some(id)
    }

    /// Returns true while a completion request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Number of times the conversation has been cleared.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The conversation, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Looks up a message by id.
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if no messages have been appended since the last clear.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn active_reveal(&self) -> Option<Reveal> {
        self.reveal.filter(|reveal| Instant::now() < reveal.clears_at)
    }

    fn push(&mut self, role: MessageRole, content: String) -> MessageId {
        self.next_id += 1;
        let id = MessageId::new(self.next_id);
        self.messages.push(Message::new(id, role, content));
        id
    }
}
