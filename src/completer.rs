//! The seam between a chat session and whatever produces replies.

use crate::context_window::ContextWindow;
use crate::error::Result;
use crate::types::{ChatCompletionRequest, ChatMessageParam, Message, Model};

/// Produces the assistant's reply to a new user turn.
///
/// Implementations see the prior conversation read-only and must not
/// mutate it; appending the reply is the caller's job.
///
/// ```
/// use nyaai::{Completer, Message, Result};
///
/// struct Canned;
///
/// #[async_trait::async_trait]
/// impl Completer for Canned {
///     async fn complete(&self, history: &[Message], user_text: &str) -> Result<String> {
///         Ok(format!("{} earlier turns; you asked: {user_text}", history.len()))
///     }
/// }
///
/// # tokio_test::block_on(async {
/// let reply = Canned.complete(&[], "Can I get bail?").await.unwrap();
/// assert_eq!(reply, "0 earlier turns; you asked: Can I get bail?");
/// # });
/// ```
#[async_trait::async_trait]
pub trait Completer: Send + Sync {
    /// Returns the full reply text for `user_text`, given prior `history`.
    async fn complete(&self, history: &[Message], user_text: &str) -> Result<String>;
}

/// Fixed sampling parameters applied to every request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    /// Model identifier.
    pub model: Model,

    /// Instruction placed before the conversation.
    pub system_prompt: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Upper bound on generated tokens.
    pub max_tokens: u32,

    /// How much history accompanies each request.
    pub context_window: ContextWindow,
}

impl CompletionParams {
    /// Builds the request body: system prompt, windowed history, new turn.
    pub fn build_request(&self, history: &[Message], user_text: &str) -> ChatCompletionRequest {
        let window = self.context_window.select(history);
        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(ChatMessageParam::system(self.system_prompt.clone()));
        messages.extend(window.iter().map(ChatMessageParam::from));
        messages.push(ChatMessageParam::user(user_text));
        ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageId, MessageRole};

    fn params(context_window: ContextWindow) -> CompletionParams {
        CompletionParams {
            model: Model::default(),
            system_prompt: "You are a legal assistant.".to_string(),
            temperature: 0.7,
            max_tokens: 1024,
            context_window,
        }
    }

    #[test]
    fn first_turn_has_system_and_user() {
        let request = params(ContextWindow::Unbounded)
            .build_request(&[], "What should I do if my wallet is stolen?");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].role, "user");
        assert_eq!(
            request.messages[1].content,
            "What should I do if my wallet is stolen?"
        );
        assert!(!request.stream);
    }

    #[test]
    fn history_is_replayed_in_order() {
        let history = vec![
            Message::new(MessageId::new(1), MessageRole::User, "first"),
            Message::new(MessageId::new(2), MessageRole::Assistant, "reply"),
        ];
        let request = params(ContextWindow::Unbounded).build_request(&history, "second");
        let roles: Vec<_> = request.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(request.messages[2].content, "reply");
    }

    #[test]
    fn window_limits_history() {
        let history: Vec<_> = (1..=6)
            .map(|i| {
                let role = if i % 2 == 1 {
                    MessageRole::User
                } else {
                    MessageRole::Assistant
                };
                Message::new(MessageId::new(i), role, format!("m{i}"))
            })
            .collect();
        let request = params(ContextWindow::LastMessages(2)).build_request(&history, "next");
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[1].content, "m5");
    }
}
