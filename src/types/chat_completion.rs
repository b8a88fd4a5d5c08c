use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Message, MessageRole, Model};

/// A message as sent to an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageParam {
    /// One of `system`, `user`, or `assistant`.
    pub role: String,

    /// The text of the turn.
    pub content: String,
}

impl ChatMessageParam {
    /// Creates a system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

impl From<&Message> for ChatMessageParam {
    fn from(message: &Message) -> Self {
        match message.role {
            MessageRole::User => Self::user(message.content.clone()),
            MessageRole::Assistant => Self::assistant(message.content.clone()),
        }
    }
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// The model that should answer.
    pub model: Model,

    /// System prompt, prior turns, and the new user turn, in order.
    pub messages: Vec<ChatMessageParam>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Upper bound on generated tokens.
    pub max_tokens: u32,

    /// Always false; replies are fetched in one piece.
    pub stream: bool,
}

/// Reply body of a chat-completions call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Provider-assigned id.
    #[serde(default)]
    pub id: Option<String>,

    /// Model that produced the reply.
    #[serde(default)]
    pub model: Option<String>,

    /// Candidate replies; only the first one is used.
    pub choices: Vec<Choice>,

    /// Token accounting, when the provider reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<CompletionUsage>,
}

impl ChatCompletion {
    /// Returns the first choice's text, verbatim.
    pub fn into_text(self) -> Result<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::malformed_response("completion carried no message content"))
    }
}

/// One candidate reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Position of this choice.
    #[serde(default)]
    pub index: u32,

    /// The generated message.
    pub message: ChoiceMessage,

    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// The message inside a [`Choice`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceMessage {
    /// Normally `assistant`.
    #[serde(default)]
    pub role: Option<String>,

    /// The reply text.
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionUsage {
    /// Tokens in the prompt.
    pub prompt_tokens: u64,
    /// Tokens generated.
    pub completion_tokens: u64,
    /// Sum of both.
    pub total_tokens: u64,
}

/// Error body used by OpenAI-compatible providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The error detail.
    pub error: ErrorDetail,
}

/// Detail of an [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable message.
    pub message: String,

    /// Provider error type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// Offending parameter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,

    /// Provider error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    /// Builds an error body with a message and type.
    pub fn new(message: impl Into<String>, error_type: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                message: message.into(),
                error_type: Some(error_type.into()),
                param: None,
                code: None,
            },
        }
    }
}
