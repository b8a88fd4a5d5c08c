// Public modules
pub mod chat_completion;
pub mod message;
pub mod model;

// Re-exports
pub use chat_completion::{
    ChatCompletion, ChatCompletionRequest, ChatMessageParam, Choice, ChoiceMessage,
    CompletionUsage, ErrorDetail, ErrorResponse,
};
pub use message::{Message, MessageId, MessageRole};
pub use model::{KnownModel, Model};
