// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod completer;
pub mod context_window;
pub mod error;
pub mod markup;
pub mod proxy;
pub mod render;
pub mod types;
pub mod typewriter;

mod observability;

// Re-exports
pub use client::CompletionClient;
pub use client_logger::{ClientLogger, LogFacadeLogger};
pub use completer::{Completer, CompletionParams};
pub use context_window::ContextWindow;
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use types::*;
pub use typewriter::{Frame, RevealPhase, RevealTick, RevealTicket, Typewriter};
