//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use arrrg_derive::CommandLine;

use crate::client::DEFAULT_BASE_URL;
use crate::completer::CompletionParams;
use crate::context_window::ContextWindow;
use crate::error::{Error, Result};
use crate::types::Model;

/// Default maximum tokens per response.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Instruction sent ahead of every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a knowledgeable legal assistant specializing in Indian laws. You help users understand legal situations and provide practical guidance in a conversational manner.

Your guidelines:
1. Identify the legal issue clearly
2. Provide step-by-step practical advice in simple language (avoid complex legal jargon)
3. For serious or complex matters, always recommend: \"You should consult a qualified lawyer for detailed advice\"
4. Keep responses helpful, concise, and friendly
5. Support both English and Hindi queries - respond in the same language the user uses
6. Remember the conversation context and refer back to previous questions when relevant
7. If asked about laws outside India, politely redirect to Indian legal context
8. Always clarify that this is general guidance, not formal legal advice

Maintain a helpful, professional, and conversational tone throughout the chat.";

/// Command-line arguments for the nyaai-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the completion endpoint.
    #[arrrg(optional, "Completion endpoint (default: http://127.0.0.1:8787/v1/)", "URL")]
    pub base_url: Option<String>,

    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: llama-3.3-70b-versatile)", "MODEL")]
    pub model: Option<String>,

    /// Maximum tokens per response.
    #[arrrg(optional, "Max tokens per response (default: 1024)", "TOKENS")]
    pub max_tokens: Option<u32>,

    /// Sampling temperature, parsed as a float.
    #[arrrg(optional, "Sampling temperature 0.0-2.0 (default: 0.7)", "T")]
    pub temperature: Option<String>,

    /// History messages sent with each request.
    #[arrrg(optional, "History messages per request, or 'all' (default: all)", "N")]
    pub context_messages: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Base URL of the completion endpoint.
    pub base_url: String,

    /// The model to use for generating responses.
    pub model: Model,

    /// Instruction placed before the conversation.
    pub system_prompt: String,

    /// Maximum tokens per response.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// How much history accompanies each request.
    pub context_window: ContextWindow,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Endpoint: the local proxy
    /// - Model: llama-3.3-70b-versatile
    /// - Max tokens: 1024
    /// - Temperature: 0.7
    /// - Context: the whole conversation
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: Model::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            context_window: ContextWindow::Unbounded,
            use_color: true,
        }
    }

    /// Sets the endpoint base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the maximum tokens per response.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the context window policy.
    pub fn with_context_window(mut self, context_window: ContextWindow) -> Self {
        self.context_window = context_window;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// The per-request parameters derived from this configuration.
    pub fn completion_params(&self) -> CompletionParams {
        CompletionParams {
            model: self.model.clone(),
            system_prompt: self.system_prompt.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            context_window: self.context_window,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_temperature(value: &str) -> Result<f32> {
    let invalid = || {
        Error::validation(
            format!("temperature expects a value between 0.0 and 2.0, got {value:?}"),
            Some("temperature".to_string()),
        )
    };
    let parsed: f32 = value.trim().parse().map_err(|_| invalid())?;
    if parsed.is_finite() && (0.0..=2.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(invalid())
    }
}

impl TryFrom<ChatArgs> for ChatConfig {
    type Error = Error;

    fn try_from(args: ChatArgs) -> Result<Self> {
        let mut config = ChatConfig::new();
        if let Some(base_url) = args.base_url {
            crate::client::parse_base_url(&base_url)?;
            config.base_url = base_url;
        }
        if let Some(model) = args.model {
            config.model = Model::from(model.as_str());
        }
        if let Some(max_tokens) = args.max_tokens {
            if max_tokens == 0 {
                return Err(Error::validation(
                    "max-tokens must be positive",
                    Some("max-tokens".to_string()),
                ));
            }
            config.max_tokens = max_tokens;
        }
        if let Some(temperature) = args.temperature {
            config.temperature = parse_temperature(&temperature)?;
        }
        if let Some(window) = args.context_messages {
            config.context_window = window.parse()?;
        }
        config.use_color = !args.no_color;
        Ok(config)
    }
}
