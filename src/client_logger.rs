//! Logging trait for completion client operations.
//!
//! This module provides the [`ClientLogger`] trait that allows users to capture
//! and log every exchange passing through the [`CompletionClient`].
//!
//! [`CompletionClient`]: crate::CompletionClient

use crate::error::Error;
use crate::types::{ChatCompletion, ChatCompletionRequest};

/// A trait for logging completion client operations.
///
/// # Example
///
/// ```rust,ignore
/// use nyaai::{ChatCompletion, ChatCompletionRequest, ClientLogger};
/// use std::sync::Mutex;
///
/// struct TranscriptLogger {
///     lines: Mutex<Vec<String>>,
/// }
///
/// impl ClientLogger for TranscriptLogger {
///     fn log_request(&self, request: &ChatCompletionRequest) {
///         self.lines.lock().unwrap().push(serde_json::to_string(request).unwrap());
///     }
///
///     fn log_response(&self, completion: &ChatCompletion) {
///         self.lines.lock().unwrap().push(serde_json::to_string(completion).unwrap());
///     }
/// }
/// ```
pub trait ClientLogger: Send + Sync {
    /// Log a request just before it is sent.
    fn log_request(&self, request: &ChatCompletionRequest);

    /// Log a successfully parsed response.
    fn log_response(&self, completion: &ChatCompletion);

    /// Log a failed request.
    fn log_error(&self, error: &Error) {
        _ = error;
    }
}

/// Forwards client activity to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacadeLogger;

impl ClientLogger for LogFacadeLogger {
    fn log_request(&self, request: &ChatCompletionRequest) {
        log::debug!(
            "completion request: model={} messages={} max_tokens={}",
            request.model,
            request.messages.len(),
            request.max_tokens
        );
    }

    fn log_response(&self, completion: &ChatCompletion) {
        match &completion.usage {
            Some(usage) => log::debug!(
                "completion response: choices={} prompt_tokens={} completion_tokens={}",
                completion.choices.len(),
                usage.prompt_tokens,
                usage.completion_tokens
            ),
            None => log::debug!(
                "completion response: choices={}",
                completion.choices.len()
            ),
        }
    }

    fn log_error(&self, error: &Error) {
        log::warn!("completion failed: {error}");
    }
}
