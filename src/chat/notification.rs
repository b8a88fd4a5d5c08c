//! Transient user-facing notices.

use std::fmt;

/// How a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Confirmation of an action.
    Info,
    /// Something the user asked for did not happen.
    Error,
}

/// A short notice shown once and then forgotten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Headline.
    pub title: String,
    /// One sentence of detail.
    pub description: String,
    /// Presentation.
    pub severity: Severity,
}

impl Notification {
    /// Creates an informational notification.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    /// Creates an error notification.
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Error,
        }
    }

    /// The notice shown for any failed completion.
    pub fn completion_failed() -> Self {
        Self::error(
            "Error",
            "Failed to get response from NyaAI. Please try again.",
        )
    }

    /// Returns true for error notifications.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}
