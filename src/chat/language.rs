//! Interface language for input hints.
//!
//! Switching language only changes the hint shown above the prompt.  The
//! system prompt is unaffected; the assistant already answers in whatever
//! language the user writes.

use std::fmt;

/// Language of the input hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// English hints.
    #[default]
    English,
    /// Hindi hints.
    Hindi,
}

impl Language {
    /// The other language.
    pub fn toggled(self) -> Self {
        match self {
            Language::English => Language::Hindi,
            Language::Hindi => Language::English,
        }
    }

    /// Hint for the input line; the first one differs from later ones.
    pub fn placeholder(self, conversation_empty: bool) -> &'static str {
        match (self, conversation_empty) {
            (Language::English, true) => "Ask about Indian law, documents, or your rights...",
            (Language::English, false) => "Type your message...",
            (Language::Hindi, true) => "भारतीय कानून, दस्तावेज़ या अपने अधिकारों के बारे में पूछें...",
            (Language::Hindi, false) => "अपना संदेश लिखें...",
        }
    }

    /// Short label shown in status output.
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "EN",
            Language::Hindi => "हि",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Hindi => write!(f, "Hindi"),
        }
    }
}
