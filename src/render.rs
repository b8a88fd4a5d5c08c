//! Output rendering for the chat application.
//!
//! This module provides a trait-based rendering abstraction so the chat loop
//! does not care whether it is talking to a colour terminal, a dumb pipe, or
//! a test buffer.  [`PlainTextRenderer`] redraws typewriter frames
//! incrementally: it writes only what a frame adds, and rewinds to the start
//! of the affected line when re-parsing the longer prefix changed output that
//! was already on screen.

use std::io::{self, Stdout, Write};

use crate::chat::{Notification, Severity};
use crate::markup::Document;
use crate::types::{Message, MessageRole};
use crate::typewriter::{CURSOR_GLYPH, Frame};

/// ANSI escape code for dim text (used for headers and hints).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the assistant label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used for informational notices).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for error notices).
const ANSI_RED: &str = "\x1b[31m";

/// Erases from the cursor to the end of the screen.
const ANSI_CLEAR_BELOW: &str = "\x1b[J";

/// Erases the current line.
const ANSI_CLEAR_LINE: &str = "\x1b[2K";

/// Trait for rendering chat output.
pub trait Renderer: Send {
    /// Print a complete message without animation.
    fn print_message(&mut self, message: &Message);

    /// Called before the first frame of an animated message.
    fn start_reveal(&mut self, message: &Message);

    /// Show the current typewriter frame for `message`.
    fn render_frame(&mut self, message: &Message, frame: Frame<'_>);

    /// Called after the final frame of an animated message.
    fn finish_reveal(&mut self, message: &Message);

    /// Show the waiting indicator while a request is in flight.
    fn print_thinking(&mut self);

    /// Remove the waiting indicator.
    fn clear_thinking(&mut self);

    /// Print a transient notice.
    fn print_notification(&mut self, notification: &Notification);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print the hint shown above the input line.
    fn print_hint(&mut self, hint: &str);
}

/// Renders message content as it should appear once fully shown.
///
/// Assistant content is interpreted as markup; user content is literal.
pub fn render_content(role: MessageRole, text: &str, use_color: bool) -> String {
    match role {
        MessageRole::Assistant => Document::parse(text).render(use_color),
        MessageRole::User => text.to_string(),
    }
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    printed: String,
    cursor_shown: bool,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer on stdout with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer on stdout with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer over an arbitrary writer.
    pub fn with_writer(out: W, use_color: bool) -> Self {
        Self {
            out,
            use_color,
            printed: String::new(),
            cursor_shown: false,
        }
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
        let _ = self.out.flush();
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn header(&self, message: &Message) -> String {
        let (label, style) = match message.role {
            MessageRole::User => ("You", ANSI_DIM),
            MessageRole::Assistant => ("NyaAI", ANSI_CYAN),
        };
        format!(
            "{} {}\n",
            self.styled(style, label),
            self.styled(ANSI_DIM, &message.clock_time())
        )
    }

    /// Computes the bytes that turn the previously printed frame into
    /// `rendered`, followed by the cursor glyph when requested.
    fn frame_update(&mut self, rendered: String, cursor: bool) -> String {
        let mut update = String::new();
        if self.cursor_shown {
            update.push_str("\x08 \x08");
            self.cursor_shown = false;
        }
        match rendered.strip_prefix(self.printed.as_str()) {
            Some(suffix) => update.push_str(suffix),
            None => {
                let common = common_prefix_len(&self.printed, &rendered);
                let line_start = self.printed[..common].rfind('\n').map_or(0, |i| i + 1);
                let rows_up = self.printed[line_start..].matches('\n').count();
                if rows_up > 0 {
                    update.push_str(&format!("\x1b[{rows_up}A"));
                }
                update.push('\r');
                update.push_str(ANSI_CLEAR_BELOW);
                update.push_str(&rendered[line_start..]);
            }
        }
        if cursor {
            update.push(CURSOR_GLYPH);
            self.cursor_shown = true;
        }
        self.printed = rendered;
        update
    }
}

/// Length in bytes of the longest common prefix, on a char boundary.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| a.len().min(b.len()))
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_message(&mut self, message: &Message) {
        let header = self.header(message);
        let body = render_content(message.role, &message.content, self.use_color);
        self.write(&format!("{header}{body}\n\n"));
    }

    fn start_reveal(&mut self, message: &Message) {
        self.printed.clear();
        self.cursor_shown = false;
        let header = self.header(message);
        self.write(&header);
    }

    fn render_frame(&mut self, message: &Message, frame: Frame<'_>) {
        let rendered = render_content(message.role, frame.text, self.use_color);
        let update = self.frame_update(rendered, frame.cursor);
        self.write(&update);
    }

    fn finish_reveal(&mut self, message: &Message) {
        let full = render_content(message.role, &message.content, self.use_color);
        let mut update = self.frame_update(full, false);
        update.push_str("\n\n");
        self.printed.clear();
        self.write(&update);
    }

    fn print_thinking(&mut self) {
        let text = self.styled(ANSI_DIM, "Thinking...");
        self.write(&text);
    }

    fn clear_thinking(&mut self) {
        self.write(&format!("\r{ANSI_CLEAR_LINE}"));
    }

    fn print_notification(&mut self, notification: &Notification) {
        let style = match notification.severity {
            Severity::Info => ANSI_GREEN,
            Severity::Error => ANSI_RED,
        };
        let title = self.styled(style, &format!("[{}]", notification.title));
        self.write(&format!("{title} {}\n", notification.description));
    }

    fn print_info(&mut self, info: &str) {
        self.write(&format!("{info}\n"));
    }

    fn print_error(&mut self, error: &str) {
        let text = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.write(&format!("{text}\n"));
    }

    fn print_hint(&mut self, hint: &str) {
        let text = self.styled(ANSI_DIM, hint);
        self.write(&format!("{text}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MessageId;

    fn renderer() -> PlainTextRenderer<Vec<u8>> {
        PlainTextRenderer::with_writer(Vec::new(), false)
    }

    fn output(renderer: PlainTextRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn renderer_default_has_color() {
        let renderer = PlainTextRenderer::new();
        assert!(renderer.use_color);
    }

    #[test]
    fn user_content_is_literal() {
        assert_eq!(
            render_content(MessageRole::User, "**not bold**\n  - kept", true),
            "**not bold**\n  - kept"
        );
        assert_eq!(
            render_content(MessageRole::Assistant, "**bold**", false),
            "bold"
        );
    }

    #[test]
    fn frames_append_only_new_text() {
        let mut renderer = renderer();
        assert_eq!(renderer.frame_update("He".to_string(), true), "He|");
        assert_eq!(renderer.frame_update("Hel".to_string(), true), "\x08 \x08l|");
        assert_eq!(renderer.frame_update("Hello".to_string(), false), "\x08 \x08lo");
    }

    #[test]
    fn diverging_frame_redraws_its_line() {
        let mut renderer = renderer();
        renderer.frame_update("Intro\n*".to_string(), false);
        let update = renderer.frame_update("Intro\n• x".to_string(), false);
        assert_eq!(update, "\r\x1b[J• x");
    }

    #[test]
    fn divergence_on_earlier_line_moves_up() {
        let mut renderer = renderer();
        renderer.frame_update("Title\n-".to_string(), false);
        let update = renderer.frame_update("Title".to_string(), false);
        assert_eq!(update, "\x1b[1A\r\x1b[JTitle");
    }

    #[test]
    fn common_prefix_respects_char_boundaries() {
        assert_eq!(common_prefix_len("नमस्ते", "नमक"), "नम".len());
        assert_eq!(common_prefix_len("abc", "abc"), 3);
        assert_eq!(common_prefix_len("", "abc"), 0);
    }

    #[test]
    fn reveal_sequence_ends_with_full_text() {
        let message = Message::new(MessageId::new(2), MessageRole::Assistant, "Hi **there**");
        let mut renderer = renderer();
        renderer.start_reveal(&message);
        renderer.render_frame(
            &message,
            Frame {
                text: "Hi **t",
                cursor: true,
            },
        );
        renderer.finish_reveal(&message);
        let out = output(renderer);
        assert!(out.starts_with("NyaAI "));
        assert!(out.ends_with("Hi there\n\n"));
    }

    #[test]
    fn notifications_and_errors() {
        let mut renderer = renderer();
        renderer.print_notification(&Notification::completion_failed());
        renderer.print_error("boom");
        assert_eq!(
            output(renderer),
            "[Error] Failed to get response from NyaAI. Please try again.\nError: boom\n"
        );
    }
}
