//! Line input that keeps blocking terminal reads off the async runtime.
//!
//! A dedicated thread owns the line editor.  The REPL asks for one line at a
//! time, so the prompt never appears while a reply is still being printed.

use std::sync::mpsc as std_mpsc;
use std::thread;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::oneshot;

/// One result of reading a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line of text, without its newline.
    Line(String),
    /// Ctrl+C at the prompt.
    Interrupted,
    /// Ctrl+D or end of input.
    Eof,
    /// The terminal could not be read.
    Failed(String),
}

/// Something that reads a line after showing a prompt.
pub trait LineSource {
    /// Blocks until a line is read.
    fn read_line(&mut self, prompt: &str) -> Input;
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Input {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.add_history_entry(line.trim());
                }
                Input::Line(line)
            }
            Err(ReadlineError::Interrupted) => Input::Interrupted,
            Err(ReadlineError::Eof) => Input::Eof,
            Err(err) => Input::Failed(err.to_string()),
        }
    }
}

struct Request {
    prompt: String,
    reply: oneshot::Sender<Input>,
}

/// Handle to the reader thread.
///
/// Dropping it lets the thread exit after its current read.
pub struct LineReader {
    requests: std_mpsc::Sender<Request>,
}

impl LineReader {
    /// Starts a reader thread over a rustyline editor.
    pub fn terminal() -> Self {
        Self::spawn(|| DefaultEditor::new().map_err(|err| err.to_string()))
    }

    /// Starts a reader thread over the source `make` builds on that thread.
    ///
    /// If `make` fails every read answers [`Input::Failed`].
    pub fn spawn<S, F>(make: F) -> Self
    where
        S: LineSource,
        F: FnOnce() -> Result<S, String> + Send + 'static,
    {
        let (requests, incoming) = std_mpsc::channel::<Request>();
        thread::spawn(move || {
            let mut source = make();
            for request in incoming {
                let input = match &mut source {
                    Ok(source) => source.read_line(&request.prompt),
                    Err(err) => Input::Failed(err.clone()),
                };
                let _ = request.reply.send(input);
            }
        });
        Self { requests }
    }

    /// Shows `prompt` and waits for the next line without blocking the
    /// runtime.
    pub async fn read_line(&self, prompt: &str) -> Input {
        let (reply, answer) = oneshot::channel();
        let request = Request {
            prompt: prompt.to_string(),
            reply,
        };
        if self.requests.send(request).is_err() {
            return Input::Failed("input thread stopped".to_string());
        }
        answer
            .await
            .unwrap_or_else(|_| Input::Failed("input thread stopped".to_string()))
    }
}
