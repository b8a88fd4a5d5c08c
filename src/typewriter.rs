//! Character-by-character replay of an already complete message.
//!
//! A [`Typewriter`] is a small state machine (`Idle`, `Revealing`, `Done`)
//! over one displayed message.  Revealing is driven by a [`RevealTicket`]
//! that ticks every [`REVEAL_CHAR_INTERVAL`] until cancelled.  Retargeting the
//! typewriter cancels the previous ticket and bumps a generation counter, so
//! a tick that was already queued for the old message is ignored.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::chat::REVEAL_CHAR_INTERVAL;
use crate::observability::{TYPEWRITER_CANCELLED, TYPEWRITER_REVEALS};
use crate::types::MessageId;

/// Glyph appended to the visible text while a reveal is running.
pub const CURSOR_GLYPH: char = '|';

/// Where a typewriter is in its reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    /// Nothing targeted.
    Idle,
    /// `shown` characters are visible.
    Revealing {
        /// Characters revealed so far.
        shown: usize,
    },
    /// The full text is visible.
    Done,
}

/// One step of a reveal, tagged with the generation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTick {
    generation: u64,
}

/// What should be on screen for the targeted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Visible prefix of the message.
    pub text: &'a str,
    /// Whether the cursor glyph follows the text.
    pub cursor: bool,
}

impl Frame<'_> {
    /// Visible text with the cursor glyph appended when shown.
    pub fn to_display_string(&self) -> String {
        let mut out = self.text.to_string();
        if self.cursor {
            out.push(CURSOR_GLYPH);
        }
        out
    }
}

/// Handle for the timer that drives one reveal.
#[derive(Debug)]
#[must_use = "a reveal only advances while its ticket is driven"]
pub struct RevealTicket {
    generation: u64,
    token: CancellationToken,
    interval: Duration,
}

impl RevealTicket {
    /// The generation this ticket ticks for.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sends a tick every interval until cancelled or the receiver is gone.
    ///
    /// The first tick arrives one interval after the call.
    pub async fn drive(self, ticks: mpsc::UnboundedSender<RevealTick>) {
        let mut interval =
            tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let tick = RevealTick {
            generation: self.generation,
        };
        loop {
            tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                _ = interval.tick() => {
                    if ticks.send(tick).is_err() {
                        break;
                    }
                }
            }
        }
    }

    /// Runs [`drive`](Self::drive) on the current runtime.
    pub fn spawn(self, ticks: mpsc::UnboundedSender<RevealTick>) -> JoinHandle<()> {
        tokio::spawn(self.drive(ticks))
    }
}

/// Reveal state machine for one displayed message.
#[derive(Debug)]
pub struct Typewriter {
    target: Option<(MessageId, bool)>,
    text: String,
    shown_bytes: usize,
    phase: RevealPhase,
    generation: u64,
    token: Option<CancellationToken>,
    interval: Duration,
}

impl Typewriter {
    /// Creates an idle typewriter ticking every [`REVEAL_CHAR_INTERVAL`].
    pub fn new() -> Self {
        Self::with_interval(REVEAL_CHAR_INTERVAL)
    }

    /// Creates an idle typewriter with a custom per-character interval.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            target: None,
            text: String::new(),
            shown_bytes: 0,
            phase: RevealPhase::Idle,
            generation: 0,
            token: None,
            interval,
        }
    }

    /// Points the typewriter at a message.
    ///
    /// Nothing happens if both the id and the revealing flag are unchanged.
    /// Otherwise any running reveal is cancelled.  A revealing target starts
    /// from empty and returns the ticket that drives it; anything else is
    /// shown in full at once.
    pub fn retarget(&mut self, id: MessageId, text: &str, revealing: bool) -> Option<RevealTicket> {
        if self.target == Some((id, revealing)) {
            return None;
        }
        self.cancel();
        self.generation += 1;
        self.target = Some((id, revealing));
        self.text.clear();
        self.text.push_str(text);
        if revealing {
            TYPEWRITER_REVEALS.click();
            self.shown_bytes = 0;
            self.phase = RevealPhase::Revealing { shown: 0 };
            let token = CancellationToken::new();
            self.token = Some(token.clone());
            Some(RevealTicket {
                generation: self.generation,
                token,
                interval: self.interval,
            })
        } else {
            self.shown_bytes = self.text.len();
            self.phase = RevealPhase::Done;
            None
        }
    }

    /// Applies a tick; returns true if the frame changed.
    ///
    /// Ticks from an earlier generation are ignored.
    pub fn on_tick(&mut self, tick: RevealTick) -> bool {
        if tick.generation != self.generation {
            return false;
        }
        let RevealPhase::Revealing { shown } = self.phase else {
            return false;
        };
        match self.text[self.shown_bytes..].chars().next() {
            Some(c) => {
                self.shown_bytes += c.len_utf8();
                self.phase = RevealPhase::Revealing { shown: shown + 1 };
                if self.shown_bytes == self.text.len() {
                    self.complete();
                }
            }
            None => self.complete(),
        }
        true
    }

    /// Skips to the end of a running reveal; returns true if one was running.
    pub fn finish(&mut self) -> bool {
        if matches!(self.phase, RevealPhase::Revealing { .. }) {
            self.shown_bytes = self.text.len();
            self.complete();
            true
        } else {
            false
        }
    }

    /// Forgets the target and stops any running reveal.
    pub fn reset(&mut self) {
        self.cancel();
        self.generation += 1;
        self.target = None;
        self.text.clear();
        self.shown_bytes = 0;
        self.phase = RevealPhase::Idle;
    }

    /// What should currently be displayed.
    pub fn frame(&self) -> Frame<'_> {
        match self.phase {
            RevealPhase::Idle => Frame {
                text: "",
                cursor: false,
            },
            RevealPhase::Revealing { .. } => Frame {
                text: &self.text[..self.shown_bytes],
                cursor: true,
            },
            RevealPhase::Done => Frame {
                text: &self.text,
                cursor: false,
            },
        }
    }

    /// Current phase.
    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    /// The targeted message, if any.
    pub fn target(&self) -> Option<MessageId> {
        self.target.map(|(id, _)| id)
    }

    /// Returns true while characters are still being revealed.
    pub fn is_revealing(&self) -> bool {
        matches!(self.phase, RevealPhase::Revealing { .. })
    }

    fn complete(&mut self) {
        self.phase = RevealPhase::Done;
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    fn cancel(&mut self) {
        if let Some(token) = self.token.take() {
            if matches!(self.phase, RevealPhase::Revealing { .. }) {
                TYPEWRITER_CANCELLED.click();
            }
            token.cancel();
        }
    }
}

impl Default for Typewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.cancel();
    }
}
