//! Plays a message through the typewriter onto a renderer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::chat::session::ChatSession;
use crate::completer::Completer;
use crate::render::Renderer;
use crate::types::MessageId;
use crate::typewriter::Typewriter;

/// How often the skip flag is checked while a reveal runs.
const SKIP_POLL: Duration = Duration::from_millis(50);

/// Shared flag that cuts a running reveal short.
///
/// Raised from a signal handler; [`play`] lowers it when it acts on it.
#[derive(Debug, Clone, Default)]
pub struct SkipSwitch(Arc<AtomicBool>);

impl SkipSwitch {
    /// Creates a lowered switch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the current reveal finish at once.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Lowers the switch so only a later [`raise`](Self::raise) counts.
    ///
    /// Call it right before [`play`]; a raise that happened while waiting
    /// for the reply must not skip that reply.
    pub fn arm(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Returns true if the switch is raised.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Shows message `id`, animated if the store marks it as revealing.
///
/// The reveal ends when the last character is shown, when the store's reveal
/// marker expires, or when `skip` is raised (it is lowered again here).
pub async fn play<C, R>(
    session: &mut ChatSession<C>,
    typewriter: &mut Typewriter,
    renderer: &mut R,
    id: MessageId,
    skip: &SkipSwitch,
) where
    C: Completer,
    R: Renderer + ?Sized,
{
    let Some(message) = session.store().get(id).cloned() else {
        return;
    };
    let revealing = session.store().is_revealing(id);
    renderer.start_reveal(&message);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let driver = typewriter
        .retarget(id, &message.content, revealing)
        .map(|ticket| ticket.spawn(tx));

    let deadline = session.store().reveal_deadline().unwrap_or_else(Instant::now);
    let expiry = tokio::time::sleep_until(deadline);
    tokio::pin!(expiry);
    let mut poll = tokio::time::interval(SKIP_POLL);

    while typewriter.is_revealing() {
        tokio::select! {
            Some(tick) = rx.recv() => {
                if typewriter.on_tick(tick) {
                    renderer.render_frame(&message, typewriter.frame());
                }
            }
            _ = &mut expiry => {
                session.expire_reveal(Instant::now());
                let _ = typewriter.retarget(id, &message.content, false);
            }
            _ = poll.tick() => {
                if skip.take() {
                    typewriter.finish();
                }
            }
        }
    }
    renderer.finish_reveal(&message);

    if let Some(driver) = driver
        && let Err(err) = driver.await
    {
        log::warn!("typewriter driver failed: {err}");
    }
}
