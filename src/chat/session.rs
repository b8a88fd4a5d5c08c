//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! store and turns user input into completion requests.

use std::path::Path;
use std::sync::Arc;

use crate::chat::attachment::{self, AttachmentVerdict};
use crate::chat::config::ChatConfig;
use crate::chat::language::Language;
use crate::chat::notification::Notification;
use crate::chat::store::{ConversationStore, PendingTurn, TurnOutcome};
use crate::client::CompletionClient;
use crate::completer::{Completer, CompletionParams};
use crate::error::Result;
use crate::observability::{SESSION_DISCARDED, SESSION_REJECTED, SESSION_SUBMISSIONS};
use crate::types::{Message, MessageId, Model};

/// Default completer that sources request parameters from `ChatConfig`.
#[derive(Debug, Clone)]
pub struct ConfigCompleter {
    client: CompletionClient,
    params: CompletionParams,
}

impl ConfigCompleter {
    /// Creates a completer sending `config`'s parameters through `client`.
    pub fn new(client: CompletionClient, config: &ChatConfig) -> Self {
        Self {
            client,
            params: config.completion_params(),
        }
    }

    /// The parameters applied to every request.
    pub fn params(&self) -> &CompletionParams {
        &self.params
    }
}

#[async_trait::async_trait]
impl Completer for ConfigCompleter {
    async fn complete(&self, history: &[Message], user_text: &str) -> Result<String> {
        let request = self.params.build_request(history, user_text);
        self.client.send(&request).await?.into_text()
    }
}

/// Why a submission did not produce a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The input was empty after trimming.
    Blank,
    /// Another request is still outstanding.
    InFlight,
}

/// What a submission amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was appended and no request was made.
    Ignored(IgnoreReason),
    /// The reply was appended under this id and is revealing.
    Answered(MessageId),
    /// The request failed; show this notice.
    Failed(Notification),
    /// The conversation was cleared before the reply arrived.
    Discarded,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// The model requests are sent to.
    pub model: Model,
    /// The number of messages in the conversation.
    pub message_count: usize,
    /// Whether a request is outstanding.
    pub in_flight: bool,
    /// How many times the conversation has been cleared.
    pub epoch: u64,
    /// Requests issued over the session's lifetime.
    pub total_requests: u64,
    /// Requests that failed.
    pub failed_requests: u64,
    /// Current interface language.
    pub language: Language,
}

/// A chat session that manages conversation state and completion requests.
pub struct ChatSession<C: Completer = ConfigCompleter> {
    config: ChatConfig,
    completer: Arc<C>,
    store: ConversationStore,
    language: Language,
    total_requests: u64,
    failed_requests: u64,
}

impl ChatSession<ConfigCompleter> {
    /// Creates a new chat session with the given client and configuration.
    pub fn new(client: CompletionClient, config: ChatConfig) -> Self {
        let completer = ConfigCompleter::new(client, &config);
        Self::with_completer(completer, config)
    }
}

impl<C: Completer> ChatSession<C> {
    /// Creates a new chat session with a custom completer.
    pub fn with_completer(completer: C, config: ChatConfig) -> Self {
        Self {
            config,
            completer: Arc::new(completer),
            store: ConversationStore::new(),
            language: Language::default(),
            total_requests: 0,
            failed_requests: 0,
        }
    }

    /// Appends the user message and opens a turn, or says why not.
    pub fn begin_turn(&mut self, input: &str) -> std::result::Result<PendingTurn, IgnoreReason> {
        if input.trim().is_empty() {
            return Err(IgnoreReason::Blank);
        }
        match self.store.append_user(input) {
            Some(turn) => {
                SESSION_SUBMISSIONS.click();
                self.total_requests += 1;
                Ok(turn)
            }
            None => {
                SESSION_REJECTED.click();
                Err(IgnoreReason::InFlight)
            }
        }
    }

    /// The completer turns are sent to.
    pub fn completer(&self) -> Arc<C> {
        Arc::clone(&self.completer)
    }

    /// Resolves a turn with the completer's result.
    pub fn finish_turn(&mut self, turn: PendingTurn, result: Result<String>) -> SubmitOutcome {
        match self.store.finish_turn(turn, result) {
            TurnOutcome::Answered(id) => SubmitOutcome::Answered(id),
            TurnOutcome::Failed(err) => {
                self.failed_requests += 1;
                log::warn!("completion failed: {err}");
                SubmitOutcome::Failed(Notification::completion_failed())
            }
            TurnOutcome::Discarded => {
                SESSION_DISCARDED.click();
                log::debug!("discarding reply to a cleared conversation");
                SubmitOutcome::Discarded
            }
        }
    }

    /// Sends `input` and waits for the reply.
    ///
    /// Blank input and input arriving while a request is outstanding are
    /// ignored without touching the network.
    pub async fn submit(&mut self, input: &str) -> SubmitOutcome {
        let turn = match self.begin_turn(input) {
            Ok(turn) => turn,
            Err(reason) => return SubmitOutcome::Ignored(reason),
        };
        let result = self
            .completer
            .complete(turn.history(), turn.user_text())
            .await;
        self.finish_turn(turn, result)
    }

    /// Clears the conversation history.
    pub fn clear(&mut self) -> Notification {
        self.store.clear();
        Notification::info("Chat cleared", "Your conversation has been cleared.")
    }

    /// Switches between English and Hindi input hints.
    pub fn toggle_language(&mut self) -> Notification {
        self.language = self.language.toggled();
        Notification::info(
            "Language changed",
            format!("Input language set to {}.", self.language),
        )
    }

    /// Screens a file for attachment and returns the notice to show.
    pub fn attach(&self, path: &Path) -> Notification {
        match attachment::screen(path) {
            Ok(verdict) => {
                if let AttachmentVerdict::Accepted { name, mime } = &verdict {
                    log::info!("accepted attachment {name} ({mime})");
                }
                verdict.notification()
            }
            Err(err) => Notification::error("Attachment failed", err.to_string()),
        }
    }

    /// Hint for the input line in the current language.
    pub fn placeholder(&self) -> &'static str {
        self.language.placeholder(self.store.is_empty())
    }

    /// Current interface language.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Clears the reveal marker if its deadline has passed.
    pub fn expire_reveal(&mut self, now: tokio::time::Instant) -> Option<MessageId> {
        self.store.expire_reveal(now)
    }

    /// The conversation state.
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Returns the number of messages in the conversation.
    pub fn message_count(&self) -> usize {
        self.store.len()
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            message_count: self.store.len(),
            in_flight: self.store.is_in_flight(),
            epoch: self.store.epoch(),
            total_requests: self.total_requests,
            failed_requests: self.failed_requests,
            language: self.language,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::Error;
    use crate::types::MessageRole;

    #[derive(Default)]
    struct ScriptedCompleter {
        calls: AtomicUsize,
        seen: Mutex<Vec<(usize, String)>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Completer for ScriptedCompleter {
        async fn complete(&self, history: &[Message], user_text: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .unwrap()
                .push((history.len(), user_text.to_string()));
            if self.fail {
                Err(Error::service_unavailable("upstream down"))
            } else {
                Ok(format!("reply {n}"))
            }
        }
    }

    fn session() -> ChatSession<ScriptedCompleter> {
        ChatSession::with_completer(ScriptedCompleter::default(), ChatConfig::default())
    }

    fn failing_session() -> ChatSession<ScriptedCompleter> {
        let completer = ScriptedCompleter {
            fail: true,
            ..ScriptedCompleter::default()
        };
        ChatSession::with_completer(completer, ChatConfig::default())
    }

    #[tokio::test]
    async fn submit_appends_user_then_reply() {
        let mut session = session();
        let outcome = session.submit("What should I do if my wallet is stolen?").await;
        let SubmitOutcome::Answered(id) = outcome else {
            panic!("expected an answer, got {outcome:?}");
        };
        let messages = session.store().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].id, id);
        assert_eq!(messages[1].content, "reply 0");
        assert!(session.store().is_revealing(id));
        assert!(!session.store().is_in_flight());
    }

    #[tokio::test]
    async fn blank_input_makes_no_request() {
        let mut session = session();
        assert_eq!(
            session.submit("   ").await,
            SubmitOutcome::Ignored(IgnoreReason::Blank)
        );
        assert_eq!(session.completer().calls.load(Ordering::SeqCst), 0);
        assert_eq!(session.message_count(), 0);
    }

    #[tokio::test]
    async fn history_grows_with_each_turn() {
        let mut session = session();
        session.submit("first").await;
        session.submit("second").await;
        let seen = session.completer().seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(0, "first".to_string()), (2, "second".to_string())]);
        assert_eq!(session.message_count(), 4);
    }

    #[tokio::test]
    async fn failure_yields_one_notification() {
        let mut session = failing_session();
        let outcome = session.submit("question").await;
        assert_eq!(
            outcome,
            SubmitOutcome::Failed(Notification::completion_failed())
        );
        assert_eq!(session.message_count(), 1);
        assert!(!session.store().is_in_flight());
        assert_eq!(session.stats().failed_requests, 1);
    }

    #[test]
    fn second_turn_rejected_while_in_flight() {
        let mut session = session();
        let turn = session.begin_turn("first").unwrap();
        assert_eq!(
            session.begin_turn("second").unwrap_err(),
            IgnoreReason::InFlight
        );
        assert_eq!(session.message_count(), 1);
        let outcome = session.finish_turn(turn, Ok("done".to_string()));
        assert!(matches!(outcome, SubmitOutcome::Answered(_)));
    }

    #[test]
    fn clear_mid_flight_discards_reply() {
        let mut session = session();
        let turn = session.begin_turn("question").unwrap();
        let notice = session.clear();
        assert_eq!(notice.title, "Chat cleared");
        assert_eq!(
            session.finish_turn(turn, Ok("late".to_string())),
            SubmitOutcome::Discarded
        );
        assert_eq!(session.message_count(), 0);
        assert!(session.begin_turn("again").is_ok());
    }

    #[test]
    fn language_toggle_changes_placeholder_only() {
        let mut session = session();
        assert_eq!(
            session.placeholder(),
            "Ask about Indian law, documents, or your rights..."
        );
        let notice = session.toggle_language();
        assert!(!notice.is_error());
        assert_eq!(session.language(), Language::Hindi);
        assert_eq!(session.config().system_prompt, ChatConfig::default().system_prompt);
        session.toggle_language();
        assert_eq!(session.language(), Language::English);
    }

    #[test]
    fn attach_missing_file_is_an_error_notice() {
        let session = session();
        let notice = session.attach(Path::new("/no/such/lease.pdf"));
        assert!(notice.is_error());
        assert_eq!(notice.title, "Attachment failed");
    }

    #[tokio::test]
    async fn stats_snapshot() {
        let mut session = session();
        session.submit("hi").await;
        session.clear();
        let stats = session.stats();
        assert_eq!(stats.model, Model::default());
        assert_eq!(stats.message_count, 0);
        assert_eq!(stats.epoch, 1);
        assert_eq!(stats.total_requests, 1);
        assert!(!stats.in_flight);
    }

    #[test]
    fn config_completer_uses_config_params() {
        let client = CompletionClient::new(None).unwrap();
        let config = ChatConfig::default().with_max_tokens(77);
        let completer = ConfigCompleter::new(client, &config);
        assert_eq!(completer.params().max_tokens, 77);
    }
}
