//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which pairs a transcript
//! store with a streaming driver and runs one turn at a time.

use std::sync::Arc;

use crate::chat::config::ChatConfig;
use crate::client::Gemini;
use crate::driver::StreamingSessionDriver;
use crate::error::{Error, Result};
use crate::observability::{
    SESSION_CLEARS, SESSION_REJECTED, SESSION_TURN_FAILURES, SESSION_TURNS,
};
use crate::persona::TURN_FAILED_TEXT;
use crate::service::CompletionService;
use crate::transcript::{SubscriptionId, TranscriptObserver, TranscriptStore};
use crate::types::{Message, MessageId, Model, SessionStatus};

/// How a submitted turn ended.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The stream ended normally; `text` is the final reply.
    Completed {
        /// The reply message.
        reply: MessageId,
        /// The final text of the reply.
        text: String,
        /// How many chunks arrived.
        chunks: usize,
    },
    /// The stream failed; the reply now holds the fixed failure text.
    Failed {
        /// The reply message.
        reply: MessageId,
        /// What went wrong.
        error: Error,
    },
}

impl TurnOutcome {
    /// The id of the reply message the turn wrote to.
    pub fn reply(&self) -> MessageId {
        match self {
            TurnOutcome::Completed { reply, .. } | TurnOutcome::Failed { reply, .. } => *reply,
        }
    }

    /// Returns true if the turn ended normally.
    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed { .. })
    }
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: Model,
    /// The number of messages in the transcript, greeting included.
    pub message_count: usize,
    /// The sampling temperature.
    pub temperature: f32,
    /// The thinking budget.
    pub thinking_budget: Option<u32>,
    /// Turns that ended normally.
    pub turns_completed: u64,
    /// Turns that ended in an error.
    pub turns_failed: u64,
    /// Chunks received across all turns.
    pub chunks_received: u64,
}

/// A chat session that manages the transcript and one in-flight turn.
pub struct ChatSession {
    store: TranscriptStore,
    driver: StreamingSessionDriver,
    config: ChatConfig,
    turns_completed: u64,
    turns_failed: u64,
    chunks_received: u64,
}

impl ChatSession {
    /// Creates a new chat session talking to Gemini.
    pub fn new(client: Gemini, config: ChatConfig) -> Self {
        let client = client.with_model(config.model.clone());
        Self::with_service(Arc::new(client), config)
    }

    /// Creates a new chat session on any completion service.
    pub fn with_service(service: Arc<dyn CompletionService>, config: ChatConfig) -> Self {
        let driver = StreamingSessionDriver::new(service, config.completion_options());
        Self {
            store: TranscriptStore::new(),
            driver,
            config,
            turns_completed: 0,
            turns_failed: 0,
            chunks_received: 0,
        }
    }

    /// Submits user text and streams the reply into the transcript.
    ///
    /// The user message and an empty reply are appended before the request
    /// starts; the reply is rewritten with the cumulative text on every
    /// chunk.  A failed stream is reported as `Ok(TurnOutcome::Failed)` after
    /// the reply has been replaced by the fixed failure text, so the
    /// transcript stays usable either way.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank input and a busy error if a turn
    /// is already in flight.  Neither touches the transcript.
    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome> {
        let text = text.trim();
        if text.is_empty() {
            SESSION_REJECTED.click();
            return Err(Error::validation(
                "message is empty",
                Some("text".to_string()),
            ));
        }
        let status = self.store.status();
        if !status.is_idle() {
            SESSION_REJECTED.click();
            return Err(Error::busy(format!("a reply is still {status}")));
        }

        SESSION_TURNS.click();
        self.store.append(Message::user(text));
        self.store.set_status(SessionStatus::AwaitingFirstToken);
        let snapshot = self.store.snapshot();
        let reply = self.store.append(Message::placeholder());

        let mut turn = PendingTurn::new(&mut self.store, reply);
        let mut chunks = 0usize;
        let result = self
            .driver
            .send(&snapshot, text, |cumulative| {
                chunks += 1;
                turn.stream(cumulative);
            })
            .await;
        self.chunks_received += chunks as u64;

        let outcome = match result {
            Ok(text) => {
                turn.complete();
                self.turns_completed += 1;
                TurnOutcome::Completed {
                    reply,
                    text,
                    chunks,
                }
            }
            Err(error) => {
                SESSION_TURN_FAILURES.click();
                tracing::warn!(error = %error, chunks, "turn failed");
                turn.fail();
                self.turns_failed += 1;
                TurnOutcome::Failed { reply, error }
            }
        };
        drop(turn);
        Ok(outcome)
    }

    /// Clears the conversation back to a fresh greeting.
    pub fn clear(&mut self) -> MessageId {
        SESSION_CLEARS.click();
        tracing::debug!(messages = self.store.len(), "clearing transcript");
        self.store.clear()
    }

    /// The transcript.
    pub fn transcript(&self) -> &TranscriptStore {
        &self.store
    }

    /// The messages in display order.
    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// The current session status.
    pub fn status(&self) -> SessionStatus {
        self.store.status()
    }

    /// Registers an observer for transcript changes.
    pub fn subscribe(&mut self, observer: impl TranscriptObserver + 'static) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    /// Removes an observer.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// The session configuration.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Returns the current model.
    pub fn model(&self) -> &Model {
        &self.config.model
    }

    /// Returns aggregated session stats.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            message_count: self.store.len(),
            temperature: self.config.temperature,
            thinking_budget: self.config.thinking_budget,
            turns_completed: self.turns_completed,
            turns_failed: self.turns_failed,
            chunks_received: self.chunks_received,
        }
    }
}

/// The reply of an in-flight turn.
///
/// Dropping an unsettled turn (the submit future was dropped mid-stream)
/// marks the reply failed, and every drop returns the session to idle.
struct PendingTurn<'a> {
    store: &'a mut TranscriptStore,
    reply: MessageId,
    settled: bool,
}

impl<'a> PendingTurn<'a> {
    fn new(store: &'a mut TranscriptStore, reply: MessageId) -> Self {
        Self {
            store,
            reply,
            settled: false,
        }
    }

    fn stream(&mut self, cumulative: &str) {
        self.store.set_status(SessionStatus::Streaming);
        self.store.update_text(self.reply, cumulative);
    }

    fn complete(&mut self) {
        self.settled = true;
    }

    fn fail(&mut self) {
        self.store.mark_error(self.reply, TURN_FAILED_TEXT);
        self.settled = true;
    }
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.store.mark_error(self.reply, TURN_FAILED_TEXT);
        }
        self.store.set_status(SessionStatus::Idle);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use futures::stream;

    use super::*;
    use crate::accumulator::ChunkConvention;
    use crate::service::{ChunkStream, CompletionOptions, Turn};
    use crate::transcript::TranscriptEvent;
    use crate::types::{KnownModel, Role};

    /// Answers every turn from a queue of scripts.
    struct Scripted {
        scripts: Mutex<Vec<Vec<Result<String>>>>,
        requests: Mutex<Vec<Vec<Turn>>>,
    }

    impl Scripted {
        fn new(scripts: Vec<Vec<Result<String>>>) -> Arc<Self> {
            Arc::new(Self {
                scripts: Mutex::new(scripts.into_iter().rev().collect()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl CompletionService for Scripted {
        async fn start_stream(
            &self,
            prior_history: &[Turn],
            _: &str,
            _: &CompletionOptions,
        ) -> Result<ChunkStream> {
            self.requests.lock().unwrap().push(prior_history.to_vec());
            let script = self.scripts.lock().unwrap().pop().unwrap_or_default();
            Ok(Box::pin(stream::iter(script)))
        }

        fn chunk_convention(&self) -> ChunkConvention {
            ChunkConvention::Cumulative
        }
    }

    fn ok(text: &str) -> Result<String> {
        Ok(text.to_string())
    }

    #[test]
    fn new_session_has_greeting() {
        let session = ChatSession::with_service(Scripted::new(vec![]), ChatConfig::default());
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role(), Role::Model);
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(
            session.model(),
            &Model::Known(KnownModel::GeminiFlashLiteLatest)
        );
    }

    #[tokio::test]
    async fn completed_turn() {
        let service = Scripted::new(vec![vec![ok("2"), ok("2+2=22")]]);
        let mut session = ChatSession::with_service(service, ChatConfig::default());

        let outcome = session.submit("  What is 2+2?  ").await.unwrap();
        assert!(outcome.is_completed());
        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text, "What is 2+2?");
        assert_eq!(messages[2].id(), outcome.reply());
        assert_eq!(messages[2].text, "2+2=22");
        assert!(!messages[2].is_error);
        assert_eq!(session.status(), SessionStatus::Idle);

        let stats = session.stats();
        assert_eq!(stats.turns_completed, 1);
        assert_eq!(stats.turns_failed, 0);
        assert_eq!(stats.chunks_received, 2);
        assert_eq!(stats.message_count, 3);
    }

    #[tokio::test]
    async fn failed_turn_keeps_partial_history_consistent() {
        let service = Scripted::new(vec![vec![
            ok("Gravity is"),
            Err(Error::streaming("reset", None)),
        ]]);
        let mut session = ChatSession::with_service(service, ChatConfig::default());

        let outcome = session.submit("explain gravity").await.unwrap();
        match outcome {
            TurnOutcome::Failed { error, .. } => assert!(error.is_streaming()),
            other => panic!("expected failure, got {other:?}"),
        }
        let reply = &session.messages()[2];
        assert_eq!(reply.text, TURN_FAILED_TEXT);
        assert!(reply.is_error);
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.stats().turns_failed, 1);
    }

    #[tokio::test]
    async fn blank_input_is_rejected() {
        let service = Scripted::new(vec![]);
        let mut session = ChatSession::with_service(service.clone(), ChatConfig::default());

        let err = session.submit("   \n").await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.messages().len(), 1);
        assert!(service.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn busy_session_rejects_submit() {
        let service = Scripted::new(vec![]);
        let mut session = ChatSession::with_service(service.clone(), ChatConfig::default());
        session.store.set_status(SessionStatus::Streaming);

        let err = session.submit("hello").await.unwrap_err();
        assert!(err.is_busy());
        assert_eq!(session.messages().len(), 1);
        assert!(service.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_transitions_in_order() {
        let service = Scripted::new(vec![vec![ok("a"), ok("ab")]]);
        let mut session = ChatSession::with_service(service, ChatConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        session.subscribe(move |event: &TranscriptEvent| {
            if let TranscriptEvent::StatusChanged { to, .. } = event {
                sink.lock().unwrap().push(*to);
            }
        });

        session.submit("hi").await.unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                SessionStatus::AwaitingFirstToken,
                SessionStatus::Streaming,
                SessionStatus::Idle,
            ]
        );
    }

    #[tokio::test]
    async fn clear_resets_to_greeting() {
        let service = Scripted::new(vec![vec![ok("wrong")]]);
        let mut session = ChatSession::with_service(service, ChatConfig::default());
        session.submit("hi").await.unwrap();
        assert_eq!(session.messages().len(), 3);

        let greeting = session.clear();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].id(), greeting);
        assert_eq!(session.status(), SessionStatus::Idle);
    }

    #[test]
    fn dropped_turn_is_marked_failed() {
        let mut store = TranscriptStore::new();
        store.append(Message::user("hi"));
        store.set_status(SessionStatus::AwaitingFirstToken);
        let reply = store.append(Message::placeholder());
        {
            let mut turn = PendingTurn::new(&mut store, reply);
            turn.stream("half an ans");
        }
        let message = store.get(reply).unwrap();
        assert!(message.is_error);
        assert_eq!(message.text, TURN_FAILED_TEXT);
        assert_eq!(store.status(), SessionStatus::Idle);
    }
}
