//! Conversation exchange use case.
//!
//! Orchestrates exactly one request/response cycle against the completion
//! gateway: prompt assembly, delta accumulation, an inactivity watchdog, and
//! persistence of the finished question/answer pair. Starting a new cycle
//! supersedes any cycle still in flight.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use confab_domain::{Dialogue, Message, Role, StreamEvent, assemble_prompt, effective_context};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ports::chat_store::{ChatStore, StoreError};
use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest, GatewayError};
use crate::ports::settings::SettingsProvider;

/// Poll interval of the inactivity watchdog.
const WATCHDOG_INTERVAL: Duration = Duration::from_millis(100);

/// Errors that can occur during an exchange cycle
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("No activity within the configured timeout")]
    Timeout,

    #[error("Exchange canceled")]
    Canceled,
}

impl ExchangeError {
    /// Check if this error represents a cancellation (explicit or
    /// superseded). Cancellations are a silent rollback path, not a
    /// user-presentable failure.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ExchangeError::Canceled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ExchangeError::Timeout)
    }
}

/// The slot holding the currently active cycle.
///
/// Each new cycle bumps the generation and replaces the token. A cycle
/// whose generation is no longer current at completion time discards its
/// result instead of persisting, so a superseded cycle's late writes can
/// never interleave with the new cycle's.
struct ExchangeSlot {
    generation: u64,
    token: CancellationToken,
}

/// Coordinates exchange cycles against the completion gateway.
///
/// Holds one active-cycle slot: a new [`send`](Self::send) anywhere cancels
/// the previous call everywhere (per coordinator instance, not per session).
/// Intended for one logical caller issuing calls serially or with the
/// supersede-previous semantics; it is not a work queue.
pub struct ExchangeCoordinator {
    gateway: Arc<dyn CompletionGateway>,
    store: Arc<dyn ChatStore>,
    settings: Arc<dyn SettingsProvider>,
    slot: Mutex<ExchangeSlot>,
}

impl ExchangeCoordinator {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        store: Arc<dyn ChatStore>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            gateway,
            store,
            settings,
            slot: Mutex::new(ExchangeSlot {
                generation: 0,
                token: CancellationToken::new(),
            }),
        }
    }

    /// Cancel the in-flight cycle, if any. Idempotent; a no-op when idle.
    pub fn cancel(&self) {
        self.lock_slot().token.cancel();
    }

    /// Run one exchange cycle.
    ///
    /// `text` must be non-empty after trimming; that validation is a caller
    /// precondition. `on_delta` receives the cumulative answer text after
    /// each delta, never with leading whitespace.
    ///
    /// On success the question and answer are persisted and returned as a
    /// [`Dialogue`]. On [`ExchangeError::Canceled`] or
    /// [`ExchangeError::Timeout`] nothing is persisted; the caller discards
    /// any partial display state.
    pub async fn send<F>(
        &self,
        session_id: Uuid,
        text: &str,
        mut on_delta: F,
    ) -> Result<Dialogue, ExchangeError>
    where
        F: FnMut(&str) + Send,
    {
        let (generation, token) = self.begin_cycle();
        let settings = self.settings.snapshot();

        let session = self.store.session(session_id)?;
        let with_context = effective_context(session.as_ref(), settings.enable_context);
        let history = if with_context {
            self.store.messages_for_session(session_id)?
        } else {
            Vec::new()
        };

        let prompt = assemble_prompt(&settings.system_messages, session.as_ref(), &history, text);
        debug!(
            generation,
            messages = prompt.len(),
            model = %settings.model,
            "starting exchange cycle"
        );

        // The question half of the dialogue carries the time the user asked,
        // not the time the answer finished.
        let question = Message::new(session_id, Role::User, text);

        let request = CompletionRequest {
            messages: prompt,
            model: settings.model.clone(),
            temperature: settings.temperature,
        };
        // Watchdog: covers the whole cycle, transport opening included.
        // Polls until the stream loop finishes, trips when the cycle goes
        // quiet for longer than the configured timeout. With zero deltas
        // the baseline is cycle start.
        let last_activity = Arc::new(Mutex::new(Instant::now()));
        let stream_done = CancellationToken::new();
        let watchdog = tokio::spawn({
            let cycle_token = token.clone();
            let stream_done = stream_done.clone();
            let last_activity = Arc::clone(&last_activity);
            let timeout = settings.timeout;
            async move {
                loop {
                    tokio::select! {
                        _ = stream_done.cancelled() => return false,
                        _ = tokio::time::sleep(WATCHDOG_INTERVAL) => {}
                    }
                    let idle = last_activity
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .elapsed();
                    if idle > timeout {
                        warn!(idle_ms = idle.as_millis() as u64, "exchange watchdog tripped");
                        cycle_token.cancel();
                        return true;
                    }
                }
            }
        });

        let mut buffer = String::new();
        let mut failure: Option<ExchangeError> = None;

        // Opening the request races the same token, so a cancel (or a
        // watchdog trip) during connection setup drops the request instead
        // of waiting on headers that may never come.
        let handle = tokio::select! {
            result = self.gateway.stream_completion(request, token.clone()) => match result {
                Ok(handle) => Some(handle),
                Err(e) => {
                    failure = Some(e.into());
                    None
                }
            },
            _ = token.cancelled() => None,
        };

        if let Some(mut handle) = handle {
            loop {
                let event = tokio::select! {
                    event = handle.receiver.recv() => event,
                    _ = token.cancelled() => None,
                };
                let Some(event) = event else { break };

                match event {
                    StreamEvent::Delta(chunk) => {
                        *last_activity
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner) = Instant::now();

                        buffer.push_str(&chunk);
                        // Normalize the leading blank tokens some models emit.
                        let stripped = buffer.len() - buffer.trim_start().len();
                        if stripped > 0 {
                            buffer.drain(..stripped);
                        }
                        if !buffer.is_empty() {
                            on_delta(&buffer);
                        }
                    }
                    StreamEvent::Done => break,
                    StreamEvent::Error(message) => {
                        failure = Some(GatewayError::RequestFailed(message).into());
                        break;
                    }
                }
            }
        }

        // Wait for the watchdog as well before resolving the cycle. A trip
        // wins over any transport error its own cancel provoked.
        stream_done.cancel();
        let timed_out = watchdog.await.unwrap_or(false);

        if timed_out {
            return Err(ExchangeError::Timeout);
        }
        if let Some(error) = failure {
            return Err(error);
        }
        if token.is_cancelled() {
            return Err(ExchangeError::Canceled);
        }

        // Persist only while this cycle is still current; a superseded
        // cycle's late result is discarded rather than racing the new
        // cycle's writes.
        if !self.is_current(generation) {
            return Err(ExchangeError::Canceled);
        }

        let answer = Message::new(session_id, Role::Assistant, buffer);
        self.store.save_message(&question)?;
        self.store.save_message(&answer)?;
        info!(generation, %session_id, "exchange cycle completed");

        Ok(Dialogue::new(question, answer))
    }

    /// Install a new cycle: cancel the previous token, bump the generation.
    fn begin_cycle(&self) -> (u64, CancellationToken) {
        let mut slot = self.lock_slot();
        slot.token.cancel();
        slot.generation += 1;
        slot.token = CancellationToken::new();
        (slot.generation, slot.token.clone())
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock_slot().generation == generation
    }

    // Slot state stays consistent even if a holder panicked, so recover
    // from poisoning instead of propagating it.
    fn lock_slot(&self) -> MutexGuard<'_, ExchangeSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::completion_gateway::StreamHandle;
    use crate::ports::settings::Settings;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use confab_domain::Session;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex as StdMutex;
    use tokio::sync::mpsc;

    type Script = Vec<(u64, StreamEvent)>;

    /// Gateway that replays scripted events with per-event delays. Each
    /// call to `stream_completion` consumes the next script in sequence.
    struct ScriptedGateway {
        scripts: StdMutex<VecDeque<Script>>,
        captured: StdMutex<Vec<CompletionRequest>>,
    }

    impl ScriptedGateway {
        fn single(script: Script) -> Self {
            Self::sequence(vec![script])
        }

        fn sequence(scripts: Vec<Script>) -> Self {
            Self {
                scripts: StdMutex::new(scripts.into()),
                captured: StdMutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<CompletionRequest> {
            self.captured.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionGateway for ScriptedGateway {
        async fn stream_completion(
            &self,
            request: CompletionRequest,
            cancel: CancellationToken,
        ) -> Result<StreamHandle, GatewayError> {
            self.captured.lock().unwrap().push(request);
            let script = self
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default();

            let (tx, rx) = mpsc::channel(16);
            tokio::spawn(async move {
                for (delay_ms, event) in script {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                    }
                    if tx.send(event).await.is_err() {
                        return;
                    }
                }
            });
            Ok(StreamHandle::new(rx))
        }
    }

    /// Gateway whose connection setup never completes.
    struct HangingGateway;

    #[async_trait]
    impl CompletionGateway for HangingGateway {
        async fn stream_completion(
            &self,
            _request: CompletionRequest,
            _cancel: CancellationToken,
        ) -> Result<StreamHandle, GatewayError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            let (_tx, rx) = mpsc::channel(1);
            Ok(StreamHandle::new(rx))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        sessions: StdMutex<HashMap<Uuid, Session>>,
        messages: StdMutex<Vec<Message>>,
    }

    impl MemoryStore {
        fn with_session(session: Session) -> Self {
            let store = Self::default();
            store
                .sessions
                .lock()
                .unwrap()
                .insert(session.id(), session);
            store
        }

        fn stored_messages(&self) -> Vec<Message> {
            let mut messages = self.messages.lock().unwrap().clone();
            messages.sort_by_key(|m| m.timestamp());
            messages
        }
    }

    impl ChatStore for MemoryStore {
        fn session(&self, id: Uuid) -> Result<Option<Session>, StoreError> {
            Ok(self.sessions.lock().unwrap().get(&id).cloned())
        }

        fn all_sessions(&self) -> Result<Vec<Session>, StoreError> {
            Ok(self.sessions.lock().unwrap().values().cloned().collect())
        }

        fn save_session(&self, session: &Session) -> Result<(), StoreError> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id(), session.clone());
            Ok(())
        }

        fn delete_session(&self, id: Uuid) -> Result<bool, StoreError> {
            self.messages
                .lock()
                .unwrap()
                .retain(|m| m.session_id() != id);
            Ok(self.sessions.lock().unwrap().remove(&id).is_some())
        }

        fn save_message(&self, message: &Message) -> Result<(), StoreError> {
            let mut messages = self.messages.lock().unwrap();
            if let Some(existing) = messages.iter_mut().find(|m| m.id() == message.id()) {
                *existing = message.clone();
            } else {
                messages.push(message.clone());
            }
            Ok(())
        }

        fn delete_message(&self, id: Uuid) -> Result<bool, StoreError> {
            let mut messages = self.messages.lock().unwrap();
            let before = messages.len();
            messages.retain(|m| m.id() != id);
            Ok(messages.len() < before)
        }

        fn messages_for_session(&self, session_id: Uuid) -> Result<Vec<Message>, StoreError> {
            let mut messages: Vec<Message> = self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.session_id() == session_id)
                .cloned()
                .collect();
            messages.sort_by_key(|m| m.timestamp());
            Ok(messages)
        }

        fn last_messages(
            &self,
            session_id: Uuid,
            limit: usize,
        ) -> Result<Vec<Message>, StoreError> {
            let mut messages = self.messages_for_session(session_id)?;
            let skip = messages.len().saturating_sub(limit);
            Ok(messages.split_off(skip))
        }

        fn last_messages_before(
            &self,
            session_id: Uuid,
            limit: usize,
            before: DateTime<Utc>,
        ) -> Result<Vec<Message>, StoreError> {
            let mut messages = self.messages_for_session(session_id)?;
            messages.retain(|m| m.timestamp() < before);
            messages.reverse();
            messages.truncate(limit);
            Ok(messages)
        }

        fn delete_messages_before(
            &self,
            session_id: Uuid,
            before: DateTime<Utc>,
        ) -> Result<usize, StoreError> {
            let mut messages = self.messages.lock().unwrap();
            let len = messages.len();
            messages.retain(|m| m.session_id() != session_id || m.timestamp() >= before);
            Ok(len - messages.len())
        }

        fn delete_messages_after(
            &self,
            session_id: Uuid,
            after: DateTime<Utc>,
        ) -> Result<usize, StoreError> {
            let mut messages = self.messages.lock().unwrap();
            let len = messages.len();
            messages.retain(|m| m.session_id() != session_id || m.timestamp() <= after);
            Ok(len - messages.len())
        }

        fn clear_session_messages(&self, session_id: Uuid) -> Result<bool, StoreError> {
            let mut messages = self.messages.lock().unwrap();
            let len = messages.len();
            messages.retain(|m| m.session_id() != session_id);
            Ok(messages.len() < len)
        }
    }

    struct StaticSettings(Settings);

    impl SettingsProvider for StaticSettings {
        fn snapshot(&self) -> Settings {
            self.0.clone()
        }
    }

    fn settings(timeout_ms: u64) -> Settings {
        Settings {
            api_host: "api.test.invalid".to_string(),
            api_key: "sk-test".to_string(),
            organization: String::new(),
            model: "test-model".to_string(),
            temperature: 0.5,
            timeout: Duration::from_millis(timeout_ms),
            system_messages: Vec::new(),
            enable_context: true,
        }
    }

    fn coordinator(
        gateway: ScriptedGateway,
        store: MemoryStore,
        settings: Settings,
    ) -> (Arc<ExchangeCoordinator>, Arc<ScriptedGateway>, Arc<MemoryStore>) {
        let gateway = Arc::new(gateway);
        let store = Arc::new(store);
        let coordinator = Arc::new(ExchangeCoordinator::new(
            gateway.clone(),
            store.clone(),
            Arc::new(StaticSettings(settings)),
        ));
        (coordinator, gateway, store)
    }

    fn delta(ms: u64, text: &str) -> (u64, StreamEvent) {
        (ms, StreamEvent::Delta(text.to_string()))
    }

    #[tokio::test]
    async fn cumulative_deltas_reach_callback_and_final_answer_persists() {
        let script = vec![
            delta(0, "He"),
            delta(0, "llo"),
            delta(0, "!"),
            (0, StreamEvent::Done),
        ];
        let (coordinator, _, store) =
            coordinator(ScriptedGateway::single(script), MemoryStore::default(), settings(5_000));

        let session_id = Uuid::new_v4();
        let mut seen = Vec::new();
        let dialogue = coordinator
            .send(session_id, "greet me", |text| seen.push(text.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, ["He", "Hello", "Hello!"]);
        assert_eq!(dialogue.answer.content(), "Hello!");
        assert_eq!(dialogue.question.content(), "greet me");

        let stored = store.stored_messages();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|m| m.session_id() == session_id));
        assert_eq!(stored[0].role(), Role::User);
        assert_eq!(stored[1].role(), Role::Assistant);
        assert!(stored[0].timestamp() <= stored[1].timestamp());
    }

    #[tokio::test]
    async fn leading_whitespace_never_reaches_callback() {
        let script = vec![
            delta(0, " \n"),
            delta(0, "\t He"),
            delta(0, "llo"),
            (0, StreamEvent::Done),
        ];
        let (coordinator, _, _) =
            coordinator(ScriptedGateway::single(script), MemoryStore::default(), settings(5_000));

        let mut seen = Vec::new();
        let dialogue = coordinator
            .send(Uuid::new_v4(), "hi", |text| seen.push(text.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, ["He", "Hello"]);
        assert!(seen.iter().all(|s| !s.starts_with(char::is_whitespace)));
        assert_eq!(dialogue.answer.content(), "Hello");
    }

    #[tokio::test]
    async fn prompt_carries_globals_then_session_then_history_then_user() {
        let mut session = Session::named("work");
        session.set_system_messages(vec!["Session rule".to_string()]);
        session.set_enable_context(Some(true));
        let session_id = session.id();

        let store = MemoryStore::with_session(session);
        store
            .save_message(&Message::new(session_id, Role::User, "old question"))
            .unwrap();
        store
            .save_message(&Message::new(session_id, Role::Assistant, "old answer"))
            .unwrap();

        let mut config = settings(5_000);
        config.system_messages = vec!["Be concise".to_string()];
        config.enable_context = false; // session override wins

        let script = vec![(0, StreamEvent::Done)];
        let (coordinator, gateway, _) =
            coordinator(ScriptedGateway::single(script), store, config);

        coordinator
            .send(session_id, "new question", |_| {})
            .await
            .unwrap();

        let request = gateway.requests().pop().unwrap();
        let contents: Vec<(Role, String)> = request
            .messages
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect();
        assert_eq!(
            contents,
            vec![
                (Role::System, "Be concise".to_string()),
                (Role::System, "Session rule".to_string()),
                (Role::User, "old question".to_string()),
                (Role::Assistant, "old answer".to_string()),
                (Role::User, "new question".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn global_context_default_applies_when_session_flag_unset() {
        let session = Session::new();
        let session_id = session.id();
        let store = MemoryStore::with_session(session);
        store
            .save_message(&Message::new(session_id, Role::User, "history"))
            .unwrap();

        let mut config = settings(5_000);
        config.enable_context = false;

        let script = vec![(0, StreamEvent::Done)];
        let (coordinator, gateway, _) =
            coordinator(ScriptedGateway::single(script), store, config);

        coordinator.send(session_id, "Hi", |_| {}).await.unwrap();

        // No globals, no session messages, context off: just the user turn.
        let request = gateway.requests().pop().unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "Hi");
    }

    #[tokio::test]
    async fn quiet_stream_times_out_and_persists_nothing() {
        let script = vec![delta(0, "He"), delta(60_000, "llo")];
        let (coordinator, _, store) =
            coordinator(ScriptedGateway::single(script), MemoryStore::default(), settings(150));

        let result = coordinator.send(Uuid::new_v4(), "hi", |_| {}).await;

        assert!(matches!(result, Err(ExchangeError::Timeout)));
        assert!(store.stored_messages().is_empty());
    }

    #[tokio::test]
    async fn zero_delta_stream_times_out_from_cycle_start() {
        let script = vec![(60_000, StreamEvent::Done)];
        let (coordinator, _, store) =
            coordinator(ScriptedGateway::single(script), MemoryStore::default(), settings(150));

        let started = Instant::now();
        let result = coordinator.send(Uuid::new_v4(), "hi", |_| {}).await;

        assert!(matches!(result, Err(ExchangeError::Timeout)));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(store.stored_messages().is_empty());
    }

    #[tokio::test]
    async fn hanging_transport_open_times_out() {
        let store = Arc::new(MemoryStore::default());
        let coordinator = ExchangeCoordinator::new(
            Arc::new(HangingGateway),
            store.clone(),
            Arc::new(StaticSettings(settings(150))),
        );

        let started = Instant::now();
        let result = coordinator.send(Uuid::new_v4(), "hi", |_| {}).await;

        assert!(matches!(result, Err(ExchangeError::Timeout)));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(store.stored_messages().is_empty());
    }

    #[tokio::test]
    async fn cancel_during_transport_open_is_silent() {
        let store = Arc::new(MemoryStore::default());
        let coordinator = Arc::new(ExchangeCoordinator::new(
            Arc::new(HangingGateway),
            store.clone(),
            Arc::new(StaticSettings(settings(30_000))),
        ));

        let task = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.send(Uuid::new_v4(), "hi", |_| {}).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        coordinator.cancel();

        let result = task.await.unwrap();
        assert!(result.as_ref().is_err_and(ExchangeError::is_canceled));
        assert!(store.stored_messages().is_empty());
    }

    #[tokio::test]
    async fn new_cycle_supersedes_the_previous_one() {
        let slow = vec![delta(0, "old "), delta(60_000, "answer"), (0, StreamEvent::Done)];
        let fast = vec![delta(0, "new answer"), (0, StreamEvent::Done)];
        let (coordinator, _, store) = coordinator(
            ScriptedGateway::sequence(vec![slow, fast]),
            MemoryStore::default(),
            settings(30_000),
        );

        let session_id = Uuid::new_v4();
        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.send(session_id, "first", |_| {}).await })
        };
        // Let the first cycle get its initial delta before superseding it.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let second = coordinator.send(session_id, "second", |_| {}).await;
        let first = first.await.unwrap();

        assert!(matches!(first, Err(ExchangeError::Canceled)));
        let dialogue = second.unwrap();
        assert_eq!(dialogue.answer.content(), "new answer");

        // Only the second cycle's pair may be persisted.
        let stored = store.stored_messages();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].content(), "second");
        assert_eq!(stored[1].content(), "new answer");
    }

    #[tokio::test]
    async fn explicit_cancel_is_silent_and_persists_nothing() {
        let script = vec![delta(0, "partial"), delta(60_000, " more")];
        let (coordinator, _, store) =
            coordinator(ScriptedGateway::single(script), MemoryStore::default(), settings(30_000));

        let task = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.send(Uuid::new_v4(), "hi", |_| {}).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        coordinator.cancel();

        let result = task.await.unwrap();
        assert!(result.as_ref().is_err_and(ExchangeError::is_canceled));
        assert!(store.stored_messages().is_empty());
    }

    #[tokio::test]
    async fn cancel_when_idle_is_a_no_op() {
        let script = vec![delta(0, "ok"), (0, StreamEvent::Done)];
        let (coordinator, _, _) =
            coordinator(ScriptedGateway::single(script), MemoryStore::default(), settings(5_000));

        coordinator.cancel();
        coordinator.cancel();

        // A fresh cycle after idle cancels still completes normally.
        let result = coordinator.send(Uuid::new_v4(), "hi", |_| {}).await;
        assert_eq!(result.unwrap().answer.content(), "ok");
    }

    #[tokio::test]
    async fn mid_stream_error_surfaces_as_gateway_failure() {
        let script = vec![
            delta(0, "par"),
            (0, StreamEvent::Error("rate limited".to_string())),
        ];
        let (coordinator, _, store) =
            coordinator(ScriptedGateway::single(script), MemoryStore::default(), settings(5_000));

        let result = coordinator.send(Uuid::new_v4(), "hi", |_| {}).await;
        assert!(matches!(result, Err(ExchangeError::Gateway(_))));
        assert!(store.stored_messages().is_empty());
    }
}
