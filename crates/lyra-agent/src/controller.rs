//! Interaction controller: the single-flight submit state machine

use futures::StreamExt;
use lyra_ai::{ChatConfig, SessionProvider};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    conversation::{Conversation, Message, MessageId},
    error::ConversationError,
    events::ChatEvent,
    exchange::open_exchange,
    session::SessionCache,
    settings::{AppSettings, OptimizationMode, TargetAi},
};

/// Banner shown when no credential is configured
pub const MISSING_CREDENTIAL_MESSAGE: &str = "API Key is missing from environment variables.";

/// Banner shown when an exchange fails
pub const EXCHANGE_FAILED_MESSAGE: &str = "Failed to generate response. Please try again.";

/// Where the controller is in the submit cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    /// Ready for input
    #[default]
    Idle,
    /// User message appended, session being prepared
    Submitting,
    /// Fragments are being folded into the open reply
    StreamingReply { reply_id: MessageId },
}

impl Phase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Phase::Idle)
    }
}

/// Why a submission was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Input was empty or whitespace only
    Blank,
    /// An exchange is already in flight
    Busy,
    /// No credential is configured
    MissingCredential,
}

/// Result of a call to [`InteractionController::submit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The reply completed and was finalized
    Completed { reply_id: MessageId },
    /// Nothing happened; see the reason
    Rejected(Rejection),
    /// The exchange failed; the banner is set and the reply rolled back
    Failed,
}

/// Everything the view needs to render one frame
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub phase: Phase,
    pub banner: Option<String>,
    pub settings: AppSettings,
}

impl Snapshot {
    pub fn is_idle(&self) -> bool {
        self.phase.is_idle()
    }
}

struct Inner {
    conversation: Conversation,
    phase: Phase,
    banner: Option<String>,
    settings: AppSettings,
    credential: Option<String>,
}

/// Owns the conversation and runs at most one exchange at a time.
///
/// All methods take `&self`; state lives behind a mutex that is never held
/// across an `.await`, so a second `submit` racing the first sees a non-idle
/// phase and is rejected.
pub struct InteractionController {
    inner: Mutex<Inner>,
    sessions: SessionCache,
    event_tx: broadcast::Sender<ChatEvent>,
}

impl InteractionController {
    /// Create a controller with an empty conversation and no credential
    pub fn new(provider: Arc<dyn SessionProvider>, config: ChatConfig) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            inner: Mutex::new(Inner {
                conversation: Conversation::new(),
                phase: Phase::Idle,
                banner: None,
                settings: AppSettings::default(),
                credential: None,
            }),
            sessions: SessionCache::new(provider, config),
            event_tx,
        }
    }

    /// Seed the conversation with a greeting that survives `clear`
    pub fn with_welcome(mut self, text: impl Into<String>) -> Self {
        self.inner.get_mut().conversation = Conversation::with_welcome(text);
        self
    }

    /// Set the credential used for new exchanges
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.inner.get_mut().credential = credential;
        self
    }

    /// Set the initial target and mode
    pub fn with_settings(mut self, settings: AppSettings) -> Self {
        self.inner.get_mut().settings = settings;
        self
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    /// Copy of the current state for rendering
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        Snapshot {
            messages: inner.conversation.messages().to_vec(),
            phase: inner.phase,
            banner: inner.banner.clone(),
            settings: inner.settings,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.inner.lock().phase
    }

    /// Current banner text, if any
    pub fn banner(&self) -> Option<String> {
        self.inner.lock().banner.clone()
    }

    /// The session cache backing this controller
    pub fn sessions(&self) -> &SessionCache {
        &self.sessions
    }

    /// Replace the credential; the next exchange picks it up
    pub fn set_credential(&self, credential: Option<String>) {
        self.inner.lock().credential = credential;
    }

    /// Whether a usable credential is configured
    pub fn has_credential(&self) -> bool {
        self.inner
            .lock()
            .credential
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }

    pub fn settings(&self) -> AppSettings {
        self.inner.lock().settings
    }

    /// Replace both settings; applies to the next submission
    pub fn set_settings(&self, settings: AppSettings) {
        self.inner.lock().settings = settings;
        self.emit(ChatEvent::SettingsChanged { settings });
    }

    pub fn set_target(&self, target_ai: TargetAi) {
        let settings = AppSettings {
            target_ai,
            ..self.settings()
        };
        self.set_settings(settings);
    }

    pub fn set_mode(&self, mode: OptimizationMode) {
        let settings = AppSettings {
            mode,
            ..self.settings()
        };
        self.set_settings(settings);
    }

    /// Hide the banner
    pub fn dismiss_error(&self) {
        let mut inner = self.inner.lock();
        if inner.banner.take().is_some() {
            drop(inner);
            self.emit(ChatEvent::BannerDismissed);
        }
    }

    /// Start over: drop everything but the greeting and forget the session.
    ///
    /// Only allowed while idle.
    pub fn clear(&self) -> Result<(), Rejection> {
        {
            let mut inner = self.inner.lock();
            if !inner.phase.is_idle() {
                return Err(Rejection::Busy);
            }
            inner.conversation.clear();
            inner.banner = None;
        }
        self.sessions.reset();
        self.emit(ChatEvent::Cleared);
        Ok(())
    }

    /// Submit user input and drive the resulting exchange to completion.
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        let (credential, payload) = match self.begin(text) {
            Ok(accepted) => accepted,
            Err(rejection) => return SubmitOutcome::Rejected(rejection),
        };

        let session = match self.sessions.get_or_create(&credential) {
            Ok(session) => session,
            Err(e) => return self.fail(None, e),
        };

        let reply_id = {
            let mut inner = self.inner.lock();
            let reply = inner
                .conversation
                .append_model_placeholder()
                .unwrap_or_else(|e| fatal(e));
            inner.phase = Phase::StreamingReply { reply_id: reply.id };
            reply.id
        };
        self.emit(ChatEvent::ReplyStarted { reply_id });

        let mut fragments = open_exchange(session, payload);
        while let Some(item) = fragments.next().await {
            match item {
                Ok(delta) => {
                    self.inner
                        .lock()
                        .conversation
                        .fold_fragment(reply_id, &delta)
                        .unwrap_or_else(|e| fatal(e));
                    self.emit(ChatEvent::ReplyDelta { reply_id, delta });
                }
                Err(e) => return self.fail(Some(reply_id), e),
            }
        }

        let message = {
            let mut inner = self.inner.lock();
            inner
                .conversation
                .finalize(reply_id)
                .unwrap_or_else(|e| fatal(e));
            inner.phase = Phase::Idle;
            inner.conversation.last().cloned()
        };
        if let Some(message) = message {
            tracing::debug!(len = message.text.len(), "reply finished");
            self.emit(ChatEvent::ReplyFinished { message });
        }

        SubmitOutcome::Completed { reply_id }
    }

    /// Guard and accept a submission: append the user message and enter
    /// `Submitting`. Returns the credential and the tagged payload.
    fn begin(&self, text: &str) -> Result<(String, String), Rejection> {
        let mut inner = self.inner.lock();

        let text = text.trim();
        if text.is_empty() {
            return Err(Rejection::Blank);
        }
        if !inner.phase.is_idle() {
            return Err(Rejection::Busy);
        }

        let Some(credential) = inner
            .credential
            .clone()
            .filter(|c| !c.trim().is_empty())
        else {
            inner.banner = Some(MISSING_CREDENTIAL_MESSAGE.to_string());
            drop(inner);
            tracing::warn!("submission blocked: no API key configured");
            self.emit(ChatEvent::ConfigurationError {
                message: MISSING_CREDENTIAL_MESSAGE.to_string(),
            });
            return Err(Rejection::MissingCredential);
        };

        let settings = inner.settings;
        let payload = settings.build_payload(text);
        let message = inner
            .conversation
            .append_user(text)
            .unwrap_or_else(|e| fatal(e));
        inner.banner = None;
        inner.phase = Phase::Submitting;
        drop(inner);

        tracing::debug!(
            target_ai = %settings.target_ai,
            mode = %settings.mode,
            "submission accepted"
        );
        self.emit(ChatEvent::SubmitStarted { message });
        Ok((credential, payload))
    }

    /// Abandon the exchange: set the banner, roll back the open reply, go idle.
    fn fail(&self, reply_id: Option<MessageId>, error: lyra_ai::Error) -> SubmitOutcome {
        tracing::warn!(error = %error, "exchange failed");
        {
            let mut inner = self.inner.lock();
            if let Some(reply_id) = reply_id {
                let removed = inner.conversation.rollback_last().unwrap_or_else(|e| fatal(e));
                if removed.id != reply_id {
                    fatal(ConversationError::UnknownMessage(reply_id));
                }
            }
            inner.banner = Some(EXCHANGE_FAILED_MESSAGE.to_string());
            inner.phase = Phase::Idle;
        }
        self.emit(ChatEvent::ReplyFailed {
            message: EXCHANGE_FAILED_MESSAGE.to_string(),
        });
        SubmitOutcome::Failed
    }

    fn emit(&self, event: ChatEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

/// Conversation misuse means the controller's own bookkeeping is broken.
fn fatal(error: ConversationError) -> ! {
    tracing::error!(error = %error, "conversation state violated");
    panic!("conversation state violated: {error}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_stream::stream;
    use async_trait::async_trait;
    use lyra_ai::{ChatSession, Error, StreamEvent, StreamEventStream, Usage};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc;
    use tokio::sync::Notify;

    /// How the fake session replies
    #[derive(Clone)]
    enum Script {
        Reply(Vec<&'static str>),
        FailAfter(Vec<&'static str>),
    }

    struct MockSession {
        script: Script,
        gate: Option<Arc<Notify>>,
        received: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ChatSession for MockSession {
        async fn send_message_stream(&self, message: &str) -> lyra_ai::Result<StreamEventStream> {
            self.received.lock().push(message.to_string());
            let script = self.script.clone();
            let gate = self.gate.clone();

            Ok(Box::pin(stream! {
                let (fragments, fail) = match script {
                    Script::Reply(f) => (f, false),
                    Script::FailAfter(f) => (f, true),
                };
                for (i, fragment) in fragments.iter().enumerate() {
                    yield StreamEvent::TextDelta { delta: fragment.to_string() };
                    if i == 0 {
                        if let Some(gate) = &gate {
                            gate.notified().await;
                        }
                    }
                }
                if fail {
                    yield StreamEvent::Error { message: "connection reset".into() };
                } else {
                    yield StreamEvent::Done {
                        text: fragments.concat(),
                        stop_reason: None,
                        usage: Usage::default(),
                    };
                }
            }))
        }
    }

    /// Holds `start_chat` until the test releases it
    struct StartGate {
        entered: mpsc::Sender<()>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    struct MockProvider {
        script: Script,
        gate: Option<Arc<Notify>>,
        start_gate: Option<StartGate>,
        received: Arc<Mutex<Vec<String>>>,
        created: AtomicU32,
        refuse: bool,
    }

    impl MockProvider {
        fn new(script: Script) -> Self {
            Self {
                script,
                gate: None,
                start_gate: None,
                received: Arc::new(Mutex::new(Vec::new())),
                created: AtomicU32::new(0),
                refuse: false,
            }
        }

        fn received(&self) -> Vec<String> {
            self.received.lock().clone()
        }

        fn created(&self) -> u32 {
            self.created.load(Ordering::SeqCst)
        }
    }

    impl SessionProvider for MockProvider {
        fn start_chat(
            &self,
            _api_key: &str,
            _config: &ChatConfig,
        ) -> lyra_ai::Result<Arc<dyn ChatSession>> {
            if let Some(gate) = &self.start_gate {
                let _ = gate.entered.send(());
                let _ = gate.release.lock().recv();
            }
            if self.refuse {
                return Err(Error::InvalidConfig("refused".into()));
            }
            self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(MockSession {
                script: self.script.clone(),
                gate: self.gate.clone(),
                received: self.received.clone(),
            }))
        }
    }

    fn controller(provider: Arc<MockProvider>, credential: Option<&str>) -> InteractionController {
        InteractionController::new(provider, ChatConfig::default())
            .with_credential(credential.map(str::to_string))
    }

    #[tokio::test]
    async fn test_successful_exchange() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["Hi", " there"])));
        let ctrl = controller(provider.clone(), Some("k1"));

        let outcome = ctrl.submit("hello").await;
        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));

        let snap = ctrl.snapshot();
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.messages[0].text, "hello");
        assert_eq!(snap.messages[1].text, "Hi there");
        assert!(!snap.messages[1].is_streaming);
        assert_eq!(snap.phase, Phase::Idle);
        assert!(snap.banner.is_none());

        assert_eq!(
            provider.received(),
            vec!["[CONTEXT - Target: ChatGPT, Mode: BASIC] hello".to_string()]
        );
    }

    #[tokio::test]
    async fn test_reply_id_matches_finalized_message() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["ok"])));
        let ctrl = controller(provider, Some("k1"));

        let SubmitOutcome::Completed { reply_id } = ctrl.submit("hello").await else {
            panic!("expected completion");
        };
        assert_eq!(ctrl.snapshot().messages.last().unwrap().id, reply_id);
    }

    #[tokio::test]
    async fn test_context_tag_never_stored() {
        for target in TargetAi::ALL {
            for mode in OptimizationMode::ALL {
                let provider = Arc::new(MockProvider::new(Script::Reply(vec!["done"])));
                let ctrl = controller(provider.clone(), Some("k1"));
                ctrl.set_settings(AppSettings {
                    target_ai: target,
                    mode,
                });

                ctrl.submit("  make this better  ").await;

                let snap = ctrl.snapshot();
                assert_eq!(snap.messages[0].text, "make this better");
                assert!(snap.messages.iter().all(|m| !m.text.contains("[CONTEXT")));

                let sent = provider.received();
                assert_eq!(
                    sent[0],
                    format!(
                        "[CONTEXT - Target: {}, Mode: {}] make this better",
                        target.label(),
                        mode.tag()
                    )
                );
            }
        }
    }

    #[tokio::test]
    async fn test_mid_stream_failure_rolls_back_placeholder() {
        let provider = Arc::new(MockProvider::new(Script::FailAfter(vec!["partial"])));
        let ctrl = controller(provider, Some("k1"));
        let mut rx = ctrl.subscribe();

        let outcome = ctrl.submit("hello").await;
        assert_eq!(outcome, SubmitOutcome::Failed);

        let snap = ctrl.snapshot();
        assert_eq!(snap.messages.len(), 1);
        assert_eq!(snap.messages[0].text, "hello");
        assert!(snap.messages.iter().all(|m| !m.is_streaming));
        assert_eq!(snap.banner.as_deref(), Some(EXCHANGE_FAILED_MESSAGE));
        assert_eq!(snap.phase, Phase::Idle);

        let mut saw_failure = false;
        while let Ok(event) = rx.try_recv() {
            if let ChatEvent::ReplyFailed { message } = event {
                assert_eq!(message, EXCHANGE_FAILED_MESSAGE);
                saw_failure = true;
            }
        }
        assert!(saw_failure);
    }

    #[tokio::test]
    async fn test_session_setup_failure_keeps_user_message() {
        let mut provider = MockProvider::new(Script::Reply(vec!["never"]));
        provider.refuse = true;
        let ctrl = controller(Arc::new(provider), Some("k1"));

        assert_eq!(ctrl.submit("hello").await, SubmitOutcome::Failed);

        let snap = ctrl.snapshot();
        assert_eq!(snap.messages.len(), 1);
        assert_eq!(snap.messages[0].text, "hello");
        assert_eq!(snap.banner.as_deref(), Some(EXCHANGE_FAILED_MESSAGE));
        assert!(snap.is_idle());
    }

    #[tokio::test]
    async fn test_session_reused_for_same_credential() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["ok"])));
        let ctrl = controller(provider.clone(), Some("k1"));

        ctrl.submit("one").await;
        ctrl.submit("two").await;
        assert_eq!(provider.created(), 1);

        ctrl.set_credential(Some("k2".into()));
        ctrl.submit("three").await;
        assert_eq!(provider.created(), 2);
        assert!(ctrl.sessions().is_cached("k2"));
        assert!(!ctrl.sessions().is_cached("k1"));
    }

    #[tokio::test]
    async fn test_whitespace_input_rejected() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["ok"])));
        let ctrl = controller(provider.clone(), Some("k1"));

        assert_eq!(
            ctrl.submit("   \n\t ").await,
            SubmitOutcome::Rejected(Rejection::Blank)
        );
        assert!(ctrl.snapshot().messages.is_empty());
        assert_eq!(provider.created(), 0);
        assert!(provider.received().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_sets_banner() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["ok"])));
        let ctrl = controller(provider.clone(), None);
        let mut rx = ctrl.subscribe();

        assert_eq!(
            ctrl.submit("hello").await,
            SubmitOutcome::Rejected(Rejection::MissingCredential)
        );

        let snap = ctrl.snapshot();
        assert!(snap.messages.is_empty());
        assert_eq!(snap.banner.as_deref(), Some(MISSING_CREDENTIAL_MESSAGE));
        assert!(snap.is_idle());
        assert_eq!(provider.created(), 0);
        assert!(matches!(
            rx.try_recv(),
            Ok(ChatEvent::ConfigurationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["ok"])));
        let ctrl = controller(provider, Some("  "));
        assert_eq!(
            ctrl.submit("hello").await,
            SubmitOutcome::Rejected(Rejection::MissingCredential)
        );
        assert!(!ctrl.has_credential());
    }

    #[tokio::test]
    async fn test_submit_while_streaming_rejected() {
        let gate = Arc::new(Notify::new());
        let mut provider = MockProvider::new(Script::Reply(vec!["Hi", " there"]));
        provider.gate = Some(gate.clone());
        let provider = Arc::new(provider);
        let ctrl = Arc::new(controller(provider.clone(), Some("k1")));
        let mut rx = ctrl.subscribe();

        let first = {
            let ctrl = ctrl.clone();
            tokio::spawn(async move { ctrl.submit("hello").await })
        };

        // Wait until the first fragment has been folded
        loop {
            match rx.recv().await {
                Ok(ChatEvent::ReplyDelta { .. }) => break,
                Ok(_) => continue,
                Err(e) => panic!("event channel closed: {e}"),
            }
        }

        let before = ctrl.snapshot();
        assert!(matches!(before.phase, Phase::StreamingReply { .. }));

        assert_eq!(
            ctrl.submit("world").await,
            SubmitOutcome::Rejected(Rejection::Busy)
        );
        let during = ctrl.snapshot();
        assert_eq!(during.messages, before.messages);
        assert_eq!(ctrl.clear(), Err(Rejection::Busy));

        gate.notify_one();
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, SubmitOutcome::Completed { .. }));

        let snap = ctrl.snapshot();
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.messages[1].text, "Hi there");
        assert!(snap.messages.iter().all(|m| m.text != "world"));
        assert_eq!(provider.received().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_submit_while_session_starting_rejected() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let mut provider = MockProvider::new(Script::Reply(vec!["Hi"]));
        provider.start_gate = Some(StartGate {
            entered: entered_tx,
            release: Mutex::new(release_rx),
        });
        let provider = Arc::new(provider);
        let ctrl = Arc::new(controller(provider.clone(), Some("k1")));

        let first = {
            let ctrl = ctrl.clone();
            tokio::spawn(async move { ctrl.submit("hello").await })
        };

        // start_chat blocks a worker thread; wait for it off the runtime
        tokio::task::spawn_blocking(move || entered_rx.recv())
            .await
            .unwrap()
            .unwrap();

        let before = ctrl.snapshot();
        assert_eq!(before.phase, Phase::Submitting);
        assert_eq!(before.messages.len(), 1);

        assert_eq!(
            ctrl.submit("world").await,
            SubmitOutcome::Rejected(Rejection::Busy)
        );
        assert_eq!(ctrl.snapshot().messages, before.messages);
        assert_eq!(ctrl.clear(), Err(Rejection::Busy));

        release_tx.send(()).unwrap();
        assert!(matches!(
            first.await.unwrap(),
            SubmitOutcome::Completed { .. }
        ));

        let snap = ctrl.snapshot();
        assert_eq!(snap.messages.len(), 2);
        assert_eq!(snap.messages[0].text, "hello");
        assert_eq!(provider.received().len(), 1);
    }

    #[tokio::test]
    async fn test_new_submission_clears_banner() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["ok"])));
        let ctrl = controller(provider, None);
        ctrl.submit("hello").await;
        assert!(ctrl.banner().is_some());

        ctrl.set_credential(Some("k1".into()));
        ctrl.submit("hello").await;
        assert!(ctrl.banner().is_none());
    }

    #[tokio::test]
    async fn test_event_order_for_successful_exchange() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["a", "b"])));
        let ctrl = controller(provider, Some("k1"));
        let mut rx = ctrl.subscribe();

        ctrl.submit("hello").await;

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(match event {
                ChatEvent::SubmitStarted { .. } => "submit",
                ChatEvent::ReplyStarted { .. } => "start",
                ChatEvent::ReplyDelta { .. } => "delta",
                ChatEvent::ReplyFinished { .. } => "finish",
                _ => "other",
            });
        }
        assert_eq!(kinds, vec!["submit", "start", "delta", "delta", "finish"]);
    }

    #[tokio::test]
    async fn test_clear_keeps_welcome_and_resets_session() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["ok"])));
        let ctrl = controller(provider.clone(), Some("k1")).with_welcome("Hello!");

        ctrl.submit("hello").await;
        assert_eq!(ctrl.snapshot().messages.len(), 3);

        ctrl.clear().unwrap();
        let snap = ctrl.snapshot();
        assert_eq!(snap.messages.len(), 1);
        assert_eq!(snap.messages[0].text, "Hello!");
        assert!(!ctrl.sessions().is_cached("k1"));

        ctrl.submit("again").await;
        assert_eq!(provider.created(), 2);
    }

    #[tokio::test]
    async fn test_settings_changes_apply_to_next_submission() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["ok"])));
        let ctrl = controller(provider.clone(), Some("k1"));

        ctrl.set_target(TargetAi::Gemini);
        ctrl.set_mode(OptimizationMode::Detail);
        assert_eq!(
            ctrl.settings(),
            AppSettings {
                target_ai: TargetAi::Gemini,
                mode: OptimizationMode::Detail,
            }
        );

        ctrl.submit("hi").await;
        assert_eq!(
            provider.received()[0],
            "[CONTEXT - Target: Gemini, Mode: DETAIL] hi"
        );
    }

    #[tokio::test]
    async fn test_dismiss_error() {
        let provider = Arc::new(MockProvider::new(Script::Reply(vec!["ok"])));
        let ctrl = controller(provider, None);
        ctrl.submit("hello").await;
        ctrl.dismiss_error();
        assert!(ctrl.banner().is_none());
    }
}
