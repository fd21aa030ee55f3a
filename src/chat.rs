use crate::api::ReplyBackend;
use crate::error::{VendorError, VendorResult};
use crate::models::{ChatMessage, SessionState};
use crate::render::Renderer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

pub const APOLOGY: &str = "Sorry, I am having trouble connecting to the AI. Please try again later.";

struct Shared {
    history: Mutex<Vec<ChatMessage>>,
    is_open: AtomicBool,
    typing: AtomicBool,
    renderer: Arc<dyn Renderer>,
}

struct PendingSend {
    text: String,
    done: oneshot::Sender<ChatMessage>,
}

// Resolves with the bot message that answered a send (reply or apology)
pub struct ReplyHandle {
    rx: oneshot::Receiver<ChatMessage>,
}

impl ReplyHandle {
    pub async fn wait(self) -> Option<ChatMessage> {
        self.rx.await.ok()
    }
}

// Single-slot in-flight flag. Cleared on drop, so an aborted lane cannot
// leave the indicator stuck.
struct TypingGuard {
    shared: Arc<Shared>,
}

impl TypingGuard {
    fn acquire(shared: &Arc<Shared>) -> Option<Self> {
        shared
            .typing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        shared.renderer.set_typing(true);
        Some(Self { shared: shared.clone() })
    }
}

impl Drop for TypingGuard {
    fn drop(&mut self) {
        self.shared.typing.store(false, Ordering::Release);
        self.shared.renderer.set_typing(false);
    }
}

#[derive(Clone)]
pub struct ChatSession {
    shared: Arc<Shared>,
    lane: mpsc::UnboundedSender<PendingSend>,
}

impl ChatSession {
    // Spawns the reply lane; it ends once every clone is dropped
    pub fn new(backend: Arc<dyn ReplyBackend>, renderer: Arc<dyn Renderer>) -> Self {
        let shared = Arc::new(Shared {
            history: Mutex::new(Vec::new()),
            is_open: AtomicBool::new(false),
            typing: AtomicBool::new(false),
            renderer,
        });
        let (lane, rx) = mpsc::unbounded_channel();
        tokio::spawn(reply_lane(shared.clone(), backend, rx));
        Self { shared, lane }
    }

    // --- Visibility ---

    pub fn open(&self) {
        self.set_visible(true);
    }

    pub fn close(&self) {
        self.set_visible(false);
    }

    pub fn toggle(&self, force_open: bool) -> bool {
        let visible = force_open || !self.is_open();
        self.set_visible(visible);
        visible
    }

    pub fn is_open(&self) -> bool {
        self.shared.is_open.load(Ordering::Acquire)
    }

    fn set_visible(&self, visible: bool) {
        self.shared.is_open.store(visible, Ordering::Release);
        self.shared.renderer.set_chat_visible(visible);
    }

    // --- Messages ---

    /// Queues a user message. Sends are appended and answered in call order.
    pub fn send_user_message(&self, text: &str) -> VendorResult<ReplyHandle> {
        let text = text.trim();
        if text.is_empty() {
            log::debug!("Ignoring empty chat message");
            return Err(VendorError::MalformedInput);
        }

        self.shared.renderer.clear_input();
        let (done, rx) = oneshot::channel();
        self.lane
            .send(PendingSend {
                text: text.to_string(),
                done,
            })
            .map_err(|_| {
                log::error!("Reply lane is gone; dropping message");
                VendorError::ReplyFetchFailed("reply lane closed".to_string())
            })?;
        Ok(ReplyHandle { rx })
    }

    pub async fn inject_bot_message(&self, text: impl Into<String>) -> ChatMessage {
        self.shared.append(ChatMessage::bot(text)).await
    }

    pub async fn history(&self) -> Vec<ChatMessage> {
        self.shared.history.lock().await.clone()
    }

    pub fn is_typing(&self) -> bool {
        self.shared.typing.load(Ordering::Acquire)
    }

    pub async fn snapshot(&self) -> SessionState {
        SessionState {
            is_open: self.is_open(),
            is_typing: self.is_typing(),
            history: self.history().await,
        }
    }
}

impl Shared {
    async fn append(&self, message: ChatMessage) -> ChatMessage {
        let history = {
            let mut history = self.history.lock().await;
            history.push(message.clone());
            history.clone()
        };
        self.renderer.render_history(&history);
        self.renderer.scroll_history();
        message
    }

    async fn receive_assistant_reply(&self, text: String) -> ChatMessage {
        self.append(ChatMessage::bot(text)).await
    }

    async fn receive_assistant_failure(&self) -> ChatMessage {
        self.append(ChatMessage::bot(APOLOGY)).await
    }
}

// Drains queued sends one at a time so history order matches send order.
async fn reply_lane(
    shared: Arc<Shared>,
    backend: Arc<dyn ReplyBackend>,
    mut rx: mpsc::UnboundedReceiver<PendingSend>,
) {
    while let Some(pending) = rx.recv().await {
        shared.append(ChatMessage::user(pending.text.clone())).await;

        let Some(guard) = TypingGuard::acquire(&shared) else {
            log::error!("Typing slot already taken; answering with apology");
            let reply = shared.receive_assistant_failure().await;
            let _ = pending.done.send(reply);
            continue;
        };

        let outcome = backend.fetch_reply(&pending.text).await;
        drop(guard);

        let reply = match outcome {
            Ok(text) => shared.receive_assistant_reply(text).await,
            Err(e) => {
                log::error!("Reply fetch failed: {:?}", e);
                shared.receive_assistant_failure().await
            }
        };
        // The caller may have stopped waiting; that's fine
        let _ = pending.done.send(reply);
    }
    log::debug!("Reply lane closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sender;
    use crate::render::{RecordingRenderer, RenderEvent};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::time::Duration;

    struct EchoBackend;

    #[async_trait]
    impl ReplyBackend for EchoBackend {
        async fn fetch_reply(&self, message: &str) -> Result<String> {
            Ok(format!("reply to {}", message))
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl ReplyBackend for FailingBackend {
        async fn fetch_reply(&self, _message: &str) -> Result<String> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    // First request is slow, later ones are fast: overlapping sends would
    // interleave if the lane did not serialize them.
    struct SlowFirstBackend {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl ReplyBackend for SlowFirstBackend {
        async fn fetch_reply(&self, message: &str) -> Result<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            if message == "fail" {
                return Err(anyhow::anyhow!("backend down"));
            }
            Ok(format!("bot-{}", message))
        }
    }

    fn session(backend: impl ReplyBackend + 'static) -> (ChatSession, Arc<RecordingRenderer>) {
        let renderer = Arc::new(RecordingRenderer::new());
        (ChatSession::new(Arc::new(backend), renderer.clone()), renderer)
    }

    fn lines(history: &[ChatMessage]) -> Vec<(Sender, String)> {
        history.iter().map(|m| (m.sender, m.text.clone())).collect()
    }

    #[tokio::test]
    async fn toggle_twice_restores_and_force_open_always_opens() {
        let (chat, _) = session(EchoBackend);
        let before = chat.is_open();
        chat.toggle(false);
        chat.toggle(false);
        assert_eq!(chat.is_open(), before);

        assert!(chat.toggle(true));
        assert!(chat.toggle(true));
        assert!(chat.is_open());

        chat.close();
        assert!(!chat.is_open());
        chat.open();
        assert!(chat.is_open());
    }

    #[tokio::test]
    async fn blank_messages_are_rejected() {
        let (chat, renderer) = session(EchoBackend);
        assert_eq!(chat.send_user_message("").err(), Some(VendorError::MalformedInput));
        assert_eq!(chat.send_user_message("   ").err(), Some(VendorError::MalformedInput));

        tokio::task::yield_now().await;
        assert!(chat.history().await.is_empty());
        assert!(!chat.is_typing());
        assert!(renderer.events().is_empty());
    }

    #[tokio::test]
    async fn successful_reply_follows_user_message() {
        let (chat, renderer) = session(EchoBackend);
        let reply = chat.send_user_message("  hello  ").unwrap().wait().await.unwrap();
        assert_eq!(reply.text, "reply to hello");

        assert_eq!(
            lines(&chat.history().await),
            vec![
                (Sender::User, "hello".to_string()),
                (Sender::Bot, "reply to hello".to_string()),
            ]
        );
        assert!(!chat.is_typing());
        assert_eq!(renderer.typing_changes(), vec![true, false]);
        assert_eq!(renderer.events().first(), Some(&RenderEvent::InputCleared));
    }

    #[tokio::test]
    async fn failed_reply_becomes_apology() {
        let (chat, _) = session(FailingBackend);
        chat.send_user_message("hello").unwrap().wait().await;

        let history = chat.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().map(|m| m.text.as_str()), Some(APOLOGY));
        assert!(!chat.is_typing());

        // Still usable afterwards
        chat.send_user_message("again").unwrap().wait().await;
        assert_eq!(chat.history().await.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_sends_keep_call_order() {
        let (chat, _) = session(SlowFirstBackend {
            calls: Default::default(),
        });
        let first = chat.send_user_message("one").unwrap();
        let second = chat.send_user_message("fail").unwrap();
        let third = chat.send_user_message("three").unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(chat.is_typing());
        assert_eq!(chat.history().await.len(), 1, "queued sends wait their turn");

        third.wait().await;
        first.wait().await;
        second.wait().await;

        assert_eq!(
            lines(&chat.history().await),
            vec![
                (Sender::User, "one".to_string()),
                (Sender::Bot, "bot-one".to_string()),
                (Sender::User, "fail".to_string()),
                (Sender::Bot, APOLOGY.to_string()),
                (Sender::User, "three".to_string()),
                (Sender::Bot, "bot-three".to_string()),
            ]
        );
        assert!(!chat.is_typing());
    }

    #[tokio::test(start_paused = true)]
    async fn closing_does_not_cancel_reply() {
        let (chat, _) = session(SlowFirstBackend {
            calls: Default::default(),
        });
        chat.open();
        let handle = chat.send_user_message("one").unwrap();
        chat.close();

        let reply = handle.wait().await.unwrap();
        assert_eq!(reply.text, "bot-one");
        assert!(!chat.is_open());
    }

    #[tokio::test]
    async fn injected_messages_skip_the_request_cycle() {
        let (chat, renderer) = session(FailingBackend);
        chat.inject_bot_message("📍 hello from location").await;

        let snapshot = chat.snapshot().await;
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].sender, Sender::Bot);
        assert!(!snapshot.is_typing);
        assert!(renderer.typing_changes().is_empty());
    }
}
