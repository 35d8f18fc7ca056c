//! The conversation the user sees.

use super::{ChatBackend, ChatSession, render_markdown};
use crate::error::{AppError, AppResult};
use crate::types::new_id;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// First bot message of every conversation.
pub const GREETING: &str = "Hello! I'm your AI Study Buddy. How can I help you be more productive today? I can now remember our conversation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    /// Bot text rendered to HTML; `None` for user messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

impl Message {
    fn user(text: &str) -> Self {
        Self {
            id: new_id(),
            sender: Sender::User,
            text: text.to_string(),
            html: None,
        }
    }

    fn bot(text: &str) -> Self {
        Self {
            id: new_id(),
            sender: Sender::Bot,
            text: text.to_string(),
            html: Some(render_markdown(text)),
        }
    }
}

/// Conversation snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub messages: Vec<Message>,
    pub pending: bool,
}

struct Conversation {
    session: ChatSession,
    messages: Vec<Message>,
    pending: bool,
    /// Bumped on every new chat; replies from an older generation are dropped.
    generation: u64,
}

impl Conversation {
    fn fresh(session: ChatSession, generation: u64) -> Self {
        Self {
            session,
            messages: vec![Message::bot(GREETING)],
            pending: false,
            generation,
        }
    }
}

/// Clears the pending flag of the generation that set it.
struct PendingGuard<'a> {
    buddy: &'a StudyBuddy,
    generation: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut conversation = self.buddy.lock();
        if conversation.generation == self.generation {
            conversation.pending = false;
        }
    }
}

/// Study buddy conversation over a [`ChatBackend`].
pub struct StudyBuddy {
    backend: Arc<dyn ChatBackend>,
    inner: Mutex<Conversation>,
}

impl StudyBuddy {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let session = backend.create_session();
        Self {
            backend,
            inner: Mutex::new(Conversation::fresh(session, 0)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn view(&self) -> ConversationView {
        let conversation = self.lock();
        ConversationView {
            messages: conversation.messages.clone(),
            pending: conversation.pending,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// Send a user message and wait for the reply.
    ///
    /// Blank input and sends while a reply is pending are rejected. Backend
    /// failures are not errors here: they land in the conversation as a bot
    /// message. Returns the conversation after the exchange.
    pub async fn send(&self, text: &str) -> AppResult<ConversationView> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::missing_field("text"));
        }

        let (session, generation) = {
            let mut conversation = self.lock();
            if conversation.pending {
                return Err(AppError::reply_pending());
            }
            conversation.messages.push(Message::user(text));
            conversation.pending = true;
            (conversation.session.clone(), conversation.generation)
        };

        // Cleared on drop so a cancelled send does not leave the flag set.
        let guard = PendingGuard {
            buddy: self,
            generation,
        };
        let result = self.backend.send_message(&session, text).await;

        {
            let mut conversation = self.lock();
            if conversation.generation != generation {
                debug!(generation, "Discarding reply for an abandoned conversation");
            } else {
                let reply = match result {
                    Ok(reply) => reply,
                    Err(e) => {
                        warn!(error = %e, "Study buddy backend failed");
                        format!("An error occurred: {e}")
                    }
                };
                conversation.messages.push(Message::bot(&reply));
            }
        }
        drop(guard);
        Ok(self.view())
    }

    /// Abandon the current conversation and start over with a new session.
    pub fn new_chat(&self) -> ConversationView {
        let session = self.backend.create_session();
        let mut conversation = self.lock();
        let generation = conversation.generation + 1;
        *conversation = Conversation::fresh(session, generation);
        debug!(generation, "Started new study buddy conversation");
        ConversationView {
            messages: conversation.messages.clone(),
            pending: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatError;
    use crate::error::ErrorCode;
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct Echo;

    #[async_trait]
    impl ChatBackend for Echo {
        async fn send_message(&self, session: &ChatSession, text: &str) -> Result<String, ChatError> {
            let reply = format!("**{text}**");
            session.record_exchange(text, &reply);
            Ok(reply)
        }
    }

    struct Failing;

    #[async_trait]
    impl ChatBackend for Failing {
        async fn send_message(&self, _: &ChatSession, _: &str) -> Result<String, ChatError> {
            Err(ChatError::EmptyResponse)
        }
    }

    /// Blocks until released.
    struct Gated(Arc<Notify>);

    #[async_trait]
    impl ChatBackend for Gated {
        async fn send_message(&self, _: &ChatSession, _: &str) -> Result<String, ChatError> {
            self.0.notified().await;
            Ok("late".to_string())
        }
    }

    #[test]
    fn starts_with_greeting() {
        let buddy = StudyBuddy::new(Arc::new(Echo));
        let view = buddy.view();
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.messages[0].sender, Sender::Bot);
        assert_eq!(view.messages[0].text, GREETING);
        assert!(!view.pending);
    }

    #[tokio::test]
    async fn exchange_appends_user_and_bot() {
        let buddy = StudyBuddy::new(Arc::new(Echo));
        let view = buddy.send("  hi  ").await.unwrap();
        assert_eq!(view.messages.len(), 3);
        assert_eq!(view.messages[1].text, "hi");
        assert_eq!(view.messages[1].html, None);
        assert_eq!(view.messages[2].html.as_deref(), Some("<strong>hi</strong>"));
        assert!(!view.pending);
    }

    #[tokio::test]
    async fn blank_input_is_rejected() {
        let buddy = StudyBuddy::new(Arc::new(Echo));
        let err = buddy.send("   ").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(buddy.view().messages.len(), 1);
    }

    #[tokio::test]
    async fn failure_becomes_bot_message() {
        let buddy = StudyBuddy::new(Arc::new(Failing));
        let view = buddy.send("hello").await.unwrap();
        let last = view.messages.last().unwrap();
        assert_eq!(last.sender, Sender::Bot);
        assert_eq!(
            last.text,
            "An error occurred: The model returned an empty response"
        );
        assert!(!view.pending);
    }

    #[tokio::test]
    async fn second_send_while_pending_is_rejected() {
        let gate = Arc::new(Notify::new());
        let buddy = Arc::new(StudyBuddy::new(Arc::new(Gated(gate.clone()))));

        let first = tokio::spawn({
            let buddy = buddy.clone();
            async move { buddy.send("one").await }
        });
        while !buddy.is_pending() {
            tokio::task::yield_now().await;
        }

        let err = buddy.send("two").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ReplyPending);

        gate.notify_one();
        let view = first.await.unwrap().unwrap();
        assert_eq!(view.messages.len(), 3);
    }

    #[tokio::test]
    async fn reply_for_abandoned_chat_is_discarded() {
        let gate = Arc::new(Notify::new());
        let buddy = Arc::new(StudyBuddy::new(Arc::new(Gated(gate.clone()))));

        let first = tokio::spawn({
            let buddy = buddy.clone();
            async move { buddy.send("one").await }
        });
        while !buddy.is_pending() {
            tokio::task::yield_now().await;
        }

        let fresh = buddy.new_chat();
        assert_eq!(fresh.messages.len(), 1);

        gate.notify_one();
        first.await.unwrap().unwrap();
        let view = buddy.view();
        assert_eq!(view.messages.len(), 1);
        assert_eq!(view.messages[0].text, GREETING);
        assert!(!view.pending);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_send_releases_pending() {
        let gate = Arc::new(Notify::new());
        let buddy = StudyBuddy::new(Arc::new(Gated(gate.clone())));

        let cancelled =
            tokio::time::timeout(std::time::Duration::from_millis(20), buddy.send("one")).await;
        assert!(cancelled.is_err());
        assert!(!buddy.is_pending());

        // Stored permit lets the next call through
        gate.notify_one();
        let view = buddy.send("two").await.unwrap();
        let texts: Vec<_> = view.messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![GREETING, "one", "two", "late"]);
        assert!(!view.pending);
    }
}
