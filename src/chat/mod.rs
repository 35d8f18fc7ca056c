//! Study buddy: conversational collaborator and conversation model.
//!
//! - [`ChatBackend`] is the seam to the remote model: create a session,
//!   send a message within it.
//! - [`GeminiBackend`] talks to the Gemini `generateContent` REST endpoint.
//! - [`StudyBuddy`] is the conversation shown to the user, with a pending
//!   indicator and failures surfaced as bot messages.
//! - [`render_markdown`] turns the small markdown subset the model uses
//!   into HTML.

mod buddy;
mod gemini;
mod markup;

pub use buddy::{ConversationView, GREETING, Message, Sender, StudyBuddy};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use markup::render_markdown;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

/// Errors from the conversational backend.
#[derive(Error, Debug)]
pub enum ChatError {
    /// No API key configured
    #[error("No API key configured for the study buddy")]
    MissingApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response carried no text
    #[error("The model returned an empty response")]
    EmptyResponse,
}

/// Speaker of a conversation turn, as the model sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One exchanged message in a session's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Stateful multi-turn session handle. Clones share the same history.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    history: Arc<Mutex<Vec<Turn>>>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Prior turns, oldest first.
    pub fn history(&self) -> Vec<Turn> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Record a completed exchange.
    pub fn record_exchange(&self, user_text: &str, model_text: &str) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push(Turn {
            role: Role::User,
            text: user_text.to_string(),
        });
        history.push(Turn {
            role: Role::Model,
            text: model_text.to_string(),
        });
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// The remote conversational model.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Open a new session with empty history.
    fn create_session(&self) -> ChatSession {
        ChatSession::new()
    }

    /// Send `text` within `session` and return the model's reply.
    /// On success the exchange is appended to the session history.
    async fn send_message(&self, session: &ChatSession, text: &str) -> Result<String, ChatError>;
}
