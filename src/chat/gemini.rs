//! Gemini REST backend.
//!
//! POST {base_url}/v1beta/models/{model}:generateContent with the system
//! instruction and the whole session history on every call.

use super::{ChatBackend, ChatError, ChatSession, Role, Turn};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Study buddy persona sent as the system instruction.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a friendly and encouraging study buddy for a student. \
Your goal is to help them understand concepts, break down complex topics into simple terms, and provide study strategies. \
You should maintain the context of the conversation to answer follow-up questions. \
Keep your responses concise, clear, and positive. \
Use markdown for formatting, like lists, bold text, and italics, to make the information easy to digest. \
Answer all kinds of questions which are not even related to academics or productivity.";

/// Gemini client configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub system_instruction: String,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            temperature: 0.7,
            top_p: 0.95,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<Role>, text: &str) -> Self {
        Self {
            role,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Content::text(Some(turn.role), &turn.text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Backend calling the Gemini API over HTTPS.
#[derive(Debug)]
pub struct GeminiBackend {
    http_client: Client,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self, ChatError> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_request(&self, history: &[Turn], text: &str) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history.iter().map(Content::from).collect();
        contents.push(Content::text(Some(Role::User), text));
        GenerateContentRequest {
            system_instruction: Content::text(None, &self.config.system_instruction),
            contents,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
            },
        }
    }
}

#[async_trait]
impl ChatBackend for GeminiBackend {
    async fn send_message(&self, session: &ChatSession, text: &str) -> Result<String, ChatError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ChatError::MissingApiKey)?;

        let history = session.history();
        let body = self.build_request(&history, text);
        debug!(
            session = %session.id(),
            turns = history.len(),
            model = %self.config.model,
            "Sending study buddy message"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&raw)
                .map(|b| b.error.message)
                .unwrap_or(raw);
            warn!(status = status.as_u16(), "Study buddy request failed");
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply = response
            .json::<GenerateContentResponse>()
            .await?
            .into_text()
            .ok_or(ChatError::EmptyResponse)?;
        session.record_exchange(text, &reply);
        Ok(reply)
    }
}
