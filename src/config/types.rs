//! Configuration types.

use crate::chat::GeminiConfig;
use crate::types::{PomodoroSettings, Theme};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default port for the HTTP API.
pub const DEFAULT_PORT: u16 = 31995;

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1).
    #[serde(default = "default_host")]
    pub host: String,

    /// Port for the HTTP API (default: 31995).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Initial store contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Start from the sample board and habits rather than empty (default: true).
    #[serde(default = "default_true")]
    pub seed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed: true }
    }
}

fn default_true() -> bool {
    true
}

/// Study buddy backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. Usually supplied through `GEMINI_API_KEY` rather than a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Overrides the built-in study buddy persona.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_timeout_secs(),
            system_instruction: None,
        }
    }
}

fn default_model() -> String {
    GeminiConfig::default().model
}

fn default_base_url() -> String {
    GeminiConfig::default().base_url
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.95
}

fn default_timeout_secs() -> u64 {
    60
}

impl ChatConfig {
    /// Client configuration for the Gemini backend.
    pub fn gemini(&self) -> GeminiConfig {
        let defaults = GeminiConfig::default();
        GeminiConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            system_instruction: self
                .system_instruction
                .clone()
                .unwrap_or(defaults.system_instruction),
            temperature: self.temperature,
            top_p: self.top_p,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Initial UI preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: Theme,
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    /// Initial pomodoro durations in minutes.
    #[serde(default)]
    pub pomodoro: PomodoroSettings,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub ui: UiConfig,
}
