//! Configuration loader with tier-based merging.
//!
//! Loads configuration from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Configuration tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Embedded defaults (lowest priority)
    Defaults = 0,
    /// Project-level config ($CWD/studydesk/)
    Project = 1,
    /// User-level config (~/.studydesk/)
    User = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Paths for each configuration tier.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory
    pub project_dir: Option<PathBuf>,
    /// User-level config directory
    pub user_dir: Option<PathBuf>,
    /// Explicit config file; replaces the project and user tiers
    pub explicit_file: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        // User dir: STUDYDESK_USER_DIR or ~/.studydesk
        let user_dir = std::env::var("STUDYDESK_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".studydesk")));

        // Project dir: STUDYDESK_PROJECT_DIR or $CWD/studydesk
        let project_dir = std::env::var("STUDYDESK_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("studydesk")));

        let explicit_file = std::env::var("STUDYDESK_CONFIG_PATH")
            .ok()
            .map(PathBuf::from);

        Self {
            project_dir,
            user_dir,
            explicit_file,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
            explicit_file: None,
        }
    }

    /// Use `file` instead of the project and user tiers.
    pub fn with_explicit_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(file.into());
        self
    }

    /// Config files to merge over the defaults, lowest tier first.
    fn tier_files(&self) -> Vec<(ConfigTier, PathBuf)> {
        if let Some(ref file) = self.explicit_file {
            return vec![(ConfigTier::User, file.clone())];
        }
        let mut files = Vec::new();
        if let Some(ref dir) = self.project_dir {
            files.push((ConfigTier::Project, dir.join("config.yaml")));
        }
        if let Some(ref dir) = self.user_dir {
            files.push((ConfigTier::User, dir.join("config.yaml")));
        }
        files
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Paths for each tier
    pub paths: ConfigPaths,
    /// Loaded configuration
    config: Config,
    /// Config files that contributed, lowest tier first
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers with proper merging.
    pub fn load() -> Result<Self> {
        Self::load_with_env(ConfigPaths::discover(), |key| std::env::var(key).ok())
    }

    /// Load configuration with explicit paths and the process environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with_env(paths, |key| std::env::var(key).ok())
    }

    /// Load configuration with explicit paths and an environment lookup.
    pub fn load_with_env(
        paths: ConfigPaths,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        // Tier 1: Defaults (embedded)
        let mut configs: Vec<Value> = vec![serde_json::to_value(Config::default())?];
        let mut sources = Vec::new();

        // Tiers 2-3: project and user files, or the explicit file
        for (tier, file) in paths.tier_files() {
            let explicit = paths.explicit_file.as_ref() == Some(&file);
            if !file.exists() {
                if explicit {
                    anyhow::bail!("Config file not found: {}", file.display());
                }
                continue;
            }
            match read_yaml(&file) {
                Ok(Value::Null) => {}
                Ok(value) => {
                    debug!(%tier, path = %file.display(), "Loaded config tier");
                    configs.push(value);
                    sources.push(file);
                }
                // A broken explicit file is fatal; a broken tier file is skipped
                Err(e) if explicit => return Err(e),
                Err(e) => warn!(%tier, path = %file.display(), error = %e, "Ignoring unreadable config"),
            }
        }

        // Merge all configs
        let merged = deep_merge_all(configs);
        let mut config: Config =
            serde_json::from_value(merged).context("Invalid configuration")?;

        // Tier 4: Environment variable overrides
        Self::apply_env_overrides(&mut config, env);

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
        if let Some(port) = env("STUDYDESK_PORT") {
            match port.parse() {
                Ok(port) => config.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid STUDYDESK_PORT"),
            }
        }

        if let Some(model) = env("STUDYDESK_CHAT_MODEL") {
            config.chat.model = model;
        }

        if let Some(key) = env("GEMINI_API_KEY").or_else(|| env("API_KEY")) {
            config.chat.api_key = Some(key);
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that were merged, lowest tier first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Get the project directory.
    pub fn project_dir(&self) -> Option<&Path> {
        self.paths.project_dir.as_deref()
    }

    /// Get the user directory.
    pub fn user_dir(&self) -> Option<&Path> {
        self.paths.user_dir.as_deref()
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_yaml::from_str::<Value>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}
