//! Configuration loading, validation, and management for DocChat.
//!
//! Loads configuration from `~/.docchat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Providers the router knows how to build.
pub const KNOWN_PROVIDERS: &[&str] = &["gemini", "estimate"];

/// The root configuration structure.
///
/// Maps directly to `~/.docchat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Which oracle backend to use ("gemini" or "estimate")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model used for both token counting and generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Override the provider's base URL (proxies, tests)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// HTTP timeout per oracle call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Input token budget
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Conversation history settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// Named system prompt library settings
    #[serde(default)]
    pub prompts: PromptsConfig,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.5-pro".into()
}
fn default_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("budget", &self.budget)
            .field("history", &self.history)
            .field("prompts", &self.prompts)
            .finish()
    }
}

/// The endpoint's hard input ceiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Maximum input tokens the endpoint accepts
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Tokens held back from the ceiling for the model's reply (0 = none)
    #[serde(default)]
    pub reserved_headroom: usize,
}

fn default_max_tokens() -> usize {
    1_000_000
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            reserved_headroom: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Cap on how many of the most recent turns are offered to the
    /// assembler. Unset = the whole history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsConfig {
    /// Path of the prompt library JSON (default: ~/.docchat/prompts.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Prompt selected when a chat starts without `--prompt`
    #[serde(default = "default_prompt_id")]
    pub default_id: String,
}

fn default_prompt_id() -> String {
    "default-general".into()
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            file: None,
            default_id: default_prompt_id(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.docchat/config.toml).
    ///
    /// Also checks environment variables for the API key when the file has none:
    /// - `DOCCHAT_API_KEY` (highest priority)
    /// - `GOOGLE_API_KEY`
    /// - `GEMINI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = api_key_from(|name| std::env::var(name).ok());
        }

        if let Ok(provider) = std::env::var("DOCCHAT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCCHAT_MODEL") {
            config.model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".docchat")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Resolved prompt library path.
    pub fn prompts_path(&self) -> PathBuf {
        match &self.prompts.file {
            Some(file) => PathBuf::from(file),
            None => Self::config_dir().join("prompts.json"),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.budget.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "budget.max_tokens must be greater than 0".into(),
            ));
        }

        if self.budget.reserved_headroom >= self.budget.max_tokens {
            return Err(ConfigError::ValidationError(
                "budget.reserved_headroom must be smaller than budget.max_tokens".into(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown provider '{}' (expected one of: {})",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            api_url: None,
            timeout_secs: default_timeout_secs(),
            budget: BudgetConfig::default(),
            history: HistoryConfig::default(),
            prompts: PromptsConfig::default(),
        }
    }
}

/// Environment variables consulted for the API key, highest priority first.
pub const API_KEY_ENV_VARS: &[&str] = &["DOCCHAT_API_KEY", "GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// First non-blank API key found through `lookup`, in [`API_KEY_ENV_VARS`] order.
fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .find_map(|name| lookup(name).filter(|key| !key.trim().is_empty()))
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
