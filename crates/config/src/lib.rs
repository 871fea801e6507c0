//! Configuration loading, validation, and management for Wrapwright.
//!
//! Loads configuration from `~/.wrapwright/config.toml`, then `.env`, then
//! environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.wrapwright/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the reasoning service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model used for every completion
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for action selection
    #[serde(default)]
    pub temperature: f32,

    /// Size of the model's context window in tokens
    #[serde(default = "default_context_window_tokens")]
    pub context_window_tokens: usize,

    /// Tokens reserved for each response
    #[serde(default = "default_max_tokens_per_response")]
    pub max_tokens_per_response: u32,

    /// Directory chat transcripts are written to
    #[serde(default = "default_transcript_dir")]
    pub transcript_dir: PathBuf,

    /// Wrap library location
    #[serde(default)]
    pub library: LibraryConfig,

    /// Wrap execution runtime
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// Tokens set aside for the `LearnWrap`/`InvokeWrap` definitions declared on
/// every request. Must cover their estimated size.
pub const FUNCTION_DEFINITIONS_RESERVE: usize = 512;

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4-0613".into()
}
fn default_context_window_tokens() -> usize {
    8000
}
fn default_max_tokens_per_response() -> u32 {
    2000
}
fn default_transcript_dir() -> PathBuf {
    PathBuf::from("chats")
}

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
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("context_window_tokens", &self.context_window_tokens)
            .field("max_tokens_per_response", &self.max_tokens_per_response)
            .field("transcript_dir", &self.transcript_dir)
            .field("library", &self.library)
            .field("runtime", &self.runtime)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Base URL of the library (`https://` or `file://`)
    #[serde(default = "default_library_url")]
    pub url: String,

    /// Library name, the directory under `url` holding `index.json`
    #[serde(default = "default_library_name")]
    pub name: String,
}

fn default_library_url() -> String {
    "https://raw.githubusercontent.com/polywrap/agent-learning-demo/master".into()
}
fn default_library_name() -> String {
    "wraps".into()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            url: default_library_url(),
            name: default_library_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Endpoint that accepts `{uri, method, args}` invocations
    #[serde(default = "default_runtime_endpoint")]
    pub endpoint: String,
}

fn default_runtime_endpoint() -> String {
    "http://localhost:8484/invoke".into()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            endpoint: default_runtime_endpoint(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.wrapwright/config.toml).
    ///
    /// A `.env` file in the working directory is read first, so its values
    /// take part in the environment overrides below.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", path.display());
        }

        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
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

    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    ///
    /// - `WRAPWRIGHT_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `WRAPWRIGHT_API_URL`, `GPT_MODEL`
    /// - `CONTEXT_WINDOW_TOKENS`, `MAX_TOKENS_PER_RESPONSE`
    /// - `WRAP_LIBRARY_URL`, `WRAP_LIBRARY_NAME`, `WRAP_RUNTIME_URL`
    ///
    /// Numeric values that fail to parse are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("WRAPWRIGHT_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup("WRAPWRIGHT_API_URL") {
            self.api_url = url;
        }
        if let Some(model) = lookup("GPT_MODEL") {
            self.model = model;
        }
        if let Some(raw) = lookup("CONTEXT_WINDOW_TOKENS") {
            match raw.trim().parse() {
                Ok(n) => self.context_window_tokens = n,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid CONTEXT_WINDOW_TOKENS"),
            }
        }
        if let Some(raw) = lookup("MAX_TOKENS_PER_RESPONSE") {
            match raw.trim().parse() {
                Ok(n) => self.max_tokens_per_response = n,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid MAX_TOKENS_PER_RESPONSE"),
            }
        }
        if let Some(url) = lookup("WRAP_LIBRARY_URL") {
            self.library.url = url;
        }
        if let Some(name) = lookup("WRAP_LIBRARY_NAME") {
            self.library.name = name;
        }
        if let Some(endpoint) = lookup("WRAP_RUNTIME_URL") {
            self.runtime.endpoint = endpoint;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".wrapwright")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        let reserved = self.max_tokens_per_response as usize + FUNCTION_DEFINITIONS_RESERVE;
        if reserved >= self.context_window_tokens {
            return Err(ConfigError::ValidationError(format!(
                "max_tokens_per_response ({}) plus {FUNCTION_DEFINITIONS_RESERVE} tokens for \
                 function definitions must be smaller than context_window_tokens ({})",
                self.max_tokens_per_response, self.context_window_tokens
            )));
        }

        if self.library.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "library.url must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: 0.0,
            context_window_tokens: default_context_window_tokens(),
            max_tokens_per_response: default_max_tokens_per_response(),
            transcript_dir: default_transcript_dir(),
            library: LibraryConfig::default(),
            runtime: RuntimeConfig::default(),
        }
    }
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
