//! Configuration loading, validation, and management for WebPilot.
//!
//! Loads configuration from `~/.webpilot/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.webpilot/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the inference endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Which model each step role uses
    #[serde(default)]
    pub models: ModelsConfig,

    /// Sampling temperature for every model request
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Optional bound on reasoning cycles (absent = run until finish)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cycles: Option<u64>,

    /// Where to write the transcript on terminal completion
    #[serde(default = "default_transcript_path")]
    pub transcript_path: PathBuf,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_transcript_path() -> PathBuf {
    PathBuf::from("output.json")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .field("models", &self.models)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_cycles", &self.max_cycles)
            .field("transcript_path", &self.transcript_path)
            .finish()
    }
}

/// Model assignment per step role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Thinking steps that plan or evaluate
    #[serde(default = "default_planner_model")]
    pub planner: String,

    /// Execution steps that select tools via native tool calls
    #[serde(default = "default_executor_model")]
    pub executor: String,

    /// Steps that look at screenshots (text-only tool convention)
    #[serde(default = "default_vision_model")]
    pub vision: String,
}

fn default_planner_model() -> String {
    "gpt-4-turbo-2024-04-09".into()
}
fn default_executor_model() -> String {
    "gpt-4-0125-preview".into()
}
fn default_vision_model() -> String {
    "gpt-4-vision-preview".into()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            planner: default_planner_model(),
            executor: default_executor_model(),
            vision: default_vision_model(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.webpilot/config.toml).
    ///
    /// Environment variable overrides:
    /// - `WEBPILOT_API_KEY` (highest priority), then `OPENAI_API_KEY`
    /// - `OPENAI_API_BASE_URL` overrides `api_url`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("WEBPILOT_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(url) = std::env::var("OPENAI_API_BASE_URL") {
            config.api_url = url;
        }

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
        dirs_home().join(".webpilot")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }

        if let Some(0) = self.max_cycles {
            return Err(ConfigError::ValidationError(
                "max_cycles must be greater than 0 when set".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            models: ModelsConfig::default(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_cycles: None,
            transcript_path: default_transcript_path(),
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
