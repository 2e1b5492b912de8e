//! Configuration loading and validation for Frontdesk.
//!
//! Loads from a TOML file (`FRONTDESK_CONFIG` or `./frontdesk.toml`) with
//! environment variable overrides. Every field has a default so a missing
//! file still yields a runnable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat orchestration settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Generation-endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Durable-store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// HTTP gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model sent on every completion request
    #[serde(default = "default_model")]
    pub model: String,

    /// Decoding temperature, pinned low for predictable phrasing
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token ceiling per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// How many reconstructed history messages reach the prompt
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Tenant used when a request names none
    #[serde(default = "default_client_id")]
    pub default_client_id: String,

    /// Reply sent when the model yields nothing usable
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    1200
}
fn default_history_limit() -> usize {
    20
}
fn default_client_id() -> String {
    "default".into()
}
fn default_fallback_reply() -> String {
    "申し訳ありません。現在お手続きできません。少し時間をおいてお試しください。".into()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            history_limit: default_history_limit(),
            default_client_id: default_client_id(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sqlite" or "memory"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// SQLite database path (ignored for the memory backend)
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_backend() -> String {
    "sqlite".into()
}
fn default_store_path() -> String {
    "frontdesk.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    ///
    /// Path resolution: `FRONTDESK_CONFIG` env var, else `./frontdesk.toml`.
    /// Environment overrides applied after the file:
    /// - `FRONTDESK_MODEL`
    /// - `FRONTDESK_STORE_PATH`
    /// - `FRONTDESK_PORT`
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("FRONTDESK_CONFIG").unwrap_or_else(|_| "frontdesk.toml".into());
        let mut config = Self::load_from(Path::new(&path))?;

        if let Ok(model) = std::env::var("FRONTDESK_MODEL") {
            config.chat.model = model;
        }
        if let Ok(path) = std::env::var("FRONTDESK_STORE_PATH") {
            config.store.path = path;
        }
        if let Ok(port) = std::env::var("FRONTDESK_PORT") {
            config.gateway.port = port
                .parse()
                .map_err(|_| ConfigError::ValidationError(format!("invalid port: {port}")))?;
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

    fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.temperature < 0.0 || self.chat.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "chat.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if self.chat.history_limit == 0 {
            return Err(ConfigError::ValidationError(
                "chat.history_limit must be at least 1".into(),
            ));
        }
        if self.store.backend != "sqlite" && self.store.backend != "memory" {
            return Err(ConfigError::ValidationError(format!(
                "unknown store backend: {}",
                self.store.backend
            )));
        }
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat: ChatConfig::default(),
            provider: ProviderConfig::default(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
        }
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
