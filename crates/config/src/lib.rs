//! Configuration loading, validation, and management for Wayfinder.
//!
//! Loads configuration from `~/.wayfinder/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.wayfinder/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the generative model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for classification and answers
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature for answers
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per generated answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Session store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// External data (weather/attractions) configuration
    #[serde(default)]
    pub external: ExternalConfig,

    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_model() -> String {
    "gemini-1.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    800
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
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("store", &self.store)
            .field("external", &self.external)
            .field("engine", &self.engine)
            .finish()
    }
}

/// Where session facts and transcripts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "memory" or "file"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Directory for the file backend. Defaults to `~/.wayfinder/sessions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_store_backend() -> String {
    "memory".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            data_dir: None,
        }
    }
}

impl StoreConfig {
    /// The resolved directory for the file backend.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("sessions"))
    }
}

/// External data fetcher configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    /// OpenWeatherMap API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_api_key: Option<String>,

    /// Geoapify API key (attractions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attractions_api_key: Option<String>,

    /// How long a fetched payload stays fresh
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Per-fetch deadline
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    3600
}
fn default_fetch_timeout_secs() -> u64 {
    10
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            weather_api_key: None,
            attractions_api_key: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for ExternalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalConfig")
            .field("weather_api_key", &redact(&self.weather_api_key))
            .field("attractions_api_key", &redact(&self.attractions_api_key))
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .finish()
    }
}

/// Per-turn engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// How many recent turns feed the classifier and the gate
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Deadline for the primary classifier before the pattern fallback
    #[serde(default = "default_classifier_timeout_secs")]
    pub classifier_timeout_secs: u64,
}

fn default_history_window() -> usize {
    6
}
fn default_classifier_timeout_secs() -> u64 {
    20
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            classifier_timeout_secs: default_classifier_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.wayfinder/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `WAYFINDER_API_KEY` (highest priority)
    /// - `GOOGLE_AI_API_KEY`
    /// - `WEATHER_API_KEY` for the weather fetcher
    /// - `GEOAPIFY_API_KEY` for the attractions fetcher
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = Self::config_dir();
        let config_path = config_dir.join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("WAYFINDER_API_KEY")
                .ok()
                .or_else(|| std::env::var("GOOGLE_AI_API_KEY").ok());
        }

        if config.external.weather_api_key.is_none() {
            config.external.weather_api_key = std::env::var("WEATHER_API_KEY").ok();
        }

        if config.external.attractions_api_key.is_none() {
            config.external.attractions_api_key = std::env::var("GEOAPIFY_API_KEY").ok();
        }

        // Allow env var to override the model
        if let Ok(model) = std::env::var("WAYFINDER_MODEL") {
            config.model = model;
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
        dirs_home().join(".wayfinder")
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

        if self.store.backend != "memory" && self.store.backend != "file" {
            return Err(ConfigError::ValidationError(format!(
                "unknown store backend '{}', expected 'memory' or 'file'",
                self.store.backend
            )));
        }

        if self.external.cache_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "cache_ttl_secs must be greater than 0".into(),
            ));
        }

        if self.engine.history_window == 0 {
            return Err(ConfigError::ValidationError(
                "history_window must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if the generative-model API key is available.
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
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            store: StoreConfig::default(),
            external: ExternalConfig::default(),
            engine: EngineConfig::default(),
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
