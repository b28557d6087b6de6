use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::enrichment::WorkerConfig;

/// Application configuration module
/// This module handles the glossary configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// How candidate terms are recognized
    #[serde(default)]
    pub ner_mode: NerMode,

    /// Chat-completion backend settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Minimum occurrences for a term to be kept
    #[serde(default = "default_count_threshold")]
    pub count_threshold: usize,

    /// Translate the surface form of every term
    #[serde(default = "default_true")]
    pub translate_surface: bool,

    /// Translate the context of person terms
    #[serde(default = "default_true")]
    pub translate_context_person: bool,

    /// Translate the context of every other category
    #[serde(default = "default_true")]
    pub translate_context_other: bool,

    /// Language the glossary is translated into
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Surfaces that are never accepted as terms
    #[serde(default)]
    pub blacklist: Vec<String>,

    /// Person names shorter than this do not knock out terms containing them (0 = no guard)
    #[serde(default)]
    pub duplication_min_length: usize,

    /// Re-pack contexts under this many tokens before context translation
    #[serde(default)]
    pub context_clip_tokens: Option<usize>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Named-entity recognition mode
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NerMode {
    // @mode: Katakana-run heuristic with final counts, no merge pass
    #[default]
    Traditional,
    // @mode: Pluggable recognizer; observations are merged and recounted
    External,
}

impl std::fmt::Display for NerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Traditional => write!(f, "traditional"),
            Self::External => write!(f, "external"),
        }
    }
}

impl std::str::FromStr for NerMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "traditional" => Ok(Self::Traditional),
            "external" => Ok(Self::External),
            _ => Err(anyhow!("Invalid NER mode: {}", s)),
        }
    }
}

/// OpenAI-compatible backend configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BackendConfig {
    // @field: Service URL, with or without the /v1 suffix
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: API key
    #[serde(default = "default_api_key")]
    pub api_key: String,

    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Timeout seconds per request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: default_api_key(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            concurrent_requests: default_concurrent_requests(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_count_threshold() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_target_language() -> String {
    "Chinese".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_api_key() -> String {
    "sk-no-key-required".to_string()
}

fn default_model() -> String {
    "glm-4-9b-chat".to_string()
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_concurrent_requests() -> usize {
    4
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.backend.endpoint)
            .with_context(|| format!("Invalid backend endpoint: {}", self.backend.endpoint))?;

        if self.backend.model.trim().is_empty() {
            return Err(anyhow!("A backend model name is required"));
        }
        if self.backend.api_key.trim().is_empty() {
            return Err(anyhow!("A backend API key is required, use any placeholder for local servers"));
        }
        if self.backend.timeout_secs == 0 {
            return Err(anyhow!("Backend timeout must be at least one second"));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("A target language is required"));
        }
        if self.context_clip_tokens == Some(0) {
            return Err(anyhow!("context_clip_tokens must be positive when set"));
        }

        Ok(())
    }

    /// Immutable settings handed to the enrichment workers
    pub fn to_worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            model: self.backend.model.clone(),
            target_language: self.target_language.clone(),
            timeout: Duration::from_secs(self.backend.timeout_secs),
            concurrency: self.backend.concurrent_requests.max(1),
        }
    }

    /// Read a JSON configuration file, or create it with defaults when missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            ner_mode: NerMode::default(),
            backend: BackendConfig::default(),
            count_threshold: default_count_threshold(),
            translate_surface: true,
            translate_context_person: true,
            translate_context_other: true,
            target_language: default_target_language(),
            blacklist: Vec::new(),
            duplication_min_length: 0,
            context_clip_tokens: None,
            log_level: LogLevel::default(),
        }
    }
}
