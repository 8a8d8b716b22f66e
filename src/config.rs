//! Configuration for the assistant, loaded from TOML.
//!
//! Every section falls back to its defaults, so an empty file (or no file at
//! all) yields a working local setup.

use crate::error::{HearthError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HearthConfig {
    /// Inference server settings.
    pub llm: LlmConfig,
    /// Crawler service settings.
    pub crawler: CrawlerConfig,
    /// Web search settings.
    pub search: SearchSettings,
    /// Agent selection and limits.
    pub agent: AgentConfig,
    /// Audio device settings.
    pub audio: AudioConfig,
    /// Speech-to-text settings.
    pub stt: SttConfig,
    /// Text-to-speech settings.
    pub tts: TtsConfig,
    /// Log output settings.
    pub logging: LogConfig,
}

/// OpenAI-compatible inference server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL up to and including the API version, e.g. `http://host:8080/v1`.
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Bearer token. Local servers ignore it.
    pub api_key: String,
    /// Sampling temperature (None = server default).
    pub temperature: Option<f32>,
    /// Completion token cap (None = server default).
    pub max_tokens: Option<u32>,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/v1".to_owned(),
            model: "current".to_owned(),
            api_key: "not-needed".to_owned(),
            temperature: None,
            max_tokens: None,
            request_timeout_secs: 120,
        }
    }
}

impl LlmConfig {
    /// Environment variable overriding [`LlmConfig::api_key`].
    pub const API_KEY_ENV: &'static str = "OPENAI_API_KEY";
    /// Environment variable overriding [`LlmConfig::base_url`].
    pub const API_BASE_ENV: &'static str = "OPENAI_API_BASE";

    /// Apply `OPENAI_API_KEY` / `OPENAI_API_BASE` from the process
    /// environment. Blank values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(Self::API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_key = key;
        }
        if let Some(base) = lookup(Self::API_BASE_ENV).filter(|v| !v.trim().is_empty()) {
            self.base_url = base;
        }
    }
}

/// Crawler service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Full URL of the crawl endpoint.
    pub url: String,
    /// `timeoutSecs` sent by the page-reading tool.
    pub read_page_timeout_secs: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:3000/crawl".to_owned(),
            read_page_timeout_secs: 30,
        }
    }
}

/// Web search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of result URLs handed to the model.
    pub max_results: usize,
    /// Search request timeout in seconds.
    pub timeout_seconds: u64,
    /// Ask the engine for safe-search filtering.
    pub safe_search: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_results: 5,
            timeout_seconds: 8,
            safe_search: true,
        }
    }
}

impl SearchSettings {
    /// Convert to the search crate's configuration.
    pub fn to_search_config(&self) -> hearth_search::SearchConfig {
        hearth_search::SearchConfig {
            max_results: self.max_results,
            timeout_seconds: self.timeout_seconds,
            safe_search: self.safe_search,
            ..Default::default()
        }
    }
}

/// Agent selection and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Which built-in agent runs the conversation.
    pub name: String,
    /// Location placed in the prompt context.
    pub location: String,
    /// Model invocations allowed per user turn.
    pub max_iterations: usize,
    /// Speak replies in `chat` without passing `--speak`.
    pub speak_replies: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "root_agent".to_owned(),
            location: "Conshohocken, PA 19428".to_owned(),
            max_iterations: 8,
            speak_replies: false,
        }
    }
}

/// Audio device configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Sample rate delivered to the recognizer, in Hz.
    pub input_sample_rate: u32,
    /// Input device name (None = system default).
    pub input_device: Option<String>,
    /// Output device name (None = system default).
    pub output_device: Option<String>,
    /// Capacity, in audio buffers, of the capture queue.
    pub queue_capacity: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_sample_rate: 16_000,
            input_device: None,
            output_device: None,
            queue_capacity: 64,
        }
    }
}

/// Speech-to-text configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    /// Directory holding the Parakeet TDT ONNX export.
    pub model_dir: PathBuf,
    /// RMS energy above which a frame counts as speech.
    pub threshold: f32,
    /// Trailing silence that ends an utterance, in milliseconds.
    pub min_silence_ms: u32,
    /// Shortest utterance worth transcribing, in milliseconds.
    pub min_speech_ms: u32,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("stt/parakeet-tdt-0.6b-v3-onnx"),
            threshold: 0.01,
            min_silence_ms: 700,
            min_speech_ms: 250,
        }
    }
}

/// Text-to-speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    /// Piper voice model (`.onnx`, with its `.onnx.json` alongside).
    pub voice_model: PathBuf,
    /// Piper executable (None = look up `piper` on `PATH`).
    pub piper_binary: Option<PathBuf>,
    /// Send text to piper sentence by sentence so playback starts early.
    pub prefer_streaming: bool,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            voice_model: PathBuf::from("voice/en_US-amy-medium.onnx"),
            piper_binary: None,
            prefer_streaming: true,
        }
    }
}

/// Log output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directives. `RUST_LOG` wins when set.
    pub filter: Option<String>,
    /// Dump full model requests and tool payloads.
    pub debug: bool,
    /// Also write logs to this file.
    pub file: Option<PathBuf>,
    /// Print the model's reasoning ahead of each reply.
    pub show_reasoning: bool,
}

impl HearthConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| HearthError::Config(e.to_string()))
    }

    /// Load `path` if given, else the default path when it exists, else
    /// defaults. Environment overrides are applied and the result validated.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit or existing file cannot be loaded, or
    /// the resulting configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default = Self::default_config_path();
                if default.is_file() {
                    Self::from_file(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.llm.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HearthError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/hearth/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("hearth").join("config.toml")
        } else if let Some(config) = dirs::config_dir() {
            config.join("hearth").join("config.toml")
        } else {
            PathBuf::from("/tmp/hearth-config/config.toml")
        }
    }

    /// Reject settings that would make every turn fail.
    ///
    /// # Errors
    ///
    /// Returns [`HearthError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        fn http_url(field: &str, value: &str) -> Result<()> {
            match url::Url::parse(value) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => Ok(()),
                _ => Err(HearthError::Config(format!(
                    "{field} must be an http(s) URL, got {value:?}"
                ))),
            }
        }

        if self.llm.model.trim().is_empty() {
            return Err(HearthError::Config("llm.model must not be empty".into()));
        }
        http_url("llm.base_url", &self.llm.base_url)?;
        http_url("crawler.url", &self.crawler.url)?;
        if self.llm.request_timeout_secs == 0 {
            return Err(HearthError::Config(
                "llm.request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.crawler.read_page_timeout_secs == 0 {
            return Err(HearthError::Config(
                "crawler.read_page_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.search.timeout_seconds == 0 {
            return Err(HearthError::Config(
                "search.timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(HearthError::Config(
                "search.max_results must be greater than 0".into(),
            ));
        }
        if self.agent.max_iterations == 0 {
            return Err(HearthError::Config(
                "agent.max_iterations must be greater than 0".into(),
            ));
        }
        if self.audio.queue_capacity == 0 {
            return Err(HearthError::Config(
                "audio.queue_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
