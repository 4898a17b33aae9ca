//! Suggestion subsystem configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Orchestrator tuning: debounce, cache, circuit breaker, timeout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Quiet period after a sentence change before the remote call is issued.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum number of cached remote results.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Consecutive remote failures that open the circuit breaker.
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// How long the breaker stays open once tripped.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Upper bound on a single remote call (0 = no limit).
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_cache_capacity() -> usize {
    20
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cooldown_ms() -> u64 {
    60_000
}

fn default_remote_timeout_ms() -> u64 {
    10_000
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            cache_capacity: default_cache_capacity(),
            failure_threshold: default_failure_threshold(),
            cooldown_ms: default_cooldown_ms(),
            remote_timeout_ms: default_remote_timeout_ms(),
        }
    }
}

impl SuggestionConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn remote_timeout(&self) -> Option<Duration> {
        (self.remote_timeout_ms > 0).then(|| Duration::from_millis(self.remote_timeout_ms))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_capacity == 0 {
            return Err("suggestions.cache_capacity must be at least 1".to_string());
        }
        if self.failure_threshold == 0 {
            return Err("suggestions.failure_threshold must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Remote completion backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Google Gemini `generateContent` API.
    Gemini,
    /// Local Ollama instance.
    Ollama,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::Ollama => "ollama",
        }
    }
}

/// Remote (LLM-backed) suggester configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub provider: LlmProvider,
    /// Model name/identifier.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Custom API base URL (for proxies or self-hosted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Vocabulary entries listed in the prompt.
    #[serde(default = "default_max_vocabulary")]
    pub max_vocabulary: usize,
    /// Suggestions kept from the reply.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_model() -> String {
    "gemini-2.5-flash-lite".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_output_tokens() -> u32 {
    100
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_vocabulary() -> usize {
    150
}

fn default_max_suggestions() -> usize {
    6
}

impl RemoteConfig {
    /// Config for the given provider with every other field at its default.
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            provider,
            model: default_model(),
            api_key: None,
            api_base: None,
            timeout_secs: default_timeout(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            max_vocabulary: default_max_vocabulary(),
            max_suggestions: default_max_suggestions(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.is_empty() {
            return Err("remote.model cannot be empty".to_string());
        }
        // Ollama runs locally without a key; Gemini needs a key unless proxied
        if self.provider == LlmProvider::Gemini
            && self.api_key.is_none()
            && self.api_base.is_none()
        {
            return Err("remote provider gemini requires api_key or api_base".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("remote.timeout_secs must be at least 1".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "remote.temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if self.max_vocabulary == 0 || self.max_suggestions == 0 {
            return Err("remote.max_vocabulary and remote.max_suggestions must be at least 1".to_string());
        }
        Ok(())
    }
}
