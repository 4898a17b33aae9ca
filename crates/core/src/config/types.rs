use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::suggest::{LlmProvider, RemoteConfig, SuggestionConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    /// Remote suggester; rule engine only when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum concurrent board sessions.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// Close sessions untouched for this many seconds. 0 keeps them forever.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl ServerConfig {
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        (self.session_idle_secs > 0).then(|| Duration::from_secs(self.session_idle_secs))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_sessions: default_max_sessions(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_max_sessions() -> usize {
    256
}

fn default_session_idle_secs() -> u64 {
    1800
}

/// Vocabulary source configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VocabularyConfig {
    /// JSON word list. The bundled seed vocabulary is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub vocabulary: VocabularyConfig,
    pub suggestions: SuggestionConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<SanitizedRemoteConfig>,
}

/// Sanitized remote config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRemoteConfig {
    pub provider: LlmProvider,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub max_vocabulary: usize,
    pub max_suggestions: usize,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            vocabulary: config.vocabulary.clone(),
            suggestions: config.suggestions.clone(),
            remote: config.remote.as_ref().map(|r| SanitizedRemoteConfig {
                provider: r.provider,
                model: r.model.clone(),
                api_base: r.api_base.clone(),
                api_key_configured: r.api_key.as_ref().is_some_and(|k| !k.is_empty()),
                timeout_secs: r.timeout_secs,
                max_vocabulary: r.max_vocabulary,
                max_suggestions: r.max_suggestions,
            }),
        }
    }
}
