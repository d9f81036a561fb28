//! Runtime configuration for the chat context window

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors, all fatal and reported before the first turn.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },

    #[error("unknown tokenizer encoding: {0}")]
    UnknownEncoding(String),

    #[error("tokenizer initialization failed: {0}")]
    Tokenizer(String),
}

/// Settings for one chat deployment.
///
/// Endpoint, deployment, and API key are required; everything else has a
/// serviceable default. `embeddings_deployment` is carried for callers
/// that share this configuration with an embeddings pipeline; the core
/// never reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub endpoint: String,
    pub deployment: String,
    pub api_key: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default)]
    pub embeddings_deployment: Option<String>,

    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,

    /// Tokens reserved for the model reply, also sent as `max_tokens`.
    #[serde(default = "default_reply_max_tokens")]
    pub reply_max_tokens: usize,

    #[serde(default = "default_tokenizer_encoding")]
    pub tokenizer_encoding: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_version() -> String {
    "2024-02-01".to_string()
}
fn default_max_context_tokens() -> usize {
    8192
}
fn default_reply_max_tokens() -> usize {
    1024
}
fn default_tokenizer_encoding() -> String {
    "cl100k_base".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// Load settings from `CHAT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            endpoint: required("CHAT_ENDPOINT")?,
            deployment: required("CHAT_DEPLOYMENT")?,
            api_key: required("CHAT_API_KEY")?,
            api_version: env::var("CHAT_API_VERSION").unwrap_or_else(|_| default_api_version()),
            embeddings_deployment: env::var("CHAT_EMBEDDINGS_DEPLOYMENT").ok(),
            max_context_tokens: parsed("CHAT_MAX_CONTEXT_TOKENS", default_max_context_tokens())?,
            reply_max_tokens: parsed("CHAT_REPLY_MAX_TOKENS", default_reply_max_tokens())?,
            tokenizer_encoding: env::var("CHAT_TOKENIZER_ENCODING")
                .unwrap_or_else(|_| default_tokenizer_encoding()),
            temperature: parsed("CHAT_TEMPERATURE", default_temperature())?,
            request_timeout_secs: parsed("CHAT_TIMEOUT_SECS", default_timeout_secs())?,
        })
    }

    /// Request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_chat_vars() {
        for name in [
            "CHAT_ENDPOINT",
            "CHAT_DEPLOYMENT",
            "CHAT_API_KEY",
            "CHAT_API_VERSION",
            "CHAT_EMBEDDINGS_DEPLOYMENT",
            "CHAT_MAX_CONTEXT_TOKENS",
            "CHAT_REPLY_MAX_TOKENS",
            "CHAT_TOKENIZER_ENCODING",
            "CHAT_TEMPERATURE",
            "CHAT_TIMEOUT_SECS",
        ] {
            std::env::remove_var(name);
        }
    }

    // Single test so the process-wide environment is not mutated from
    // two tests at once.
    #[test]
    fn test_from_env_round_trip() {
        clear_chat_vars();

        // Missing required settings fail pre-flight.
        let err = Settings::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("CHAT_ENDPOINT")));

        std::env::set_var("CHAT_ENDPOINT", "https://example.openai.azure.com");
        std::env::set_var("CHAT_DEPLOYMENT", "gpt-4o");
        std::env::set_var("CHAT_API_KEY", "test-key");

        // Defaults apply for everything optional.
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.api_version, "2024-02-01");
        assert_eq!(settings.max_context_tokens, 8192);
        assert_eq!(settings.reply_max_tokens, 1024);
        assert_eq!(settings.tokenizer_encoding, "cl100k_base");
        assert_eq!(settings.embeddings_deployment, None);
        assert_eq!(settings.timeout(), Duration::from_secs(30));

        // Overrides are honored.
        std::env::set_var("CHAT_MAX_CONTEXT_TOKENS", "4096");
        std::env::set_var("CHAT_TEMPERATURE", "0");
        std::env::set_var("CHAT_EMBEDDINGS_DEPLOYMENT", "text-embedding-3-small");
        let settings = Settings::from_env().unwrap();
        assert_eq!(settings.max_context_tokens, 4096);
        assert_eq!(settings.temperature, 0.0);
        assert_eq!(
            settings.embeddings_deployment.as_deref(),
            Some("text-embedding-3-small")
        );

        // Malformed numerics are fatal, not silently defaulted.
        std::env::set_var("CHAT_MAX_CONTEXT_TOKENS", "lots");
        let err = Settings::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar {
                name: "CHAT_MAX_CONTEXT_TOKENS",
                ..
            }
        ));

        clear_chat_vars();
    }
}
