//! TTS configuration parsed from environment variables.

use super::types::TtsError;
use crate::config::{HttpTimeouts, env_parse};

pub const DEFAULT_ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_monolingual_v1";
pub const DEFAULT_TTS_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TTS_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtsConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeouts: HttpTimeouts,
}

impl TtsConfig {
    /// Build typed TTS config from environment variables.
    ///
    /// Required:
    /// - `ELEVENLABS_API_KEY`
    ///
    /// Optional:
    /// - `ELEVENLABS_BASE_URL`: default public API
    /// - `ELEVENLABS_MODEL`: default `eleven_monolingual_v1`
    /// - `TTS_REQUEST_TIMEOUT_SECS`: default 120
    /// - `TTS_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::MissingApiKey`] when the key is unset or blank.
    pub fn from_env() -> Result<Self, TtsError> {
        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| TtsError::MissingApiKey { var: "ELEVENLABS_API_KEY".into() })?;
        let base_url = std::env::var("ELEVENLABS_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_ELEVENLABS_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = std::env::var("ELEVENLABS_MODEL").unwrap_or_else(|_| DEFAULT_ELEVENLABS_MODEL.to_string());
        let timeouts = HttpTimeouts {
            request_secs: env_parse("TTS_REQUEST_TIMEOUT_SECS", DEFAULT_TTS_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("TTS_CONNECT_TIMEOUT_SECS", DEFAULT_TTS_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { api_key, base_url, model, timeouts })
    }
}
