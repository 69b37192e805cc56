//! TTS types: provider-neutral voice catalog, synthesis request, and errors.

use serde::{Deserialize, Serialize};

/// Errors produced by TTS client operations.
#[derive(Debug, thiserror::Error)]
pub enum TtsError {
    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the TTS provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The TTS provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The TTS provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    /// The provider answered 200 with an empty audio body.
    #[error("provider returned no audio")]
    EmptyAudio,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// A voice offered by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
}

/// One synthesis call.
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: String,
    /// Playback speed multiplier; 1.0 is the provider's natural pace.
    pub speed: f32,
}

/// Provider-neutral async trait for speech synthesis. Enables mocking in tests.
#[async_trait::async_trait]
pub trait SpeechSynth: Send + Sync {
    /// Fetch the live voice catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`TtsError`] if the request fails or the body is malformed.
    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError>;

    /// Synthesize `request.text` and return encoded audio (MP3) bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`TtsError`] if the request fails or no audio is returned.
    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, TtsError>;
}
