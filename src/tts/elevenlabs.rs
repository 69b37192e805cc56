//! `ElevenLabs` text-to-speech client.
//!
//! Two endpoints: `GET /voices` for the catalog and
//! `POST /text-to-speech/{voice_id}` which answers with MP3 bytes.

use serde::{Deserialize, Serialize};

use super::config::TtsConfig;
use super::types::{SpeechRequest, SpeechSynth, TtsError, Voice};
use crate::config::build_http_client;

const DEFAULT_STABILITY: f32 = 0.5;
const DEFAULT_SIMILARITY_BOOST: f32 = 0.75;

pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ElevenLabsClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: TtsConfig) -> Result<Self, TtsError> {
        let http = build_http_client(config.timeouts).map_err(|e| TtsError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key: config.api_key, base_url: config.base_url, model: config.model })
    }

    /// # Errors
    ///
    /// Returns an error if the key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, TtsError> {
        Self::new(TtsConfig::from_env()?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, TtsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(TtsError::ApiResponse { status: status.as_u16(), body })
    }
}

#[async_trait::async_trait]
impl SpeechSynth for ElevenLabsClient {
    async fn list_voices(&self) -> Result<Vec<Voice>, TtsError> {
        let response = self
            .http
            .get(format!("{}/voices", self.base_url))
            .header("xi-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| TtsError::ApiRequest(e.to_string()))?;
        let text = Self::check(response)
            .await?
            .text()
            .await
            .map_err(|e| TtsError::ApiRequest(e.to_string()))?;
        parse_voices(&text)
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<Vec<u8>, TtsError> {
        let body = SynthesisBody {
            text: &request.text,
            model_id: &self.model,
            voice_settings: VoiceSettings {
                stability: DEFAULT_STABILITY,
                similarity_boost: DEFAULT_SIMILARITY_BOOST,
                speed: request.speed,
            },
        };
        let response = self
            .http
            .post(format!("{}/text-to-speech/{}", self.base_url, request.voice_id))
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await
            .map_err(|e| TtsError::ApiRequest(e.to_string()))?;
        let audio = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| TtsError::ApiRequest(e.to_string()))?;
        if audio.is_empty() {
            return Err(TtsError::EmptyAudio);
        }
        Ok(audio.to_vec())
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct SynthesisBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
    speed: f32,
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<Voice>,
}

fn parse_voices(json: &str) -> Result<Vec<Voice>, TtsError> {
    let parsed: VoicesResponse = serde_json::from_str(json).map_err(|e| TtsError::ApiParse(e.to_string()))?;
    Ok(parsed.voices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_voices_ignores_extra_fields() {
        let json = serde_json::json!({
            "voices": [
                { "voice_id": "21m00Tcm4TlvDq8ikWAM", "name": "Rachel", "category": "premade" },
                { "voice_id": "AZnzlk1XvdvUeBnXmlld", "name": "Domi", "labels": {} }
            ]
        })
        .to_string();
        let voices = parse_voices(&json).unwrap();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0], Voice { voice_id: "21m00Tcm4TlvDq8ikWAM".into(), name: "Rachel".into() });
    }

    #[test]
    fn parse_voices_rejects_malformed_body() {
        assert!(matches!(parse_voices(r#"{"items":[]}"#), Err(TtsError::ApiParse(_))));
    }

    #[test]
    fn synthesis_body_shape() {
        let body = SynthesisBody {
            text: "Hello",
            model_id: "eleven_monolingual_v1",
            voice_settings: VoiceSettings { stability: 0.5, similarity_boost: 0.75, speed: 1.0 },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["text"], "Hello");
        assert_eq!(value["model_id"], "eleven_monolingual_v1");
        assert_eq!(value["voice_settings"]["speed"], 1.0);
        assert_eq!(value["voice_settings"]["similarity_boost"], 0.75);
    }
}
