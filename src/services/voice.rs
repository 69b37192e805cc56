//! Voice service: text → optional translation → speech → temp audio file.
//!
//! DESIGN
//! ======
//! A generation validates the request, optionally rewrites the text into the
//! target language with one LLM call, synthesizes MP3 bytes with one TTS call,
//! writes them to `voice_{id}.mp3` under the audio directory, and records the
//! interaction. The record owns the file; the retention sweep deletes both.
//!
//! Translation is best-effort (original text on any failure). Synthesis and
//! file writes are not: either one failing aborts the request.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm::{ChatRequest, LlmChat};
use crate::state::VoiceState;
use crate::stats::{STATS_WINDOW, count_by, count_since};
use crate::store::Expiring;
use crate::tts::{SpeechRequest, SpeechSynth, TtsError};

pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_EMOTION: &str = "neutral";
pub const MAX_TEXT_CHARS: usize = 5000;
/// Speaking-rate range the TTS provider accepts.
pub const MIN_SPEED: f32 = 0.7;
pub const MAX_SPEED: f32 = 1.2;

/// Rough MP3 bitrate used to estimate playback length from the byte count.
const BYTES_PER_SECOND: f64 = 16_000.0;

const TRANSLATE_MAX_TOKENS: u32 = 200;
const TRANSLATE_TEMPERATURE: f32 = 0.7;
const TRANSLATE_SYSTEM: &str =
    "You are a language expert. Translate and optimize text for natural voice synthesis.";

/// Voices offered when the live catalog cannot be fetched.
pub const FALLBACK_VOICES: [(&str, &str); 3] = [
    ("21m00Tcm4TlvDq8ikWAM", "Rachel"),
    ("AZnzlk1XvdvUeBnXmlld", "Domi"),
    ("EXAVITQu4vr4xnSDxMaL", "Bella"),
];

/// Supported language codes and their display names.
pub const LANGUAGES: [(&str, &str); 9] = [
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ar", "Arabic"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("speech synthesis failed: {0}")]
    Synthesis(#[from] TtsError),
    #[error("audio file write failed: {0}")]
    Storage(#[from] std::io::Error),
}

/// Body of `POST /generate-voice`.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceRequest {
    pub text: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default = "default_emotion")]
    pub emotion: String,
}

fn default_voice_id() -> String {
    DEFAULT_VOICE_ID.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_speed() -> f32 {
    1.0
}

fn default_emotion() -> String {
    DEFAULT_EMOTION.to_string()
}

/// One generated clip. Owns the audio file at `file_path`.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceRecord {
    pub id: String,
    /// Text actually spoken (after translation).
    pub text: String,
    pub voice_id: String,
    pub language: String,
    pub speed: f32,
    pub emotion: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub file_path: PathBuf,
    pub byte_len: usize,
}

impl VoiceRecord {
    /// Approximate playback length in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        estimate_duration(self.byte_len)
    }
}

impl Expiring for VoiceRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn artifact_path(&self) -> Option<&Path> {
        Some(&self.file_path)
    }
}

/// Voice id → display name, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceCatalog {
    pub voices: BTreeMap<String, String>,
    /// `false` when the fallback set is in use.
    pub live: bool,
}

impl VoiceCatalog {
    #[must_use]
    pub fn fallback() -> Self {
        let voices = FALLBACK_VOICES
            .iter()
            .map(|(id, name)| ((*id).to_string(), (*name).to_string()))
            .collect();
        Self { voices, live: false }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.voices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceStats {
    pub total_generations: usize,
    pub language_distribution: BTreeMap<String, usize>,
    pub voice_distribution: BTreeMap<String, usize>,
    pub last_24h: usize,
}

// =============================================================================
// HELPERS
// =============================================================================

#[must_use]
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

#[must_use]
pub fn languages() -> BTreeMap<&'static str, &'static str> {
    LANGUAGES.iter().copied().collect()
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn estimate_duration(byte_len: usize) -> f64 {
    byte_len as f64 / BYTES_PER_SECOND
}

#[must_use]
pub fn audio_path(audio_dir: &Path, id: &str) -> PathBuf {
    audio_dir.join(format!("voice_{id}.mp3"))
}

/// Check field values that serde cannot express.
///
/// # Errors
///
/// Returns [`VoiceError::Invalid`] describing the first offending field.
pub fn validate(request: &VoiceRequest) -> Result<(), VoiceError> {
    if request.text.trim().is_empty() {
        return Err(VoiceError::Invalid("text must not be empty".into()));
    }
    if request.text.chars().count() > MAX_TEXT_CHARS {
        return Err(VoiceError::Invalid(format!("text exceeds {MAX_TEXT_CHARS} characters")));
    }
    if request.voice_id.trim().is_empty() {
        return Err(VoiceError::Invalid("voice_id must not be empty".into()));
    }
    if language_name(&request.language).is_none() {
        return Err(VoiceError::Invalid(format!("unsupported language: {}", request.language)));
    }
    if !(MIN_SPEED..=MAX_SPEED).contains(&request.speed) {
        return Err(VoiceError::Invalid(format!("speed must be between {MIN_SPEED} and {MAX_SPEED}")));
    }
    Ok(())
}

/// Fetch the live voice catalog, falling back to the built-in set.
pub async fn load_catalog(tts: &dyn SpeechSynth) -> VoiceCatalog {
    match tts.list_voices().await {
        Ok(voices) if !voices.is_empty() => {
            info!(count = voices.len(), "voice catalog loaded");
            VoiceCatalog { voices: voices.into_iter().map(|v| (v.voice_id, v.name)).collect(), live: true }
        }
        Ok(_) => {
            warn!("voice catalog empty; using fallback voices");
            VoiceCatalog::fallback()
        }
        Err(e) => {
            warn!(error = %e, "voice catalog unavailable; using fallback voices");
            VoiceCatalog::fallback()
        }
    }
}

/// Rewrite `text` into `language` for synthesis. English text, a missing
/// LLM, or any provider failure returns the input unchanged.
pub async fn localize_text(llm: Option<&dyn LlmChat>, text: &str, language: &str) -> String {
    if language == DEFAULT_LANGUAGE {
        return text.to_string();
    }
    let Some(llm) = llm else {
        return text.to_string();
    };
    let target = language_name(language).unwrap_or("English");
    let prompt = format!("Translate this text to {target} and make it natural for voice synthesis: {text}");
    let request = ChatRequest::single(TRANSLATE_SYSTEM, prompt, TRANSLATE_MAX_TOKENS, TRANSLATE_TEMPERATURE);
    match llm.chat(&request).await {
        Ok(response) => response.text.trim().to_string(),
        Err(e) => {
            warn!(error = %e, language, "translation failed; speaking original text");
            text.to_string()
        }
    }
}

// =============================================================================
// MAIN ENTRY POINTS
// =============================================================================

/// Generate one clip and record it.
///
/// # Errors
///
/// Returns [`VoiceError::Invalid`] for bad input, [`VoiceError::Synthesis`]
/// when the provider fails, or [`VoiceError::Storage`] when the audio file
/// cannot be written.
pub async fn generate(state: &VoiceState, request: VoiceRequest) -> Result<VoiceRecord, VoiceError> {
    validate(&request)?;

    let text = localize_text(state.llm.as_deref(), &request.text, &request.language).await;
    let audio = state
        .tts
        .synthesize(&SpeechRequest { text: text.clone(), voice_id: request.voice_id.clone(), speed: request.speed })
        .await?;

    let id = Uuid::new_v4().to_string();
    let file_path = audio_path(&state.audio_dir, &id);
    tokio::fs::write(&file_path, &audio).await?;

    let record = VoiceRecord {
        id: id.clone(),
        text,
        voice_id: request.voice_id,
        language: request.language,
        speed: request.speed,
        emotion: request.emotion,
        created_at: Utc::now(),
        file_path,
        byte_len: audio.len(),
    };
    state.records.insert(id, record.clone()).await;

    info!(
        id = %record.id,
        voice_id = %record.voice_id,
        language = %record.language,
        bytes = record.byte_len,
        "voice generated"
    );
    Ok(record)
}

/// Aggregate generation counts from a store snapshot.
pub async fn voice_stats(state: &VoiceState, now: DateTime<Utc>) -> VoiceStats {
    let records = state.records.snapshot().await;
    VoiceStats {
        total_generations: records.len(),
        language_distribution: count_by(&records, |r| r.language.as_str()),
        voice_distribution: count_by(&records, |r| r.voice_id.as_str()),
        last_24h: count_since(&records, now, STATS_WINDOW),
    }
}

#[cfg(test)]
#[path = "voice_test.rs"]
mod tests;
