//! Voice bot HTTP surface.

use std::collections::BTreeMap;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::{Health, with_common_layers};
use crate::services::voice::{self, VoiceError, VoiceRequest, VoiceStats};
use crate::state::VoiceState;

const SERVICE_NAME: &str = "ElevenLabs Voice Bot";

pub fn voice_app(state: VoiceState) -> Router {
    let routes = Router::new()
        .route("/generate-voice", post(generate_voice))
        .route("/audio/{id}", get(get_audio))
        .route("/voices", get(list_voices))
        .route("/voice-stats", get(voice_stats))
        .route("/health", get(health))
        .with_state(state);
    with_common_layers(routes)
}

#[derive(Debug, Serialize)]
pub struct VoiceResponse {
    pub audio_url: String,
    pub duration: f64,
    pub text: String,
    pub voice_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: BTreeMap<String, String>,
    pub languages: BTreeMap<&'static str, &'static str>,
    pub total_voices: usize,
    /// `false` when the built-in fallback voices are being served.
    pub live: bool,
}

impl From<VoiceError> for ApiError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::Invalid(msg) => Self::BadRequest(msg),
            other => Self::internal("Voice generation failed", other),
        }
    }
}

async fn generate_voice(
    State(state): State<VoiceState>,
    body: Result<Json<VoiceRequest>, JsonRejection>,
) -> Result<Json<VoiceResponse>, ApiError> {
    let Json(request) = body?;
    let record = voice::generate(&state, request).await?;
    Ok(Json(VoiceResponse {
        audio_url: format!("/audio/{}", record.id),
        duration: record.duration(),
        text: record.text,
        voice_id: record.voice_id,
        timestamp: record.created_at,
    }))
}

async fn get_audio(
    State(state): State<VoiceState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.records.get(&id).await.map_err(|_| ApiError::NotFound("Audio"))?;
    let bytes = match tokio::fs::read(&record.file_path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ApiError::NotFound("Audio")),
        Err(e) => return Err(ApiError::internal("Audio unavailable", e)),
    };
    let disposition = format!("attachment; filename=\"voice_{id}.mp3\"");
    Ok(([(CONTENT_TYPE, "audio/mpeg".to_string()), (CONTENT_DISPOSITION, disposition)], bytes))
}

async fn list_voices(State(state): State<VoiceState>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        voices: state.catalog.voices.clone(),
        languages: voice::languages(),
        total_voices: state.catalog.len(),
        live: state.catalog.live,
    })
}

async fn voice_stats(State(state): State<VoiceState>) -> Json<VoiceStats> {
    Json(voice::voice_stats(&state, Utc::now()).await)
}

async fn health(State(state): State<VoiceState>) -> Json<Health> {
    Json(Health { voices_available: Some(state.catalog.len()), ..Health::healthy(SERVICE_NAME) })
}

#[cfg(test)]
#[path = "voice_test.rs"]
mod tests;
