use super::*;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use tower::ServiceExt;

use crate::routes::test_support::{body_bytes, body_json, get, post_json};
use crate::state::test_helpers::{MockTts, voice_state};
use crate::sweep::sweep_once;

fn app(dir: &std::path::Path, tts: MockTts) -> (Router, VoiceState) {
    let state = voice_state(dir, Arc::new(tts), None);
    (voice_app(state.clone()), state)
}

#[tokio::test]
async fn generate_then_download_then_sweep() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app(dir.path(), MockTts::new(&[1u8; 16_000]));

    let response = app
        .clone()
        .oneshot(post_json(
            "/generate-voice",
            &serde_json::json!({ "text": "Hello", "voice_id": "21m00Tcm4TlvDq8ikWAM", "language": "en" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let audio_url = body["audio_url"].as_str().unwrap().to_string();
    assert!(audio_url.starts_with("/audio/"));
    assert!(body["duration"].as_f64().unwrap() > 0.0);
    assert_eq!(body["text"], "Hello");
    assert_eq!(body["voice_id"], "21m00Tcm4TlvDq8ikWAM");

    let response = app.clone().oneshot(get(&audio_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "audio/mpeg");
    let id = audio_url.trim_start_matches("/audio/");
    assert_eq!(
        response.headers()[CONTENT_DISPOSITION],
        format!("attachment; filename=\"voice_{id}.mp3\"").as_str()
    );
    assert_eq!(body_bytes(response).await.len(), 16_000);

    let later = Utc::now() + chrono::TimeDelta::days(2);
    assert_eq!(sweep_once(&state.records, later, Duration::from_secs(86_400)).await, 1);

    let response = app.oneshot(get(&audio_url)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["detail"], "Audio not found");
}

#[tokio::test]
async fn unknown_audio_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(dir.path(), MockTts::new(b"mp3"));
    let response = app.oneshot(get("/audio/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn synthesis_failure_is_generic_500() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app(dir.path(), MockTts::failing());

    let response = app
        .oneshot(post_json("/generate-voice", &serde_json::json!({ "text": "Hello" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, serde_json::json!({ "detail": "Voice generation failed" }));
    assert!(state.records.is_empty().await);
}

#[tokio::test]
async fn invalid_body_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(dir.path(), MockTts::new(b"mp3"));

    let response = app
        .clone()
        .oneshot(post_json("/generate-voice", &serde_json::json!({ "voice_id": "x" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json("/generate-voice", &serde_json::json!({ "text": "hi", "language": "xx" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"].as_str().unwrap().contains("xx"));
}

#[tokio::test]
async fn speed_outside_provider_range_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = app(dir.path(), MockTts::new(b"mp3"));

    let response = app
        .oneshot(post_json("/generate-voice", &serde_json::json!({ "text": "hi", "speed": 2.0 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["detail"].as_str().unwrap().contains("speed"));
    assert!(state.records.is_empty().await);
}

#[tokio::test]
async fn voices_lists_catalog_and_languages() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(dir.path(), MockTts::new(b"mp3"));

    let body = body_json(app.oneshot(get("/voices")).await.unwrap()).await;
    assert_eq!(body["total_voices"], 3);
    assert_eq!(body["voices"]["EXAVITQu4vr4xnSDxMaL"], "Bella");
    assert_eq!(body["languages"]["de"], "German");
    assert_eq!(body["live"], false);
}

#[tokio::test]
async fn stats_reflect_generation_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(dir.path(), MockTts::new(b"mp3"));

    app.clone()
        .oneshot(post_json("/generate-voice", &serde_json::json!({ "text": "Hola", "language": "es" })))
        .await
        .unwrap();

    let body = body_json(app.oneshot(get("/voice-stats")).await.unwrap()).await;
    assert_eq!(body["total_generations"], 1);
    assert_eq!(body["language_distribution"]["es"], 1);
    assert_eq!(body["voice_distribution"]["21m00Tcm4TlvDq8ikWAM"], 1);
    assert_eq!(body["last_24h"], 1);
}

#[tokio::test]
async fn health_reports_voice_count() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = app(dir.path(), MockTts::new(b"mp3"));

    let body = body_json(app.oneshot(get("/health")).await.unwrap()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], SERVICE_NAME);
    assert_eq!(body["voices_available"], 3);
    assert!(body["timestamp"].is_string());
}
