use std::sync::Arc;

use relaybots::config::{self, ServiceConfig, VOICE_BOT_PORT};
use relaybots::services::voice;
use relaybots::state::VoiceState;
use relaybots::sweep::{SweepConfig, spawn_sweeper};
use relaybots::tts::ElevenLabsClient;
use relaybots::{llm, routes, server};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    server::init_tracing();

    let config = ServiceConfig::from_env(VOICE_BOT_PORT);
    let tts = Arc::new(ElevenLabsClient::from_env().expect("TTS client init failed (is ELEVENLABS_API_KEY set?)"));
    let llm = llm::from_env_optional();

    let audio_dir = config::audio_dir();
    tokio::fs::create_dir_all(&audio_dir)
        .await
        .expect("audio directory not writable");

    let catalog = voice::load_catalog(tts.as_ref()).await;
    let state = VoiceState::new(tts, llm, catalog, audio_dir);

    let shutdown = CancellationToken::new();
    let sweeper = spawn_sweeper("voice", state.records.clone(), SweepConfig::from(&config), shutdown.clone());

    let app = routes::voice_app(state);
    server::serve("voice-bot", &config, app, shutdown)
        .await
        .expect("server failed");
    let _ = sweeper.await;
}
