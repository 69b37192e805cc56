//! TTS: text-to-speech provider adapter for the voice bot.
//!
//! The voice service only depends on the `SpeechSynth` trait; the concrete
//! `ElevenLabsClient` is wired in by the binary.

pub mod config;
pub mod elevenlabs;
pub mod types;

pub use elevenlabs::ElevenLabsClient;
pub use types::{SpeechRequest, SpeechSynth, TtsError, Voice};
