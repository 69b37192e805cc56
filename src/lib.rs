//! relaybots: three small AI-backed web bots sharing one runtime core.
//!
//! - `voice-bot`: text to speech with optional translation.
//! - `email-bot`: categorize outgoing mail and optionally draft the reply.
//! - `assistant-bot`: conversational webhook with per-sender memory.
//!
//! Each bot keeps its interactions in an [`store::InteractionStore`] that a
//! periodic [`sweep`] task trims to the retention window.

pub mod config;
pub mod error;
pub mod llm;
pub mod routes;
pub mod server;
pub mod services;
pub mod state;
pub mod stats;
pub mod store;
pub mod sweep;
pub mod tts;
