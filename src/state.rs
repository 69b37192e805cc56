//! Shared service state.
//!
//! DESIGN
//! ======
//! Each bot gets its own state struct, injected into Axum handlers via the
//! `State` extractor. Cloning is cheap: stores share one map and providers sit
//! behind `Arc`. Provider handles are trait objects so tests can swap in mocks.
//! An LLM handle of `None` means no provider was configured; every caller has
//! a deterministic fallback for that case.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::llm::LlmChat;
use crate::services::assistant::{Conversation, FaqDatabase};
use crate::services::email::EmailRecord;
use crate::services::voice::{VoiceCatalog, VoiceRecord};
use crate::store::InteractionStore;
use crate::tts::SpeechSynth;

// =============================================================================
// VOICE
// =============================================================================

#[derive(Clone)]
pub struct VoiceState {
    pub records: InteractionStore<VoiceRecord>,
    pub tts: Arc<dyn SpeechSynth>,
    pub llm: Option<Arc<dyn LlmChat>>,
    pub catalog: Arc<VoiceCatalog>,
    /// Directory the generated MP3 files are written to.
    pub audio_dir: PathBuf,
}

impl VoiceState {
    #[must_use]
    pub fn new(
        tts: Arc<dyn SpeechSynth>,
        llm: Option<Arc<dyn LlmChat>>,
        catalog: VoiceCatalog,
        audio_dir: PathBuf,
    ) -> Self {
        Self { records: InteractionStore::new(), tts, llm, catalog: Arc::new(catalog), audio_dir }
    }
}

// =============================================================================
// EMAIL
// =============================================================================

#[derive(Clone)]
pub struct EmailState {
    pub records: InteractionStore<EmailRecord>,
    pub llm: Option<Arc<dyn LlmChat>>,
    /// Simulated transport latency before a message is logged as delivered.
    pub delivery_delay: Duration,
}

impl EmailState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, delivery_delay: Duration) -> Self {
        Self { records: InteractionStore::new(), llm, delivery_delay }
    }
}

// =============================================================================
// ASSISTANT
// =============================================================================

#[derive(Clone)]
pub struct AssistantState {
    /// Conversation history keyed by sender id.
    pub conversations: InteractionStore<Conversation>,
    pub llm: Option<Arc<dyn LlmChat>>,
    pub faq: Arc<FaqDatabase>,
}

impl AssistantState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, faq: FaqDatabase) -> Self {
        Self { conversations: InteractionStore::new(), llm, faq: Arc::new(faq) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
