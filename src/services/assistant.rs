//! Assistant service: per-sender conversation memory plus one LLM reply.
//!
//! DESIGN
//! ======
//! A conversation is keyed by the sender id and holds at most
//! [`MAX_STORED_TURNS`] turns. The prompt context is built from a copy of the
//! last [`CONTEXT_TURNS`] turns, so no lock is held while the provider call is
//! in flight. A successful reply is appended atomically afterwards; two
//! concurrent messages from one sender may interleave but never lose a turn.
//!
//! A provider failure returns the apology text and leaves history untouched.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm::{ChatRequest, LlmChat};
use crate::state::AssistantState;
use crate::stats::{STATS_WINDOW, count_since};
use crate::store::Expiring;

pub const MAX_STORED_TURNS: usize = 10;
pub const CONTEXT_TURNS: usize = 5;
pub const UNKNOWN_SENDER: &str = "unknown";
pub const APOLOGY: &str = "I apologize, but I'm experiencing technical difficulties. Please try again later.";

const REPLY_MAX_TOKENS: u32 = 150;
const REPLY_TEMPERATURE: f32 = 0.7;
const BASE_SYSTEM_PROMPT: &str = "You are a helpful business assistant. Be professional, friendly, and concise.";

// =============================================================================
// CONVERSATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub user: String,
    pub bot: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub user_id: String,
    pub turns: Vec<Turn>,
    /// Time of the latest turn. Drives retention and the stats window.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    #[must_use]
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self { user_id: user_id.into(), turns: Vec::new(), updated_at: now }
    }

    /// Append a turn, dropping the oldest beyond [`MAX_STORED_TURNS`].
    pub fn push_turn(&mut self, turn: Turn) {
        self.updated_at = turn.timestamp;
        self.turns.push(turn);
        if self.turns.len() > MAX_STORED_TURNS {
            let excess = self.turns.len() - MAX_STORED_TURNS;
            self.turns.drain(..excess);
        }
    }

    /// The last [`CONTEXT_TURNS`] turns, oldest first.
    #[must_use]
    pub fn recent(&self) -> &[Turn] {
        let start = self.turns.len().saturating_sub(CONTEXT_TURNS);
        &self.turns[start..]
    }
}

impl Expiring for Conversation {
    fn created_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

// =============================================================================
// FAQ
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// FAQ entries grouped by topic, e.g. `{"general": [{question, answer}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaqDatabase(pub BTreeMap<String, Vec<FaqEntry>>);

impl FaqDatabase {
    pub fn entries(&self) -> impl Iterator<Item = &FaqEntry> {
        self.0.values().flatten()
    }
}

#[must_use]
pub fn default_faq() -> FaqDatabase {
    let general = vec![
        FaqEntry {
            question: "What are your business hours?".into(),
            answer: "We're open 24/7 for online support!".into(),
        },
        FaqEntry {
            question: "How can I contact support?".into(),
            answer: "You can reach us through this WhatsApp number or email us at support@company.com".into(),
        },
    ];
    FaqDatabase(BTreeMap::from([("general".to_string(), general)]))
}

/// Load the FAQ file. A missing, unreadable, or malformed file yields
/// [`default_faq`].
pub async fn load_faq(path: &Path) -> FaqDatabase {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no FAQ file; using default entries");
            return default_faq();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "FAQ file unreadable; using default entries");
            return default_faq();
        }
    };
    match serde_json::from_str::<FaqDatabase>(&raw) {
        Ok(faq) => {
            info!(path = %path.display(), entries = faq.entries().count(), "FAQ loaded");
            faq
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "FAQ file invalid; using default entries");
            default_faq()
        }
    }
}

// =============================================================================
// PROMPTS
// =============================================================================

#[must_use]
pub fn system_prompt(faq: &FaqDatabase) -> String {
    let mut prompt = BASE_SYSTEM_PROMPT.to_string();
    let mut entries = faq.entries().peekable();
    if entries.peek().is_some() {
        prompt.push_str("\n\nUse these FAQ entries when they answer the question:");
        for entry in entries {
            prompt.push_str(&format!("\nQ: {}\nA: {}", entry.question, entry.answer));
        }
    }
    prompt
}

/// Render prior turns as `User:`/`Bot:` lines followed by the new message.
#[must_use]
pub fn build_context(recent: &[Turn], message: &str) -> String {
    let mut lines = recent
        .iter()
        .map(|t| format!("User: {}\nBot: {}", t.user, t.bot))
        .collect::<Vec<_>>();
    lines.push(format!("User: {message}"));
    lines.join("\n")
}

// =============================================================================
// MAIN ENTRY POINTS
// =============================================================================

/// Outcome of one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// `false` when the apology fallback was sent and history was not touched.
    pub recorded: bool,
}

/// Generate a reply for `message` from `user_id` and record the turn.
pub async fn respond(state: &AssistantState, user_id: &str, message: &str) -> Reply {
    let recent = match state.conversations.get(user_id).await {
        Ok(conversation) => conversation.recent().to_vec(),
        Err(_) => Vec::new(),
    };

    let Some(llm) = state.llm.as_deref() else {
        warn!(user_id, "no LLM configured; sending apology");
        return Reply { text: APOLOGY.to_string(), recorded: false };
    };

    let request = ChatRequest::single(
        system_prompt(&state.faq),
        build_context(&recent, message),
        REPLY_MAX_TOKENS,
        REPLY_TEMPERATURE,
    );
    let Some(text) = complete(llm, &request).await else {
        return Reply { text: APOLOGY.to_string(), recorded: false };
    };

    let now = Utc::now();
    let turn = Turn { user: message.to_string(), bot: text.clone(), timestamp: now };
    let stored = state
        .conversations
        .update_or_insert(user_id, || Conversation::new(user_id, now), |c| {
            c.push_turn(turn);
            c.turns.len()
        })
        .await;

    info!(user_id, turns = stored, "assistant replied");
    Reply { text, recorded: true }
}

async fn complete(llm: &dyn LlmChat, request: &ChatRequest) -> Option<String> {
    match llm.chat(request).await {
        Ok(response) => Some(response.text.trim().to_string()),
        Err(e) => {
            tracing::error!(error = %e, "assistant completion failed");
            None
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssistantStats {
    pub total_conversations: usize,
    pub total_messages: usize,
    pub active_users: usize,
    pub last_24h: usize,
}

pub async fn assistant_stats(state: &AssistantState, now: DateTime<Utc>) -> AssistantStats {
    let conversations = state.conversations.snapshot().await;
    AssistantStats {
        total_conversations: conversations.len(),
        total_messages: conversations.iter().map(|c| c.turns.len()).sum(),
        active_users: conversations.iter().filter(|c| !c.turns.is_empty()).count(),
        last_24h: count_since(&conversations, now, STATS_WINDOW),
    }
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
