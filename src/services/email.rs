//! Email service: categorize, optionally draft a reply, simulate delivery.
//!
//! DESIGN
//! ======
//! `send` validates the request, asks the LLM for a category label, and when
//! `auto_reply` is set asks for a drafted reply that replaces the outgoing
//! body. The record is stored before the delivery task is spawned, so stats
//! see the message immediately.
//!
//! ERROR HANDLING
//! ==============
//! Only validation fails the request. Every provider failure degrades: an
//! unusable category reply becomes `general`, and a failed draft becomes the
//! canned acknowledgement with `ai_generated = false`.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::llm::{ChatRequest, LlmChat};
use crate::state::EmailState;
use crate::stats::{STATS_WINDOW, count_by, count_since};
use crate::store::Expiring;

pub const CANNED_REPLY: &str = "Thank you for your email. We will get back to you shortly.";
const CONTENT_PREVIEW_CHARS: usize = 500;
const ID_SUFFIX_LEN: usize = 6;

const CATEGORIZE_MAX_TOKENS: u32 = 50;
const CATEGORIZE_TEMPERATURE: f32 = 0.3;
const CATEGORIZE_SYSTEM: &str = "You are an email categorization expert. Return only the category name.";

const REPLY_MAX_TOKENS: u32 = 200;
const REPLY_TEMPERATURE: f32 = 0.7;

// =============================================================================
// CATEGORY / PRIORITY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Support,
    Sales,
    Billing,
    General,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Support, Self::Sales, Self::Billing, Self::General];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Support => "support",
            Self::Sales => "sales",
            Self::Billing => "billing",
            Self::General => "general",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Support => "Customer support inquiries",
            Self::Sales => "Sales and lead generation",
            Self::Billing => "Billing and payment issues",
            Self::General => "General inquiries",
        }
    }

    /// Map a model reply to a label. Anything but an exact (trimmed,
    /// case-insensitive) label match is `General`.
    #[must_use]
    pub fn from_reply(reply: &str) -> Self {
        let label = reply.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == label)
            .unwrap_or(Self::General)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Body of `POST /send-email`. An unknown `priority` is rejected by serde.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    pub to_email: String,
    pub subject: String,
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_requested_category")]
    pub category: String,
    #[serde(default)]
    pub auto_reply: bool,
}

fn default_requested_category() -> String {
    Category::General.as_str().to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailRecord {
    pub id: String,
    pub to: String,
    pub subject: String,
    /// Outgoing body: the drafted reply when one was generated.
    pub content: String,
    pub category: Category,
    /// Caller-supplied category hint, kept for reference only.
    pub requested_category: String,
    pub priority: Priority,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
    pub ai_generated: bool,
}

impl Expiring for EmailRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Serialize)]
pub struct EmailStats {
    pub total_emails: usize,
    pub ai_generated: usize,
    pub category_distribution: BTreeMap<String, usize>,
    pub priority_distribution: BTreeMap<String, usize>,
    pub last_24h: usize,
}

// =============================================================================
// HELPERS
// =============================================================================

/// Trim and lowercase an address; `None` unless it is `local@domain`.
#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || normalized.contains(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

/// `msg_YYYYmmdd_HHMMSS_xxxxxx`. The random suffix keeps ids unique within
/// one second.
#[must_use]
pub fn message_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("msg_{}_{suffix}", now.format("%Y%m%d_%H%M%S"))
}

/// Validate and normalize a request in place.
///
/// # Errors
///
/// Returns [`EmailError::Invalid`] for a malformed address or an empty
/// subject or body.
pub fn validate(request: &mut EmailRequest) -> Result<(), EmailError> {
    request.to_email = normalize_email(&request.to_email)
        .ok_or_else(|| EmailError::Invalid("to_email must be a valid address".into()))?;
    if request.subject.trim().is_empty() {
        return Err(EmailError::Invalid("subject must not be empty".into()));
    }
    if request.content.trim().is_empty() {
        return Err(EmailError::Invalid("content must not be empty".into()));
    }
    Ok(())
}

#[must_use]
pub fn categorize_prompt(subject: &str, content: &str) -> String {
    let preview: String = content.chars().take(CONTENT_PREVIEW_CHARS).collect();
    let labels = Category::ALL
        .iter()
        .map(|c| format!("{} ({})", c.as_str(), c.description()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Subject: {subject}\nContent: {preview}\n\n\
         Categorize this email into one of these categories: {labels}. Return only the category name."
    )
}

/// Ask the model for a category. No LLM or any failure yields `General`.
pub async fn categorize(llm: Option<&dyn LlmChat>, subject: &str, content: &str) -> Category {
    let Some(llm) = llm else {
        return Category::General;
    };
    let request = ChatRequest::single(
        CATEGORIZE_SYSTEM,
        categorize_prompt(subject, content),
        CATEGORIZE_MAX_TOKENS,
        CATEGORIZE_TEMPERATURE,
    );
    match llm.chat(&request).await {
        Ok(response) => Category::from_reply(&response.text),
        Err(e) => {
            warn!(error = %e, "categorization failed; using general");
            Category::General
        }
    }
}

/// Draft a reply body for `content`. `None` when no LLM is configured or the
/// call fails.
pub async fn draft_reply(llm: Option<&dyn LlmChat>, content: &str, category: Category) -> Option<String> {
    let llm = llm?;
    let system = format!(
        "You are a professional customer service representative. Generate a helpful, professional \
         response for a {} email. Keep it concise and friendly.",
        category.as_str()
    );
    let request = ChatRequest::single(system, content, REPLY_MAX_TOKENS, REPLY_TEMPERATURE);
    match llm.chat(&request).await {
        Ok(response) => Some(response.text.trim().to_string()).filter(|t| !t.is_empty()),
        Err(e) => {
            warn!(error = %e, "reply drafting failed; using canned reply");
            None
        }
    }
}

/// Simulated transport: wait `delay`, then log the delivery.
pub fn spawn_delivery(record: &EmailRecord, delay: Duration) -> JoinHandle<()> {
    let id = record.id.clone();
    let to = record.to.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        info!(message_id = %id, to = %to, "email delivered");
    })
}

// =============================================================================
// MAIN ENTRY POINTS
// =============================================================================

/// Process one outgoing email and record it.
///
/// # Errors
///
/// Returns [`EmailError::Invalid`] when validation fails. Provider failures
/// never surface.
pub async fn send(state: &EmailState, mut request: EmailRequest) -> Result<EmailRecord, EmailError> {
    validate(&mut request)?;

    let llm = state.llm.as_deref();
    let category = categorize(llm, &request.subject, &request.content).await;

    let (content, ai_generated) = if request.auto_reply {
        match draft_reply(llm, &request.content, category).await {
            Some(reply) => (reply, true),
            None => (CANNED_REPLY.to_string(), false),
        }
    } else {
        (request.content, false)
    };

    let now = Utc::now();
    let record = EmailRecord {
        id: message_id(now),
        to: request.to_email,
        subject: request.subject,
        content,
        category,
        requested_category: request.category,
        priority: request.priority,
        created_at: now,
        ai_generated,
    };
    state.records.insert(record.id.clone(), record.clone()).await;
    let _delivery = spawn_delivery(&record, state.delivery_delay);

    info!(
        message_id = %record.id,
        category = record.category.as_str(),
        priority = record.priority.as_str(),
        ai_generated,
        "email queued"
    );
    Ok(record)
}

pub async fn email_stats(state: &EmailState, now: DateTime<Utc>) -> EmailStats {
    let records = state.records.snapshot().await;
    EmailStats {
        total_emails: records.len(),
        ai_generated: records.iter().filter(|r| r.ai_generated).count(),
        category_distribution: count_by(&records, |r| r.category.as_str()),
        priority_distribution: count_by(&records, |r| r.priority.as_str()),
        last_24h: count_since(&records, now, STATS_WINDOW),
    }
}

#[cfg(test)]
#[path = "email_test.rs"]
mod tests;
