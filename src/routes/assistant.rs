//! Assistant bot HTTP surface: the messaging-provider webhook plus stats.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::routes::{Health, with_common_layers};
use crate::services::assistant::{self, AssistantStats, UNKNOWN_SENDER};
use crate::state::AssistantState;

const SERVICE_NAME: &str = "WhatsApp Automation Bot";
const NO_TEXT: &str = "No text message received";

pub fn assistant_app(state: AssistantState) -> Router {
    let routes = Router::new()
        .route("/webhook", post(webhook))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .with_state(state);
    with_common_layers(routes)
}

// =============================================================================
// ENVELOPE
// =============================================================================

/// Inbound provider payload: `{"message": {"from": .., "text": {"body": ..}}}`.
/// Every level is optional.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(default)]
    pub message: InboundMessage,
}

#[derive(Debug, Default, Deserialize)]
pub struct InboundMessage {
    pub from: Option<String>,
    pub text: Option<InboundText>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InboundText {
    #[serde(default)]
    pub body: String,
}

impl WebhookEnvelope {
    fn sender(&self) -> &str {
        self.message.from.as_deref().unwrap_or(UNKNOWN_SENDER)
    }

    fn body(&self) -> Option<&str> {
        self.message
            .text
            .as_ref()
            .map(|t| t.body.as_str())
            .filter(|b| !b.is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WebhookResponse {
    Reply { status: &'static str, response: String, user_id: String },
    Ignored { status: &'static str, message: &'static str },
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn webhook(
    State(state): State<AssistantState>,
    body: Result<Json<WebhookEnvelope>, JsonRejection>,
) -> Result<Json<WebhookResponse>, ApiError> {
    let Json(envelope) = body?;
    let user_id = envelope.sender().to_string();

    let Some(text) = envelope.body() else {
        info!(user_id = %user_id, "webhook without text");
        return Ok(Json(WebhookResponse::Ignored { status: "success", message: NO_TEXT }));
    };

    let reply = assistant::respond(&state, &user_id, text).await;
    info!(user_id = %user_id, recorded = reply.recorded, "webhook answered");
    Ok(Json(WebhookResponse::Reply { status: "success", response: reply.text, user_id }))
}

async fn stats(State(state): State<AssistantState>) -> Json<AssistantStats> {
    Json(assistant::assistant_stats(&state, Utc::now()).await)
}

async fn health() -> Json<Health> {
    Json(Health::healthy(SERVICE_NAME))
}

#[cfg(test)]
#[path = "assistant_test.rs"]
mod tests;
