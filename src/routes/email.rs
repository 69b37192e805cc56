//! Email bot HTTP surface.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;
use crate::routes::{Health, with_common_layers};
use crate::services::email::{self, Category, EmailError, EmailRequest, EmailStats};
use crate::state::EmailState;

const SERVICE_NAME: &str = "Email Automation Bot";

pub fn email_app(state: EmailState) -> Router {
    let routes = Router::new()
        .route("/send-email", post(send_email))
        .route("/email-stats", get(email_stats))
        .route("/health", get(health))
        .with_state(state);
    with_common_layers(routes)
}

#[derive(Debug, Serialize)]
pub struct EmailResponse {
    pub message_id: String,
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub ai_generated: bool,
    pub category: Category,
}

impl From<EmailError> for ApiError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Invalid(msg) => Self::BadRequest(msg),
        }
    }
}

async fn send_email(
    State(state): State<EmailState>,
    body: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<EmailResponse>, ApiError> {
    let Json(request) = body?;
    let record = email::send(&state, request).await?;
    Ok(Json(EmailResponse {
        message_id: record.id,
        status: "sent",
        timestamp: record.created_at,
        ai_generated: record.ai_generated,
        category: record.category,
    }))
}

async fn email_stats(State(state): State<EmailState>) -> Json<EmailStats> {
    Json(email::email_stats(&state, Utc::now()).await)
}

async fn health() -> Json<Health> {
    Json(Health::healthy(SERVICE_NAME))
}

#[cfg(test)]
#[path = "email_test.rs"]
mod tests;
