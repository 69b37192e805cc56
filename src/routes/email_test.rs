use super::*;
use std::sync::Arc;

use axum::http::StatusCode;
use tower::ServiceExt;

use crate::routes::test_support::{body_json, get, post_json};
use crate::state::test_helpers::{MockLlm, email_state};

fn payload(auto_reply: bool) -> serde_json::Value {
    serde_json::json!({
        "to_email": "customer@example.com",
        "subject": "Where is my order?",
        "content": "It has been two weeks.",
        "priority": "high",
        "auto_reply": auto_reply,
    })
}

#[tokio::test]
async fn send_email_returns_receipt() {
    let app = email_app(email_state(Some(Arc::new(MockLlm::replying(&["support"])))));

    let response = app.oneshot(post_json("/send-email", &payload(false))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["message_id"].as_str().unwrap().starts_with("msg_"));
    assert_eq!(body["status"], "sent");
    assert_eq!(body["category"], "support");
    assert_eq!(body["ai_generated"], false);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn auto_reply_flags_ai_generated() {
    let llm = Arc::new(MockLlm::replying(&["support", "We are looking into it."]));
    let app = email_app(email_state(Some(llm)));

    let body = body_json(app.oneshot(post_json("/send-email", &payload(true))).await.unwrap()).await;
    assert_eq!(body["ai_generated"], true);
}

#[tokio::test]
async fn invalid_address_is_400() {
    let app = email_app(email_state(None));
    let mut bad = payload(false);
    bad["to_email"] = "not-an-address".into();

    let response = app.oneshot(post_json("/send-email", &bad)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_priority_is_400() {
    let app = email_app(email_state(None));
    let mut bad = payload(false);
    bad["priority"] = "whenever".into();

    let response = app.oneshot(post_json("/send-email", &bad)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "invalid request body");
}

#[tokio::test]
async fn stats_count_sent_mail() {
    let state = email_state(None);
    let app = email_app(state);

    for _ in 0..2 {
        app.clone().oneshot(post_json("/send-email", &payload(false))).await.unwrap();
    }

    let body = body_json(app.oneshot(get("/email-stats")).await.unwrap()).await;
    assert_eq!(body["total_emails"], 2);
    assert_eq!(body["ai_generated"], 0);
    assert_eq!(body["category_distribution"]["general"], 2);
    assert_eq!(body["priority_distribution"]["high"], 2);
    assert_eq!(body["last_24h"], 2);
}

#[tokio::test]
async fn health_has_no_voice_count() {
    let app = email_app(email_state(None));
    let body = body_json(app.oneshot(get("/health")).await.unwrap()).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], SERVICE_NAME);
    assert!(body.get("voices_available").is_none());
}
