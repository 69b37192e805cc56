use super::*;
use std::sync::Arc;

use chrono::TimeDelta;

use crate::state::test_helpers::{MockLlm, assistant_state};

fn turn(n: usize) -> Turn {
    Turn { user: format!("q{n}"), bot: format!("a{n}"), timestamp: Utc::now() }
}

// =============================================================================
// Conversation
// =============================================================================

#[test]
fn push_turn_caps_history() {
    let mut conversation = Conversation::new("u1", Utc::now());
    for n in 0..13 {
        conversation.push_turn(turn(n));
    }
    assert_eq!(conversation.turns.len(), MAX_STORED_TURNS);
    assert_eq!(conversation.turns[0].user, "q3");
    assert_eq!(conversation.turns[9].user, "q12");
}

#[test]
fn push_turn_advances_updated_at() {
    let start = Utc::now() - TimeDelta::hours(3);
    let mut conversation = Conversation::new("u1", start);
    let t = turn(0);
    let stamp = t.timestamp;
    conversation.push_turn(t);
    assert_eq!(conversation.updated_at, stamp);
    assert_eq!(Expiring::created_at(&conversation), stamp);
}

#[test]
fn recent_returns_last_five_oldest_first() {
    let mut conversation = Conversation::new("u1", Utc::now());
    assert!(conversation.recent().is_empty());
    for n in 0..8 {
        conversation.push_turn(turn(n));
    }
    let users = conversation.recent().iter().map(|t| t.user.as_str()).collect::<Vec<_>>();
    assert_eq!(users, ["q3", "q4", "q5", "q6", "q7"]);
}

// =============================================================================
// build_context / system_prompt
// =============================================================================

#[test]
fn context_without_history() {
    assert_eq!(build_context(&[], "hello"), "User: hello");
}

#[test]
fn context_with_history() {
    let context = build_context(&[turn(1), turn(2)], "next");
    assert_eq!(context, "User: q1\nBot: a1\nUser: q2\nBot: a2\nUser: next");
}

#[test]
fn system_prompt_includes_faq() {
    let prompt = system_prompt(&default_faq());
    assert!(prompt.starts_with(BASE_SYSTEM_PROMPT));
    assert!(prompt.contains("What are your business hours?"));
    assert!(prompt.contains("support@company.com"));
}

#[test]
fn system_prompt_empty_faq_is_base() {
    assert_eq!(system_prompt(&FaqDatabase::default()), BASE_SYSTEM_PROMPT);
}

// =============================================================================
// load_faq
// =============================================================================

#[tokio::test]
async fn load_faq_missing_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(load_faq(&dir.path().join("nope.json")).await, default_faq());
}

#[tokio::test]
async fn load_faq_invalid_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faq.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert_eq!(load_faq(&path).await, default_faq());
}

#[tokio::test]
async fn load_faq_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("faq.json");
    std::fs::write(
        &path,
        r#"{"shipping": [{"question": "Do you ship abroad?", "answer": "Yes, worldwide."}]}"#,
    )
    .unwrap();

    let faq = load_faq(&path).await;
    let entries = faq.entries().collect::<Vec<_>>();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].answer, "Yes, worldwide.");
    assert!(!faq.0.contains_key("general"));
}

// =============================================================================
// respond
// =============================================================================

#[tokio::test]
async fn respond_records_turn() {
    let llm = Arc::new(MockLlm::replying(&["Hi there!"]));
    let state = assistant_state(Some(llm.clone()));

    let reply = respond(&state, "+15550001", "hello").await;
    assert_eq!(reply, Reply { text: "Hi there!".into(), recorded: true });

    let conversation = state.conversations.get("+15550001").await.unwrap();
    assert_eq!(conversation.turns.len(), 1);
    assert_eq!(conversation.turns[0].user, "hello");
    assert_eq!(conversation.turns[0].bot, "Hi there!");

    let sent = llm.last_request().unwrap();
    assert_eq!(sent.max_tokens, 150);
    assert_eq!(sent.messages[0].content, "User: hello");
}

#[tokio::test]
async fn respond_uses_last_five_turns_as_context() {
    let llm = Arc::new(MockLlm::replying(&[]));
    let state = assistant_state(Some(llm.clone()));
    for n in 0..7 {
        respond(&state, "u1", &format!("m{n}")).await;
    }
    respond(&state, "u1", "final").await;

    let context = llm.last_request().unwrap().messages[0].content.clone();
    assert!(!context.contains("User: m1\n"));
    assert!(context.starts_with("User: m2\nBot: done"));
    assert!(context.ends_with("User: final"));
    assert_eq!(context.matches("Bot: ").count(), CONTEXT_TURNS);
}

#[tokio::test]
async fn respond_caps_stored_history() {
    let state = assistant_state(Some(Arc::new(MockLlm::replying(&[]))));
    for n in 0..12 {
        respond(&state, "u1", &format!("m{n}")).await;
    }
    let conversation = state.conversations.get("u1").await.unwrap();
    assert_eq!(conversation.turns.len(), MAX_STORED_TURNS);
    assert_eq!(conversation.turns[0].user, "m2");
}

#[tokio::test]
async fn respond_failure_apologizes_and_keeps_history() {
    let state = assistant_state(Some(Arc::new(MockLlm::failing())));
    let reply = respond(&state, "u1", "hello").await;
    assert_eq!(reply.text, APOLOGY);
    assert!(!reply.recorded);
    assert!(state.conversations.is_empty().await);
}

#[tokio::test]
async fn respond_without_llm_apologizes() {
    let state = assistant_state(None);
    let reply = respond(&state, "u1", "hello").await;
    assert_eq!(reply.text, APOLOGY);
    assert!(state.conversations.is_empty().await);
}

#[tokio::test]
async fn senders_have_separate_histories() {
    let state = assistant_state(Some(Arc::new(MockLlm::replying(&[]))));
    respond(&state, "a", "one").await;
    respond(&state, "b", "two").await;
    respond(&state, "a", "three").await;

    assert_eq!(state.conversations.get("a").await.unwrap().turns.len(), 2);
    assert_eq!(state.conversations.get("b").await.unwrap().turns.len(), 1);
}

// =============================================================================
// assistant_stats
// =============================================================================

#[tokio::test]
async fn stats_sum_turns_and_window() {
    let state = assistant_state(None);
    let now = Utc::now();

    let mut fresh = Conversation::new("fresh", now);
    fresh.push_turn(Turn { user: "a".into(), bot: "b".into(), timestamp: now });
    fresh.push_turn(Turn { user: "c".into(), bot: "d".into(), timestamp: now });
    let mut stale = Conversation::new("stale", now);
    stale.push_turn(Turn { user: "e".into(), bot: "f".into(), timestamp: now - TimeDelta::hours(30) });

    state.conversations.insert("fresh", fresh).await;
    state.conversations.insert("stale", stale).await;

    let stats = assistant_stats(&state, now).await;
    assert_eq!(stats.total_conversations, 2);
    assert_eq!(stats.total_messages, 3);
    assert_eq!(stats.active_users, 2);
    assert_eq!(stats.last_24h, 1);
}
