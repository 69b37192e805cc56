use relaybots::config::{self, ASSISTANT_BOT_PORT, ServiceConfig};
use relaybots::services::assistant;
use relaybots::state::AssistantState;
use relaybots::sweep::{SweepConfig, spawn_sweeper};
use relaybots::{llm, routes, server};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    server::init_tracing();

    let config = ServiceConfig::from_env(ASSISTANT_BOT_PORT);
    let faq = assistant::load_faq(&config::faq_path()).await;
    let state = AssistantState::new(llm::from_env_optional(), faq);

    let shutdown = CancellationToken::new();
    let sweeper = spawn_sweeper(
        "assistant",
        state.conversations.clone(),
        SweepConfig::from(&config),
        shutdown.clone(),
    );

    let app = routes::assistant_app(state);
    server::serve("assistant-bot", &config, app, shutdown)
        .await
        .expect("server failed");
    let _ = sweeper.await;
}
