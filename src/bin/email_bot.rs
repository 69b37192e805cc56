use relaybots::config::{self, EMAIL_BOT_PORT, ServiceConfig};
use relaybots::state::EmailState;
use relaybots::sweep::{SweepConfig, spawn_sweeper};
use relaybots::{llm, routes, server};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    server::init_tracing();

    let config = ServiceConfig::from_env(EMAIL_BOT_PORT);
    let state = EmailState::new(llm::from_env_optional(), config::delivery_delay());

    let shutdown = CancellationToken::new();
    let sweeper = spawn_sweeper("email", state.records.clone(), SweepConfig::from(&config), shutdown.clone());

    let app = routes::email_app(state);
    server::serve("email-bot", &config, app, shutdown)
        .await
        .expect("server failed");
    let _ = sweeper.await;
}
