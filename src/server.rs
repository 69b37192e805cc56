//! Process bootstrap shared by the bot binaries.
//!
//! Every binary follows the same sequence: load `.env`, install the tracing
//! subscriber, build its state, spawn its sweeper, then `serve` until Ctrl-C or
//! SIGTERM. Shutdown cancels the token the sweeper listens on.

use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::config::ServiceConfig;

/// Load `.env` (if any) and install the fmt subscriber. `RUST_LOG` overrides
/// the default `info` filter.
pub fn init_tracing() {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Bind `config.bind_addr()` and serve `app` until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error when the address is invalid, the bind fails, or the
/// server stops with an I/O error.
pub async fn serve(
    name: &'static str,
    config: &ServiceConfig,
    app: Router,
    shutdown: CancellationToken,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(service = name, %addr, "listening");

    let token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_signal(token).await;
            tracing::info!(service = name, "shutting down");
        })
        .await?;

    shutdown.cancel();
    Ok(())
}

/// Resolve on Ctrl-C, SIGTERM, or an external cancel, and cancel `token`.
async fn wait_for_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "ctrl-c handler failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
        () = token.cancelled() => {}
    }
    token.cancel();
}
