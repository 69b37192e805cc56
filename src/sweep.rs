//! Retention sweep: periodic eviction of expired interaction records.
//!
//! DESIGN
//! ======
//! A background task ticks every `sweep_interval`, removes records older than
//! `retention` from the store, then deletes the artifact files those records
//! owned. The task is independent of request volume and stops when the
//! service's shutdown token is cancelled.
//!
//! ERROR HANDLING
//! ==============
//! Artifact deletion is best-effort. A file that is already gone or cannot be
//! removed is logged at debug level; the record is evicted regardless. Nothing
//! here is ever reported to a caller.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::store::{Expiring, InteractionStore};

/// Timing knobs for one sweeper task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    pub retention: Duration,
    pub interval: Duration,
}

impl From<&crate::config::ServiceConfig> for SweepConfig {
    fn from(config: &crate::config::ServiceConfig) -> Self {
        Self { retention: config.retention, interval: config.sweep_interval }
    }
}

/// `true` when `now - created_at` strictly exceeds `retention`.
#[must_use]
pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>, retention: Duration) -> bool {
    let Ok(retention) = TimeDelta::from_std(retention) else {
        // Too large to represent: nothing can be that old.
        return false;
    };
    now.signed_duration_since(created_at) > retention
}

/// Run one sweep pass and return how many records were evicted.
pub async fn sweep_once<R>(store: &InteractionStore<R>, now: DateTime<Utc>, retention: Duration) -> usize
where
    R: Expiring + Clone,
{
    if store.is_empty().await {
        return 0;
    }
    let removed = store.remove_expired(now, retention).await;
    for record in &removed {
        if let Some(path) = record.artifact_path() {
            remove_artifact(path).await;
        }
    }
    removed.len()
}

async fn remove_artifact(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "sweep: artifact deleted"),
        Err(e) => debug!(path = %path.display(), error = %e, "sweep: artifact not deleted"),
    }
}

/// Spawn the periodic sweeper for `store`. Returns a handle for shutdown.
pub fn spawn_sweeper<R>(
    name: &'static str,
    store: InteractionStore<R>,
    config: SweepConfig,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    R: Expiring + Clone + Send + Sync + 'static,
{
    info!(
        store = name,
        retention_secs = config.retention.as_secs(),
        interval_secs = config.interval.as_secs(),
        "retention sweep configured"
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = shutdown.cancelled() => {
                    debug!(store = name, "retention sweep stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let evicted = sweep_once(&store, Utc::now(), config.retention).await;
                    if evicted > 0 {
                        let remaining = store.len().await;
                        info!(store = name, evicted, remaining, "retention sweep evicted records");
                    }
                }
            }
        }
    })
}

#[cfg(test)]
#[path = "sweep_test.rs"]
mod tests;
