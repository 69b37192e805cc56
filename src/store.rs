//! Ephemeral interaction store.
//!
//! DESIGN
//! ======
//! One `InteractionStore<R>` per service, constructed at startup and injected
//! into handlers through the service state. Records live only in process
//! memory behind a single `RwLock`; nothing survives a restart.
//!
//! The lock is never held across provider I/O. Readers that aggregate take a
//! `snapshot()` so the sweep can run while they count.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// A record with a creation time and an optionally owned artifact file.
pub trait Expiring {
    /// Time used for retention and the trailing stats window.
    fn created_at(&self) -> DateTime<Utc>;

    /// File exclusively owned by this record, deleted when it is evicted.
    fn artifact_path(&self) -> Option<&Path> {
        None
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
}

/// Process-local map from generated identifier to record.
pub struct InteractionStore<R> {
    records: Arc<RwLock<HashMap<String, R>>>,
}

impl<R> Clone for InteractionStore<R> {
    fn clone(&self) -> Self {
        Self { records: Arc::clone(&self.records) }
    }
}

impl<R> Default for InteractionStore<R> {
    fn default() -> Self {
        Self { records: Arc::new(RwLock::new(HashMap::new())) }
    }
}

impl<R> InteractionStore<R>
where
    R: Expiring + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record stored under `id`.
    pub async fn insert(&self, id: impl Into<String>, record: R) {
        self.records.write().await.insert(id.into(), record);
    }

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no record has that id.
    pub async fn get(&self, id: &str) -> Result<R, StoreError> {
        self.records
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Apply `f` to the record under `id`, inserting `default()` first when
    /// absent. Runs under one write lock so concurrent updates never clobber
    /// each other.
    pub async fn update_or_insert<T>(
        &self,
        id: &str,
        default: impl FnOnce() -> R,
        f: impl FnOnce(&mut R) -> T,
    ) -> T {
        let mut records = self.records.write().await;
        let record = records.entry(id.to_string()).or_insert_with(default);
        f(record)
    }

    /// Owned copy of every record for read-only aggregation.
    pub async fn snapshot(&self) -> Vec<R> {
        self.records.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Remove and return every record older than `retention` at `now`.
    ///
    /// Records exactly at the boundary are kept.
    pub async fn remove_expired(&self, now: DateTime<Utc>, retention: Duration) -> Vec<R> {
        let mut records = self.records.write().await;
        let expired = records
            .iter()
            .filter(|(_, record)| crate::sweep::is_expired(record.created_at(), now, retention))
            .map(|(id, _)| id.clone())
            .collect::<Vec<_>>();
        expired
            .iter()
            .filter_map(|id| records.remove(id))
            .collect()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
