//! In-memory reply store.
//!
//! Behaves like the SQL backends (ids start at 1 and only grow) and keeps
//! counters so tests can assert how the store was used.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{PersistenceError, ReplyQuery, ReplyStore, SortOrder};
use crate::domain::{NewReply, ReplyRecord};

/// Process-local store backed by a `Vec`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<ReplyRecord>>,
    failure: Option<PersistenceError>,
    record_calls: AtomicUsize,
    initialize_calls: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose writes always fail with `error`.
    #[must_use]
    pub fn failing(error: PersistenceError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Number of `record` calls, successful or not.
    #[must_use]
    pub fn record_calls(&self) -> usize {
        self.record_calls.load(Ordering::SeqCst)
    }

    /// Number of `initialize` calls.
    #[must_use]
    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored row in insertion order.
    pub async fn rows(&self) -> Vec<ReplyRecord> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl ReplyStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn initialize(&self) -> Result<(), PersistenceError> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn record(&self, reply: NewReply) -> Result<ReplyRecord, PersistenceError> {
        self.record_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let mut rows = self.rows.write().await;
        let id = rows.last().map_or(1, |last| last.id.saturating_add(1));
        let record = ReplyRecord::from_new(id, reply);
        rows.push(record.clone());
        Ok(record)
    }

    async fn list(&self, query: &ReplyQuery) -> Result<Vec<ReplyRecord>, PersistenceError> {
        let rows = self.rows.read().await;
        let matching = rows
            .iter()
            .filter(|r| query.platform.is_none_or(|p| r.platform == p));
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        let selected: Vec<ReplyRecord> = match query.order {
            SortOrder::OldestFirst => matching.take(limit).cloned().collect(),
            SortOrder::NewestFirst => matching.rev().take(limit).cloned().collect(),
        };
        Ok(selected)
    }

    async fn platform_counts(&self) -> Result<BTreeMap<String, u64>, PersistenceError> {
        let rows = self.rows.read().await;
        let mut counts = BTreeMap::new();
        for row in rows.iter() {
            *counts.entry(row.platform.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
