//! Persistence gateway: the `replies` table behind one trait.
//!
//! [`ReplyStore`] is implemented by a local SQLite file store, a remote
//! PostgreSQL store and an in-memory store. Exactly one is selected at
//! startup by [`connect`]; callers never branch on the backend.

pub mod memory;
pub mod postgres;
pub mod sqlite;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::domain::{NewReply, Platform, ReplyRecord, UnknownPlatform, parse_timestamp};

/// Storage failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// The store could not be opened or reached.
    #[error("database connection failed: {0}")]
    Connect(String),

    /// A statement failed.
    #[error("database query failed: {0}")]
    Query(String),

    /// A stored row could not be decoded.
    #[error("corrupt reply row {id}: {reason}")]
    Corrupt {
        /// Row id.
        id: i64,
        /// What could not be decoded.
        reason: String,
    },
}

/// Row ordering by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Highest id first.
    #[default]
    NewestFirst,
    /// Lowest id first.
    OldestFirst,
}

impl SortOrder {
    const fn sql(self) -> &'static str {
        match self {
            Self::NewestFirst => " ORDER BY id DESC",
            Self::OldestFirst => " ORDER BY id ASC",
        }
    }
}

/// Filter for [`ReplyStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplyQuery {
    /// Only rows for this platform.
    pub platform: Option<Platform>,
    /// Row order.
    pub order: SortOrder,
    /// Maximum rows returned.
    pub limit: Option<u32>,
}

impl ReplyQuery {
    /// The `limit` most recent rows.
    #[must_use]
    pub const fn newest(limit: u32) -> Self {
        Self {
            platform: None,
            order: SortOrder::NewestFirst,
            limit: Some(limit),
        }
    }

    /// Every row in insertion order.
    #[must_use]
    pub const fn everything() -> Self {
        Self {
            platform: None,
            order: SortOrder::OldestFirst,
            limit: None,
        }
    }

    /// Restricts the query to one platform.
    #[must_use]
    pub const fn for_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }
}

/// Capability set of a reply store.
///
/// Implementations own their schema and connection lifecycle; no other
/// component touches storage directly.
#[async_trait]
pub trait ReplyStore: Send + Sync + std::fmt::Debug {
    /// Backend name for logs.
    fn backend(&self) -> &'static str;

    /// Creates the `replies` table if it does not exist.
    ///
    /// Idempotent and never drops existing rows.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] on database failure.
    async fn initialize(&self) -> Result<(), PersistenceError>;

    /// Inserts one reply and returns it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] on connection or constraint failure.
    async fn record(&self, reply: NewReply) -> Result<ReplyRecord, PersistenceError>;

    /// Reads rows matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] on database failure. Rows that cannot be
    /// decoded are skipped with a warning.
    async fn list(&self, query: &ReplyQuery) -> Result<Vec<ReplyRecord>, PersistenceError>;

    /// Row counts keyed by stored platform label.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] on database failure.
    async fn platform_counts(&self) -> Result<BTreeMap<String, u64>, PersistenceError>;
}

/// Opens the store selected by configuration. Does not create the table.
///
/// # Errors
///
/// Returns [`PersistenceError::Connect`] if the store cannot be opened.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn ReplyStore>, PersistenceError> {
    let store: Arc<dyn ReplyStore> = match &config.backend {
        StoreBackend::Sqlite { path } => Arc::new(SqliteStore::open(path, config).await?),
        StoreBackend::Postgres { url } => Arc::new(PostgresStore::connect(url, config).await?),
    };
    tracing::info!(backend = store.backend(), "reply store connected");
    Ok(store)
}

/// Opens the configured store and creates its table if needed.
///
/// # Errors
///
/// Returns [`PersistenceError`] if the store cannot be opened or
/// initialized.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn ReplyStore>, PersistenceError> {
    let store = connect(config).await?;
    store.initialize().await?;
    Ok(store)
}

/// Raw `(id, platform, post_text, generated_reply, timestamp)` row.
pub(crate) type ReplyRow = (i64, String, String, String, String);

pub(crate) fn decode_row(row: ReplyRow) -> Result<ReplyRecord, PersistenceError> {
    let (id, platform, post_text, generated_reply, timestamp) = row;
    let platform = Platform::from_stored(&platform).ok_or_else(|| PersistenceError::Corrupt {
        id,
        reason: UnknownPlatform(platform).to_string(),
    })?;
    let timestamp = parse_timestamp(&timestamp).map_err(|e| PersistenceError::Corrupt {
        id,
        reason: format!("timestamp '{timestamp}': {e}"),
    })?;
    Ok(ReplyRecord {
        id,
        platform,
        post_text,
        generated_reply,
        timestamp,
    })
}

/// Decodes every row, dropping the ones that cannot be read.
pub(crate) fn decode_rows(rows: Vec<ReplyRow>) -> Vec<ReplyRecord> {
    rows.into_iter()
        .filter_map(|row| {
            decode_row(row)
                .inspect_err(|e| tracing::warn!(error = %e, "skipping unreadable reply row"))
                .ok()
        })
        .collect()
}

pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
