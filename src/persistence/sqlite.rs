//! SQLite implementation of the reply store.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::{PersistenceError, ReplyQuery, ReplyRow, ReplyStore, count_to_u64, decode_rows};
use crate::config::StoreConfig;
use crate::domain::{NewReply, ReplyRecord, format_timestamp};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS replies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    platform TEXT NOT NULL,
    post_text TEXT NOT NULL,
    generated_reply TEXT NOT NULL,
    timestamp TEXT NOT NULL
)
"#;

/// File-backed SQLite store using `sqlx::SqlitePool`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a store with the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Connect`] if the parent directory or the
    /// database cannot be created.
    pub async fn open(path: &Path, config: &StoreConfig) -> Result<Self, PersistenceError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                PersistenceError::Connect(format!("create {}: {e}", parent.display()))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(config.connect_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| PersistenceError::Connect(e.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Connect`] if SQLite cannot start.
    pub async fn in_memory() -> Result<Self, PersistenceError> {
        // A single connection that never expires keeps the database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| PersistenceError::Connect(e.to_string()))?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ReplyStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn initialize(&self) -> Result<(), PersistenceError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;
        Ok(())
    }

    async fn record(&self, reply: NewReply) -> Result<ReplyRecord, PersistenceError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO replies (platform, post_text, generated_reply, timestamp) \
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(reply.platform.as_str())
        .bind(&reply.post_text)
        .bind(&reply.generated_reply)
        .bind(format_timestamp(&reply.timestamp))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PersistenceError::Query(e.to_string()))?;

        Ok(ReplyRecord::from_new(id, reply))
    }

    async fn list(&self, query: &ReplyQuery) -> Result<Vec<ReplyRecord>, PersistenceError> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, platform, post_text, generated_reply, timestamp FROM replies",
        );
        if let Some(platform) = query.platform {
            qb.push(" WHERE platform = ").push_bind(platform.as_str());
        }
        qb.push(query.order.sql());
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let rows = qb
            .build_query_as::<ReplyRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PersistenceError::Query(e.to_string()))?;

        Ok(decode_rows(rows))
    }

    async fn platform_counts(&self) -> Result<BTreeMap<String, u64>, PersistenceError> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT platform, COUNT(*) FROM replies GROUP BY platform",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PersistenceError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(platform, count)| (platform, count_to_u64(count)))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use tokio_test::assert_ok;

    use super::*;
    use crate::config::StoreBackend;
    use crate::domain::{Platform, PostInput};
    use crate::persistence::SortOrder;

    fn reply(platform: Platform, text: &str) -> NewReply {
        let Ok(input) = PostInput::new(platform, text) else {
            panic!("valid input");
        };
        NewReply::generated_now(input, format!("re: {text}"))
    }

    async fn memory_store() -> SqliteStore {
        let Ok(store) = SqliteStore::in_memory().await else {
            panic!("in-memory sqlite should open");
        };
        assert_ok!(store.initialize().await);
        store
    }

    fn file_config(path: &Path) -> StoreConfig {
        StoreConfig {
            backend: StoreBackend::Sqlite {
                path: path.to_path_buf(),
            },
            max_connections: 2,
            min_connections: 0,
            connect_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn record_assigns_increasing_ids() {
        let store = memory_store().await;
        let Ok(first) = store.record(reply(Platform::Twitter, "one")).await else {
            panic!("insert failed");
        };
        let Ok(second) = store.record(reply(Platform::Twitter, "two")).await else {
            panic!("insert failed");
        };
        assert!(second.id > first.id);
        assert_eq!(first.post_text, "one");
        assert_eq!(first.generated_reply, "re: one");
    }

    #[tokio::test]
    async fn stored_row_reads_back_identically() {
        let store = memory_store().await;
        let Ok(written) = store.record(reply(Platform::LinkedIn, "hired!")).await else {
            panic!("insert failed");
        };
        let Ok(rows) = store.list(&ReplyQuery::everything()).await else {
            panic!("list failed");
        };
        assert_eq!(rows, vec![written]);
    }

    #[tokio::test]
    async fn list_filters_orders_and_limits() {
        let store = memory_store().await;
        for (platform, text) in [
            (Platform::Twitter, "a"),
            (Platform::Instagram, "b"),
            (Platform::Twitter, "c"),
            (Platform::Twitter, "d"),
        ] {
            assert_ok!(store.record(reply(platform, text)).await);
        }

        let Ok(newest) = store
            .list(&ReplyQuery::newest(2).for_platform(Platform::Twitter))
            .await
        else {
            panic!("list failed");
        };
        let texts: Vec<&str> = newest.iter().map(|r| r.post_text.as_str()).collect();
        assert_eq!(texts, vec!["d", "c"]);

        let Ok(all) = store
            .list(&ReplyQuery {
                order: SortOrder::OldestFirst,
                ..ReplyQuery::default()
            })
            .await
        else {
            panic!("list failed");
        };
        let texts: Vec<&str> = all.iter().map(|r| r.post_text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn platform_counts_group_rows() {
        let store = memory_store().await;
        assert_ok!(store.record(reply(Platform::Twitter, "a")).await);
        assert_ok!(store.record(reply(Platform::Twitter, "b")).await);
        assert_ok!(store.record(reply(Platform::LinkedIn, "c")).await);

        let Ok(counts) = store.platform_counts().await else {
            panic!("count failed");
        };
        assert_eq!(counts.get("Twitter"), Some(&2));
        assert_eq!(counts.get("LinkedIn"), Some(&1));
        assert_eq!(counts.get("Instagram"), None);
    }

    #[tokio::test]
    async fn record_before_initialize_fails() {
        let Ok(store) = SqliteStore::in_memory().await else {
            panic!("in-memory sqlite should open");
        };
        assert!(matches!(
            store.record(reply(Platform::Twitter, "x")).await,
            Err(PersistenceError::Query(_))
        ));
    }

    #[tokio::test]
    async fn initialize_is_idempotent_on_populated_file() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("tempdir");
        };
        let path = dir.path().join("nested").join("replies.db");
        let config = file_config(&path);

        let Ok(store) = SqliteStore::open(&path, &config).await else {
            panic!("open failed");
        };
        assert_ok!(store.initialize().await);
        assert_ok!(store.record(reply(Platform::Twitter, "kept")).await);
        assert_ok!(store.record(reply(Platform::Instagram, "also kept")).await);
        for _ in 0..3 {
            assert_ok!(store.initialize().await);
        }
        drop(store);

        let Ok(reopened) = SqliteStore::open(&path, &config).await else {
            panic!("reopen failed");
        };
        assert_ok!(reopened.initialize().await);
        let Ok(rows) = reopened.list(&ReplyQuery::everything()).await else {
            panic!("list failed");
        };
        let texts: Vec<&str> = rows.iter().map(|r| r.post_text.as_str()).collect();
        assert_eq!(texts, vec!["kept", "also kept"]);
    }

    #[tokio::test]
    async fn reads_rows_written_by_older_tools() {
        let store = memory_store().await;
        assert_ok!(
            sqlx::query(
                "INSERT INTO replies (platform, post_text, generated_reply, timestamp) \
                 VALUES ('Instagram', 'old', 'reply', '2024-05-01T10:00:00.500000')",
            )
            .execute(&store.pool)
            .await
        );
        let Ok(rows) = store.list(&ReplyQuery::everything()).await else {
            panic!("list failed");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows.first().map(|r| format_timestamp(&r.timestamp)).as_deref(),
            Some("2024-05-01T10:00:00.500000Z")
        );
    }

    #[tokio::test]
    async fn legacy_platform_labels_do_not_break_listing() {
        let store = memory_store().await;
        assert_ok!(store.record(reply(Platform::Twitter, "current")).await);
        for label in ["twitter", "Facebook"] {
            assert_ok!(
                sqlx::query(
                    "INSERT INTO replies (platform, post_text, generated_reply, timestamp) \
                     VALUES (?, 'legacy', 'reply', '2024-05-01T10:00:00')",
                )
                .bind(label)
                .execute(&store.pool)
                .await
            );
        }

        let Ok(rows) = store.list(&ReplyQuery::everything()).await else {
            panic!("list failed");
        };
        let read: Vec<(i64, Platform)> = rows.iter().map(|r| (r.id, r.platform)).collect();
        assert_eq!(read, vec![(1, Platform::Twitter), (2, Platform::Twitter)]);

        let Ok(counts) = store.platform_counts().await else {
            panic!("counts failed");
        };
        assert_eq!(counts.values().sum::<u64>(), 3);
    }
}
