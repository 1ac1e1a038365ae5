//! PostgreSQL implementation of the reply store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{PersistenceError, ReplyQuery, ReplyRow, ReplyStore, count_to_u64, decode_rows};
use crate::config::StoreConfig;
use crate::domain::{NewReply, ReplyRecord, format_timestamp};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS replies (
    id BIGSERIAL PRIMARY KEY,
    platform VARCHAR(50) NOT NULL,
    post_text TEXT NOT NULL,
    generated_reply TEXT NOT NULL,
    timestamp VARCHAR(50) NOT NULL
)
"#;

// Tables created by older tools use a 32-bit `id`; every read casts.
const SELECT_COLUMNS: &str = "SELECT CAST(id AS BIGINT), platform, post_text, generated_reply, \
                              timestamp FROM replies";

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pool to `url` using the configured limits.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::Connect`] if the server is unreachable
    /// or rejects the credentials.
    pub async fn connect(url: &str, config: &StoreConfig) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect(url)
            .await
            .map_err(|e| PersistenceError::Connect(e.to_string()))?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl ReplyStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
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
             VALUES ($1, $2, $3, $4) RETURNING CAST(id AS BIGINT)",
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
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(SELECT_COLUMNS);
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
