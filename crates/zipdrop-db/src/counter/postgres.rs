use async_trait::async_trait;
use chrono::Duration;
use sqlx::{PgPool, Postgres};

use super::CounterStore;
use crate::error::StoreError;

/// Counter store backed by the `counters` table.
///
/// Increments run as a single `INSERT .. ON CONFLICT DO UPDATE .. RETURNING`, so the
/// row lock taken by Postgres serializes concurrent writers on the same key.
#[derive(Clone)]
pub struct PgCounterStore {
    pool: PgPool,
}

impl PgCounterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn ttl_millis(ttl: Option<Duration>) -> Option<i64> {
    ttl.map(|d| d.num_milliseconds())
}

#[async_trait]
impl CounterStore for PgCounterStore {
    #[tracing::instrument(skip(self), fields(db.table = "counters", db.operation = "get"))]
    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let value: Option<i64> = sqlx::query_scalar::<Postgres, i64>(
            r#"
            SELECT value FROM counters
            WHERE key = $1 AND (expires_at IS NULL OR expires_at > NOW())
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    #[tracing::instrument(skip(self), fields(db.table = "counters", db.operation = "set"))]
    async fn set(&self, key: &str, value: i64, ttl: Option<Duration>) -> Result<(), StoreError> {
        sqlx::query::<Postgres>(
            r#"
            INSERT INTO counters (key, value, expires_at)
            VALUES ($1, $2, CASE WHEN $3::BIGINT IS NULL THEN NULL
                                 ELSE NOW() + $3::BIGINT * INTERVAL '1 millisecond' END)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(ttl_millis(ttl))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "counters", db.operation = "increment"))]
    async fn increment(
        &self,
        key: &str,
        delta: i64,
        ttl: Option<Duration>,
    ) -> Result<i64, StoreError> {
        let value: i64 = sqlx::query_scalar::<Postgres, i64>(
            r#"
            INSERT INTO counters AS c (key, value, expires_at)
            VALUES ($1, $2, CASE WHEN $3::BIGINT IS NULL THEN NULL
                                 ELSE NOW() + $3::BIGINT * INTERVAL '1 millisecond' END)
            ON CONFLICT (key) DO UPDATE
            SET value = CASE WHEN c.expires_at IS NOT NULL AND c.expires_at <= NOW()
                             THEN EXCLUDED.value ELSE c.value + EXCLUDED.value END,
                expires_at = CASE WHEN c.expires_at IS NOT NULL AND c.expires_at <= NOW()
                                  THEN EXCLUDED.expires_at ELSE c.expires_at END
            RETURNING value
            "#,
        )
        .bind(key)
        .bind(delta)
        .bind(ttl_millis(ttl))
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }

    #[tracing::instrument(skip(self), fields(db.table = "counters", db.operation = "delete"))]
    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query::<Postgres>("DELETE FROM counters WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "counters", db.operation = "purge"))]
    async fn purge_expired(&self) -> Result<u64, StoreError> {
        let result = sqlx::query::<Postgres>(
            "DELETE FROM counters WHERE expires_at IS NOT NULL AND expires_at <= NOW()",
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
