//! PostgreSQL implementation of the URL store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{CreateOutcome, NewUrlRecord, UrlRecord, UrlRecordPatch};
use crate::domain::repositories::UrlStore;
use crate::error::AppError;

/// Reads of a conflicting key before giving up. The conflicting row can only
/// vanish through a concurrent delete.
const CONFLICT_READ_ATTEMPTS: usize = 3;

#[derive(sqlx::FromRow)]
struct UrlRecordRow {
    key: String,
    value: String,
    created_at: DateTime<Utc>,
    click_count: i64,
    last_accessed: Option<DateTime<Utc>>,
    is_fallback: bool,
}

impl From<UrlRecordRow> for UrlRecord {
    fn from(row: UrlRecordRow) -> Self {
        Self {
            key: row.key,
            value: row.value,
            created_at: row.created_at,
            click_count: u64::try_from(row.click_count).unwrap_or(0),
            last_accessed: row.last_accessed,
            is_fallback: row.is_fallback,
        }
    }
}

/// PostgreSQL store for URL records.
///
/// Conditional creation relies on the primary key: `ON CONFLICT DO NOTHING`
/// returns no row when another writer already holds the key.
pub struct PgUrlStore {
    pool: Arc<PgPool>,
}

impl PgUrlStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlStore for PgUrlStore {
    async fn get(&self, key: &str) -> Result<Option<UrlRecord>, AppError> {
        let row = sqlx::query_as::<_, UrlRecordRow>(
            r#"
            SELECT key, value, created_at, click_count, last_accessed, is_fallback
            FROM url_records
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UrlRecord::from))
    }

    async fn create_if_absent(&self, record: NewUrlRecord) -> Result<CreateOutcome, AppError> {
        for _ in 0..CONFLICT_READ_ATTEMPTS {
            let inserted = sqlx::query_as::<_, UrlRecordRow>(
                r#"
                INSERT INTO url_records (key, value, created_at, is_fallback)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (key) DO NOTHING
                RETURNING key, value, created_at, click_count, last_accessed, is_fallback
                "#,
            )
            .bind(&record.key)
            .bind(&record.value)
            .bind(record.created_at)
            .bind(record.is_fallback)
            .fetch_optional(self.pool.as_ref())
            .await?;

            if let Some(row) = inserted {
                return Ok(CreateOutcome::Created(row.into()));
            }

            if let Some(existing) = self.get(&record.key).await? {
                return Ok(CreateOutcome::Exists(existing));
            }
        }

        Err(AppError::storage(
            "Key kept changing during insert",
            json!({ "key": record.key }),
        ))
    }

    async fn update(&self, key: &str, patch: UrlRecordPatch) -> Result<(), AppError> {
        let click_count = patch
            .click_count
            .map(|c| i64::try_from(c).unwrap_or(i64::MAX));

        sqlx::query(
            r#"
            UPDATE url_records
            SET click_count = GREATEST(click_count, COALESCE($2, click_count)),
                last_accessed = GREATEST(last_accessed, $3)
            WHERE key = $1
            "#,
        )
        .bind(key)
        .bind(click_count)
        .bind(patch.last_accessed)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM url_records WHERE key = $1")
            .bind(key)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UrlRecord>, AppError> {
        let rows = sqlx::query_as::<_, UrlRecordRow>(
            r#"
            SELECT key, value, created_at, click_count, last_accessed, is_fallback
            FROM url_records
            ORDER BY created_at DESC, key
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(UrlRecord::from).collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_records")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
