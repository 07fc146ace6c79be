//! Record history repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use carechart_core::error::{AppError, ErrorKind};
use carechart_core::result::AppResult;
use carechart_entity::history::{HistoryEntry, NewHistoryEntry};
use carechart_entity::record::RecordKind;

use crate::traits::HistoryStore;

/// Repository for the append-only `record_history` table.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    /// Create a new history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HistoryStore for HistoryRepository {
    async fn append(&self, entry: &NewHistoryEntry) -> AppResult<HistoryEntry> {
        sqlx::query_as::<_, HistoryEntry>(
            "INSERT INTO record_history \
             (record_kind, record_storage_id, record_external_id, action, before, after, actor, actor_id, reason) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(entry.record_kind)
        .bind(entry.record_storage_id)
        .bind(&entry.record_external_id)
        .bind(entry.action)
        .bind(&entry.before)
        .bind(&entry.after)
        .bind(&entry.actor)
        .bind(entry.actor_id)
        .bind(&entry.reason)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append history entry", e))
    }

    async fn list_for_record(
        &self,
        kind: RecordKind,
        storage_id: i64,
    ) -> AppResult<Vec<HistoryEntry>> {
        sqlx::query_as::<_, HistoryEntry>(
            "SELECT * FROM record_history \
             WHERE record_kind = $1 AND record_storage_id = $2 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(kind)
        .bind(storage_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list history", e))
    }
}
