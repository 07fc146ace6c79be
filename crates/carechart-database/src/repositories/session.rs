//! Session repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use carechart_core::error::{AppError, ErrorKind};
use carechart_core::result::AppResult;
use carechart_entity::session::{CreateSession, Session};

use crate::traits::SessionStore;

/// Repository for server-side session rows.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn create(&self, data: &CreateSession) -> AppResult<Session> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions \
             (id, account_id, username, display_name, role, is_admin, must_change_password, \
              ip_address, user_agent, created_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(data.id)
        .bind(data.account_id)
        .bind(&data.username)
        .bind(&data.display_name)
        .bind(data.role)
        .bind(data.is_admin)
        .bind(data.must_change_password)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(data.created_at)
        .bind(data.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create session", e))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find session", e))
    }

    async fn terminate(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET terminated_at = $2 WHERE id = $1 AND terminated_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to terminate session", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn terminate_for_account(&self, account_id: i64, at: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET terminated_at = $2 \
             WHERE account_id = $1 AND terminated_at IS NULL",
        )
        .bind(account_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to terminate account sessions", e)
        })?;

        Ok(result.rows_affected())
    }

    async fn clear_password_change(&self, account_id: i64) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE sessions SET must_change_password = FALSE \
             WHERE account_id = $1 AND must_change_password AND terminated_at IS NULL",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update account sessions", e)
        })?;

        Ok(result.rows_affected())
    }
}
