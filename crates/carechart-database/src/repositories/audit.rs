//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use carechart_core::error::{AppError, ErrorKind};
use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::audit::{AuditFilter, AuditLogEntry, CreateAuditLogEntry};

use crate::traits::AuditStore;

/// Repository for audit log entries.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditStore for AuditLogRepository {
    async fn create(&self, data: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_log \
             (action, actor_id, actor_username, target_account_id, success, error_message, \
              ip_address, user_agent, details) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(data.action)
        .bind(data.actor_id)
        .bind(&data.actor_username)
        .bind(data.target_account_id)
        .bind(data.success)
        .bind(&data.error_message)
        .bind(&data.ip_address)
        .bind(&data.user_agent)
        .bind(&data.details)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create audit entry", e))
    }

    async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        if filter.action.is_some() {
            conditions.push(format!("action = ${param_idx}"));
            param_idx += 1;
        }
        if filter.actor_id.is_some() {
            conditions.push(format!("actor_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.target_account_id.is_some() {
            conditions.push(format!("target_account_id = ${param_idx}"));
            param_idx += 1;
        }
        if filter.success.is_some() {
            conditions.push(format!("success = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM audit_log {where_clause}");
        let select_sql = format!(
            "SELECT * FROM audit_log {where_clause} ORDER BY created_at DESC, id DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, AuditLogEntry>(&select_sql);

        if let Some(action) = filter.action {
            count_query = count_query.bind(action);
            select_query = select_query.bind(action);
        }
        if let Some(actor) = filter.actor_id {
            count_query = count_query.bind(actor);
            select_query = select_query.bind(actor);
        }
        if let Some(target) = filter.target_account_id {
            count_query = count_query.bind(target);
            select_query = select_query.bind(target);
        }
        if let Some(success) = filter.success {
            count_query = count_query.bind(success);
            select_query = select_query.bind(success);
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
        })?;

        let entries = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to search audit log", e)
            })?;

        Ok(page.respond(entries, total as u64))
    }
}
