//! Account repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use carechart_core::error::{AppError, ErrorKind};
use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::account::{Account, AccountFilter, CreateAccount, UpdateAccount};

use super::violated_constraint;
use crate::traits::AccountStore;

/// Repository for account CRUD and lockout bookkeeping.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    /// Create a new account repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_write_error(e: sqlx::Error, username: &str, context: &'static str) -> AppError {
        match violated_constraint(&e).as_deref() {
            Some("accounts_username_key") => {
                AppError::conflict(format!("Username '{username}' already exists"))
            }
            Some("accounts_email_key") => AppError::conflict("Email already in use"),
            _ => AppError::with_source(ErrorKind::Database, context, e),
        }
    }

    async fn fetch_updated(&self, sql: &str, id: i64, context: &'static str) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, context, e))?
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }
}

#[async_trait]
impl AccountStore for AccountRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by id", e)
            })
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE LOWER(username) = LOWER($1)")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by username", e)
            })
    }

    async fn find_active_by_login(
        &self,
        identifier: &str,
        case_insensitive: bool,
    ) -> AppResult<Option<Account>> {
        let sql = if case_insensitive {
            "SELECT * FROM accounts WHERE is_active \
             AND (LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)) \
             ORDER BY id LIMIT 1"
        } else {
            "SELECT * FROM accounts WHERE is_active AND (username = $1 OR email = $1) \
             ORDER BY id LIMIT 1"
        };
        sqlx::query_as::<_, Account>(sql)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by login", e)
            })
    }

    async fn list(
        &self,
        filter: &AccountFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Account>> {
        let mut conditions = Vec::new();
        let mut param_idx = 1u32;

        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        if pattern.is_some() {
            conditions.push(format!(
                "(username ILIKE ${param_idx} OR email ILIKE ${param_idx} OR display_name ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }
        if filter.role.is_some() {
            conditions.push(format!("role = ${param_idx}"));
            param_idx += 1;
        }
        if filter.is_active.is_some() {
            conditions.push(format!("is_active = ${param_idx}"));
            param_idx += 1;
        }
        if filter.is_locked.is_some() {
            conditions.push(format!("is_locked = ${param_idx}"));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM accounts {where_clause}");
        let select_sql = format!(
            "SELECT * FROM accounts {where_clause} ORDER BY username ASC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, Account>(&select_sql);

        if let Some(p) = &pattern {
            count_query = count_query.bind(p.clone());
            select_query = select_query.bind(p.clone());
        }
        if let Some(role) = filter.role {
            count_query = count_query.bind(role);
            select_query = select_query.bind(role);
        }
        if let Some(active) = filter.is_active {
            count_query = count_query.bind(active);
            select_query = select_query.bind(active);
        }
        if let Some(locked) = filter.is_locked {
            count_query = count_query.bind(locked);
            select_query = select_query.bind(locked);
        }

        let total = count_query.fetch_one(&self.pool).await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count accounts", e)
        })?;

        let accounts = select_query
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list accounts", e))?;

        Ok(page.respond(accounts, total as u64))
    }

    async fn create(&self, data: &CreateAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "INSERT INTO accounts \
             (username, email, password_hash, display_name, role, is_admin, must_change_password, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.display_name)
        .bind(data.role)
        .bind(data.is_admin)
        .bind(data.must_change_password)
        .bind(data.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, &data.username, "Failed to create account"))
    }

    async fn update_profile(&self, id: i64, data: &UpdateAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET email = COALESCE($2, email), \
                                 display_name = COALESCE($3, display_name), \
                                 role = COALESCE($4, role), \
                                 is_admin = COALESCE($5, is_admin), \
                                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.email)
        .bind(&data.display_name)
        .bind(data.role)
        .bind(data.is_admin)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, "", "Failed to update account"))?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn record_failed_login(&self, id: i64, threshold: i32) -> AppResult<Account> {
        // SET expressions see the pre-update row, so both columns derive
        // from the same counter value.
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET failed_login_attempts = failed_login_attempts + 1, \
                                 is_locked = is_locked OR failed_login_attempts + 1 >= $2, \
                                 updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(threshold)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record failed login", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn record_successful_login(
        &self,
        id: i64,
        ip_address: Option<&str>,
    ) -> AppResult<Option<Account>> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET failed_login_attempts = 0, \
                                 last_login_at = NOW(), \
                                 last_login_ip = $2, \
                                 updated_at = NOW() \
             WHERE id = $1 AND NOT is_locked RETURNING *",
        )
        .bind(id)
        .bind(ip_address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to record successful login", e)
        })
    }

    async fn unlock(&self, id: i64) -> AppResult<Account> {
        self.fetch_updated(
            "UPDATE accounts SET is_locked = FALSE, failed_login_attempts = 0, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
            id,
            "Failed to unlock account",
        )
        .await
    }

    async fn set_password(
        &self,
        id: i64,
        password_hash: &str,
        must_change_password: bool,
    ) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET password_hash = $2, must_change_password = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(password_hash)
        .bind(must_change_password)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update password", e))?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn set_active(&self, id: i64, active: bool) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            "UPDATE accounts SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update account status", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    async fn count_admins(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM accounts WHERE is_active AND (is_admin OR role = 'admin')",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count admins", e))?;
        Ok(count as u64)
    }
}
