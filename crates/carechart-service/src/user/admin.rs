//! Admin account management: creation, profile changes, unlock, password
//! reset, (de)activation, and the audit log.
//!
//! Every mutation writes a security audit entry naming both the acting
//! administrator and the target account.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use validator::Validate;

use carechart_auth::password::{PasswordHasher, PasswordValidator};
use carechart_auth::{RbacEnforcer, SecurityAudit};
use carechart_core::error::AppError;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_database::{AccountStore, AuditStore, SessionStore};
use carechart_entity::account::{Account, AccountFilter, AccountRole, CreateAccount, UpdateAccount};
use carechart_entity::audit::{AuditAction, AuditFilter, AuditLogEntry, CreateAuditLogEntry};

use crate::context::RequestContext;
use crate::validation::validate_input;

/// Request to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAccountRequest {
    /// Login name (unique, case-insensitive).
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,
    /// Email (unique, optional).
    #[validate(email)]
    pub email: Option<String>,
    /// Initial password.
    pub password: String,
    #[validate(length(max = 200))]
    pub display_name: Option<String>,
    pub role: AccountRole,
    #[serde(default)]
    pub is_admin: bool,
    /// Force a change at first login. Defaults to `true`.
    #[serde(default = "default_true")]
    pub must_change_password: bool,
}

fn default_true() -> bool {
    true
}

/// Handles administrative account operations.
#[derive(Clone)]
pub struct AdminAccountService {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    audit_log: Arc<dyn AuditStore>,
    audit: SecurityAudit,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    rbac: RbacEnforcer,
}

impl std::fmt::Debug for AdminAccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminAccountService")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl AdminAccountService {
    /// Creates a new admin account service.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        audit_log: Arc<dyn AuditStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        rbac: RbacEnforcer,
    ) -> Self {
        Self {
            audit: SecurityAudit::new(Arc::clone(&audit_log)),
            accounts,
            sessions,
            audit_log,
            hasher,
            validator,
            rbac,
        }
    }

    /// Lists accounts matching a filter.
    pub async fn list_accounts(
        &self,
        ctx: &RequestContext,
        filter: AccountFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Account>, AppError> {
        self.rbac.require_admin(&ctx.identity)?;
        self.accounts.list(&filter, &page).await
    }

    /// Gets a single account by ID. Non-admins may only read their own.
    pub async fn get_account(&self, ctx: &RequestContext, id: i64) -> Result<Account, AppError> {
        if !self.rbac.can_act_on_account(&ctx.identity, id) {
            return Err(AppError::forbidden("Cannot view another account"));
        }
        self.load(id).await
    }

    /// Creates a new account.
    pub async fn create_account(
        &self,
        ctx: &RequestContext,
        mut req: CreateAccountRequest,
    ) -> Result<Account, AppError> {
        self.rbac.require_admin(&ctx.identity)?;

        req.username = req.username.trim().to_string();
        if req.username.is_empty() {
            return Err(AppError::validation("Username is required"));
        }
        validate_input(&req)?;
        if !req
            .username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(AppError::validation(
                "Username may only contain letters, digits, '.', '_' and '-'",
            ));
        }

        self.validator.enforce(&req.password)?;
        let password_hash = self.hasher.hash_password(&req.password)?;

        let account = self
            .accounts
            .create(&CreateAccount {
                username: req.username,
                email: normalize(req.email),
                password_hash,
                display_name: normalize(req.display_name),
                role: req.role,
                is_admin: req.is_admin,
                must_change_password: req.must_change_password,
                created_by: Some(ctx.account_id()),
            })
            .await?;

        self.write_audit(
            ctx,
            CreateAuditLogEntry::success(AuditAction::AccountCreate)
                .target(account.id)
                .details(json!({
                    "username": account.username,
                    "role": account.role,
                    "is_admin": account.is_admin,
                })),
        )
        .await;

        info!(
            account_id = account.id,
            username = %account.username,
            role = %account.role,
            admin = %ctx.username(),
            "Account created"
        );

        Ok(account)
    }

    /// Updates profile, role, or admin flag.
    ///
    /// Removing administrative privilege from the last active administrator
    /// is rejected.
    pub async fn update_account(
        &self,
        ctx: &RequestContext,
        id: i64,
        mut update: UpdateAccount,
    ) -> Result<Account, AppError> {
        self.rbac.require_admin(&ctx.identity)?;

        update.email = normalize(update.email);
        update.display_name = normalize(update.display_name);
        if update.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let existing = self.load(id).await?;

        let mut preview = existing.clone();
        update.apply_to(&mut preview);
        if existing.has_admin_privilege() && !preview.has_admin_privilege() {
            self.ensure_not_last_admin(&existing).await?;
        }

        let account = self.accounts.update_profile(id, &update).await?;

        self.write_audit(
            ctx,
            CreateAuditLogEntry::success(AuditAction::AccountUpdate)
                .target(id)
                .details(json!({ "changes": update })),
        )
        .await;

        info!(account_id = id, admin = %ctx.username(), "Account updated");

        Ok(account)
    }

    /// Clears the lockout flag and resets the failed-attempt counter.
    pub async fn unlock(&self, ctx: &RequestContext, id: i64) -> Result<Account, AppError> {
        self.rbac.require_admin(&ctx.identity)?;

        let existing = self.load(id).await?;
        let account = self.accounts.unlock(id).await?;

        self.write_audit(
            ctx,
            CreateAuditLogEntry::success(AuditAction::AccountUnlock)
                .target(id)
                .details(json!({
                    "username": existing.username,
                    "was_locked": existing.is_locked,
                    "failed_login_attempts": existing.failed_login_attempts,
                })),
        )
        .await;

        info!(
            account_id = id,
            username = %existing.username,
            admin = %ctx.username(),
            "Account unlocked"
        );

        Ok(account)
    }

    /// Sets a new password chosen by the administrator. The account must
    /// change it at next login and its open sessions are ended.
    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        id: i64,
        new_password: &str,
    ) -> Result<Account, AppError> {
        self.rbac.require_admin(&ctx.identity)?;

        self.load(id).await?;
        self.validator.enforce(new_password)?;
        let hash = self.hasher.hash_password(new_password)?;

        let account = self.accounts.set_password(id, &hash, true).await?;
        let terminated = self.sessions.terminate_for_account(id, Utc::now()).await?;

        self.write_audit(
            ctx,
            CreateAuditLogEntry::success(AuditAction::PasswordReset)
                .target(id)
                .details(json!({ "sessions_terminated": terminated })),
        )
        .await;

        info!(
            account_id = id,
            sessions_terminated = terminated,
            admin = %ctx.username(),
            "Password reset by admin"
        );

        Ok(account)
    }

    /// Deactivates an account and ends its sessions. Administrators cannot
    /// deactivate themselves.
    pub async fn deactivate(&self, ctx: &RequestContext, id: i64) -> Result<Account, AppError> {
        self.rbac.require_admin(&ctx.identity)?;

        if id == ctx.account_id() {
            return Err(AppError::validation("Cannot deactivate your own account"));
        }

        let existing = self.load(id).await?;
        if existing.has_admin_privilege() {
            self.ensure_not_last_admin(&existing).await?;
        }

        let account = self.accounts.set_active(id, false).await?;
        let terminated = self.sessions.terminate_for_account(id, Utc::now()).await?;

        self.write_audit(
            ctx,
            CreateAuditLogEntry::success(AuditAction::AccountDeactivate)
                .target(id)
                .details(json!({ "sessions_terminated": terminated })),
        )
        .await;

        info!(account_id = id, admin = %ctx.username(), "Account deactivated");

        Ok(account)
    }

    /// Reactivates a deactivated account.
    pub async fn activate(&self, ctx: &RequestContext, id: i64) -> Result<Account, AppError> {
        self.rbac.require_admin(&ctx.identity)?;

        self.load(id).await?;
        let account = self.accounts.set_active(id, true).await?;

        self.write_audit(
            ctx,
            CreateAuditLogEntry::success(AuditAction::AccountActivate).target(id),
        )
        .await;

        info!(account_id = id, admin = %ctx.username(), "Account activated");

        Ok(account)
    }

    /// Searches the security audit log, newest first.
    pub async fn search_audit(
        &self,
        ctx: &RequestContext,
        filter: AuditFilter,
        page: PageRequest,
    ) -> Result<PageResponse<AuditLogEntry>, AppError> {
        self.rbac.require_admin(&ctx.identity)?;
        self.audit_log.search(&filter, &page).await
    }

    async fn load(&self, id: i64) -> Result<Account, AppError> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))
    }

    async fn ensure_not_last_admin(&self, account: &Account) -> Result<(), AppError> {
        if account.is_active && self.accounts.count_admins().await? <= 1 {
            return Err(AppError::conflict(
                "Cannot remove the last active administrator",
            ));
        }
        Ok(())
    }

    async fn write_audit(&self, ctx: &RequestContext, entry: CreateAuditLogEntry) {
        let entry = entry.actor(Some(ctx.account_id()), Some(ctx.username().to_string()));
        self.audit.record(entry, &ctx.origin).await;
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use carechart_auth::{ClientOrigin, SessionIdentity};
    use carechart_core::ErrorKind;
    use carechart_core::config::AuthConfig;
    use carechart_database::Stores;
    use uuid::Uuid;

    const PASSWORD: &str = "Str0ng!Pass";

    struct Fixture {
        stores: Stores,
        service: AdminAccountService,
        admin: Account,
    }

    async fn fixture() -> Fixture {
        let stores = Stores::memory();
        let hasher = Arc::new(PasswordHasher::new());
        let admin = stores
            .accounts
            .create(&CreateAccount {
                username: "root".into(),
                email: None,
                password_hash: hasher.hash_password(PASSWORD).unwrap(),
                display_name: Some("Root Admin".into()),
                role: AccountRole::Admin,
                is_admin: true,
                must_change_password: false,
                created_by: None,
            })
            .await
            .unwrap();
        let service = AdminAccountService::new(
            stores.accounts.clone(),
            stores.sessions.clone(),
            stores.audit.clone(),
            hasher,
            Arc::new(PasswordValidator::new(&AuthConfig::default())),
            RbacEnforcer::new(),
        );
        Fixture {
            stores,
            service,
            admin,
        }
    }

    fn ctx_for(account: &Account) -> RequestContext {
        RequestContext::new(
            SessionIdentity {
                account_id: account.id,
                session_id: Uuid::new_v4(),
                username: account.username.clone(),
                display_name: account.display_name.clone(),
                role: account.role,
                is_admin: account.is_admin,
                must_change_password: false,
                expires_at: Utc::now(),
            },
            ClientOrigin {
                ip_address: Some("198.51.100.4".into()),
                user_agent: None,
            },
        )
    }

    fn nurse_request() -> CreateAccountRequest {
        CreateAccountRequest {
            username: "nurse.kim".into(),
            email: Some("kim@clinic.test".into()),
            password: PASSWORD.into(),
            display_name: Some("Kim".into()),
            role: AccountRole::Nurse,
            is_admin: false,
            must_change_password: true,
        }
    }

    #[tokio::test]
    async fn test_create_account_audited_and_conflicts() {
        let f = fixture().await;
        let ctx = ctx_for(&f.admin);

        let nurse = f.service.create_account(&ctx, nurse_request()).await.unwrap();
        assert!(nurse.must_change_password);
        assert_eq!(nurse.created_by, Some(f.admin.id));

        let err = f.service.create_account(&ctx, nurse_request()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let mut weak = nurse_request();
        weak.username = "nurse.lee".into();
        weak.email = None;
        weak.password = "Password1!".into();
        let err = f.service.create_account(&ctx, weak).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let entries = f
            .service
            .search_audit(
                &ctx,
                AuditFilter {
                    action: Some(AuditAction::AccountCreate),
                    ..Default::default()
                },
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(entries.items.len(), 1);
        assert_eq!(entries.items[0].target_account_id, Some(nurse.id));
        assert_eq!(entries.items[0].actor_id, Some(f.admin.id));
    }

    #[tokio::test]
    async fn test_username_checked_after_trimming() {
        let f = fixture().await;
        let ctx = ctx_for(&f.admin);

        for username in ["   ", " ab "] {
            let mut req = nurse_request();
            req.username = username.into();
            let err = f.service.create_account(&ctx, req).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{username:?}");
        }

        let mut req = nurse_request();
        req.username = "  nurse.kim  ".into();
        let nurse = f.service.create_account(&ctx, req).await.unwrap();
        assert_eq!(nurse.username, "nurse.kim");
    }

    #[tokio::test]
    async fn test_non_admin_forbidden() {
        let f = fixture().await;
        let nurse = f
            .service
            .create_account(&ctx_for(&f.admin), nurse_request())
            .await
            .unwrap();

        let err = f
            .service
            .unlock(&ctx_for(&nurse), f.admin.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let err = f
            .service
            .get_account(&ctx_for(&nurse), f.admin.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);

        let own = f.service.get_account(&ctx_for(&nurse), nurse.id).await.unwrap();
        assert_eq!(own.username, nurse.username);
    }

    #[tokio::test]
    async fn test_unlock_resets_counter_and_names_both_parties() {
        let f = fixture().await;
        let ctx = ctx_for(&f.admin);
        let nurse = f.service.create_account(&ctx, nurse_request()).await.unwrap();
        for _ in 0..5 {
            f.stores.accounts.record_failed_login(nurse.id, 5).await.unwrap();
        }

        let unlocked = f.service.unlock(&ctx, nurse.id).await.unwrap();
        assert!(!unlocked.is_locked);
        assert_eq!(unlocked.failed_login_attempts, 0);

        let entries = f
            .stores
            .audit
            .search(
                &AuditFilter {
                    action: Some(AuditAction::AccountUnlock),
                    ..Default::default()
                },
                &PageRequest::default(),
            )
            .await
            .unwrap();
        let entry = &entries.items[0];
        assert_eq!(entry.actor_id, Some(f.admin.id));
        assert_eq!(entry.target_account_id, Some(nurse.id));
        assert_eq!(entry.ip_address.as_deref(), Some("198.51.100.4"));
        assert_eq!(entry.details.as_ref().unwrap()["was_locked"], json!(true));
    }

    #[tokio::test]
    async fn test_reset_password_forces_change() {
        let f = fixture().await;
        let ctx = ctx_for(&f.admin);
        let mut req = nurse_request();
        req.must_change_password = false;
        let nurse = f.service.create_account(&ctx, req).await.unwrap();

        let err = f.service.reset_password(&ctx, nurse.id, "short1!").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let updated = f.service.reset_password(&ctx, nurse.id, "N3w!Secret").await.unwrap();
        assert!(updated.must_change_password);
        assert!(
            PasswordHasher::new()
                .verify_password("N3w!Secret", &updated.password_hash)
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_deactivation_rules() {
        let f = fixture().await;
        let ctx = ctx_for(&f.admin);

        let err = f.service.deactivate(&ctx, f.admin.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let nurse = f.service.create_account(&ctx, nurse_request()).await.unwrap();
        let off = f.service.deactivate(&ctx, nurse.id).await.unwrap();
        assert!(!off.is_active);
        let on = f.service.activate(&ctx, nurse.id).await.unwrap();
        assert!(on.is_active);

        let err = f
            .service
            .update_account(
                &ctx,
                f.admin.id,
                UpdateAccount {
                    role: Some(AccountRole::Physician),
                    is_admin: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let f = fixture().await;
        let err = f
            .service
            .update_account(&ctx_for(&f.admin), f.admin.id, UpdateAccount::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
