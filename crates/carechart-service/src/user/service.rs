//! Self-service account operations for the signed-in user.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use carechart_auth::password::{PasswordCheck, PasswordHasher, PasswordValidator};
use carechart_auth::SecurityAudit;
use carechart_core::error::AppError;
use carechart_database::{AccountStore, SessionStore};
use carechart_entity::account::Account;
use carechart_entity::audit::{AuditAction, CreateAuditLogEntry};

use crate::context::RequestContext;

/// Request to change the caller's own password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Operations a user performs on their own account.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    audit: SecurityAudit,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        audit: SecurityAudit,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            accounts,
            sessions,
            audit,
            hasher,
            validator,
        }
    }

    /// The caller's account.
    pub async fn profile(&self, ctx: &RequestContext) -> Result<Account, AppError> {
        self.accounts
            .find_by_id(ctx.account_id())
            .await?
            .ok_or_else(|| AppError::not_found("Account not found"))
    }

    /// Evaluate a candidate password against the policy without storing it.
    pub fn check_password(&self, candidate: &str) -> PasswordCheck {
        self.validator.check(candidate)
    }

    /// Change the caller's password.
    ///
    /// The current password must verify and the new one must pass the
    /// policy and differ from it. Clears `must_change_password` on the
    /// account and on its open sessions. Audited on success and failure.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        req: ChangePasswordRequest,
    ) -> Result<Account, AppError> {
        let account = self.profile(ctx).await?;

        match self.apply_change(&account, &req).await {
            Ok(updated) => {
                self.write_audit(ctx, CreateAuditLogEntry::success(AuditAction::PasswordChange))
                    .await;
                info!(account_id = updated.id, "Password changed");
                Ok(updated)
            }
            Err(e) => {
                self.write_audit(
                    ctx,
                    CreateAuditLogEntry::failure(AuditAction::PasswordChange, e.message.clone()),
                )
                .await;
                warn!(account_id = account.id, error = %e, "Password change rejected");
                Err(e)
            }
        }
    }

    async fn apply_change(
        &self,
        account: &Account,
        req: &ChangePasswordRequest,
    ) -> Result<Account, AppError> {
        if !self
            .hasher
            .verify_password(&req.current_password, &account.password_hash)?
        {
            return Err(AppError::validation("Current password is incorrect"));
        }

        self.validator
            .validate_not_same(&req.current_password, &req.new_password)?;
        self.validator.enforce(&req.new_password)?;

        let hash = self.hasher.hash_password(&req.new_password)?;
        let updated = self.accounts.set_password(account.id, &hash, false).await?;
        self.sessions.clear_password_change(account.id).await?;
        Ok(updated)
    }

    async fn write_audit(&self, ctx: &RequestContext, entry: CreateAuditLogEntry) {
        let entry = entry
            .actor(Some(ctx.account_id()), Some(ctx.username().to_string()))
            .target(ctx.account_id());
        self.audit.record(entry, &ctx.origin).await;
    }
}
