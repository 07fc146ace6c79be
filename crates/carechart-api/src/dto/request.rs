//! Request DTOs.

use serde::{Deserialize, Serialize};

use carechart_entity::account::{AccountFilter, AccountRole};
use carechart_entity::audit::{AuditAction, AuditFilter};

/// Login request. `identifier` is a username or an email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    pub password: String,
}

/// Candidate password to evaluate against the policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatePasswordRequest {
    pub password: String,
}

/// Admin password reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// Patient listing filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientListQuery {
    pub search: Option<String>,
}

/// Record listing options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordListQuery {
    #[serde(default)]
    pub include_deleted: bool,
}

/// Soft-delete options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteRecordQuery {
    pub reason: Option<String>,
}

/// Account listing filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountListQuery {
    pub search: Option<String>,
    pub role: Option<AccountRole>,
    pub is_active: Option<bool>,
    pub is_locked: Option<bool>,
}

impl From<AccountListQuery> for AccountFilter {
    fn from(q: AccountListQuery) -> Self {
        Self {
            search: q.search,
            role: q.role,
            is_active: q.is_active,
            is_locked: q.is_locked,
        }
    }
}

/// Audit log filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditQuery {
    pub action: Option<AuditAction>,
    pub actor_id: Option<i64>,
    pub target_account_id: Option<i64>,
    pub success: Option<bool>,
}

impl From<AuditQuery> for AuditFilter {
    fn from(q: AuditQuery) -> Self {
        Self {
            action: q.action,
            actor_id: q.actor_id,
            target_account_id: q.target_account_id,
            success: q.success,
        }
    }
}
