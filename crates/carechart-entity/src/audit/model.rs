//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Security-relevant account actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Login,
    Logout,
    PasswordChange,
    AccountCreate,
    AccountUpdate,
    AccountUnlock,
    PasswordReset,
    AccountDeactivate,
    AccountActivate,
}

impl AuditAction {
    /// Return the action as its stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::PasswordChange => "password_change",
            Self::AccountCreate => "account_create",
            Self::AccountUpdate => "account_update",
            Self::AccountUnlock => "account_unlock",
            Self::PasswordReset => "password_reset",
            Self::AccountDeactivate => "account_deactivate",
            Self::AccountActivate => "account_activate",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AuditAction {
    type Err = carechart_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s {
            "login" => Self::Login,
            "logout" => Self::Logout,
            "password_change" => Self::PasswordChange,
            "account_create" => Self::AccountCreate,
            "account_update" => Self::AccountUpdate,
            "account_unlock" => Self::AccountUnlock,
            "password_reset" => Self::PasswordReset,
            "account_deactivate" => Self::AccountDeactivate,
            "account_activate" => Self::AccountActivate,
            other => {
                return Err(carechart_core::AppError::validation(format!(
                    "Invalid audit action: '{other}'"
                )));
            }
        };
        Ok(action)
    }
}

/// An append-only audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: i64,
    /// The action that was attempted.
    pub action: AuditAction,
    /// The acting account, when known.
    pub actor_id: Option<i64>,
    /// Username of the actor, or the attempted identifier for failed logins.
    pub actor_username: Option<String>,
    /// The account acted upon, when different from the actor.
    pub target_account_id: Option<i64>,
    /// Whether the action succeeded.
    pub success: bool,
    /// Failure reason for unsuccessful attempts.
    pub error_message: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    /// Additional details (JSON).
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Data required to create a new audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    pub action: AuditAction,
    pub actor_id: Option<i64>,
    pub actor_username: Option<String>,
    pub target_account_id: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<serde_json::Value>,
}

impl CreateAuditLogEntry {
    /// Start a successful entry for `action`.
    pub fn success(action: AuditAction) -> Self {
        Self {
            action,
            actor_id: None,
            actor_username: None,
            target_account_id: None,
            success: true,
            error_message: None,
            ip_address: None,
            user_agent: None,
            details: None,
        }
    }

    /// Start a failed entry for `action`.
    pub fn failure(action: AuditAction, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(error.into()),
            ..Self::success(action)
        }
    }

    /// Set the acting account.
    pub fn actor(mut self, id: Option<i64>, username: Option<String>) -> Self {
        self.actor_id = id;
        self.actor_username = username;
        self
    }

    /// Set the target account.
    pub fn target(mut self, account_id: i64) -> Self {
        self.target_account_id = Some(account_id);
        self
    }

    /// Set the client origin.
    pub fn origin(mut self, ip_address: Option<String>, user_agent: Option<String>) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Attach JSON details.
    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Filter for audit log searches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    pub action: Option<AuditAction>,
    pub actor_id: Option<i64>,
    pub target_account_id: Option<i64>,
    pub success: Option<bool>,
}

impl AuditFilter {
    /// Evaluate the filter against an entry.
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        self.action.is_none_or(|a| entry.action == a)
            && self.actor_id.is_none_or(|id| entry.actor_id == Some(id))
            && self
                .target_account_id
                .is_none_or(|id| entry.target_account_id == Some(id))
            && self.success.is_none_or(|s| entry.success == s)
    }
}
