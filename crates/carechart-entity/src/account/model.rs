//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::role::AccountRole;

/// A staff account able to sign in to CareChart.
///
/// Accounts are never physically deleted; deactivation clears `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Storage identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Email address (unique when present).
    pub email: Option<String>,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Account role.
    pub role: AccountRole,
    /// Explicit administrative privilege flag.
    pub is_admin: bool,
    /// Soft-deactivation flag.
    pub is_active: bool,
    /// Locked after too many failed logins; cleared only by an admin.
    pub is_locked: bool,
    /// Consecutive failed login attempts.
    pub failed_login_attempts: i32,
    /// Last successful login time.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Origin address of the last successful login.
    pub last_login_ip: Option<String>,
    /// Forces a password change at next login.
    pub must_change_password: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
    /// The admin who created this account.
    pub created_by: Option<i64>,
}

impl Account {
    /// Whether this account holds administrative privilege.
    pub fn has_admin_privilege(&self) -> bool {
        self.is_admin || self.role.is_admin()
    }

    /// Name shown in history and audit entries.
    ///
    /// Falls back to the username, then the numeric id.
    pub fn display_identity(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ if !self.username.is_empty() => self.username.clone(),
            _ => self.id.to_string(),
        }
    }

    /// Whether `identifier` names this account by username or email.
    pub fn matches_login(&self, identifier: &str, case_insensitive: bool) -> bool {
        let eq = |a: &str, b: &str| {
            if case_insensitive {
                a.eq_ignore_ascii_case(b)
            } else {
                a == b
            }
        };
        eq(&self.username, identifier)
            || self
                .email
                .as_deref()
                .map(|email| eq(email, identifier))
                .unwrap_or(false)
    }
}

/// Data required to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    /// Desired username.
    pub username: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Display name (optional).
    pub display_name: Option<String>,
    /// Assigned role.
    pub role: AccountRole,
    /// Administrative flag.
    pub is_admin: bool,
    /// Force a password change at first login.
    pub must_change_password: bool,
    /// Creating admin's account id.
    pub created_by: Option<i64>,
}

/// Profile fields an administrator may change. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAccount {
    /// New email address.
    pub email: Option<String>,
    /// New display name.
    pub display_name: Option<String>,
    /// New role.
    pub role: Option<AccountRole>,
    /// New administrative flag.
    pub is_admin: Option<bool>,
}

impl UpdateAccount {
    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.display_name.is_none()
            && self.role.is_none()
            && self.is_admin.is_none()
    }

    /// Apply the update in place.
    pub fn apply_to(&self, account: &mut Account) {
        if let Some(email) = &self.email {
            account.email = Some(email.clone());
        }
        if let Some(name) = &self.display_name {
            account.display_name = Some(name.clone());
        }
        if let Some(role) = self.role {
            account.role = role;
        }
        if let Some(is_admin) = self.is_admin {
            account.is_admin = is_admin;
        }
    }
}

/// Filter for account listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountFilter {
    /// Case-insensitive substring over username, email, and display name.
    pub search: Option<String>,
    /// Only accounts with this role.
    pub role: Option<AccountRole>,
    /// Only active (`true`) or deactivated (`false`) accounts.
    pub is_active: Option<bool>,
    /// Only locked (`true`) or unlocked (`false`) accounts.
    pub is_locked: Option<bool>,
}

impl AccountFilter {
    /// Evaluate the filter against an account.
    pub fn matches(&self, account: &Account) -> bool {
        if let Some(role) = self.role {
            if account.role != role {
                return false;
            }
        }
        if let Some(active) = self.is_active {
            if account.is_active != active {
                return false;
            }
        }
        if let Some(locked) = self.is_locked {
            if account.is_locked != locked {
                return false;
            }
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) if !needle.is_empty() => {
                let hit = |s: &str| s.to_lowercase().contains(&needle);
                hit(&account.username)
                    || account.email.as_deref().map(hit).unwrap_or(false)
                    || account.display_name.as_deref().map(hit).unwrap_or(false)
            }
            _ => true,
        }
    }
}
