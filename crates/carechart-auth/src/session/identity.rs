//! The authenticated principal resolved from a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use carechart_core::error::AppError;
use carechart_entity::account::AccountRole;
use carechart_entity::session::Session;

/// Identity attached to every authenticated request.
///
/// Built from the session row, so it reflects the account as it was at
/// login time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub account_id: i64,
    pub session_id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub role: AccountRole,
    pub is_admin: bool,
    pub must_change_password: bool,
    pub expires_at: DateTime<Utc>,
}

impl SessionIdentity {
    /// Whether this identity holds administrative privilege.
    pub fn has_admin_privilege(&self) -> bool {
        self.is_admin || self.role.is_admin()
    }

    /// Fails while the account still has to replace an administrator-issued
    /// password. Only the password change itself, logout and `me` skip this.
    pub fn require_password_current(&self) -> Result<(), AppError> {
        if self.must_change_password {
            return Err(AppError::forbidden("Password change required before continuing"));
        }
        Ok(())
    }

    /// Name written into history entries: display name, then username,
    /// then the numeric account id.
    pub fn display_identity(&self) -> String {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ if !self.username.is_empty() => self.username.clone(),
            _ => self.account_id.to_string(),
        }
    }
}

impl From<&Session> for SessionIdentity {
    fn from(session: &Session) -> Self {
        Self {
            account_id: session.account_id,
            session_id: session.id,
            username: session.username.clone(),
            display_name: session.display_name.clone(),
            role: session.role,
            is_admin: session.is_admin,
            must_change_password: session.must_change_password,
            expires_at: session.expires_at,
        }
    }
}
