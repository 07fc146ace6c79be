//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::account::AccountRole;

/// A server-side login session.
///
/// Carries a denormalized copy of the account's identity fields taken at
/// login time. The lifetime is absolute: `expires_at` never moves.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The account this session belongs to.
    pub account_id: i64,
    /// Username at login time.
    pub username: String,
    /// Display name at login time.
    pub display_name: Option<String>,
    /// Role at login time.
    pub role: AccountRole,
    /// Administrative privilege at login time.
    pub is_admin: bool,
    /// The account still has to replace its password. Cleared on every open
    /// session once it does.
    pub must_change_password: bool,
    /// Origin address of the login request.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
    /// When the session was ended by logout.
    pub terminated_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Check whether the session is still usable at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.terminated_at.is_none() && self.expires_at > now
    }

    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    /// Pre-generated session id (embedded in the token).
    pub id: Uuid,
    /// The account this session belongs to.
    pub account_id: i64,
    /// Username snapshot.
    pub username: String,
    /// Display name snapshot.
    pub display_name: Option<String>,
    /// Role snapshot.
    pub role: AccountRole,
    /// Admin flag snapshot.
    pub is_admin: bool,
    /// Pending forced password change.
    pub must_change_password: bool,
    /// Client address.
    pub ip_address: Option<String>,
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry.
    pub expires_at: DateTime<Utc>,
}

impl From<CreateSession> for Session {
    fn from(data: CreateSession) -> Self {
        Self {
            id: data.id,
            account_id: data.account_id,
            username: data.username,
            display_name: data.display_name,
            role: data.role,
            is_admin: data.is_admin,
            must_change_password: data.must_change_password,
            ip_address: data.ip_address,
            user_agent: data.user_agent,
            created_at: data.created_at,
            expires_at: data.expires_at,
            terminated_at: None,
        }
    }
}
