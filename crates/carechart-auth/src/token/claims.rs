//! Session token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use carechart_entity::account::AccountRole;

/// Claims carried by every session token.
///
/// Mirrors the denormalized identity stored on the session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the account id.
    pub sub: i64,
    /// Session id.
    pub sid: Uuid,
    pub username: String,
    pub display_name: Option<String>,
    pub role: AccountRole,
    pub is_admin: bool,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiration (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn account_id(&self) -> i64 {
        self.sub
    }

    pub fn session_id(&self) -> Uuid {
        self.sid
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
