//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carechart_auth::{LoginResult, SessionIdentity};
use carechart_entity::account::{Account, AccountRole};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Account summary for responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: AccountRole,
    pub is_admin: bool,
    pub is_active: bool,
    pub is_locked: bool,
    pub failed_login_attempts: i32,
    pub must_change_password: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub last_login_ip: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            username: a.username,
            email: a.email,
            display_name: a.display_name,
            role: a.role,
            is_admin: a.is_admin,
            is_active: a.is_active,
            is_locked: a.is_locked,
            failed_login_attempts: a.failed_login_attempts,
            must_change_password: a.must_change_password,
            last_login_at: a.last_login_at,
            last_login_ip: a.last_login_ip,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed session token; also set as an HttpOnly cookie.
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub must_change_password: bool,
    pub account: AccountResponse,
}

impl From<LoginResult> for LoginResponse {
    fn from(r: LoginResult) -> Self {
        Self {
            token: r.token,
            expires_at: r.session.expires_at,
            must_change_password: r.must_change_password,
            account: r.account.into(),
        }
    }
}

/// Current identity plus the stored profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub identity: SessionIdentity,
    pub account: AccountResponse,
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
