//! Session lifecycle manager: login with lockout, logout, validation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use carechart_core::config::AuthConfig;
use carechart_core::error::AppError;
use carechart_database::{AccountStore, SessionStore};
use carechart_entity::account::Account;
use carechart_entity::audit::{AuditAction, CreateAuditLogEntry};
use carechart_entity::session::{CreateSession, Session};

use crate::audit::{ClientOrigin, SecurityAudit};
use crate::lockout::{GENERIC_LOGIN_FAILURE, LockoutPolicy};
use crate::password::PasswordHasher;
use crate::token::{TokenDecoder, TokenEncoder};

use super::identity::SessionIdentity;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// Signed session token.
    pub token: String,
    /// The created session row.
    pub session: Session,
    /// The authenticated account after the login bookkeeping.
    pub account: Account,
    /// The account must change its password before doing anything else.
    pub must_change_password: bool,
}

/// Manages login, logout and per-request validation.
#[derive(Clone)]
pub struct SessionManager {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    audit: SecurityAudit,
    hasher: PasswordHasher,
    encoder: TokenEncoder,
    decoder: TokenDecoder,
    policy: LockoutPolicy,
    session_ttl: Duration,
    case_insensitive_login: bool,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("policy", &self.policy)
            .field("session_ttl", &self.session_ttl)
            .field("case_insensitive_login", &self.case_insensitive_login)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager. All policy knobs come from `config`.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        audit: SecurityAudit,
        config: &AuthConfig,
    ) -> Self {
        Self {
            accounts,
            sessions,
            audit,
            hasher: PasswordHasher::new(),
            encoder: TokenEncoder::new(config),
            decoder: TokenDecoder::new(config),
            policy: LockoutPolicy::new(config),
            session_ttl: Duration::hours(config.session_ttl_hours as i64),
            case_insensitive_login: config.case_insensitive_login,
        }
    }

    /// Authenticate by username or email.
    ///
    /// 1. Resolve the identifier among active accounts
    /// 2. Refuse locked accounts without checking the password
    /// 3. On mismatch, advance the lockout counter atomically
    /// 4. On success, reset the counter, open a session and sign a token
    ///
    /// Every outcome writes an audit entry.
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
        origin: &ClientOrigin,
    ) -> Result<LoginResult, AppError> {
        let identifier = identifier.trim();

        let account = match self
            .accounts
            .find_active_by_login(identifier, self.case_insensitive_login)
            .await?
        {
            Some(account) => account,
            None => {
                info!(identifier = %identifier, "Login attempt for unknown account");
                self.audit
                    .record(
                        CreateAuditLogEntry::failure(AuditAction::Login, "Unknown account")
                            .actor(None, Some(identifier.to_string()))
                            .details(serde_json::json!({ "identifier": identifier })),
                        origin,
                    )
                    .await;
                return Err(AppError::invalid_credentials(GENERIC_LOGIN_FAILURE));
            }
        };

        if account.is_locked {
            warn!(account_id = account.id, "Login attempt on locked account");
            return Err(self.reject_locked(&account, origin).await);
        }

        if !self.hasher.verify_password(password, &account.password_hash)? {
            return Err(self.handle_failed_login(&account, origin).await?);
        }

        // The lock may have been set by a concurrent failure since the lookup.
        let Some(account) = self
            .accounts
            .record_successful_login(account.id, origin.ip_address.as_deref())
            .await?
        else {
            warn!(account_id = account.id, "Account locked during login");
            return Err(self.reject_locked(&account, origin).await);
        };

        let session = self.open_session(&account, origin).await?;
        let token = self.encoder.issue(&session)?;

        self.audit
            .record(
                CreateAuditLogEntry::success(AuditAction::Login)
                    .actor(Some(account.id), Some(account.username.clone()))
                    .target(account.id)
                    .details(serde_json::json!({ "session_id": session.id })),
                origin,
            )
            .await;

        info!(
            account_id = account.id,
            session_id = %session.id,
            "Login successful"
        );

        Ok(LoginResult {
            token,
            must_change_password: account.must_change_password,
            session,
            account,
        })
    }

    /// Terminate the caller's session.
    pub async fn logout(
        &self,
        identity: &SessionIdentity,
        origin: &ClientOrigin,
    ) -> Result<(), AppError> {
        let terminated = self.sessions.terminate(identity.session_id, Utc::now()).await?;

        self.audit
            .record(
                CreateAuditLogEntry::success(AuditAction::Logout)
                    .actor(Some(identity.account_id), Some(identity.username.clone()))
                    .details(serde_json::json!({ "session_id": identity.session_id })),
                origin,
            )
            .await;

        info!(
            account_id = identity.account_id,
            session_id = %identity.session_id,
            terminated,
            "Logout completed"
        );
        Ok(())
    }

    /// Resolve a presented token into an identity.
    ///
    /// The token signature and expiry are checked first, then the session
    /// row must exist, be open, and be unexpired.
    pub async fn validate(&self, token: &str) -> Result<SessionIdentity, AppError> {
        let claims = self.decoder.decode(token)?;

        let session = self
            .sessions
            .find_by_id(claims.session_id())
            .await?
            .ok_or_else(|| AppError::unauthenticated("Session not found"))?;

        if session.account_id != claims.account_id() {
            warn!(session_id = %session.id, "Token subject does not match session");
            return Err(AppError::unauthenticated("Invalid session token"));
        }
        if session.terminated_at.is_some() {
            return Err(AppError::unauthenticated("Session has been terminated"));
        }
        if !session.is_active_at(Utc::now()) {
            return Err(AppError::unauthenticated("Session has expired"));
        }

        Ok(SessionIdentity::from(&session))
    }

    /// Audit a login refused because the account is locked.
    async fn reject_locked(&self, account: &Account, origin: &ClientOrigin) -> AppError {
        let err = self.policy.locked_error();
        self.audit
            .record(
                CreateAuditLogEntry::failure(AuditAction::Login, err.message.clone())
                    .actor(Some(account.id), Some(account.username.clone()))
                    .target(account.id),
                origin,
            )
            .await;
        err
    }

    /// Advance the lockout counter and build the caller-facing error.
    async fn handle_failed_login(
        &self,
        account: &Account,
        origin: &ClientOrigin,
    ) -> Result<AppError, AppError> {
        let updated = self
            .accounts
            .record_failed_login(account.id, self.policy.threshold)
            .await?;

        let err = self.policy.failure_error(&updated);

        if updated.is_locked {
            warn!(
                account_id = updated.id,
                failed_attempts = updated.failed_login_attempts,
                "Account locked after repeated failed logins"
            );
        } else {
            info!(
                account_id = updated.id,
                failed_attempts = updated.failed_login_attempts,
                "Failed login"
            );
        }

        self.audit
            .record(
                CreateAuditLogEntry::failure(AuditAction::Login, err.message.clone())
                    .actor(Some(updated.id), Some(updated.username.clone()))
                    .target(updated.id)
                    .details(serde_json::json!({
                        "failed_login_attempts": updated.failed_login_attempts,
                        "locked": updated.is_locked,
                    })),
                origin,
            )
            .await;

        Ok(err)
    }

    async fn open_session(
        &self,
        account: &Account,
        origin: &ClientOrigin,
    ) -> Result<Session, AppError> {
        let now = Utc::now();
        self.sessions
            .create(&CreateSession {
                id: Uuid::new_v4(),
                account_id: account.id,
                username: account.username.clone(),
                display_name: account.display_name.clone(),
                role: account.role,
                is_admin: account.has_admin_privilege(),
                must_change_password: account.must_change_password,
                ip_address: origin.ip_address.clone(),
                user_agent: origin.user_agent.clone(),
                created_at: now,
                expires_at: now + self.session_ttl,
            })
            .await
    }
}
