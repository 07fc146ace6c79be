//! Authentication, lockout, and session configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lowest password length the configuration may ask for.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication and credential configuration.
///
/// Passed explicitly into the login guard and password validator at
/// construction time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for session token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Absolute session lifetime in hours.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: u64,
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Consecutive failed login attempts that lock the account.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: i32,
    /// Remaining-attempt count at or below which the login error names it.
    #[serde(default = "default_low_attempts")]
    pub low_attempts_warning: i32,
    /// Whether username/email matching ignores case.
    #[serde(default = "default_true")]
    pub case_insensitive_login: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            session_ttl_hours: default_session_ttl(),
            cookie_name: default_cookie_name(),
            password_min_length: default_password_min(),
            max_failed_attempts: default_max_failed(),
            low_attempts_warning: default_low_attempts(),
            case_insensitive_login: true,
        }
    }
}

impl AuthConfig {
    /// Rejects settings the lockout guard cannot operate with.
    pub fn check(&self) -> Result<(), AppError> {
        if self.max_failed_attempts < 1 {
            return Err(AppError::configuration(
                "auth.max_failed_attempts must be at least 1",
            ));
        }
        if self.low_attempts_warning < 0 {
            return Err(AppError::configuration(
                "auth.low_attempts_warning must not be negative",
            ));
        }
        if self.session_ttl_hours == 0 {
            return Err(AppError::configuration(
                "auth.session_ttl_hours must be at least 1",
            ));
        }
        if self.password_min_length < MIN_PASSWORD_LENGTH {
            return Err(AppError::configuration(format!(
                "auth.password_min_length must be at least {MIN_PASSWORD_LENGTH}"
            )));
        }
        if self.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        Ok(())
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_session_ttl() -> u64 {
    24
}

fn default_cookie_name() -> String {
    "carechart_session".to_string()
}

fn default_password_min() -> usize {
    MIN_PASSWORD_LENGTH
}

fn default_max_failed() -> i32 {
    5
}

fn default_low_attempts() -> i32 {
    2
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rejects_zero_threshold() {
        let config = AuthConfig {
            max_failed_attempts: 0,
            ..AuthConfig::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_check_rejects_short_password_floor() {
        let config = AuthConfig {
            password_min_length: 6,
            ..AuthConfig::default()
        };
        let err = config.check().unwrap_err();
        assert!(err.message.contains("password_min_length"));

        let config = AuthConfig {
            password_min_length: MIN_PASSWORD_LENGTH,
            ..AuthConfig::default()
        };
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_check_accepts_defaults() {
        assert!(AuthConfig::default().check().is_ok());
    }
}
