//! Failed-login lockout policy.
//!
//! The counter itself lives on the account row and is advanced atomically
//! by [`AccountStore::record_failed_login`]; this module only decides what
//! the caller is told after each failure.
//!
//! [`AccountStore::record_failed_login`]: carechart_database::AccountStore::record_failed_login

use carechart_core::config::AuthConfig;
use carechart_core::error::AppError;
use carechart_entity::account::Account;

/// Message returned whenever the failure reason must not be disclosed.
pub const GENERIC_LOGIN_FAILURE: &str = "Invalid username or password";

/// Lockout threshold and warning window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    /// Consecutive failures that lock the account.
    pub threshold: i32,
    /// Remaining-attempt count at or below which the error names it.
    pub low_attempts_warning: i32,
}

impl LockoutPolicy {
    /// Creates a policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            threshold: config.max_failed_attempts,
            low_attempts_warning: config.low_attempts_warning,
        }
    }

    /// Attempts left before the account locks.
    pub fn remaining(&self, account: &Account) -> i32 {
        (self.threshold - account.failed_login_attempts).max(0)
    }

    /// Error for a login attempt against an account that is already locked.
    pub fn locked_error(&self) -> AppError {
        AppError::account_locked(
            "Account is locked due to too many failed login attempts. Contact an administrator.",
        )
    }

    /// Error for a password mismatch, given the account state after the
    /// counter was advanced.
    pub fn failure_error(&self, account: &Account) -> AppError {
        if account.is_locked {
            return AppError::account_locked(format!(
                "Account is now locked after {} failed login attempts. Contact an administrator.",
                account.failed_login_attempts
            ));
        }

        let remaining = self.remaining(account);
        if remaining <= self.low_attempts_warning {
            let noun = if remaining == 1 { "attempt" } else { "attempts" };
            return AppError::invalid_credentials(format!(
                "{GENERIC_LOGIN_FAILURE}. {remaining} {noun} remaining before the account is locked."
            ));
        }

        AppError::invalid_credentials(GENERIC_LOGIN_FAILURE)
    }
}
