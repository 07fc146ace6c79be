//! Password complexity policy.
//!
//! Every rule is evaluated so callers can report all failures at once.

use serde::{Deserialize, Serialize};

use carechart_core::config::AuthConfig;
use carechart_core::error::AppError;

/// Characters accepted by the symbol rule.
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?`~";

/// Passwords refused regardless of composition. Compared case-insensitively.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password1!",
    "password123",
    "password123!",
    "passw0rd",
    "passw0rd!",
    "p@ssw0rd",
    "p@ssword1",
    "123456",
    "12345678",
    "123456789",
    "qwerty",
    "qwerty123",
    "qwerty123!",
    "letmein",
    "letmein1!",
    "welcome1",
    "welcome1!",
    "welcome123",
    "admin123",
    "admin@123",
    "changeme",
    "changeme1!",
    "iloveyou",
    "abc123",
    "abcd1234!",
    "trustno1",
    "monkey123",
    "sunshine1",
];

/// A single complexity rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
    NotCommon,
}

impl PasswordRule {
    /// Human-readable description for error responses.
    pub fn describe(&self, min_length: usize) -> String {
        match self {
            Self::MinLength => format!("at least {min_length} characters"),
            Self::Uppercase => "at least one uppercase letter".to_string(),
            Self::Lowercase => "at least one lowercase letter".to_string(),
            Self::Digit => "at least one digit".to_string(),
            Self::Symbol => "at least one symbol".to_string(),
            Self::NotCommon => "not a commonly used password".to_string(),
        }
    }
}

/// Outcome of checking a candidate password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCheck {
    pub valid: bool,
    pub failed_rules: Vec<PasswordRule>,
}

/// Validates password strength against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Minimum accepted length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Evaluate every rule against `password`.
    pub fn check(&self, password: &str) -> PasswordCheck {
        let mut failed_rules = Vec::new();

        if password.chars().count() < self.min_length {
            failed_rules.push(PasswordRule::MinLength);
        }
        if !password.chars().any(char::is_uppercase) {
            failed_rules.push(PasswordRule::Uppercase);
        }
        if !password.chars().any(char::is_lowercase) {
            failed_rules.push(PasswordRule::Lowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            failed_rules.push(PasswordRule::Digit);
        }
        if !password.chars().any(|c| SYMBOLS.contains(c)) {
            failed_rules.push(PasswordRule::Symbol);
        }
        let lowered = password.to_lowercase();
        if COMMON_PASSWORDS.contains(&lowered.as_str()) {
            failed_rules.push(PasswordRule::NotCommon);
        }

        PasswordCheck {
            valid: failed_rules.is_empty(),
            failed_rules,
        }
    }

    /// Check `password` and turn a failure into a validation error listing
    /// every failed rule in its details.
    pub fn enforce(&self, password: &str) -> Result<(), AppError> {
        let check = self.check(password);
        if check.valid {
            return Ok(());
        }

        let requirements: Vec<String> = check
            .failed_rules
            .iter()
            .map(|rule| rule.describe(self.min_length))
            .collect();
        Err(
            AppError::validation(format!(
                "Password does not meet requirements: {}",
                requirements.join(", ")
            ))
            .with_details(serde_json::json!({ "failed_rules": check.failed_rules })),
        )
    }

    /// Reject a new password identical to the current one.
    pub fn validate_not_same(&self, old_password: &str, new_password: &str) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}
