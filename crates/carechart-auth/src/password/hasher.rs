//! Credential storage for CareChart accounts.
//!
//! Account rows only ever hold the PHC-encoded Argon2id digest produced
//! here; plaintext never reaches a store.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use carechart_core::error::AppError;

/// Produces and checks `accounts.password_hash` values.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Digest for a new or reset password. Each call draws a fresh salt, so
    /// two digests of the same password never match textually.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| AppError::internal(format!("Could not hash credential: {e}")))
    }

    /// Check a login or current-password attempt against a stored digest.
    ///
    /// A wrong password is `Ok(false)` and feeds the lockout counter. A
    /// digest that fails to parse is an internal error, never a mismatch.
    pub fn verify_password(&self, password: &str, stored: &str) -> Result<bool, AppError> {
        let digest = PasswordHash::new(stored)
            .map_err(|e| AppError::internal(format!("Stored credential is corrupt: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &digest) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Could not verify credential: {e}"
            ))),
        }
    }
}
