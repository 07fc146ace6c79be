//! Session token validation.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use carechart_core::config::AuthConfig;
use carechart_core::error::AppError;

use super::claims::Claims;

/// Verifies token signature and expiry.
#[derive(Clone)]
pub struct TokenDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decode a token, rejecting bad signatures and expired tokens.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::unauthenticated("Session has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::unauthenticated("Invalid session token signature")
                }
                _ => AppError::unauthenticated("Invalid session token"),
            })
    }
}
