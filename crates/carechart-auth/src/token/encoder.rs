//! Session token creation.

use jsonwebtoken::{EncodingKey, Header, encode};

use carechart_core::config::AuthConfig;
use carechart_core::error::AppError;
use carechart_entity::session::Session;

use super::claims::Claims;

/// Signs session tokens with the configured HMAC secret.
#[derive(Clone)]
pub struct TokenEncoder {
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for TokenEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenEncoder").finish_non_exhaustive()
    }
}

impl TokenEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    /// Issue a token for a freshly created session. The token expires
    /// together with the session row.
    pub fn issue(&self, session: &Session) -> Result<String, AppError> {
        let claims = Claims {
            sub: session.account_id,
            sid: session.id,
            username: session.username.clone(),
            display_name: session.display_name.clone(),
            role: session.role,
            is_admin: session.is_admin,
            iat: session.created_at.timestamp(),
            exp: session.expires_at.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {e}")))
    }
}
