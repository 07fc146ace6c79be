//! Session extractors: pull the session token from the Authorization
//! header or the session cookie, validate it, and inject the context.
//!
//! `AuthUser` additionally refuses sessions opened with a pending forced
//! password change. `SessionUser` accepts them and is reserved for the
//! handlers that let the user get out of that state.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;

use carechart_core::error::AppError;
use carechart_service::RequestContext;

use crate::error::ApiError;
use crate::extractors::client::ClientInfo;
use crate::state::AppState;

/// Extracted authenticated user context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    /// Returns the inner `RequestContext`.
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = resolve_context(parts, state).await?;
        context.identity.require_password_current()?;
        Ok(AuthUser(context))
    }
}

/// Authenticated context that may still owe a password change.
#[derive(Debug, Clone)]
pub struct SessionUser(pub RequestContext);

impl std::ops::Deref for SessionUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(SessionUser(resolve_context(parts, state).await?))
    }
}

async fn resolve_context(parts: &mut Parts, state: &AppState) -> Result<RequestContext, ApiError> {
    // Bearer header first, then the cookie set at login
    let token = match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await
    {
        Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
        Err(_) => {
            let jar = CookieJar::from_headers(&parts.headers);
            jar.get(&state.config.auth.cookie_name)
                .map(|c| c.value().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::unauthenticated("Missing session token"))?
        }
    };

    let identity = state.session_manager.validate(&token).await?;
    let ClientInfo(origin) = ClientInfo::from_parts(parts);

    Ok(RequestContext::new(identity, origin))
}
