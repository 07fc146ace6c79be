//! Auth handlers: login, logout, me, password change and check.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use carechart_auth::PasswordCheck;
use carechart_service::user::ChangePasswordRequest;

use crate::dto::request::{LoginRequest, ValidatePasswordRequest};
use crate::dto::response::{
    AccountResponse, ApiResponse, LoginResponse, MeResponse, MessageResponse,
};
use crate::error::ApiError;
use crate::extractors::{ClientInfo, SessionUser};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ClientInfo(origin): ClientInfo,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<LoginResponse>>), ApiError> {
    let result = state
        .session_manager
        .authenticate(&req.identifier, &req.password, &origin)
        .await?;

    let cookie = Cookie::build((state.config.auth.cookie_name.clone(), result.token.clone()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/");

    Ok((jar.add(cookie), Json(ApiResponse::ok(result.into()))))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: SessionUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<MessageResponse>>), ApiError> {
    state
        .session_manager
        .logout(&auth.identity, &auth.origin)
        .await?;

    let jar = jar.remove(Cookie::build(state.config.auth.cookie_name.clone()).path("/"));
    Ok((
        jar,
        Json(ApiResponse::ok(MessageResponse::new("Logged out successfully"))),
    ))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: SessionUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let account = state.account_service.profile(&auth).await?;

    Ok(Json(ApiResponse::ok(MeResponse {
        identity: auth.0.identity,
        account: account.into(),
    })))
}

/// PUT /api/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: SessionUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, ApiError> {
    let account = state.account_service.change_password(&auth, req).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// POST /api/auth/password/validate
pub async fn validate_password(
    State(state): State<AppState>,
    Json(req): Json<ValidatePasswordRequest>,
) -> Json<ApiResponse<PasswordCheck>> {
    Json(ApiResponse::ok(
        state.account_service.check_password(&req.password),
    ))
}
