//! Admin account management handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use carechart_core::types::pagination::PageResponse;
use carechart_entity::account::UpdateAccount;
use carechart_service::user::CreateAccountRequest;

use crate::dto::request::{AccountListQuery, ResetPasswordRequest};
use crate::dto::response::{AccountResponse, ApiResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

type AccountJson = Json<ApiResponse<AccountResponse>>;

/// GET /api/admin/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AccountListQuery>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<AccountResponse>>>, ApiError> {
    let result = state
        .admin_service
        .list_accounts(&auth, query.into(), page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(result.map(AccountResponse::from))))
}

/// POST /api/admin/accounts
pub async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, AccountJson), ApiError> {
    let account = state.admin_service.create_account(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(account.into()))))
}

/// GET /api/admin/accounts/{id}
pub async fn get_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<AccountJson, ApiError> {
    let account = state.admin_service.get_account(&auth, id).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// PUT /api/admin/accounts/{id}
pub async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAccount>,
) -> Result<AccountJson, ApiError> {
    let account = state.admin_service.update_account(&auth, id, req).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// POST /api/admin/accounts/{id}/unlock
pub async fn unlock_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<AccountJson, ApiError> {
    let account = state.admin_service.unlock(&auth, id).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// POST /api/admin/accounts/{id}/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<AccountJson, ApiError> {
    let account = state
        .admin_service
        .reset_password(&auth, id, &req.new_password)
        .await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// POST /api/admin/accounts/{id}/deactivate
pub async fn deactivate_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<AccountJson, ApiError> {
    let account = state.admin_service.deactivate(&auth, id).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}

/// POST /api/admin/accounts/{id}/activate
pub async fn activate_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<AccountJson, ApiError> {
    let account = state.admin_service.activate(&auth, id).await?;
    Ok(Json(ApiResponse::ok(account.into())))
}
