//! Audit log search handler.

use axum::Json;
use axum::extract::{Query, State};

use carechart_core::types::pagination::PageResponse;
use carechart_entity::audit::AuditLogEntry;

use crate::dto::request::AuditQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/admin/audit
pub async fn search_audit(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<AuditQuery>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<AuditLogEntry>>>, ApiError> {
    let result = state
        .admin_service
        .search_audit(&auth, query.into(), page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}
