//! Patient handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use carechart_core::types::pagination::PageResponse;
use carechart_entity::patient::{CreatePatient, Patient};

use crate::dto::request::PatientListQuery;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/patients
pub async fn list_patients(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PatientListQuery>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Patient>>>, ApiError> {
    let result = state
        .patient_service
        .list(&auth, query.search.as_deref(), page.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// POST /api/patients
pub async fn create_patient(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreatePatient>,
) -> Result<(StatusCode, Json<ApiResponse<Patient>>), ApiError> {
    let patient = state.patient_service.create(&auth, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(patient))))
}

/// GET /api/patients/{id}
pub async fn get_patient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    let patient = state.patient_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(patient)))
}
