//! Clinical record handlers, shared by the medical and monitoring routes.
//!
//! Each handler is generic over the record kind; the router instantiates
//! it once per kind.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use validator::Validate;

use carechart_core::types::pagination::PageResponse;
use carechart_entity::record::{ClinicalRecord, MedicalRecord, MonitoringRecord};
use carechart_service::{ClinicalRecordService, HistoryView};

use crate::dto::request::{DeleteRecordQuery, RecordListQuery};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// Selects the record service for a kind.
pub trait RecordService<R: ClinicalRecord> {
    fn records(&self) -> &ClinicalRecordService<R>;
}

impl RecordService<MedicalRecord> for AppState {
    fn records(&self) -> &ClinicalRecordService<MedicalRecord> {
        &self.medical_records
    }
}

impl RecordService<MonitoringRecord> for AppState {
    fn records(&self) -> &ClinicalRecordService<MonitoringRecord> {
        &self.monitoring_records
    }
}

/// POST /api/{kind}-records
pub async fn create_record<R>(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(draft): Json<R::Draft>,
) -> Result<(StatusCode, Json<ApiResponse<R>>), ApiError>
where
    R: ClinicalRecord,
    R::Draft: DeserializeOwned + Validate,
    R::Patch: Validate,
    AppState: RecordService<R>,
{
    let record = state.records().create(&auth, draft).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

/// GET /api/{kind}-records/{reference}
pub async fn get_record<R>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<R>>, ApiError>
where
    R: ClinicalRecord,
    R::Draft: Validate,
    R::Patch: Validate,
    AppState: RecordService<R>,
{
    let record = state.records().get(&auth, &reference).await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// PUT /api/{kind}-records/{reference}
pub async fn update_record<R>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reference): Path<String>,
    Json(patch): Json<R::Patch>,
) -> Result<Json<ApiResponse<R>>, ApiError>
where
    R: ClinicalRecord,
    R::Draft: Validate,
    R::Patch: DeserializeOwned + Validate,
    AppState: RecordService<R>,
{
    let record = state.records().update(&auth, &reference, patch).await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// DELETE /api/{kind}-records/{reference}
pub async fn delete_record<R>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reference): Path<String>,
    Query(query): Query<DeleteRecordQuery>,
) -> Result<Json<ApiResponse<R>>, ApiError>
where
    R: ClinicalRecord,
    R::Draft: Validate,
    R::Patch: Validate,
    AppState: RecordService<R>,
{
    let record = state
        .records()
        .delete(&auth, &reference, query.reason)
        .await?;
    Ok(Json(ApiResponse::ok(record)))
}

/// GET /api/{kind}-records/{reference}/history
pub async fn record_history<R>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(reference): Path<String>,
) -> Result<Json<ApiResponse<Vec<HistoryView>>>, ApiError>
where
    R: ClinicalRecord,
    R::Draft: Validate,
    R::Patch: Validate,
    AppState: RecordService<R>,
{
    let history = state.records().history(&auth, &reference).await?;
    Ok(Json(ApiResponse::ok(history)))
}

/// GET /api/patients/{id}/{kind}-records
pub async fn list_patient_records<R>(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(patient_id): Path<i64>,
    Query(query): Query<RecordListQuery>,
    Query(page): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<R>>>, ApiError>
where
    R: ClinicalRecord,
    R::Draft: Validate,
    R::Patch: Validate,
    AppState: RecordService<R>,
{
    let result = state
        .records()
        .list_for_patient(
            &auth,
            patient_id,
            query.include_deleted,
            page.into_page_request(),
        )
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}
