//! Monitoring record repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use carechart_core::error::{AppError, ErrorKind};
use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::record::{
    MonitoringRecord, MonitoringRecordPatch, NewMonitoringRecord, RecordLookup,
};

use super::violated_constraint;
use crate::traits::RecordStore;

/// Repository for monitoring (vital-sign) records.
#[derive(Debug, Clone)]
pub struct MonitoringRecordRepository {
    pool: PgPool,
}

impl MonitoringRecordRepository {
    /// Create a new monitoring record repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<MonitoringRecord> for MonitoringRecordRepository {
    async fn create(
        &self,
        record_id: &str,
        draft: &NewMonitoringRecord,
        created_by: Option<i64>,
    ) -> AppResult<MonitoringRecord> {
        sqlx::query_as::<_, MonitoringRecord>(
            "INSERT INTO monitoring_records \
             (record_id, patient_id, recorded_at, systolic_bp, diastolic_bp, heart_rate, \
              respiratory_rate, temperature_c, oxygen_saturation, blood_glucose, weight_kg, \
              pain_score, notes, created_by) \
             VALUES ($1, $2, COALESCE($3, NOW()), $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING *",
        )
        .bind(record_id)
        .bind(draft.patient_id)
        .bind(draft.recorded_at)
        .bind(draft.systolic_bp)
        .bind(draft.diastolic_bp)
        .bind(draft.heart_rate)
        .bind(draft.respiratory_rate)
        .bind(draft.temperature_c)
        .bind(draft.oxygen_saturation)
        .bind(draft.blood_glucose)
        .bind(draft.weight_kg)
        .bind(draft.pain_score)
        .bind(&draft.notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e).as_deref() {
            Some("monitoring_records_record_id_key") => {
                AppError::conflict(format!("Monitoring record '{record_id}' already exists"))
            }
            Some("monitoring_records_patient_id_fkey") => {
                AppError::not_found(format!("Patient {} not found", draft.patient_id))
            }
            _ => {
                AppError::with_source(ErrorKind::Database, "Failed to create monitoring record", e)
            }
        })
    }

    async fn find_by_reference(
        &self,
        reference: &str,
        lookup: RecordLookup,
    ) -> AppResult<Option<MonitoringRecord>> {
        let reference = reference.trim();
        sqlx::query_as::<_, MonitoringRecord>(
            "SELECT * FROM monitoring_records \
             WHERE (id = $1 OR record_id = $2) AND ($3 OR deleted_at IS NULL) \
             ORDER BY CASE WHEN id = $1 THEN 0 ELSE 1 END LIMIT 1",
        )
        .bind(reference.parse::<i64>().ok())
        .bind(reference)
        .bind(lookup == RecordLookup::IncludeDeleted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find monitoring record", e)
        })
    }

    async fn list_for_patient(
        &self,
        patient_id: i64,
        include_deleted: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<MonitoringRecord>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM monitoring_records \
             WHERE patient_id = $1 AND ($2 OR deleted_at IS NULL)",
        )
        .bind(patient_id)
        .bind(include_deleted)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count monitoring records", e)
        })?;

        let records = sqlx::query_as::<_, MonitoringRecord>(
            "SELECT * FROM monitoring_records \
             WHERE patient_id = $1 AND ($2 OR deleted_at IS NULL) \
             ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4",
        )
        .bind(patient_id)
        .bind(include_deleted)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list monitoring records", e)
        })?;

        Ok(page.respond(records, total as u64))
    }

    async fn update(&self, id: i64, patch: &MonitoringRecordPatch) -> AppResult<MonitoringRecord> {
        sqlx::query_as::<_, MonitoringRecord>(
            "UPDATE monitoring_records SET \
                 recorded_at = COALESCE($2, recorded_at), \
                 systolic_bp = COALESCE($3, systolic_bp), \
                 diastolic_bp = COALESCE($4, diastolic_bp), \
                 heart_rate = COALESCE($5, heart_rate), \
                 respiratory_rate = COALESCE($6, respiratory_rate), \
                 temperature_c = COALESCE($7, temperature_c), \
                 oxygen_saturation = COALESCE($8, oxygen_saturation), \
                 blood_glucose = COALESCE($9, blood_glucose), \
                 weight_kg = COALESCE($10, weight_kg), \
                 pain_score = COALESCE($11, pain_score), \
                 notes = COALESCE($12, notes), \
                 updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(patch.recorded_at)
        .bind(patch.systolic_bp)
        .bind(patch.diastolic_bp)
        .bind(patch.heart_rate)
        .bind(patch.respiratory_rate)
        .bind(patch.temperature_c)
        .bind(patch.oxygen_saturation)
        .bind(patch.blood_glucose)
        .bind(patch.weight_kg)
        .bind(patch.pain_score)
        .bind(&patch.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update monitoring record", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Monitoring record {id} not found")))
    }

    async fn soft_delete(&self, id: i64) -> AppResult<MonitoringRecord> {
        sqlx::query_as::<_, MonitoringRecord>(
            "UPDATE monitoring_records SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete monitoring record", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Monitoring record {id} not found")))
    }
}
