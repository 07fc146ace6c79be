//! Medical record repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use carechart_core::error::{AppError, ErrorKind};
use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::record::{MedicalRecord, MedicalRecordPatch, NewMedicalRecord, RecordLookup};

use super::violated_constraint;
use crate::traits::RecordStore;

/// Repository for medical records.
#[derive(Debug, Clone)]
pub struct MedicalRecordRepository {
    pool: PgPool,
}

impl MedicalRecordRepository {
    /// Create a new medical record repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore<MedicalRecord> for MedicalRecordRepository {
    async fn create(
        &self,
        record_id: &str,
        draft: &NewMedicalRecord,
        created_by: Option<i64>,
    ) -> AppResult<MedicalRecord> {
        sqlx::query_as::<_, MedicalRecord>(
            "INSERT INTO medical_records \
             (record_id, patient_id, visit_date, chief_complaint, diagnosis, treatment_plan, \
              medications, lab_results, vital_signs, notes, created_by) \
             VALUES ($1, $2, COALESCE($3, NOW()), $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(record_id)
        .bind(draft.patient_id)
        .bind(draft.visit_date)
        .bind(&draft.chief_complaint)
        .bind(&draft.diagnosis)
        .bind(&draft.treatment_plan)
        .bind(&draft.medications)
        .bind(&draft.lab_results)
        .bind(&draft.vital_signs)
        .bind(&draft.notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match violated_constraint(&e).as_deref() {
            Some("medical_records_record_id_key") => {
                AppError::conflict(format!("Medical record '{record_id}' already exists"))
            }
            Some("medical_records_patient_id_fkey") => {
                AppError::not_found(format!("Patient {} not found", draft.patient_id))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create medical record", e),
        })
    }

    async fn find_by_reference(
        &self,
        reference: &str,
        lookup: RecordLookup,
    ) -> AppResult<Option<MedicalRecord>> {
        let reference = reference.trim();
        sqlx::query_as::<_, MedicalRecord>(
            "SELECT * FROM medical_records \
             WHERE (id = $1 OR record_id = $2) AND ($3 OR deleted_at IS NULL) \
             ORDER BY CASE WHEN id = $1 THEN 0 ELSE 1 END LIMIT 1",
        )
        .bind(reference.parse::<i64>().ok())
        .bind(reference)
        .bind(lookup == RecordLookup::IncludeDeleted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find medical record", e))
    }

    async fn list_for_patient(
        &self,
        patient_id: i64,
        include_deleted: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<MedicalRecord>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM medical_records \
             WHERE patient_id = $1 AND ($2 OR deleted_at IS NULL)",
        )
        .bind(patient_id)
        .bind(include_deleted)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count medical records", e)
        })?;

        let records = sqlx::query_as::<_, MedicalRecord>(
            "SELECT * FROM medical_records \
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
            AppError::with_source(ErrorKind::Database, "Failed to list medical records", e)
        })?;

        Ok(page.respond(records, total as u64))
    }

    async fn update(&self, id: i64, patch: &MedicalRecordPatch) -> AppResult<MedicalRecord> {
        sqlx::query_as::<_, MedicalRecord>(
            "UPDATE medical_records SET \
                 visit_date = COALESCE($2, visit_date), \
                 chief_complaint = COALESCE($3, chief_complaint), \
                 diagnosis = COALESCE($4, diagnosis), \
                 treatment_plan = COALESCE($5, treatment_plan), \
                 medications = COALESCE($6, medications), \
                 lab_results = COALESCE($7, lab_results), \
                 vital_signs = COALESCE($8, vital_signs), \
                 notes = COALESCE($9, notes), \
                 updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(patch.visit_date)
        .bind(&patch.chief_complaint)
        .bind(&patch.diagnosis)
        .bind(&patch.treatment_plan)
        .bind(&patch.medications)
        .bind(&patch.lab_results)
        .bind(&patch.vital_signs)
        .bind(&patch.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update medical record", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Medical record {id} not found")))
    }

    async fn soft_delete(&self, id: i64) -> AppResult<MedicalRecord> {
        sqlx::query_as::<_, MedicalRecord>(
            "UPDATE medical_records SET deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete medical record", e)
        })?
        .ok_or_else(|| AppError::not_found(format!("Medical record {id} not found")))
    }
}
