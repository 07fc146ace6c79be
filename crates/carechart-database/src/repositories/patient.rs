//! Patient repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use carechart_core::error::{AppError, ErrorKind};
use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::patient::{CreatePatient, Patient};

use super::violated_constraint;
use crate::traits::PatientStore;

/// Repository for the patient registry.
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: PgPool,
}

impl PatientRepository {
    /// Create a new patient repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PatientStore for PatientRepository {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Patient>> {
        sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find patient", e))
    }

    async fn create(&self, data: &CreatePatient, created_by: Option<i64>) -> AppResult<Patient> {
        sqlx::query_as::<_, Patient>(
            "INSERT INTO patients (mrn, full_name, date_of_birth, gender, phone, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&data.mrn)
        .bind(&data.full_name)
        .bind(data.date_of_birth)
        .bind(&data.gender)
        .bind(&data.phone)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violated_constraint(&e).as_deref() == Some("patients_mrn_key") {
                AppError::conflict(format!("MRN '{}' already exists", data.mrn))
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to create patient", e)
            }
        })
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Patient>> {
        let pattern = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM patients \
             WHERE $1::TEXT IS NULL OR full_name ILIKE $1 OR mrn ILIKE $1",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count patients", e))?;

        let patients = sqlx::query_as::<_, Patient>(
            "SELECT * FROM patients \
             WHERE $1::TEXT IS NULL OR full_name ILIKE $1 OR mrn ILIKE $1 \
             ORDER BY full_name ASC, id ASC LIMIT $2 OFFSET $3",
        )
        .bind(&pattern)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list patients", e))?;

        Ok(page.respond(patients, total as u64))
    }
}
