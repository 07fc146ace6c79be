//! Patient entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A patient whose clinical records are kept in CareChart.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    /// Storage identifier.
    pub id: i64,
    /// Medical record number; unique, external-facing.
    pub mrn: String,
    /// Full name.
    pub full_name: String,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Gender as recorded at registration.
    pub gender: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Registering account.
    pub created_by: Option<i64>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl Patient {
    /// Case-insensitive substring match over name and MRN.
    pub fn matches_search(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self.full_name.to_lowercase().contains(&needle)
            || self.mrn.to_lowercase().contains(&needle)
    }
}

/// Data required to register a patient.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePatient {
    /// Medical record number.
    #[validate(length(min = 1, max = 64, message = "MRN is required"))]
    pub mrn: String,
    /// Full name.
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Gender.
    #[validate(length(max = 32))]
    pub gender: Option<String>,
    /// Contact phone.
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}
