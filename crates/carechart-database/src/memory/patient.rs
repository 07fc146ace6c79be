//! In-memory patient store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use carechart_core::error::AppError;
use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::patient::{CreatePatient, Patient};

use crate::traits::PatientStore;

#[derive(Debug, Default)]
struct InnerState {
    next_id: i64,
    patients: BTreeMap<i64, Patient>,
}

/// In-memory patient store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatientStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryPatientStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientStore for MemoryPatientStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Patient>> {
        Ok(self.state.lock().await.patients.get(&id).cloned())
    }

    async fn create(&self, data: &CreatePatient, created_by: Option<i64>) -> AppResult<Patient> {
        let mut state = self.state.lock().await;
        if state.patients.values().any(|p| p.mrn == data.mrn) {
            return Err(AppError::conflict(format!(
                "MRN '{}' already exists",
                data.mrn
            )));
        }

        state.next_id += 1;
        let now = Utc::now();
        let patient = Patient {
            id: state.next_id,
            mrn: data.mrn.clone(),
            full_name: data.full_name.clone(),
            date_of_birth: data.date_of_birth,
            gender: data.gender.clone(),
            phone: data.phone.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        };
        state.patients.insert(patient.id, patient.clone());
        Ok(patient)
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Patient>> {
        let state = self.state.lock().await;
        let mut matched: Vec<Patient> = state
            .patients
            .values()
            .filter(|p| search.map(|q| p.matches_search(q)).unwrap_or(true))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(page.paginate(matched))
    }
}
