//! Patient registration and lookup.

use std::sync::Arc;

use tracing::info;

use carechart_core::error::AppError;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_database::PatientStore;
use carechart_entity::patient::{CreatePatient, Patient};

use crate::context::RequestContext;
use crate::validation::validate_input;

/// Patient registry operations. Open to every authenticated role.
#[derive(Clone)]
pub struct PatientService {
    patients: Arc<dyn PatientStore>,
}

impl std::fmt::Debug for PatientService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientService").finish_non_exhaustive()
    }
}

impl PatientService {
    pub fn new(patients: Arc<dyn PatientStore>) -> Self {
        Self { patients }
    }

    /// Register a patient. A duplicate MRN is a conflict.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        mut data: CreatePatient,
    ) -> Result<Patient, AppError> {
        data.mrn = data.mrn.trim().to_string();
        data.full_name = data.full_name.trim().to_string();
        validate_input(&data)?;

        let patient = self.patients.create(&data, Some(ctx.account_id())).await?;

        info!(
            patient_id = patient.id,
            mrn = %patient.mrn,
            actor = %ctx.username(),
            "Patient registered"
        );

        Ok(patient)
    }

    pub async fn get(&self, _ctx: &RequestContext, patient_id: i64) -> Result<Patient, AppError> {
        self.patients
            .find_by_id(patient_id)
            .await?
            .ok_or_else(|| AppError::not_found("Patient not found"))
    }

    /// List patients, optionally filtered by a name or MRN substring.
    pub async fn list(
        &self,
        _ctx: &RequestContext,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<PageResponse<Patient>, AppError> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.patients.list(search, &page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carechart_auth::{ClientOrigin, SessionIdentity};
    use carechart_core::ErrorKind;
    use carechart_database::Stores;
    use carechart_entity::account::AccountRole;
    use chrono::Utc;
    use uuid::Uuid;

    fn ctx() -> RequestContext {
        RequestContext::new(
            SessionIdentity {
                account_id: 5,
                session_id: Uuid::new_v4(),
                username: "frontdesk".into(),
                display_name: None,
                role: AccountRole::Staff,
                is_admin: false,
                must_change_password: false,
                expires_at: Utc::now(),
            },
            ClientOrigin::default(),
        )
    }

    fn patient(mrn: &str, name: &str) -> CreatePatient {
        CreatePatient {
            mrn: mrn.into(),
            full_name: name.into(),
            date_of_birth: None,
            gender: None,
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_register_search_and_conflict() {
        let service = PatientService::new(Stores::memory().patients);
        let ctx = ctx();

        let p = service.create(&ctx, patient(" MRN-7 ", "Lena Hart")).await.unwrap();
        assert_eq!(p.mrn, "MRN-7");
        assert_eq!(p.created_by, Some(5));
        service.create(&ctx, patient("MRN-8", "Omar Reyes")).await.unwrap();

        let found = service
            .list(&ctx, Some("hart"), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].id, p.id);

        let all = service.list(&ctx, Some("  "), PageRequest::default()).await.unwrap();
        assert_eq!(all.total_items, 2);

        let err = service.create(&ctx, patient("MRN-7", "Someone Else")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_blank_name_rejected_and_missing_not_found() {
        let service = PatientService::new(Stores::memory().patients);
        let err = service.create(&ctx(), patient("MRN-1", "   ")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = service.get(&ctx(), 404).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
