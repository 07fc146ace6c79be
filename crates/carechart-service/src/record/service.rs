//! Record service: create, read, update, soft delete, and history for one
//! record kind.

use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use carechart_auth::RbacEnforcer;
use carechart_core::error::AppError;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_database::{PatientStore, RecordStore};
use carechart_entity::history::HistoryAction;
use carechart_entity::record::{ClinicalRecord, RecordDraft, RecordLookup};

use crate::context::RequestContext;
use crate::history::{HistoryRecorder, HistoryView, RecordRef, Snapshot};
use crate::validation::validate_input;

/// Manages the lifecycle of one clinical record kind.
///
/// Every successful mutation is followed by a history entry holding full
/// before/after snapshots. The history write is not part of the mutation.
pub struct ClinicalRecordService<R: ClinicalRecord> {
    records: Arc<dyn RecordStore<R>>,
    patients: Arc<dyn PatientStore>,
    history: HistoryRecorder,
    rbac: RbacEnforcer,
}

impl<R: ClinicalRecord> Clone for ClinicalRecordService<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            patients: Arc::clone(&self.patients),
            history: self.history.clone(),
            rbac: self.rbac,
        }
    }
}

impl<R: ClinicalRecord> std::fmt::Debug for ClinicalRecordService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClinicalRecordService")
            .field("kind", &R::KIND)
            .finish_non_exhaustive()
    }
}

impl<R> ClinicalRecordService<R>
where
    R: ClinicalRecord,
    R::Draft: Validate,
    R::Patch: Validate,
{
    /// Creates a new record service.
    pub fn new(
        records: Arc<dyn RecordStore<R>>,
        patients: Arc<dyn PatientStore>,
        history: HistoryRecorder,
        rbac: RbacEnforcer,
    ) -> Self {
        Self {
            records,
            patients,
            history,
            rbac,
        }
    }

    /// Create a record. The external id is generated when the draft does
    /// not carry one.
    pub async fn create(&self, ctx: &RequestContext, draft: R::Draft) -> Result<R, AppError> {
        self.rbac.require_clinical(&ctx.identity)?;
        validate_input(&draft)?;

        self.ensure_patient(draft.patient_id()).await?;

        let record_id = match draft.external_id().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => R::KIND.generate_external_id(),
        };

        let record = self
            .records
            .create(&record_id, &draft, Some(ctx.account_id()))
            .await?;

        self.history
            .record(
                HistoryAction::Create,
                &RecordRef::of(&record),
                None,
                snapshot(&record),
                &ctx.identity,
                None,
            )
            .await;

        info!(
            kind = %R::KIND,
            record_id = %record.external_id(),
            patient_id = record.patient_id(),
            actor = %ctx.username(),
            "Clinical record created"
        );

        Ok(record)
    }

    /// Fetch an active record by storage id or external id.
    pub async fn get(&self, ctx: &RequestContext, reference: &str) -> Result<R, AppError> {
        self.rbac.require_clinical(&ctx.identity)?;
        self.find(reference, RecordLookup::ActiveOnly).await
    }

    /// List a patient's records, newest first.
    pub async fn list_for_patient(
        &self,
        ctx: &RequestContext,
        patient_id: i64,
        include_deleted: bool,
        page: PageRequest,
    ) -> Result<PageResponse<R>, AppError> {
        self.rbac.require_clinical(&ctx.identity)?;
        self.ensure_patient(patient_id).await?;
        self.records
            .list_for_patient(patient_id, include_deleted, &page)
            .await
    }

    /// Apply a partial update to an active record.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        reference: &str,
        patch: R::Patch,
    ) -> Result<R, AppError> {
        self.rbac.require_clinical(&ctx.identity)?;
        validate_input(&patch)?;

        let existing = self.find(reference, RecordLookup::ActiveOnly).await?;
        let before = snapshot(&existing);

        let updated = self.records.update(existing.storage_id(), &patch).await?;

        self.history
            .record(
                HistoryAction::Update,
                &RecordRef::of(&updated),
                before,
                snapshot(&updated),
                &ctx.identity,
                None,
            )
            .await;

        info!(
            kind = %R::KIND,
            record_id = %updated.external_id(),
            actor = %ctx.username(),
            "Clinical record updated"
        );

        Ok(updated)
    }

    /// Soft-delete an active record. Deleted records stay readable through
    /// their history only.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        reference: &str,
        reason: Option<String>,
    ) -> Result<R, AppError> {
        self.rbac.require_clinical(&ctx.identity)?;

        let existing = self.find(reference, RecordLookup::ActiveOnly).await?;
        let before = snapshot(&existing);

        let deleted = self.records.soft_delete(existing.storage_id()).await?;
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        self.history
            .record(
                HistoryAction::Delete,
                &RecordRef::of(&deleted),
                before,
                snapshot(&deleted),
                &ctx.identity,
                reason,
            )
            .await;

        info!(
            kind = %R::KIND,
            record_id = %deleted.external_id(),
            actor = %ctx.username(),
            "Clinical record deleted"
        );

        Ok(deleted)
    }

    /// History of a record, including soft-deleted ones, newest first.
    pub async fn history(
        &self,
        ctx: &RequestContext,
        reference: &str,
    ) -> Result<Vec<HistoryView>, AppError> {
        self.rbac.require_clinical(&ctx.identity)?;
        let record = self.find(reference, RecordLookup::IncludeDeleted).await?;
        self.history.list(&RecordRef::of(&record)).await
    }

    async fn find(&self, reference: &str, lookup: RecordLookup) -> Result<R, AppError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(AppError::validation("Record reference is required"));
        }
        self.records
            .find_by_reference(reference, lookup)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{} record not found", R::KIND)))
    }

    async fn ensure_patient(&self, patient_id: i64) -> Result<(), AppError> {
        match self.patients.find_by_id(patient_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("Patient not found")),
        }
    }
}

fn snapshot<R: ClinicalRecord>(record: &R) -> Option<Snapshot> {
    match Snapshot::capture(record) {
        Ok(snap) => Some(snap),
        Err(e) => {
            warn!(kind = %R::KIND, error = %e, "Failed to snapshot record");
            None
        }
    }
}
