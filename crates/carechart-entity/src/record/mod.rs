//! Clinical record entities.
//!
//! Two record kinds exist, medical and monitoring. Both share the same
//! lifecycle (`absent -> active -> soft-deleted`) and the same dual
//! identity: an internal storage id and an external-facing `record_id`.

pub mod kind;
pub mod medical;
pub mod monitoring;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use kind::RecordKind;
pub use medical::{MedicalRecord, MedicalRecordPatch, NewMedicalRecord};
pub use monitoring::{MonitoringRecord, MonitoringRecordPatch, NewMonitoringRecord};

/// Creation payload for a clinical record.
pub trait RecordDraft: Send + Sync {
    /// The external identifier requested by the caller, if any.
    fn external_id(&self) -> Option<&str>;

    /// The patient the record belongs to.
    fn patient_id(&self) -> i64;
}

/// Behaviour shared by every clinical record kind.
pub trait ClinicalRecord:
    Serialize + DeserializeOwned + Clone + std::fmt::Debug + Send + Sync + 'static
{
    /// Creation payload.
    type Draft: RecordDraft;
    /// Partial update payload.
    type Patch: Send + Sync;

    /// Which kind of record this is.
    const KIND: RecordKind;

    /// Internal storage identifier.
    fn storage_id(&self) -> i64;

    /// External-facing identifier.
    fn external_id(&self) -> &str;

    /// Owning patient.
    fn patient_id(&self) -> i64;

    /// Soft-delete marker.
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Build a fresh record from a draft.
    fn from_draft(
        id: i64,
        record_id: String,
        draft: &Self::Draft,
        created_by: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self;

    /// Apply a partial update. Fields absent from the patch are kept.
    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>);

    /// Set the soft-delete marker.
    fn mark_deleted(&mut self, now: DateTime<Utc>);

    /// Whether the record has been soft-deleted.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// How a lookup treats soft-deleted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLookup {
    /// Exclude soft-deleted records (update and delete paths).
    ActiveOnly,
    /// Include soft-deleted records (history and audit views).
    IncludeDeleted,
}

impl RecordLookup {
    /// Whether a record with the given delete marker passes this lookup.
    pub fn admits(&self, deleted_at: Option<DateTime<Utc>>) -> bool {
        match self {
            Self::ActiveOnly => deleted_at.is_none(),
            Self::IncludeDeleted => true,
        }
    }
}
