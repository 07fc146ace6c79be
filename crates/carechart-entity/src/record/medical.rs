//! Medical record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{ClinicalRecord, RecordDraft, RecordKind};

/// A visit-level medical record for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MedicalRecord {
    /// Storage identifier.
    pub id: i64,
    /// External identifier (e.g. `MR-4F1A09C2B7DE`).
    pub record_id: String,
    /// Owning patient.
    pub patient_id: i64,
    /// Date and time of the visit.
    pub visit_date: DateTime<Utc>,
    /// Presenting complaint.
    pub chief_complaint: Option<String>,
    /// Working or final diagnosis.
    pub diagnosis: Option<String>,
    /// Planned treatment.
    pub treatment_plan: Option<String>,
    /// Prescribed medications, free-form JSON.
    pub medications: Option<serde_json::Value>,
    /// Lab results, free-form JSON.
    pub lab_results: Option<serde_json::Value>,
    /// Vital signs taken at the visit, free-form JSON.
    pub vital_signs: Option<serde_json::Value>,
    /// Clinician notes.
    pub notes: Option<String>,
    /// Authoring account.
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Creation payload for a medical record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewMedicalRecord {
    /// Caller-chosen external id; generated when absent.
    #[validate(length(min = 1, max = 64))]
    pub record_id: Option<String>,
    #[validate(range(min = 1))]
    pub patient_id: i64,
    /// Defaults to the creation time.
    pub visit_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub chief_complaint: Option<String>,
    #[validate(length(max = 2000))]
    pub diagnosis: Option<String>,
    #[validate(length(max = 4000))]
    pub treatment_plan: Option<String>,
    pub medications: Option<serde_json::Value>,
    pub lab_results: Option<serde_json::Value>,
    pub vital_signs: Option<serde_json::Value>,
    #[validate(length(max = 10000))]
    pub notes: Option<String>,
}

impl RecordDraft for NewMedicalRecord {
    fn external_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    fn patient_id(&self) -> i64 {
        self.patient_id
    }
}

/// Partial update for a medical record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MedicalRecordPatch {
    pub visit_date: Option<DateTime<Utc>>,
    #[validate(length(max = 2000))]
    pub chief_complaint: Option<String>,
    #[validate(length(max = 2000))]
    pub diagnosis: Option<String>,
    #[validate(length(max = 4000))]
    pub treatment_plan: Option<String>,
    pub medications: Option<serde_json::Value>,
    pub lab_results: Option<serde_json::Value>,
    pub vital_signs: Option<serde_json::Value>,
    #[validate(length(max = 10000))]
    pub notes: Option<String>,
}

impl ClinicalRecord for MedicalRecord {
    type Draft = NewMedicalRecord;
    type Patch = MedicalRecordPatch;

    const KIND: RecordKind = RecordKind::Medical;

    fn storage_id(&self) -> i64 {
        self.id
    }

    fn external_id(&self) -> &str {
        &self.record_id
    }

    fn patient_id(&self) -> i64 {
        self.patient_id
    }

    fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    fn from_draft(
        id: i64,
        record_id: String,
        draft: &NewMedicalRecord,
        created_by: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            record_id,
            patient_id: draft.patient_id,
            visit_date: draft.visit_date.unwrap_or(now),
            chief_complaint: draft.chief_complaint.clone(),
            diagnosis: draft.diagnosis.clone(),
            treatment_plan: draft.treatment_plan.clone(),
            medications: draft.medications.clone(),
            lab_results: draft.lab_results.clone(),
            vital_signs: draft.vital_signs.clone(),
            notes: draft.notes.clone(),
            created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn apply_patch(&mut self, patch: &MedicalRecordPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.visit_date {
            self.visit_date = v;
        }
        if let Some(v) = &patch.chief_complaint {
            self.chief_complaint = Some(v.clone());
        }
        if let Some(v) = &patch.diagnosis {
            self.diagnosis = Some(v.clone());
        }
        if let Some(v) = &patch.treatment_plan {
            self.treatment_plan = Some(v.clone());
        }
        if let Some(v) = &patch.medications {
            self.medications = Some(v.clone());
        }
        if let Some(v) = &patch.lab_results {
            self.lab_results = Some(v.clone());
        }
        if let Some(v) = &patch.vital_signs {
            self.vital_signs = Some(v.clone());
        }
        if let Some(v) = &patch.notes {
            self.notes = Some(v.clone());
        }
        self.updated_at = now;
    }

    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> NewMedicalRecord {
        NewMedicalRecord {
            patient_id: 3,
            diagnosis: Some("Hypertension".into()),
            medications: Some(json!([{ "name": "lisinopril", "dose": "10mg" }])),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_draft_defaults_visit_date() {
        let now = Utc::now();
        let rec = MedicalRecord::from_draft(1, "MR-1".into(), &draft(), Some(9), now);
        assert_eq!(rec.visit_date, now);
        assert_eq!(rec.created_by, Some(9));
        assert!(!rec.is_deleted());
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let now = Utc::now();
        let mut rec = MedicalRecord::from_draft(1, "MR-1".into(), &draft(), None, now);
        let patch = MedicalRecordPatch {
            notes: Some("Follow up in 2 weeks".into()),
            ..Default::default()
        };
        rec.apply_patch(&patch, now);
        assert_eq!(rec.diagnosis.as_deref(), Some("Hypertension"));
        assert_eq!(rec.notes.as_deref(), Some("Follow up in 2 weeks"));
    }

    #[test]
    fn test_draft_requires_patient() {
        let bad = NewMedicalRecord::default();
        assert!(bad.validate().is_err());
        assert!(draft().validate().is_ok());
    }
}
