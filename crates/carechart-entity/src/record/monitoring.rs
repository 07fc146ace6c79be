//! Monitoring (vital signs) record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{ClinicalRecord, RecordDraft, RecordKind};

/// A point-in-time vital-sign observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MonitoringRecord {
    pub id: i64,
    /// External identifier (e.g. `MON-0C6D11E9A3F4`).
    pub record_id: String,
    pub patient_id: i64,
    /// When the observation was taken.
    pub recorded_at: DateTime<Utc>,
    pub systolic_bp: Option<i32>,
    pub diastolic_bp: Option<i32>,
    pub heart_rate: Option<i32>,
    pub respiratory_rate: Option<i32>,
    pub temperature_c: Option<f64>,
    pub oxygen_saturation: Option<f64>,
    pub blood_glucose: Option<f64>,
    pub weight_kg: Option<f64>,
    /// Self-reported pain, 0 to 10.
    pub pain_score: Option<i32>,
    pub notes: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Creation payload for a monitoring record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewMonitoringRecord {
    #[validate(length(min = 1, max = 64))]
    pub record_id: Option<String>,
    #[validate(range(min = 1))]
    pub patient_id: i64,
    pub recorded_at: Option<DateTime<Utc>>,
    #[validate(range(min = 0, max = 400))]
    pub systolic_bp: Option<i32>,
    #[validate(range(min = 0, max = 300))]
    pub diastolic_bp: Option<i32>,
    #[validate(range(min = 0, max = 400))]
    pub heart_rate: Option<i32>,
    #[validate(range(min = 0, max = 150))]
    pub respiratory_rate: Option<i32>,
    #[validate(range(min = 20.0, max = 50.0))]
    pub temperature_c: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub oxygen_saturation: Option<f64>,
    #[validate(range(min = 0.0))]
    pub blood_glucose: Option<f64>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub weight_kg: Option<f64>,
    #[validate(range(min = 0, max = 10))]
    pub pain_score: Option<i32>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

impl RecordDraft for NewMonitoringRecord {
    fn external_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    fn patient_id(&self) -> i64 {
        self.patient_id
    }
}

/// Partial update for a monitoring record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MonitoringRecordPatch {
    pub recorded_at: Option<DateTime<Utc>>,
    #[validate(range(min = 0, max = 400))]
    pub systolic_bp: Option<i32>,
    #[validate(range(min = 0, max = 300))]
    pub diastolic_bp: Option<i32>,
    #[validate(range(min = 0, max = 400))]
    pub heart_rate: Option<i32>,
    #[validate(range(min = 0, max = 150))]
    pub respiratory_rate: Option<i32>,
    #[validate(range(min = 20.0, max = 50.0))]
    pub temperature_c: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub oxygen_saturation: Option<f64>,
    #[validate(range(min = 0.0))]
    pub blood_glucose: Option<f64>,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub weight_kg: Option<f64>,
    #[validate(range(min = 0, max = 10))]
    pub pain_score: Option<i32>,
    #[validate(length(max = 4000))]
    pub notes: Option<String>,
}

fn overwrite<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
    if let Some(v) = value {
        *slot = Some(v.clone());
    }
}

impl ClinicalRecord for MonitoringRecord {
    type Draft = NewMonitoringRecord;
    type Patch = MonitoringRecordPatch;

    const KIND: RecordKind = RecordKind::Monitoring;

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
        draft: &NewMonitoringRecord,
        created_by: Option<i64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            record_id,
            patient_id: draft.patient_id,
            recorded_at: draft.recorded_at.unwrap_or(now),
            systolic_bp: draft.systolic_bp,
            diastolic_bp: draft.diastolic_bp,
            heart_rate: draft.heart_rate,
            respiratory_rate: draft.respiratory_rate,
            temperature_c: draft.temperature_c,
            oxygen_saturation: draft.oxygen_saturation,
            blood_glucose: draft.blood_glucose,
            weight_kg: draft.weight_kg,
            pain_score: draft.pain_score,
            notes: draft.notes.clone(),
            created_by,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    fn apply_patch(&mut self, patch: &MonitoringRecordPatch, now: DateTime<Utc>) {
        if let Some(at) = patch.recorded_at {
            self.recorded_at = at;
        }
        overwrite(&mut self.systolic_bp, &patch.systolic_bp);
        overwrite(&mut self.diastolic_bp, &patch.diastolic_bp);
        overwrite(&mut self.heart_rate, &patch.heart_rate);
        overwrite(&mut self.respiratory_rate, &patch.respiratory_rate);
        overwrite(&mut self.temperature_c, &patch.temperature_c);
        overwrite(&mut self.oxygen_saturation, &patch.oxygen_saturation);
        overwrite(&mut self.blood_glucose, &patch.blood_glucose);
        overwrite(&mut self.weight_kg, &patch.weight_kg);
        overwrite(&mut self.pain_score, &patch.pain_score);
        overwrite(&mut self.notes, &patch.notes);
        self.updated_at = now;
    }

    fn mark_deleted(&mut self, now: DateTime<Utc>) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}
